use std::io::{Read, Write};
use std::mem::size_of;

use uuid::Uuid;

use crate::io::error::Error;
use crate::io::io::{Readable, Writable};
use crate::io::var::VarInt;

// Wire names for the primitive field types, as used throughout the packet
// declarations.
pub type Byte = i8;
pub type UnsignedByte = u8;
pub type Short = i16;
pub type UnsignedShort = u16;
pub type Int = i32;
pub type UnsignedInt = u32;
pub type Long = i64;
pub type UnsignedLong = u64;
pub type Float = f32;
pub type Double = f64;

macro_rules! number_impl {
    ($($t:ty),* $(,)?) => {
        $(
            impl Readable for $t {
                fn read<R: Read>(buf: &mut R) -> Result<Self, Error> {
                    let mut tmp = [0; size_of::<$t>()];
                    if buf.read_exact(&mut tmp).is_err() {
                        return Err(Error::Eof);
                    }

                    Ok(<$t>::from_be_bytes(tmp))
                }
            }

            impl Writable for $t {
                fn write<W: Write>(&self, buf: &mut W) -> Result<usize, Error> {
                    buf.write_all(&self.to_be_bytes())?;

                    Ok(size_of::<$t>())
                }
            }
        )*
    };
}

number_impl!(i8, u8, i16, u16, i32, u32, i64, u64, f32, f64);

impl Readable for bool {
    fn read<R: Read>(buf: &mut R) -> Result<Self, Error> {
        Ok(u8::read(buf)? != 0x00)
    }
}

impl Writable for bool {
    fn write<W: Write>(&self, buf: &mut W) -> Result<usize, Error> {
        let byte: u8 = if *self { 0x01 } else { 0x00 };

        byte.write(buf)
    }
}

impl Readable for String {
    fn read<R: Read>(buf: &mut R) -> Result<Self, Error> {
        let len = VarInt::read(buf)?;
        if len.0 < 0 {
            return Err(Error::InvalidLength(len.0));
        }

        let mut bytes = vec![0; len.0 as usize];
        if buf.read_exact(&mut bytes).is_err() {
            return Err(Error::Eof);
        }

        Ok(String::from_utf8(bytes)?)
    }
}

impl Writable for String {
    fn write<W: Write>(&self, buf: &mut W) -> Result<usize, Error> {
        let written = VarInt(self.len() as i32).write(buf)?;
        buf.write_all(self.as_bytes())?;

        Ok(written + self.len())
    }
}

impl Readable for Uuid {
    fn read<R: Read>(buf: &mut R) -> Result<Self, Error> {
        let mut bytes = [0; 16];
        if buf.read_exact(&mut bytes).is_err() {
            return Err(Error::Eof);
        }

        Ok(Uuid::from_bytes(bytes))
    }
}

impl Writable for Uuid {
    fn write<W: Write>(&self, buf: &mut W) -> Result<usize, Error> {
        buf.write_all(self.as_bytes())?;

        Ok(16)
    }
}
