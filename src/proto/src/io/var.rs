use std::cmp::Ordering;
use std::fmt::Display;
use std::fmt::Formatter;
use std::io::{Read, Write};

use crate::io::error::Error;
use crate::io::io::{Readable, Writable};

macro_rules! var_impl {
    (
        $t:ident, $prim:ty, $max_len:literal
    ) => {
        impl $t {
            pub const MAX_LENGTH: usize = $max_len;

            const SEGMENT_BITS: $prim = 0x7F;
            const CONTINUE_BIT: $prim = 0x80;

            #[cfg(test)]
            pub(crate) fn from_hex(hex: &str) -> Result<Self, Error> {
                let bytes = lodestone_util::hex::decode(hex).unwrap();

                Self::read(&mut std::io::BufReader::new(bytes.as_slice()))
            }
        }

        impl Display for $t {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<$prim> for $t {
            fn from(value: $prim) -> Self {
                $t(value)
            }
        }

        impl PartialEq<$prim> for $t {
            fn eq(&self, other: &$prim) -> bool {
                self.0 == *other
            }
        }

        impl PartialOrd<$prim> for $t {
            fn partial_cmp(&self, other: &$prim) -> Option<Ordering> {
                self.0.partial_cmp(other)
            }
        }
    }
}

/// Compact i32 implementation small values of which occupy less space on
/// the wire. Every frame length and packet id is carried in this form.
///
/// [`Read more`] about it.
///
/// [`Read more`]: https://wiki.vg/Protocol#VarInt_and_VarLong
#[derive(PartialEq, Eq, Hash, Debug, Clone, Copy)]
#[cfg_attr(test, derive(Default))]
pub struct VarInt(pub i32);

var_impl!(VarInt, i32, 5);

impl Readable for VarInt {
    fn read<R: Read>(buf: &mut R) -> Result<Self, Error> {
        let mut value: i32 = 0;
        let mut position: i32 = 0;

        loop {
            let mut tmp = [0];
            if buf.read_exact(&mut tmp).is_err() {
                return Err(Error::Eof);
            }

            let current_byte = tmp[0];

            value |= (i32::from(current_byte) & VarInt::SEGMENT_BITS) << position;

            if (i32::from(current_byte) & VarInt::CONTINUE_BIT) == 0 {
                return Ok(VarInt(value));
            }

            position += 7;

            if position >= 32 {
                // VarInt is too big
                return Err(Error::TooBig);
            }
        }
    }
}

impl Writable for VarInt {
    fn write<W: Write>(&self, buf: &mut W) -> Result<usize, Error> {
        let mut value = self.0 as u32;
        let mut written = 0;

        loop {
            if (value & !(VarInt::SEGMENT_BITS as u32)) == 0 {
                buf.write_all(&[value as u8])?;

                return Ok(written + 1);
            }

            buf.write_all(&[((value & VarInt::SEGMENT_BITS as u32) | VarInt::CONTINUE_BIT as u32) as u8])?;

            written += 1;
            value >>= 7;
        }
    }
}

/// Compact i64 implementation small values of which occupy less space on
/// the wire.
///
/// [`Read more`] about it.
///
/// [`Read more`]: https://wiki.vg/Protocol#VarInt_and_VarLong
#[derive(PartialEq, Eq, Hash, Debug, Clone, Copy)]
#[cfg_attr(test, derive(Default))]
pub struct VarLong(pub i64);

var_impl!(VarLong, i64, 10);

impl Readable for VarLong {
    fn read<R: Read>(buf: &mut R) -> Result<Self, Error> {
        let mut value: i64 = 0;
        let mut position: i64 = 0;

        loop {
            let mut tmp = [0];
            if buf.read_exact(&mut tmp).is_err() {
                return Err(Error::Eof);
            }

            let current_byte = tmp[0];

            value |= (i64::from(current_byte) & VarLong::SEGMENT_BITS) << position;

            if (i64::from(current_byte) & VarLong::CONTINUE_BIT) == 0 {
                return Ok(VarLong(value));
            }

            position += 7;

            if position >= 64 {
                // VarLong is too big
                return Err(Error::TooBig);
            }
        }
    }
}

impl Writable for VarLong {
    fn write<W: Write>(&self, buf: &mut W) -> Result<usize, Error> {
        let mut value = self.0 as u64;
        let mut written = 0;

        loop {
            if (value & !(VarLong::SEGMENT_BITS as u64)) == 0 {
                buf.write_all(&[value as u8])?;

                return Ok(written + 1);
            }

            buf.write_all(&[((value & VarLong::SEGMENT_BITS as u64) | VarLong::CONTINUE_BIT as u64) as u8])?;

            written += 1;
            value >>= 7;
        }
    }
}
