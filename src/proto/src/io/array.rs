use std::fmt::Debug;
use std::io::{Read, Write};
use std::ops::{Deref, DerefMut};

use crate::io::error::Error;
use crate::io::io::{Readable, Writable};
use crate::io::var::VarInt;

macro_rules! length_prefixed_sequence_writable {
    ($t: tt<$param: tt>) => {
        impl<T: Writable> Writable for $t < $param > {
            fn write<W: Write>(&self, buf: &mut W) -> Result<usize, Error> {
                let mut written = VarInt(self.len() as i32).write(buf)?;
                for x in self.iter() {
                    written += x.write(buf)?;
                }

                Ok(written)
            }
        }
    };
}

impl<T: Readable + Debug, const C: usize> Readable for [T; C] {
    fn read<R: Read>(buf: &mut R) -> Result<Self, Error> where Self: Sized {
        let mut vec = Vec::new();
        for _ in 0..C {
            vec.push(T::read(buf)?);
        }

        Ok(vec.try_into().unwrap())
    }
}

impl<T: Writable, const C: usize> Writable for [T; C] {
    fn write<W: Write>(&self, buf: &mut W) -> Result<usize, Error> {
        let mut written = 0;
        for x in self {
            written += x.write(buf)?;
        }

        Ok(written)
    }
}

impl<T: Readable> Readable for Box<[T]> {
    fn read<R: Read>(buf: &mut R) -> Result<Self, Error> where Self: Sized {
        let len = VarInt::read(buf)?;
        if len.0 < 0 {
            return Err(Error::InvalidLength(len.0));
        }

        let mut slice = Vec::new();
        for _ in 0..len.0 {
            slice.push(T::read(buf)?);
        }

        Ok(slice.into_boxed_slice())
    }
}

length_prefixed_sequence_writable!(Box<[T]>);

impl<T: Readable> Readable for Vec<T> {
    fn read<R: Read>(buf: &mut R) -> Result<Self, Error> where Self: Sized {
        let len = VarInt::read(buf)?;
        if len.0 < 0 {
            return Err(Error::InvalidLength(len.0));
        }

        let mut vec = Vec::new();
        for _ in 0..len.0 {
            vec.push(T::read(buf)?);
        }

        Ok(vec)
    }
}

length_prefixed_sequence_writable!(Vec<T>);

macro_rules! count_prefixed_array {
    ($name:ident, $len:ty, $doc:literal) => {
        #[doc = $doc]
        #[derive(Debug, Clone)]
        #[cfg_attr(test, derive(PartialEq, Default))]
        pub struct $name<T>(pub Vec<T>);

        impl<T> Deref for $name<T> {
            type Target = Vec<T>;

            fn deref(&self) -> &Self::Target {
                &self.0
            }
        }

        impl<T> DerefMut for $name<T> {
            fn deref_mut(&mut self) -> &mut Self::Target {
                &mut self.0
            }
        }

        impl<T> From<Vec<T>> for $name<T> {
            fn from(vec: Vec<T>) -> Self {
                Self(vec)
            }
        }

        impl<T: Readable> Readable for $name<T> {
            fn read<R: Read>(buf: &mut R) -> Result<Self, Error> where Self: Sized {
                let len = <$len>::read(buf)?;
                if len < 0 {
                    return Err(Error::InvalidLength(len as i32));
                }

                let mut vec = Vec::new();
                for _ in 0..len {
                    vec.push(T::read(buf)?);
                }

                Ok(Self(vec))
            }
        }

        impl<T: Writable> Writable for $name<T> {
            fn write<W: Write>(&self, buf: &mut W) -> Result<usize, Error> {
                let mut written = (self.0.len() as $len).write(buf)?;
                for x in &self.0 {
                    written += x.write(buf)?;
                }

                Ok(written)
            }
        }
    };
}

count_prefixed_array!(ByteArray, i8, "Sequence whose element count is carried as a single signed byte.");
count_prefixed_array!(ShortArray, i16, "Sequence whose element count is carried as a big-endian i16.");
count_prefixed_array!(IntArray, i32, "Sequence whose element count is carried as a big-endian i32.");

macro_rules! length_prefixed_bytes {
    ($name:ident, $len:ty, $doc:literal) => {
        #[doc = $doc]
        #[derive(Debug, Clone)]
        #[cfg_attr(test, derive(PartialEq, Default))]
        pub struct $name(pub Vec<u8>);

        impl Deref for $name {
            type Target = Vec<u8>;

            fn deref(&self) -> &Self::Target {
                &self.0
            }
        }

        impl DerefMut for $name {
            fn deref_mut(&mut self) -> &mut Self::Target {
                &mut self.0
            }
        }

        impl From<Vec<u8>> for $name {
            fn from(bytes: Vec<u8>) -> Self {
                Self(bytes)
            }
        }

        impl Readable for $name {
            fn read<R: Read>(buf: &mut R) -> Result<Self, Error> where Self: Sized {
                let len = <$len>::read(buf)?;
                if len < 0 {
                    return Err(Error::InvalidLength(len as i32));
                }

                // Bytes bypass the per-element loop: one exact read.
                let mut bytes = vec![0; len as usize];
                if buf.read_exact(&mut bytes).is_err() {
                    return Err(Error::Eof);
                }

                Ok(Self(bytes))
            }
        }

        impl Writable for $name {
            fn write<W: Write>(&self, buf: &mut W) -> Result<usize, Error> {
                let written = (self.0.len() as $len).write(buf)?;
                buf.write_all(&self.0)?;

                Ok(written + self.0.len())
            }
        }
    };
}

length_prefixed_bytes!(ShortBytes, i16, "Byte blob whose length is carried as a big-endian i16, copied in one pass.");
length_prefixed_bytes!(IntBytes, i32, "Byte blob whose length is carried as a big-endian i32, copied in one pass.");
