use std::fmt::{Display, Formatter};
use std::io::Error as IOError;
use std::string::FromUtf8Error;

use crate::io::var::VarInt;

#[derive(Debug)]
pub enum Error {
    /// A read crossed the end of the available bytes.
    Eof,
    /// A varint had more continuation bytes than its type allows.
    TooBig,
    /// A length prefix was negative or inconsistent with its element size.
    InvalidLength(i32),
    /// The packet id is not registered for the current state and direction.
    InvalidPacketId(VarInt),
    /// An entity metadata entry carried an unknown type code.
    InvalidMetadataKind(u8),
    Utf8(FromUtf8Error),
    IO(IOError),
}

impl From<IOError> for Error {
    fn from(value: IOError) -> Self {
        Error::IO(value)
    }
}

impl From<FromUtf8Error> for Error {
    fn from(value: FromUtf8Error) -> Self {
        Error::Utf8(value)
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl std::error::Error for Error {}
