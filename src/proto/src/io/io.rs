use std::io::{Read, Write};

use crate::io::Error;

/// Reads itself from the passed instance of [`Read`].
///
/// Primarily, this trait is implemented by all types (including primitives) that
/// could be received via network from the server.
pub trait Readable {
    /// Reads data from underlying source R wrapped with [`Read`].
    /// It is fully synchronous, and it is assumed that reading will be done from
    /// a buffer in memory holding exactly one already framed packet, not from
    /// the Tokio stream directly.
    fn read<R: Read>(buf: &mut R) -> Result<Self, Error>
        where Self: Sized;
}

/// Writes itself to the passed instance of [`Write`].
///
/// Primarily, this trait is implemented by all types (including primitives) that
/// could be transferred through network to the server.
pub trait Writable {
    /// Writes data to underlying sink W wrapped with [`Write`].
    /// It is fully synchronous, and it is assumed that writing will be done to
    /// a buffer in memory that is framed and flushed afterwards, not to the
    /// Tokio stream directly.
    ///
    /// For success, it returns number of written bytes.
    fn write<W: Write>(&self, buf: &mut W) -> Result<usize, Error>;
}

#[cfg(test)]
pub(crate) mod tests {
    use std::fmt::Debug;
    use std::io::Cursor;

    use crate::io::io::{Readable, Writable};

    pub(crate) fn ser_write_read_type_assert<RW>(rw: &RW)
        where RW: Readable + Writable + PartialEq<RW> + Debug
    {
        ser_write_read_type(rw, &|x| {
            assert_eq!(*rw, x)
        })
    }

    pub(crate) fn ser_write_read_type<RW>(ser: &RW, read_fn: &dyn Fn(RW))
        where RW: Readable + Writable
    {
        let mut buf = Vec::new();
        let written = ser.write(&mut buf).unwrap();

        assert_eq!(buf.len(), written);

        let mut reader = Cursor::new(buf.as_slice());
        let value = RW::read(&mut reader).unwrap();

        assert_eq!(buf.len(), reader.position() as usize);

        read_fn(value);
    }
}
