pub use array::{ByteArray, IntArray, IntBytes, ShortArray, ShortBytes};
pub use error::Error;
pub use io::{Readable, Writable};
pub use prim::*;
pub use var::{VarInt, VarLong};

mod array;
mod error;
pub(crate) mod io;
mod prim;
mod var;
