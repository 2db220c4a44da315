use std::io::Cursor;

use aes::Aes128;
use cfb8::cipher::{AsyncStreamCipher, NewCipher};
use cfb8::Cfb8;

use crate::io::{Error, VarInt};
use crate::io::{Readable, Writable};

/// 16-byte shared secret key as described [`here`]. It serves as both the
/// AES key and the initial CFB8 register.
///
/// [`here`]: https://wiki.vg/Protocol_Encryption#Symmetric_Encryption
pub type CipherKey = [u8; 16];

/// One direction of the AES-128/CFB8 stream. Each connection holds two
/// independent contexts once encryption is enabled, since the encrypting
/// and decrypting registers advance separately.
pub struct CipherContext {
    cipher: Cfb8<Aes128>
}

impl CipherContext {
    pub fn new(key: CipherKey) -> Self {
        Self {
            cipher: Cfb8::new_from_slices(&key, &key).unwrap()
        }
    }

    pub fn encrypt(&mut self, buf: &mut [u8]) {
        self.cipher.encrypt(buf)
    }

    pub fn decrypt(&mut self, buf: &mut [u8]) {
        self.cipher.decrypt(buf)
    }
}

pub struct ReadableCodec {
    // Buffer of received bytes. It accumulates input data in order to form
    // a packet later.
    buf: Vec<u8>,
    cipher: Option<CipherContext>
}

impl ReadableCodec {
    pub fn new() -> Self {
        Self {
            buf: Vec::new(),
            // Initially the codec passes bytes through untouched. Encryption
            // is enabled upon request during the login exchange.
            cipher: None
        }
    }

    pub fn enable_encryption(&mut self, context: CipherContext) {
        self.cipher = Some(context)
    }

    pub fn append(&mut self, buf: &[u8]) {
        let start = self.buf.len();
        self.buf.extend_from_slice(buf);

        if let Some(cipher) = &mut self.cipher {
            cipher.decrypt(&mut self.buf[start..])
        }
    }

    /// Extracts the next whole frame from the accumulated bytes and decodes
    /// it as `R`, or returns `None` when no complete frame has arrived yet.
    ///
    /// A complete frame is consumed from the buffer whether its body decodes
    /// or not, so a decode failure never desynchronizes the stream.
    pub fn next<R: Readable>(&mut self) -> Result<Option<R>, Error> {
        let mut cursor = Cursor::new(&self.buf[..]);

        let length = match VarInt::read(&mut cursor) {
            Ok(length) => length,
            // The length prefix itself is still incomplete.
            Err(Error::Eof) => return Ok(None),
            // A malformed prefix leaves no way to resynchronize, so the
            // pending bytes are dropped along with the error.
            Err(e) => {
                self.buf.clear();

                return Err(e);
            }
        };

        if length.0 < 0 {
            self.buf.clear();

            return Err(Error::InvalidLength(length.0));
        }

        let body_start = cursor.position() as usize;
        let body_len = length.0 as usize;

        if self.buf.len() - body_start < body_len {
            return Ok(None);
        }

        let mut frame = Cursor::new(&self.buf[body_start..body_start + body_len]);
        let packet = R::read(&mut frame);

        self.buf = self.buf.split_off(body_start + body_len);

        packet.map(Some)
    }

    pub fn buf(&self) -> &Vec<u8> {
        &self.buf
    }
}

impl Default for ReadableCodec {
    fn default() -> Self {
        Self::new()
    }
}

pub struct WritableCodec {
    // Buffer to store temporary data about to send. This storage is used only
    // during write() method invocation and not present between method calls
    buf: Vec<u8>,
    cipher: Option<CipherContext>
}

impl WritableCodec {
    pub fn new() -> Self {
        Self {
            buf: Vec::new(),
            cipher: None
        }
    }

    pub fn enable_encryption(&mut self, context: CipherContext) {
        self.cipher = Some(context)
    }

    /// Encodes `packet` as one frame into `buf`: varint body length, body,
    /// then the cipher pass over the whole frame when encryption is on.
    /// `buf` must hold exactly this frame when the cipher runs, so callers
    /// clear their scratch buffer between frames.
    pub fn write(&mut self, packet: &impl Writable, buf: &mut Vec<u8>) -> Result<(), Error> {
        self.buf.clear();
        packet.write(&mut self.buf)?;

        let length = self.buf.len();
        VarInt(length as i32).write(buf)?;
        buf.extend_from_slice(&self.buf);

        if let Some(ctx) = &mut self.cipher {
            ctx.encrypt(buf);
        }

        Ok(())
    }
}

impl Default for WritableCodec {
    fn default() -> Self {
        Self::new()
    }
}
