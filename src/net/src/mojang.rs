use rand::RngCore;
use rsa::{BigUint, Pkcs1v15Encrypt, PublicKey, RsaPublicKey};
use sha1::{Digest, Sha1};

use lodestone_proto::codec::CipherKey;
use lodestone_util::hex;

use crate::error::NetError;

/// Outcome of a session join: the freshly generated symmetric secret for
/// the CFB8 overlay, bound to the server's RSA key so the encryption
/// response can prove possession of it.
pub struct Session {
    shared_secret: CipherKey,
    public_key: RsaPublicKey,
}

impl Session {
    pub(crate) fn new(public_key_der: &[u8]) -> Result<Self, NetError> {
        let (n, e) = rsa_der::public_key_from_der(public_key_der)
            .map_err(|e| NetError::Crypto(format!("server public key: {:?}", e)))?;
        let public_key = RsaPublicKey::new(BigUint::from_bytes_be(&n), BigUint::from_bytes_be(&e))
            .map_err(|e| NetError::Crypto(format!("server public key: {}", e)))?;

        let mut shared_secret = [0; 16];
        rand::thread_rng().fill_bytes(&mut shared_secret);

        Ok(Self {
            shared_secret,
            public_key,
        })
    }

    pub fn shared_secret(&self) -> CipherKey {
        self.shared_secret
    }

    /// RSA-PKCS#1-v1.5 under the server's public key, as required for both
    /// fields of the encryption response.
    pub fn encrypt(&self, data: &[u8]) -> Result<Vec<u8>, NetError> {
        self.public_key
            .encrypt(&mut rand::thread_rng(), Pkcs1v15Encrypt, data)
            .map_err(|e| NetError::Crypto(format!("rsa encrypt: {}", e)))
    }
}

/// The hash a joining client reports to the session server:
/// `SHA1(server_id || shared_secret || public_key_der)` rendered the way
/// Java renders a signed big integer in hex.
pub fn server_hash(server_id: &str, shared_secret: &[u8], public_key_der: &[u8]) -> String {
    let mut sha = Sha1::new();
    sha.update(server_id.as_bytes());
    sha.update(shared_secret);
    sha.update(public_key_der);

    digest_string(sha.finalize().into())
}

/// Signed-hex rendering: when the top bit is set the digest is negated in
/// two's complement and prefixed with a minus sign; leading zeros are
/// trimmed either way.
fn digest_string(mut digest: [u8; 20]) -> String {
    let negative = digest[0] & 0x80 != 0;
    if negative {
        twos_complement(&mut digest);
    }

    let hex = hex::encode(&digest);
    let trimmed = hex.trim_start_matches('0');
    let body = if trimmed.is_empty() { "0" } else { trimmed };

    if negative {
        format!("-{}", body)
    } else {
        body.to_owned()
    }
}

fn twos_complement(bytes: &mut [u8]) {
    let mut carry = true;
    for b in bytes.iter_mut().rev() {
        *b = !*b;
        if carry {
            carry = *b == 0xFF;
            *b = b.wrapping_add(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use rsa::{Pkcs1v15Encrypt, RsaPrivateKey};

    use crate::mojang::{server_hash, Session};

    #[test]
    fn digest_vectors() {
        // Reference vectors from wiki.vg: the username alone is hashed, so
        // the negative formatting and zero trimming are both exercised.
        for (name, digest) in [
            ("Notch", "4ed1f46bbe04bc756bcb17c0c7ce3e4632f06a48"),
            ("jeb_", "-7c9d5b0044c130109a5d7b5fb5c317c02b4e28c1"),
            ("simon", "88e16a1019277b15d58faf0541e11910eb756f6"),
        ] {
            assert_eq!(digest, server_hash(name, &[], &[]));
        }
    }

    #[test]
    fn session_secret_roundtrips_through_rsa() {
        let mut rng = rand::thread_rng();
        let private_key = RsaPrivateKey::new(&mut rng, 1024).unwrap();
        let public_key = private_key.to_public_key();

        use rsa::PublicKeyParts;
        let der = rsa_der::public_key_to_der(
            &public_key.n().to_bytes_be(),
            &public_key.e().to_bytes_be(),
        );

        let session = Session::new(&der).unwrap();
        let encrypted = session.encrypt(&session.shared_secret()).unwrap();

        let decrypted = private_key.decrypt(Pkcs1v15Encrypt, &encrypted).unwrap();
        assert_eq!(session.shared_secret().to_vec(), decrypted);
    }

    #[test]
    fn malformed_key_is_rejected() {
        assert!(Session::new(&[0x30, 0x03, 0x01, 0x02, 0x03]).is_err());
    }
}
