//! Symmetric cryptography for envelopes.
//!
//! Provides the A256GCM content cipher, AES key wrap (A256KW) and the
//! Concat KDF that turns an ECDH shared secret into a key-encryption key.

use aes_gcm::aead::{Aead, KeyInit, Payload};
use aes_gcm::{Aes256Gcm, Nonce};
use aes_kw::KekAes256;
use rand::RngCore;
use sha2::{Digest, Sha256};

use crate::error::{PermsError, Result};

/// Size of an A256GCM / A256KW key in bytes.
pub const KEY_SIZE: usize = 32;

/// Size of an A256GCM initialization vector in bytes.
pub const IV_SIZE: usize = 12;

/// Size of an A256GCM authentication tag in bytes.
pub const TAG_SIZE: usize = 16;

/// A 256-bit content encryption key (CEK) for A256GCM.
#[derive(Clone, PartialEq, Eq)]
pub struct ContentKey([u8; KEY_SIZE]);

impl ContentKey {
    /// Generate a new random key.
    pub fn generate() -> Self {
        let mut bytes = [0u8; KEY_SIZE];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Create from a slice, failing unless it is exactly 32 bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let arr: [u8; KEY_SIZE] = bytes.try_into().map_err(|_| {
            PermsError::KeyWrapError(format!(
                "invalid content key length: expected {KEY_SIZE}, got {}",
                bytes.len()
            ))
        })?;
        Ok(Self(arr))
    }

    /// Get the raw bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }

    /// Encrypt with A256GCM, returning `(ciphertext, tag)`.
    pub fn encrypt(
        &self,
        plaintext: &[u8],
        iv: &ContentIv,
        aad: &[u8],
    ) -> Result<(Vec<u8>, [u8; TAG_SIZE])> {
        let cipher = Aes256Gcm::new_from_slice(&self.0)
            .map_err(|e| PermsError::EncryptionError(e.to_string()))?;

        let mut sealed = cipher
            .encrypt(Nonce::from_slice(&iv.0), Payload { msg: plaintext, aad })
            .map_err(|e| PermsError::EncryptionError(e.to_string()))?;

        let split = sealed.len() - TAG_SIZE;
        let mut tag = [0u8; TAG_SIZE];
        tag.copy_from_slice(&sealed[split..]);
        sealed.truncate(split);
        Ok((sealed, tag))
    }

    /// Decrypt A256GCM content, checking `tag` over the ciphertext and `aad`.
    pub fn decrypt(
        &self,
        ciphertext: &[u8],
        tag: &[u8],
        iv: &ContentIv,
        aad: &[u8],
    ) -> Result<Vec<u8>> {
        if tag.len() != TAG_SIZE {
            return Err(PermsError::DecryptionError(format!(
                "invalid tag length: expected {TAG_SIZE}, got {}",
                tag.len()
            )));
        }
        let cipher = Aes256Gcm::new_from_slice(&self.0)
            .map_err(|e| PermsError::DecryptionError(e.to_string()))?;

        let mut sealed = Vec::with_capacity(ciphertext.len() + TAG_SIZE);
        sealed.extend_from_slice(ciphertext);
        sealed.extend_from_slice(tag);

        cipher
            .decrypt(
                Nonce::from_slice(&iv.0),
                Payload {
                    msg: &sealed,
                    aad,
                },
            )
            .map_err(|_| PermsError::DecryptionError("content authentication failed".into()))
    }
}

impl std::fmt::Debug for ContentKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ContentKey(..)")
    }
}

/// A 96-bit A256GCM initialization vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentIv(pub [u8; IV_SIZE]);

impl ContentIv {
    /// Generate a new random IV.
    pub fn generate() -> Self {
        let mut bytes = [0u8; IV_SIZE];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Create from a slice, failing unless it is exactly 12 bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let arr: [u8; IV_SIZE] = bytes.try_into().map_err(|_| {
            PermsError::MalformedEnvelope(format!(
                "invalid iv length: expected {IV_SIZE}, got {}",
                bytes.len()
            ))
        })?;
        Ok(Self(arr))
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; IV_SIZE] {
        &self.0
    }
}

/// An A256KW key-encryption key, derived per recipient.
pub struct KeyEncryptionKey([u8; KEY_SIZE]);

impl KeyEncryptionKey {
    /// Derive from an ECDH shared secret `z` with the Concat KDF of
    /// RFC 7518 §4.6.2, for the algorithm `alg`.
    pub fn derive(z: &[u8], alg: &str, apu: &[u8], apv: &[u8]) -> Self {
        let mut key = [0u8; KEY_SIZE];
        key.copy_from_slice(&concat_kdf(z, alg.as_bytes(), apu, apv, KEY_SIZE));
        Self(key)
    }

    /// Wrap a content key (RFC 3394).
    pub fn wrap(&self, cek: &ContentKey) -> Result<Vec<u8>> {
        KekAes256::from(self.0)
            .wrap_vec(cek.as_bytes())
            .map_err(|e| PermsError::KeyWrapError(format!("A256KW wrap: {e}")))
    }

    /// Unwrap a content key. Fails if the integrity check does not pass,
    /// which is what happens when the entry was wrapped for someone else.
    pub fn unwrap(&self, wrapped: &[u8]) -> Result<ContentKey> {
        let bytes = KekAes256::from(self.0)
            .unwrap_vec(wrapped)
            .map_err(|e| PermsError::KeyWrapError(format!("A256KW unwrap: {e}")))?;
        ContentKey::from_slice(&bytes)
    }
}

/// Single-pass Concat KDF with SHA-256. `key_len` is at most 32 bytes.
fn concat_kdf(z: &[u8], alg: &[u8], apu: &[u8], apv: &[u8], key_len: usize) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(1u32.to_be_bytes());
    hasher.update(z);
    for part in [alg, apu, apv] {
        hasher.update((part.len() as u32).to_be_bytes());
        hasher.update(part);
    }
    hasher.update(((key_len * 8) as u32).to_be_bytes());
    hasher.finalize()[..key_len].to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encrypt_decrypt() {
        let key = ContentKey::generate();
        let iv = ContentIv::generate();

        let (ciphertext, tag) = key.encrypt(b"hello, world!", &iv, b"aad").unwrap();
        assert_eq!(ciphertext.len(), b"hello, world!".len());

        let plaintext = key.decrypt(&ciphertext, &tag, &iv, b"aad").unwrap();
        assert_eq!(plaintext, b"hello, world!");
    }

    #[test]
    fn test_decrypt_checks_aad_and_key() {
        let key = ContentKey::generate();
        let iv = ContentIv::generate();
        let (ciphertext, tag) = key.encrypt(b"secret", &iv, b"header").unwrap();

        assert!(key.decrypt(&ciphertext, &tag, &iv, b"other").is_err());
        assert!(ContentKey::generate()
            .decrypt(&ciphertext, &tag, &iv, b"header")
            .is_err());
        assert!(key.decrypt(&ciphertext, &tag[..15], &iv, b"header").is_err());
    }

    #[test]
    fn test_wrap_unwrap() {
        let kek = KeyEncryptionKey::derive(&[7u8; 32], "ECDH-ES+A256KW", b"", b"");
        let cek = ContentKey::generate();

        let wrapped = kek.wrap(&cek).unwrap();
        assert_eq!(wrapped.len(), KEY_SIZE + 8);
        assert_eq!(kek.unwrap(&wrapped).unwrap(), cek);

        let other = KeyEncryptionKey::derive(&[8u8; 32], "ECDH-ES+A256KW", b"", b"");
        assert!(other.unwrap(&wrapped).is_err());
    }

    #[test]
    fn test_concat_kdf_rfc7518_appendix_c() {
        let z = [
            158, 86, 217, 29, 129, 113, 53, 211, 114, 131, 66, 131, 191, 132, 38, 156, 251, 49,
            110, 163, 218, 128, 106, 72, 246, 218, 167, 121, 140, 254, 144, 196,
        ];
        let key = concat_kdf(&z, b"A128GCM", b"Alice", b"Bob", 16);
        assert_eq!(
            key,
            vec![86, 170, 141, 234, 248, 35, 109, 32, 92, 34, 40, 205, 113, 167, 16, 26]
        );
    }

    #[test]
    fn test_kdf_separates_algorithms() {
        let a = KeyEncryptionKey::derive(&[1u8; 32], "ECDH-ES+A256KW", b"", b"");
        let b = KeyEncryptionKey::derive(&[1u8; 32], "ECDH-ES+A128KW", b"", b"");
        assert_ne!(a.0, b.0);
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn any_ciphertext_bit_flip_is_detected(
                plaintext in prop::collection::vec(any::<u8>(), 1..256),
                bit in any::<prop::sample::Index>(),
            ) {
                let key = ContentKey::generate();
                let iv = ContentIv::generate();
                let (mut ciphertext, tag) = key.encrypt(&plaintext, &iv, b"aad").unwrap();

                let i = bit.index(ciphertext.len() * 8);
                ciphertext[i / 8] ^= 1 << (i % 8);
                prop_assert!(key.decrypt(&ciphertext, &tag, &iv, b"aad").is_err());
            }
        }
    }
}
