//! XSalsa20-Poly1305 sealing and opening, BLAKE2b key normalization, and the
//! random source used for nonce generation.
//!
//! Callers may pass passphrases of any length as keys. [`normalize_key`] hashes
//! them down to the [`KEY_LEN`] bytes the secretbox construction requires,
//! exactly as libsodium's `crypto_generichash(key, "", 32)` does.

use blake2::{digest::consts::U32, Blake2b, Digest};
use crypto_secretbox::{
    aead::{rand_core::RngCore, Aead, KeyInit, OsRng},
    Key, Nonce, XSalsa20Poly1305,
};
use zeroize::Zeroizing;

/// Byte length of a secretbox nonce (24 bytes = 192 bits).
pub const NONCE_LEN: usize = XSalsa20Poly1305::NONCE_SIZE;

/// Byte length of a secretbox key (32 bytes = 256 bits).
pub const KEY_LEN: usize = XSalsa20Poly1305::KEY_SIZE;

/// Byte length of the Poly1305 tag prefixed to every ciphertext.
pub const TAG_LEN: usize = XSalsa20Poly1305::TAG_SIZE;

/// Unkeyed BLAKE2b with a [`KEY_LEN`]-byte digest.
type KeyHash = Blake2b<U32>;

/// Source of cryptographically secure random bytes.
#[cfg_attr(test, mockall::automock)]
pub trait Entropy {
    /// Fill `dest` entirely with random bytes.
    fn fill(&self, dest: &mut [u8]);
}

/// [`Entropy`] backed by the operating system CSPRNG.
///
/// Stateless; safe to share between threads.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsEntropy;

impl Entropy for OsEntropy {
    fn fill(&self, dest: &mut [u8]) {
        OsRng.fill_bytes(dest);
    }
}

/// Hash arbitrary key material into a fixed-length secretbox key.
pub fn normalize_key(key: &[u8]) -> Zeroizing<[u8; KEY_LEN]> {
    let digest = KeyHash::digest(key);
    let mut out = Zeroizing::new([0u8; KEY_LEN]);
    out.copy_from_slice(&digest);
    out
}

/// Seal `message` under `nonce` and `key`, returning `tag || ciphertext`.
///
/// # Errors
///
/// Returns the primitive's opaque error. The secretbox construction only
/// rejects non-empty associated data, which this function never passes.
pub fn seal(
    message: &[u8],
    nonce: &[u8; NONCE_LEN],
    key: &[u8; KEY_LEN],
) -> Result<Vec<u8>, crypto_secretbox::Error> {
    let cipher = XSalsa20Poly1305::new(Key::from_slice(key));
    cipher.encrypt(Nonce::from_slice(nonce), message)
}

/// Open `tag || ciphertext` produced by [`seal`].
///
/// # Errors
///
/// Returns the primitive's opaque error when the tag does not verify (wrong
/// key, wrong nonce, tampered or truncated ciphertext).
pub fn open(
    ciphertext: &[u8],
    nonce: &[u8; NONCE_LEN],
    key: &[u8; KEY_LEN],
) -> Result<Vec<u8>, crypto_secretbox::Error> {
    let cipher = XSalsa20Poly1305::new(Key::from_slice(key));
    cipher.decrypt(Nonce::from_slice(nonce), ciphertext)
}
