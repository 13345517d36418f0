//! XSalsa20-Poly1305 secretbox primitives and envelope framing.
//!
//! This module is free of key-resolution policy. It provides the low-level
//! seal/open operations, key normalization, and the textual envelope used by
//! the service layer.
//!
//! # Envelope format
//!
//! ```text
//! <base64(nonce)>.<base64(tag+ciphertext)>
//! ```
//!
//! Standard base64 alphabet with padding. Nonce, tag layout and key hashing
//! match libsodium's `crypto_secretbox` and `crypto_generichash`, so payloads
//! interoperate with other libsodium-based implementations.

pub mod envelope;
pub mod secretbox;

pub use envelope::Envelope;
pub use secretbox::{Entropy, OsEntropy, KEY_LEN, NONCE_LEN};
