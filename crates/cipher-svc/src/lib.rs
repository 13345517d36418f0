//! Symmetric authenticated encryption with a self-describing envelope format.
//!
//! [`CipherService`] hides nonce generation, key normalization and framing
//! behind two calls:
//!
//! ```
//! use cipher_svc::{Cipher, CipherService};
//!
//! let svc = CipherService::new(Some("app-key".to_string()));
//! let payload = svc.encrypt(b"hello", None, None)?;
//! assert_eq!(svc.decrypt(&payload, None)?, b"hello");
//! # Ok::<(), common::CipherError>(())
//! ```

pub mod crypto;
pub mod key;
pub mod service;

pub use crypto::{Entropy, Envelope, OsEntropy, KEY_LEN, NONCE_LEN};
pub use key::KeySource;
pub use service::{Cipher, CipherService};
