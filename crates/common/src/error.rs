//! Error taxonomy shared by the cipher service and its callers.

use std::fmt;

use thiserror::Error;

/// Why no usable key could be resolved for an encrypt/decrypt call.
///
/// An empty string is never treated as an absent key, so each of the three
/// outcomes is reported separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyNotFoundReason {
    /// A per-call key was supplied but it is the empty string.
    CustomKeyEmpty,
    /// No per-call key was supplied and the default key is the empty string.
    DefaultKeyEmpty,
    /// Neither a per-call key nor a default key exists.
    NeitherKeyFound,
}

impl KeyNotFoundReason {
    /// Short diagnostic tag for this reason.
    pub fn tag(&self) -> &'static str {
        match self {
            KeyNotFoundReason::CustomKeyEmpty => "custom key empty",
            KeyNotFoundReason::DefaultKeyEmpty => "default key empty",
            KeyNotFoundReason::NeitherKeyFound => "neither key found",
        }
    }
}

impl fmt::Display for KeyNotFoundReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            KeyNotFoundReason::CustomKeyEmpty => "the custom key should not be an empty string",
            KeyNotFoundReason::DefaultKeyEmpty => "the default key should not be an empty string",
            KeyNotFoundReason::NeitherKeyFound => {
                "neither a default key nor a custom key was found"
            }
        };
        f.write_str(message)
    }
}

/// Errors returned by `encrypt` and `decrypt`.
///
/// [`CipherError::MalformedPayload`] and [`CipherError::DecryptionFailed`] are
/// kept apart: the first means the input must be fixed, the second that the
/// key (or the data) is wrong.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CipherError {
    /// Key resolution failed. Raised before any cryptographic work.
    #[error("key not found: {0}")]
    KeyNotFound(KeyNotFoundReason),

    /// A caller-supplied nonce has the wrong length.
    #[error("the length of the nonce should be {expected} bytes, got {actual}")]
    NonceLength { expected: usize, actual: usize },

    /// The decryption payload is not a well-formed envelope.
    #[error("decryption payload malformed: {0}")]
    MalformedPayload(String),

    /// Authenticated decryption failed. Deliberately carries no detail.
    #[error("unable to decrypt the payload using the given key")]
    DecryptionFailed,

    /// The underlying primitive failed unexpectedly while sealing.
    #[error("internal error: {0}")]
    Internal(String),
}

impl CipherError {
    /// Short machine-readable code for this error (e.g. `"key_not_found"`).
    pub fn code(&self) -> &'static str {
        match self {
            CipherError::KeyNotFound(_) => "key_not_found",
            CipherError::NonceLength { .. } => "nonce_length",
            CipherError::MalformedPayload(_) => "malformed_payload",
            CipherError::DecryptionFailed => "decryption_failed",
            CipherError::Internal(_) => "internal",
        }
    }
}
