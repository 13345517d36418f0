//! Request and response types exchanged with callers of the cipher service.
//!
//! These types are serialised as JSON by the `sodium` command-line front end.

use serde::{Deserialize, Serialize};

use crate::error::CipherError;

// ---------------------------------------------------------------------------
// Encrypt
// ---------------------------------------------------------------------------

/// Input for an encrypt operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncryptRequest {
    /// The message to encrypt.
    pub message: String,
    /// Caller-supplied nonce. A fresh random nonce is used when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nonce: Option<String>,
    /// Per-call key. The service default key is used when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
}

/// Successful result of an encrypt operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncryptResponse {
    /// `<base64(nonce)>.<base64(ciphertext)>` envelope.
    pub payload: String,
}

// ---------------------------------------------------------------------------
// Decrypt
// ---------------------------------------------------------------------------

/// Input for a decrypt operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecryptRequest {
    /// Envelope previously produced by encrypt.
    pub payload: String,
    /// Per-call key. The service default key is used when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
}

/// Successful result of a decrypt operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecryptResponse {
    /// The recovered plaintext.
    pub message: String,
}

// ---------------------------------------------------------------------------
// Error response
// ---------------------------------------------------------------------------

/// Error body emitted when an operation fails.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Short machine-readable error code (e.g. `"key_not_found"`).
    pub code: String,
    /// Human-readable description safe to expose to callers.
    pub message: String,
}

impl ErrorResponse {
    /// Construct an [`ErrorResponse`] from a code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

impl From<&CipherError> for ErrorResponse {
    fn from(err: &CipherError) -> Self {
        Self::new(err.code(), err.to_string())
    }
}
