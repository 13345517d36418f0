//! Textual framing of a sealed message: `<base64(nonce)>.<base64(ciphertext)>`.

use std::fmt;
use std::str::FromStr;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use common::CipherError;

use super::secretbox::NONCE_LEN;

/// Separator between the nonce and ciphertext segments.
pub const SEPARATOR: char = '.';

/// A parsed envelope.
///
/// The string representation is `<base64(nonce)>.<base64(tag+ciphertext)>`
/// using the standard base64 alphabet with padding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    /// Raw nonce bytes.
    pub nonce: [u8; NONCE_LEN],
    /// Raw authentication tag + ciphertext bytes.
    pub ciphertext: Vec<u8>,
}

impl fmt::Display for Envelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{}",
            STANDARD.encode(self.nonce),
            SEPARATOR,
            STANDARD.encode(&self.ciphertext),
        )
    }
}

impl FromStr for Envelope {
    type Err = CipherError;

    /// Parse an envelope string.
    ///
    /// Every structural problem maps to [`CipherError::MalformedPayload`]:
    /// a segment count other than two, invalid base64 in either segment, or a
    /// nonce that does not decode to exactly [`NONCE_LEN`] bytes.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(SEPARATOR).collect();
        let [nonce_b64, ciphertext_b64] = parts.as_slice() else {
            return Err(CipherError::MalformedPayload(format!(
                "expected 2 segments, found {}",
                parts.len()
            )));
        };

        let nonce_bytes = STANDARD
            .decode(nonce_b64)
            .map_err(|e| CipherError::MalformedPayload(format!("nonce segment: {e}")))?;
        let nonce: [u8; NONCE_LEN] = nonce_bytes.try_into().map_err(|bytes: Vec<u8>| {
            CipherError::MalformedPayload(format!(
                "nonce must decode to {NONCE_LEN} bytes, got {}",
                bytes.len()
            ))
        })?;

        let ciphertext = STANDARD
            .decode(ciphertext_b64)
            .map_err(|e| CipherError::MalformedPayload(format!("ciphertext segment: {e}")))?;

        Ok(Self { nonce, ciphertext })
    }
}
