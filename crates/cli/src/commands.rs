//! Command-line surface: argument parsing and command execution.
//!
//! Commands are translated into [`common::protocol`] requests and run against
//! any [`Cipher`] implementation.

use cipher_svc::Cipher;
use clap::{Parser, Subcommand};
use common::protocol::{
    DecryptRequest, DecryptResponse, EncryptRequest, EncryptResponse, ErrorResponse,
};
use serde::Serialize;

/// Encrypt and decrypt messages with XSalsa20-Poly1305 envelopes.
///
/// The default key is read from `APP_KEY`; `--key` overrides it per call.
#[derive(Debug, Parser)]
#[command(name = "sodium", version)]
pub struct Cli {
    /// Print results and errors as JSON.
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Encrypt a message into a `<nonce>.<ciphertext>` envelope.
    Encrypt {
        /// Message to encrypt.
        message: String,
        /// Nonce to use instead of a random one (exactly 24 bytes).
        #[arg(long)]
        nonce: Option<String>,
        /// Key to use instead of `APP_KEY`.
        #[arg(long)]
        key: Option<String>,
    },
    /// Decrypt an envelope produced by `encrypt`.
    Decrypt {
        /// Envelope to decrypt.
        payload: String,
        /// Key to use instead of `APP_KEY`.
        #[arg(long)]
        key: Option<String>,
    },
}

/// Result of a successful command.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum Output {
    Encrypted(EncryptResponse),
    Decrypted(DecryptResponse),
}

impl Output {
    /// Plain-text rendering: the envelope or the recovered message.
    pub fn text(&self) -> &str {
        match self {
            Output::Encrypted(resp) => &resp.payload,
            Output::Decrypted(resp) => &resp.message,
        }
    }
}

/// Run `command` against `cipher`.
pub fn execute(cipher: &impl Cipher, command: Command) -> Result<Output, ErrorResponse> {
    match command {
        Command::Encrypt {
            message,
            nonce,
            key,
        } => {
            let req = EncryptRequest {
                message,
                nonce,
                key,
            };
            encrypt(cipher, &req).map(Output::Encrypted)
        }
        Command::Decrypt { payload, key } => {
            let req = DecryptRequest { payload, key };
            decrypt(cipher, &req).map(Output::Decrypted)
        }
    }
}

/// Serve an [`EncryptRequest`]. The nonce is taken as raw bytes of the string.
pub fn encrypt(
    cipher: &impl Cipher,
    req: &EncryptRequest,
) -> Result<EncryptResponse, ErrorResponse> {
    let payload = cipher
        .encrypt(
            req.message.as_bytes(),
            req.nonce.as_deref().map(str::as_bytes),
            req.key.as_deref(),
        )
        .map_err(|e| ErrorResponse::from(&e))?;
    Ok(EncryptResponse { payload })
}

/// Serve a [`DecryptRequest`]. Plaintext that is not UTF-8 is reported as an error.
pub fn decrypt(
    cipher: &impl Cipher,
    req: &DecryptRequest,
) -> Result<DecryptResponse, ErrorResponse> {
    let plaintext = cipher
        .decrypt(&req.payload, req.key.as_deref())
        .map_err(|e| ErrorResponse::from(&e))?;
    let message = String::from_utf8(plaintext)
        .map_err(|_| ErrorResponse::new("invalid_utf8", "decrypted message is not valid UTF-8"))?;
    Ok(DecryptResponse { message })
}
