//! Common types, protocol definitions, and errors shared across `sodium-svc` crates.

pub mod error;
pub mod protocol;

pub use error::{CipherError, KeyNotFoundReason};
