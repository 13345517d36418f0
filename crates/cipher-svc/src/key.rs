//! Key resolution: choose between a per-call key and the service default key.

use common::{CipherError, KeyNotFoundReason};

/// Supplies the default key a [`CipherService`](crate::CipherService) is built with.
///
/// Implemented by configuration layers. `None` means no default key is
/// configured; `Some("")` means one is configured but empty, which is reported
/// separately when the key is used.
#[cfg_attr(test, mockall::automock)]
pub trait KeySource {
    /// The configured default key, if any.
    fn default_key(&self) -> Option<String>;
}

impl KeySource for Option<String> {
    fn default_key(&self) -> Option<String> {
        self.clone()
    }
}

/// Resolve the key for one call.
///
/// A per-call key always takes precedence over the default, even when it is
/// empty. Empty strings are rejected, never treated as absent.
///
/// # Errors
///
/// Returns [`CipherError::KeyNotFound`] tagged with the matching
/// [`KeyNotFoundReason`].
pub fn resolve<'a>(
    custom: Option<&'a str>,
    default: Option<&'a str>,
) -> Result<&'a str, CipherError> {
    match (custom, default) {
        (Some(""), _) => Err(CipherError::KeyNotFound(KeyNotFoundReason::CustomKeyEmpty)),
        (Some(key), _) => Ok(key),
        (None, Some("")) => Err(CipherError::KeyNotFound(KeyNotFoundReason::DefaultKeyEmpty)),
        (None, Some(key)) => Ok(key),
        (None, None) => Err(CipherError::KeyNotFound(KeyNotFoundReason::NeitherKeyFound)),
    }
}
