//! [`CipherService`]: symmetric authenticated encryption behind one narrow API.
//!
//! # Behaviour
//!
//! - `encrypt` validates or generates the nonce, resolves the key, normalizes it
//!   with BLAKE2b, seals the message and frames the result as an envelope.
//! - `decrypt` resolves the key, parses the envelope, normalizes the key and
//!   opens the box. Authentication failures collapse into a single
//!   [`CipherError::DecryptionFailed`].
//!
//! # Security invariants
//!
//! - Keys, nonces and plaintext are **never** logged.
//! - The normalized key lives in a zeroizing buffer for the duration of a call.

use std::fmt;

use common::CipherError;
use tracing::{debug, warn};

use crate::crypto::{secretbox, Entropy, Envelope, OsEntropy, NONCE_LEN};
use crate::key::{self, KeySource};

/// Encrypt/decrypt contract implemented by [`CipherService`].
pub trait Cipher {
    /// Encrypt `message`. When `key` is `None` the service default key is used;
    /// when `nonce` is `None` a fresh random nonce is generated.
    ///
    /// # Errors
    ///
    /// - [`CipherError::NonceLength`] if `nonce` is not exactly [`NONCE_LEN`] bytes.
    /// - [`CipherError::KeyNotFound`] if no usable key can be resolved.
    fn encrypt(
        &self,
        message: &[u8],
        nonce: Option<&[u8]>,
        key: Option<&str>,
    ) -> Result<String, CipherError>;

    /// Decrypt an envelope produced by [`Cipher::encrypt`]. When `key` is
    /// `None` the service default key is used.
    ///
    /// # Errors
    ///
    /// - [`CipherError::KeyNotFound`] if no usable key can be resolved.
    /// - [`CipherError::MalformedPayload`] if `payload` is not a valid envelope.
    /// - [`CipherError::DecryptionFailed`] if authentication fails.
    fn decrypt(&self, payload: &str, key: Option<&str>) -> Result<Vec<u8>, CipherError>;
}

/// Cipher service holding an optional default key.
///
/// Immutable after construction. With the default [`OsEntropy`] source it is
/// `Send + Sync` and can be shared between threads without locking.
#[derive(Clone)]
pub struct CipherService<E = OsEntropy> {
    default_key: Option<String>,
    entropy: E,
}

impl CipherService<OsEntropy> {
    /// Create a service with the given default key, drawing nonces from the OS CSPRNG.
    pub fn new(default_key: Option<String>) -> Self {
        Self::with_entropy(default_key, OsEntropy)
    }

    /// Create a service whose default key is supplied by `source`.
    pub fn from_source(source: &dyn KeySource) -> Self {
        Self::new(source.default_key())
    }
}

impl<E: Entropy> CipherService<E> {
    /// Create a service drawing nonces from a custom random source.
    pub fn with_entropy(default_key: Option<String>, entropy: E) -> Self {
        Self {
            default_key,
            entropy,
        }
    }

    /// Use the caller's nonce after checking its length, or generate one.
    fn resolve_nonce(&self, nonce: Option<&[u8]>) -> Result<[u8; NONCE_LEN], CipherError> {
        match nonce {
            Some(bytes) => bytes.try_into().map_err(|_| CipherError::NonceLength {
                expected: NONCE_LEN,
                actual: bytes.len(),
            }),
            None => {
                let mut generated = [0u8; NONCE_LEN];
                self.entropy.fill(&mut generated);
                Ok(generated)
            }
        }
    }

    fn resolve_key<'a>(&'a self, custom: Option<&'a str>) -> Result<&'a str, CipherError> {
        key::resolve(custom, self.default_key.as_deref()).map_err(|e| {
            warn!(code = e.code(), error = %e, "key resolution failed");
            e
        })
    }
}

impl<E: Entropy> Cipher for CipherService<E> {
    fn encrypt(
        &self,
        message: &[u8],
        nonce: Option<&[u8]>,
        key: Option<&str>,
    ) -> Result<String, CipherError> {
        let nonce_supplied = nonce.is_some();
        let nonce = self.resolve_nonce(nonce)?;
        let key = secretbox::normalize_key(self.resolve_key(key)?.as_bytes());

        let ciphertext = secretbox::seal(message, &nonce, &key)
            .map_err(|_| CipherError::Internal("secretbox seal failed".into()))?;

        let envelope = Envelope { nonce, ciphertext }.to_string();
        debug!(
            message_len = message.len(),
            envelope_len = envelope.len(),
            nonce_supplied,
            "message encrypted"
        );
        Ok(envelope)
    }

    fn decrypt(&self, payload: &str, key: Option<&str>) -> Result<Vec<u8>, CipherError> {
        let key = self.resolve_key(key)?;

        let envelope: Envelope = payload.parse().map_err(|e: CipherError| {
            debug!(error = %e, "rejecting malformed payload");
            e
        })?;

        let key = secretbox::normalize_key(key.as_bytes());
        let plaintext =
            secretbox::open(&envelope.ciphertext, &envelope.nonce, &key).map_err(|_| {
                warn!("payload failed authentication");
                CipherError::DecryptionFailed
            })?;

        debug!(message_len = plaintext.len(), "message decrypted");
        Ok(plaintext)
    }
}

impl<E> fmt::Debug for CipherService<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Never print key material, only whether a default key is configured.
        let default_key = match self.default_key.as_deref() {
            None => "None",
            Some("") => "Some(<empty>)",
            Some(_) => "Some([REDACTED])",
        };
        f.debug_struct("CipherService")
            .field("default_key", &default_key)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Arc;

    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use common::KeyNotFoundReason;

    use super::*;
    use crate::crypto::secretbox::{MockEntropy, TAG_LEN};
    use crate::key::MockKeySource;

    const MESSAGE: &str = "test_message";
    const KEY: &str = "test_key";
    const NONCE: &[u8] = b"abcdefghijklmnopqrstuvwx";

    fn service() -> CipherService {
        CipherService::new(None)
    }

    /// (default key, custom key, expected reason)
    type KeyCase = (Option<&'static str>, Option<&'static str>, KeyNotFoundReason);

    fn key_presence_cases() -> Vec<KeyCase> {
        vec![
            (None, None, KeyNotFoundReason::NeitherKeyFound),
            (None, Some(""), KeyNotFoundReason::CustomKeyEmpty),
            (Some(""), None, KeyNotFoundReason::DefaultKeyEmpty),
        ]
    }

    #[test]
    fn round_trip_with_custom_key() {
        let svc = service();
        let encrypted = svc.encrypt(MESSAGE.as_bytes(), None, Some(KEY)).unwrap();
        assert_ne!(encrypted, MESSAGE);
        let decrypted = svc.decrypt(&encrypted, Some(KEY)).unwrap();
        assert_eq!(decrypted, MESSAGE.as_bytes());
    }

    #[test]
    fn round_trip_with_service_key() {
        let svc = CipherService::new(Some(KEY.into()));
        let encrypted = svc.encrypt(MESSAGE.as_bytes(), None, None).unwrap();
        assert_ne!(encrypted, MESSAGE);
        assert_eq!(svc.decrypt(&encrypted, None).unwrap(), MESSAGE.as_bytes());
    }

    #[test]
    fn custom_key_overrides_service_key() {
        let svc = CipherService::new(Some("k1".into()));
        let encrypted = svc.encrypt(MESSAGE.as_bytes(), None, Some("k2")).unwrap();
        assert_eq!(
            svc.decrypt(&encrypted, None),
            Err(CipherError::DecryptionFailed)
        );
        assert_eq!(
            service().decrypt(&encrypted, Some("k2")).unwrap(),
            MESSAGE.as_bytes()
        );
    }

    #[test]
    fn service_key_and_equal_custom_key_interoperate() {
        let encrypted = CipherService::new(Some("k1".into()))
            .encrypt(MESSAGE.as_bytes(), None, None)
            .unwrap();
        assert_eq!(
            service().decrypt(&encrypted, Some("k1")).unwrap(),
            MESSAGE.as_bytes()
        );
    }

    #[test]
    fn round_trip_with_custom_nonce() {
        let svc = service();
        let encrypted = svc
            .encrypt(MESSAGE.as_bytes(), Some(NONCE), Some(KEY))
            .unwrap();

        let (nonce_b64, ciphertext_b64) = encrypted.split_once('.').unwrap();
        assert!(!ciphertext_b64.contains('.'));
        assert_eq!(nonce_b64, "YWJjZGVmZ2hpamtsbW5vcHFyc3R1dnd4");
        assert_eq!(STANDARD.decode(nonce_b64).unwrap(), NONCE);
        assert_eq!(
            STANDARD.decode(ciphertext_b64).unwrap().len(),
            MESSAGE.len() + TAG_LEN
        );

        assert_eq!(
            svc.decrypt(&encrypted, Some(KEY)).unwrap(),
            MESSAGE.as_bytes()
        );
    }

    #[test]
    fn same_nonce_and_key_is_deterministic() {
        let svc = service();
        let a = svc
            .encrypt(MESSAGE.as_bytes(), Some(NONCE), Some(KEY))
            .unwrap();
        let b = svc
            .encrypt(MESSAGE.as_bytes(), Some(NONCE), Some(KEY))
            .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn random_nonces_differ() {
        let svc = service();
        let a = svc.encrypt(MESSAGE.as_bytes(), None, Some(KEY)).unwrap();
        let b = svc.encrypt(MESSAGE.as_bytes(), None, Some(KEY)).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn generated_nonce_comes_from_entropy_source() {
        let mut entropy = MockEntropy::new();
        entropy
            .expect_fill()
            .times(1)
            .returning(|dest| dest.fill(b'n'));
        let svc = CipherService::with_entropy(Some(KEY.into()), entropy);

        let encrypted = svc.encrypt(MESSAGE.as_bytes(), None, None).unwrap();
        let expected_prefix = format!("{}.", STANDARD.encode([b'n'; NONCE_LEN]));
        assert!(encrypted.starts_with(&expected_prefix));
    }

    #[test]
    fn wrong_nonce_length_is_rejected_before_entropy_is_drawn() {
        let too_short = &NONCE[..NONCE_LEN - 1];
        let too_long = b"abcdefghijklmnopqrstuvwxy".as_slice();
        for nonce in [too_short, too_long] {
            let mut entropy = MockEntropy::new();
            entropy.expect_fill().never();
            let svc = CipherService::with_entropy(None, entropy);

            // No key is configured: the nonce check must still win.
            let err = svc
                .encrypt(MESSAGE.as_bytes(), Some(nonce), None)
                .unwrap_err();
            assert_eq!(
                err,
                CipherError::NonceLength {
                    expected: NONCE_LEN,
                    actual: nonce.len()
                }
            );
        }
    }

    #[test]
    fn key_presence_errors_on_encrypt() {
        for (default_key, custom_key, reason) in key_presence_cases() {
            let svc = CipherService::new(default_key.map(String::from));
            assert_eq!(
                svc.encrypt(MESSAGE.as_bytes(), None, custom_key),
                Err(CipherError::KeyNotFound(reason)),
                "default={default_key:?} custom={custom_key:?}"
            );
        }
    }

    #[test]
    fn key_presence_errors_on_decrypt() {
        for (default_key, custom_key, reason) in key_presence_cases() {
            let svc = CipherService::new(default_key.map(String::from));
            // The payload is not an envelope; key resolution is reported first.
            assert_eq!(
                svc.decrypt(MESSAGE, custom_key),
                Err(CipherError::KeyNotFound(reason)),
                "default={default_key:?} custom={custom_key:?}"
            );
        }
    }

    #[test]
    fn wrong_key_fails_closed() {
        let svc = service();
        let encrypted = svc.encrypt(MESSAGE.as_bytes(), None, Some(KEY)).unwrap();
        assert_eq!(
            svc.decrypt(&encrypted, Some("wrong_key")),
            Err(CipherError::DecryptionFailed)
        );
    }

    #[test]
    fn decryption_failure_message_is_generic() {
        let svc = service();
        let encrypted = svc.encrypt(MESSAGE.as_bytes(), None, Some(KEY)).unwrap();
        let err = svc.decrypt(&encrypted, Some("wrong_key")).unwrap_err();
        assert_eq!(
            err.to_string(),
            "unable to decrypt the payload using the given key"
        );
    }

    #[test]
    fn swapped_nonce_fails_authentication() {
        let svc = service();
        let a = svc.encrypt(b"first", None, Some(KEY)).unwrap();
        let b = svc.encrypt(b"second", None, Some(KEY)).unwrap();
        let (nonce_a, _) = a.split_once('.').unwrap();
        let (_, ciphertext_b) = b.split_once('.').unwrap();
        let spliced = format!("{nonce_a}.{ciphertext_b}");
        assert_eq!(
            svc.decrypt(&spliced, Some(KEY)),
            Err(CipherError::DecryptionFailed)
        );
    }

    #[test]
    fn tampered_ciphertext_fails_authentication() {
        let svc = service();
        let encrypted = svc.encrypt(MESSAGE.as_bytes(), None, Some(KEY)).unwrap();
        let mut envelope: Envelope = encrypted.parse().unwrap();
        let last = envelope.ciphertext.len() - 1;
        envelope.ciphertext[last] ^= 0x01;
        assert_eq!(
            svc.decrypt(&envelope.to_string(), Some(KEY)),
            Err(CipherError::DecryptionFailed)
        );
    }

    #[test]
    fn malformed_payloads_are_detected() {
        let svc = service();
        let encrypted = svc.encrypt(MESSAGE.as_bytes(), None, Some(KEY)).unwrap();
        let cases = [
            "not-a-valid-envelope".to_string(),
            format!("{encrypted}.extra"),
            "a.b.c".to_string(),
            "!!!.AAAA".to_string(),
            "YWJj.AAAA".to_string(),
        ];
        for payload in cases {
            assert!(
                matches!(
                    svc.decrypt(&payload, Some(KEY)),
                    Err(CipherError::MalformedPayload(_))
                ),
                "payload {payload:?}"
            );
        }
    }

    #[test]
    fn empty_and_binary_messages_round_trip() {
        let svc = service();
        for message in [b"".as_slice(), &[0u8, 0xFF, 0x10, 0x80]] {
            let encrypted = svc.encrypt(message, None, Some(KEY)).unwrap();
            assert_eq!(svc.decrypt(&encrypted, Some(KEY)).unwrap(), message);
        }
    }

    #[test]
    fn from_source_asks_for_default_key_once() {
        let mut source = MockKeySource::new();
        source
            .expect_default_key()
            .times(1)
            .return_const(Some("k1".to_string()));
        let svc = CipherService::from_source(&source);

        let encrypted = svc.encrypt(MESSAGE.as_bytes(), None, None).unwrap();
        assert_eq!(svc.decrypt(&encrypted, None).unwrap(), MESSAGE.as_bytes());
    }

    #[test]
    fn shared_across_threads() {
        let svc = Arc::new(CipherService::new(Some(KEY.into())));
        let envelopes: Vec<String> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|i| {
                    let svc = Arc::clone(&svc);
                    scope.spawn(move || {
                        let message = format!("message {i}");
                        let encrypted = svc.encrypt(message.as_bytes(), None, None).unwrap();
                        assert_eq!(svc.decrypt(&encrypted, None).unwrap(), message.as_bytes());
                        encrypted
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        let nonces: HashSet<&str> = envelopes
            .iter()
            .map(|e| e.split_once('.').unwrap().0)
            .collect();
        assert_eq!(nonces.len(), envelopes.len());
    }

    #[test]
    fn debug_redacts_default_key() {
        let dbg = format!("{:?}", CipherService::new(Some("super-secret".into())));
        assert!(dbg.contains("REDACTED"));
        assert!(!dbg.contains("super-secret"));
    }
}
