//! Crypto error types.
//!
//! Two severities, per the propagation policy: [`KeyError`] is fatal and
//! surfaces at startup; [`EnvelopeError`] is recoverable per message, so a
//! single corrupt stored envelope never aborts a batch listing.

use thiserror::Error;

/// Errors while loading or generating persisted key material. Fatal.
#[derive(Debug, Error)]
pub enum KeyError {
    /// Exactly one half of the keypair is present on disk.
    #[error("partial key material: found {found} but not {missing}")]
    PartialKeyMaterial {
        /// Path of the key file that exists.
        found: String,
        /// Path of the key file that is missing.
        missing: String,
    },

    /// A key file exists but could not be parsed.
    #[error("invalid key file {path}: {reason}")]
    InvalidPem {
        /// Path of the unparsable key file.
        path: String,
        /// Underlying PKCS#8/SPKI decode failure.
        reason: String,
    },

    /// Keypair generation failed.
    #[error("key generation failed: {0}")]
    Generate(#[from] rsa::Error),

    /// Key material could not be encoded for persistence.
    #[error("key encoding failed: {0}")]
    Encode(String),

    /// IO error reading or writing key files.
    #[error("key file IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors while sealing or opening an envelope.
///
/// `Unwrap` and `Decrypt` are recoverable at the call site: the caller
/// skips the offending entry and keeps going.
#[derive(Debug, Error)]
pub enum EnvelopeError {
    /// Wrapping the symmetric key under the public key failed.
    #[error("symmetric key wrap failed: {0}")]
    Wrap(#[source] rsa::Error),

    /// Unwrapping the symmetric key failed (key mismatch or corrupted wrap).
    #[error("symmetric key unwrap failed: {0}")]
    Unwrap(#[source] rsa::Error),

    /// Decrypting the content failed (corrupted ciphertext, bad padding,
    /// integrity mismatch, or malformed envelope fields).
    #[error("content decryption failed: {0}")]
    Decrypt(String),
}

/// Result type for envelope operations.
pub type Result<T> = std::result::Result<T, EnvelopeError>;
