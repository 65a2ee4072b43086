//! Vigil Crypto - keypair lifecycle and hybrid envelope encryption.
//!
//! Stored message content is never persisted in plaintext: each message is
//! encrypted under a fresh AES-256 key (CBC, PKCS#7), and that key is
//! wrapped under an RSA-2048 public key with OAEP(SHA-256). This crate
//! provides:
//!
//! - Key lifecycle: generate-once-persist, load-if-present ([`KeyPair`])
//! - [`seal`] / [`open`] envelope primitives
//! - An error split between fatal key-material problems ([`KeyError`])
//!   and recoverable per-message failures ([`EnvelopeError`])
//!
//! # Example
//!
//! ```no_run
//! use vigil_crypto::{seal, open, KeyPair};
//!
//! let keys = KeyPair::load_or_generate("keys".as_ref()).unwrap();
//! let envelope = seal("hello", keys.public()).unwrap();
//! let plaintext = open(&envelope, keys.private()).unwrap();
//! assert_eq!(plaintext, "hello");
//! ```

mod envelope;
pub mod error;
mod keys;

pub use envelope::{open, seal, Envelope};
pub use error::{EnvelopeError, KeyError, Result};
pub use keys::{KeyPair, PRIVATE_KEY_FILE, PUBLIC_KEY_FILE};

// Re-exported so embedders can hold key halves without naming the rsa
// crate directly.
pub use rsa::{RsaPrivateKey, RsaPublicKey};
