//! Asymmetric keypair lifecycle: generate once, persist, load thereafter.
//!
//! Key material lives in two PEM files (PKCS#8 private key, SPKI public
//! key) under a caller-chosen directory. On startup either both files
//! exist and are loaded, or neither exists and a fresh pair is generated
//! and persisted. Exactly one file present is a configuration error: the
//! process must not silently regenerate and orphan existing ciphertext.

use std::fs;
use std::path::Path;

use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePrivateKey, EncodePublicKey, LineEnding};
use rsa::{RsaPrivateKey, RsaPublicKey};
use tracing::info;

use crate::error::KeyError;

/// File name of the persisted private key (PKCS#8 PEM).
pub const PRIVATE_KEY_FILE: &str = "private_key.pem";
/// File name of the persisted public key (SPKI PEM).
pub const PUBLIC_KEY_FILE: &str = "public_key.pem";

/// RSA modulus size in bits.
const KEY_BITS: usize = 2048;

/// An RSA keypair shared read-only across all pipeline invocations.
///
/// Which keypair a pipeline uses is an explicit constructor argument, not
/// ambient process state; callers that want per-recipient encryption hold
/// one `KeyPair` per recipient.
#[derive(Debug, Clone)]
pub struct KeyPair {
    public: RsaPublicKey,
    private: RsaPrivateKey,
}

impl KeyPair {
    /// Generates a fresh keypair without persisting it.
    pub fn generate() -> Result<Self, KeyError> {
        let mut rng = rand::thread_rng();
        let private = RsaPrivateKey::new(&mut rng, KEY_BITS)?;
        let public = RsaPublicKey::from(&private);
        Ok(Self { public, private })
    }

    /// Loads the keypair persisted under `dir`, or generates and persists
    /// a fresh one if neither key file exists.
    ///
    /// Idempotent across restarts as long as the persisted material is
    /// intact. Exactly one file present returns
    /// [`KeyError::PartialKeyMaterial`].
    pub fn load_or_generate(dir: &Path) -> Result<Self, KeyError> {
        let private_path = dir.join(PRIVATE_KEY_FILE);
        let public_path = dir.join(PUBLIC_KEY_FILE);

        match (private_path.exists(), public_path.exists()) {
            (true, true) => Self::load(&private_path, &public_path),
            (false, false) => {
                let pair = Self::generate()?;
                pair.persist(dir, &private_path, &public_path)?;
                info!(dir = %dir.display(), "generated new keypair");
                Ok(pair)
            }
            (true, false) => Err(KeyError::PartialKeyMaterial {
                found: path_string(&private_path),
                missing: path_string(&public_path),
            }),
            (false, true) => Err(KeyError::PartialKeyMaterial {
                found: path_string(&public_path),
                missing: path_string(&private_path),
            }),
        }
    }

    /// The public half, used to wrap per-message symmetric keys.
    pub fn public(&self) -> &RsaPublicKey {
        &self.public
    }

    /// The private half, used to unwrap symmetric keys on read paths.
    pub fn private(&self) -> &RsaPrivateKey {
        &self.private
    }

    fn load(private_path: &Path, public_path: &Path) -> Result<Self, KeyError> {
        let private_pem = fs::read_to_string(private_path)?;
        let private =
            RsaPrivateKey::from_pkcs8_pem(&private_pem).map_err(|e| KeyError::InvalidPem {
                path: path_string(private_path),
                reason: e.to_string(),
            })?;

        let public_pem = fs::read_to_string(public_path)?;
        let public =
            RsaPublicKey::from_public_key_pem(&public_pem).map_err(|e| KeyError::InvalidPem {
                path: path_string(public_path),
                reason: e.to_string(),
            })?;

        info!(path = %private_path.display(), "loaded persisted keypair");
        Ok(Self { public, private })
    }

    fn persist(&self, dir: &Path, private_path: &Path, public_path: &Path) -> Result<(), KeyError> {
        fs::create_dir_all(dir)?;

        let private_pem = self
            .private
            .to_pkcs8_pem(LineEnding::LF)
            .map_err(|e| KeyError::Encode(e.to_string()))?;
        fs::write(private_path, private_pem.as_bytes())?;

        let public_pem = self
            .public
            .to_public_key_pem(LineEnding::LF)
            .map_err(|e| KeyError::Encode(e.to_string()))?;
        fs::write(public_path, public_pem.as_bytes())?;

        Ok(())
    }
}

fn path_string(path: &Path) -> String {
    path.display().to_string()
}
