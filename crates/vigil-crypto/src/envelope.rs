//! Hybrid envelope encryption.
//!
//! Each message is encrypted under a fresh random AES-256 key in CBC mode
//! with PKCS#7 padding; the AES key is wrapped under an RSA public key
//! with OAEP(SHA-256). The resulting [`Envelope`] is self-describing and
//! independently persistable: all three fields serialize as base64.
//!
//! CBC with padding alone cannot detect tampering (an IV flip yields
//! valid padding over wrong plaintext), so the sealed payload carries a
//! SHA-256 digest of the plaintext that [`open`] verifies after unpadding.

use aes::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use rand::RngCore;
use rsa::{Oaep, RsaPrivateKey, RsaPublicKey};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{EnvelopeError, Result};

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

/// AES-256 key length in bytes.
const SYMMETRIC_KEY_LEN: usize = 32;
/// AES block / IV length in bytes.
const IV_LEN: usize = 16;
/// SHA-256 digest length appended to the sealed payload.
const DIGEST_LEN: usize = 32;

/// A sealed message: wrapped symmetric key, IV, and ciphertext.
///
/// Decryptable only by the holder of the matching private key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    /// The per-message AES key, wrapped under RSA-OAEP(SHA-256).
    #[serde(with = "b64")]
    pub wrapped_key: Vec<u8>,
    /// CBC initialization vector.
    #[serde(with = "b64")]
    pub iv: Vec<u8>,
    /// AES-256-CBC ciphertext of plaintext ‖ SHA-256(plaintext).
    #[serde(with = "b64")]
    pub ciphertext: Vec<u8>,
}

/// Seals `plaintext` under `public_key`.
///
/// Generates a fresh symmetric key and IV per call; two seals of the same
/// plaintext yield different envelopes.
pub fn seal(plaintext: &str, public_key: &RsaPublicKey) -> Result<Envelope> {
    let mut rng = rand::thread_rng();

    let mut key = [0u8; SYMMETRIC_KEY_LEN];
    rng.fill_bytes(&mut key);
    let mut iv = [0u8; IV_LEN];
    rng.fill_bytes(&mut iv);

    let mut payload = plaintext.as_bytes().to_vec();
    payload.extend_from_slice(&Sha256::digest(plaintext.as_bytes()));

    let ciphertext =
        Aes256CbcEnc::new(&key.into(), &iv.into()).encrypt_padded_vec_mut::<Pkcs7>(&payload);

    let wrapped_key = public_key
        .encrypt(&mut rng, Oaep::new::<Sha256>(), &key)
        .map_err(EnvelopeError::Wrap)?;

    Ok(Envelope {
        wrapped_key,
        iv: iv.to_vec(),
        ciphertext,
    })
}

/// Opens `envelope` with `private_key`, returning the original plaintext.
///
/// Fails with [`EnvelopeError::Unwrap`] on key mismatch or a corrupted
/// wrapped key, and [`EnvelopeError::Decrypt`] on corrupted ciphertext,
/// bad padding, an integrity mismatch, or non-UTF-8 content. Both are
/// recoverable per item.
pub fn open(envelope: &Envelope, private_key: &RsaPrivateKey) -> Result<String> {
    let key = private_key
        .decrypt(Oaep::new::<Sha256>(), &envelope.wrapped_key)
        .map_err(EnvelopeError::Unwrap)?;
    let key: [u8; SYMMETRIC_KEY_LEN] = key
        .as_slice()
        .try_into()
        .map_err(|_| EnvelopeError::Decrypt("unwrapped key has invalid length".to_string()))?;

    let iv: [u8; IV_LEN] = envelope
        .iv
        .as_slice()
        .try_into()
        .map_err(|_| EnvelopeError::Decrypt("invalid iv length".to_string()))?;

    // Strict PKCS#7: the trailing byte must match a consistent run of
    // that many padding bytes.
    let payload = Aes256CbcDec::new(&key.into(), &iv.into())
        .decrypt_padded_vec_mut::<Pkcs7>(&envelope.ciphertext)
        .map_err(|_| EnvelopeError::Decrypt("invalid padding".to_string()))?;

    if payload.len() < DIGEST_LEN {
        return Err(EnvelopeError::Decrypt("payload too short".to_string()));
    }
    let (content, digest) = payload.split_at(payload.len() - DIGEST_LEN);
    if Sha256::digest(content).as_slice() != digest {
        return Err(EnvelopeError::Decrypt("integrity check failed".to_string()));
    }

    String::from_utf8(content.to_vec())
        .map_err(|_| EnvelopeError::Decrypt("content is not valid UTF-8".to_string()))
}

/// Base64 (de)serialization for envelope byte fields.
mod b64 {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD.decode(encoded).map_err(serde::de::Error::custom)
    }
}
