use chacha20poly1305::{
    aead::{Aead, KeyInit},
    ChaCha20Poly1305, Nonce,
};
use rand::RngCore;
use zeroize::Zeroizing;

use crate::error::CryptoError;

/// BLAKE3 key-derivation context for session keys.
const SESSION_KEY_CONTEXT: &str = "shardproof 2024 transport session key v1";

/// ChaCha20-Poly1305 nonce size.
pub const NONCE_LEN: usize = 12;

/// Ciphertext sealed under a session key.
#[derive(Debug, Clone)]
pub struct SealedBox {
    /// 12-byte nonce for ChaCha20-Poly1305.
    pub nonce: [u8; NONCE_LEN],
    /// Encrypted data (ciphertext + 16-byte Poly1305 tag).
    pub ciphertext: Vec<u8>,
}

impl SealedBox {
    /// Serialize to bytes: nonce (12) + ciphertext (variable).
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(NONCE_LEN + self.ciphertext.len());
        out.extend_from_slice(&self.nonce);
        out.extend_from_slice(&self.ciphertext);
        out
    }

    /// Deserialize from bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        // Nonce plus at least the 16-byte tag.
        if bytes.len() < NONCE_LEN + 16 {
            return Err(CryptoError::DecryptionError("sealed box too short".into()));
        }
        let mut nonce = [0u8; NONCE_LEN];
        nonce.copy_from_slice(&bytes[..NONCE_LEN]);
        Ok(Self {
            nonce,
            ciphertext: bytes[NONCE_LEN..].to_vec(),
        })
    }
}

/// Derive the 32-byte symmetric key for a session key string.
fn derive_session_key(session_key: &str) -> Zeroizing<[u8; 32]> {
    Zeroizing::new(blake3::derive_key(
        SESSION_KEY_CONTEXT,
        session_key.as_bytes(),
    ))
}

/// Encrypt `plaintext` under `session_key` with ChaCha20-Poly1305.
pub fn seal(plaintext: &[u8], session_key: &str) -> Result<SealedBox, CryptoError> {
    let key = derive_session_key(session_key);

    let mut nonce_bytes = [0u8; NONCE_LEN];
    rand::rngs::OsRng.fill_bytes(&mut nonce_bytes);
    let nonce = Nonce::from_slice(&nonce_bytes);

    let cipher = ChaCha20Poly1305::new_from_slice(&key[..])
        .map_err(|e| CryptoError::EncryptionError(format!("cipher init failed: {}", e)))?;
    let ciphertext = cipher
        .encrypt(nonce, plaintext)
        .map_err(|e| CryptoError::EncryptionError(format!("encryption failed: {}", e)))?;

    Ok(SealedBox {
        nonce: nonce_bytes,
        ciphertext,
    })
}

/// Decrypt a sealed box with the same session key it was sealed under.
pub fn open(sealed: &SealedBox, session_key: &str) -> Result<Vec<u8>, CryptoError> {
    let key = derive_session_key(session_key);

    let nonce = Nonce::from_slice(&sealed.nonce);
    let cipher = ChaCha20Poly1305::new_from_slice(&key[..])
        .map_err(|e| CryptoError::DecryptionError(format!("cipher init failed: {}", e)))?;
    cipher
        .decrypt(nonce, sealed.ciphertext.as_slice())
        .map_err(|_| CryptoError::DecryptionError("authentication failed".into()))
}
