// src/crypto.rs
use crate::config::Argon2Params;
use crate::error::{CryptoError, CryptoResult};
use log;

use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;
use rand::RngCore;

const SALT_LEN: usize = 16;

fn generate_salt() -> [u8; SALT_LEN] {
    let mut salt = [0u8; SALT_LEN];
    OsRng.fill_bytes(&mut salt);
    salt
}

/// Hashes a note password with Argon2id and a fresh random salt.
/// Returns the PHC string (`$argon2id$v=19$...`), which carries its own salt
/// and parameters.
pub fn hash_note_password(password: &str, argon2_config: &Argon2Params) -> CryptoResult<String> {
    let salt = SaltString::b64_encode(&generate_salt()).map_err(|e| {
        let msg = format!("Salt encoding failed: {}", e);
        log::error!("hash_note_password: {}", msg);
        CryptoError::Argon2(msg)
    })?;

    let params = argon2::Params::new(argon2_config.m_cost, argon2_config.t_cost, argon2_config.p_cost, None)
        .map_err(|e| {
            let msg = format!("Argon2 params error: {}", e);
            log::error!("hash_note_password: {}", msg);
            CryptoError::Argon2(msg)
        })?;
    let argon2 = Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, params);

    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| {
            let msg = format!("Hashing failed: {}", e);
            log::error!("hash_note_password: {}", msg);
            CryptoError::Argon2(msg)
        })?
        .to_string();
    Ok(hash)
}

/// True when `stored` parses as a PHC hash string.
pub fn is_password_hash(stored: &str) -> bool {
    stored.starts_with('$') && PasswordHash::new(stored).is_ok()
}

/// Checks `candidate` against a PHC hash produced by `hash_note_password`.
/// A mismatch is `Ok(false)`; only a malformed hash is an error.
pub fn verify_hashed_password(stored_hash: &str, candidate: &str) -> CryptoResult<bool> {
    let parsed = PasswordHash::new(stored_hash).map_err(|e| {
        let msg = format!("Parsing hash failed: {}", e);
        log::error!("verify_hashed_password: {}", msg);
        CryptoError::Argon2(msg)
    })?;

    // Parameters come from the hash itself.
    match Argon2::default().verify_password(candidate.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => {
            log::debug!("verify_hashed_password: password mismatch");
            Ok(false)
        }
        Err(e) => {
            let msg = format!("Verification failed: {}", e);
            log::error!("verify_hashed_password: {}", msg);
            Err(CryptoError::Argon2(msg))
        }
    }
}
