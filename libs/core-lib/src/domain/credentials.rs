use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Argon2, password_hash::rand_core::OsRng};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::warn;

use super::role::Role;
use crate::CoreError;

/// Prefix every acceptable stored hash must carry (PHC string format).
/// Anything else is treated as malformed and rejected outright, so a
/// plaintext or legacy-hash directory entry can never authenticate anyone.
pub const STRONG_HASH_PREFIX: &str = "$argon2";

/// Durable local directory entry backing offline verification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CredentialRecord {
    pub user_id: String,
    pub username: String,
    pub display_name: String,
    pub password_hash: String,
    pub role: Role,
    pub assigned_stores: HashSet<String>,
    pub tenant_id: String,
    pub active: bool,
}

/// Hash a password into a PHC-format argon2 string for directory storage.
pub fn hash_password(password: &str) -> Result<String, CoreError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| CoreError::Internal(format!("password hashing failed: {e}")))
}

/// Offline credential check against a stored directory record. Fails closed:
/// a hash without the recognised prefix, or one argon2 cannot parse, rejects
/// regardless of the password supplied.
pub fn verify_offline(record: &CredentialRecord, password: &str) -> bool {
    if !record.active {
        return false;
    }
    if !record.password_hash.starts_with(STRONG_HASH_PREFIX) {
        warn!(
            username = %record.username,
            "stored credential hash is not argon2; rejecting offline login"
        );
        return false;
    }
    let parsed = match PasswordHash::new(&record.password_hash) {
        Ok(p) => p,
        Err(e) => {
            warn!(username = %record.username, "unparseable credential hash: {e}");
            return false;
        }
    };
    // Argon2's verify is a constant-time comparison internally.
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}
