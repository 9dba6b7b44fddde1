use argon2::{
    password_hash::{Error as PasswordHashError, PasswordHash, PasswordHasher, SaltString},
    Argon2, PasswordVerifier,
};
use rand::rngs::OsRng;
use rand::RngCore;
use std::sync::LazyLock;
use uuid::Uuid;

use crate::api::error::StoreError;
use crate::constants::TOKEN_LENGTH;

static ARGON2: LazyLock<Argon2<'static>> = LazyLock::new(Argon2::default);

pub fn hash_password(password: &str) -> Result<String, StoreError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = ARGON2.hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

pub fn verify_password(hash: &str, password: &str) -> Result<bool, StoreError> {
    let parsed_hash = PasswordHash::new(hash)?;
    match ARGON2.verify_password(password.as_bytes(), &parsed_hash) {
        Ok(_) => Ok(true),
        Err(PasswordHashError::Password) => Ok(false),
        Err(e) => Err(StoreError::Hash(e)),
    }
}

/// 15 random bytes, hex-encoded: a 30-character login token.
pub fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_LENGTH];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Canonical unordered pair key: `max(a,b) + "_" + min(a,b)`, so both
/// directions of a conversation share one dialog.
pub fn dialog_id(a: &Uuid, b: &Uuid) -> String {
    let (a, b) = (a.to_string(), b.to_string());
    if a > b {
        format!("{a}_{b}")
    } else {
        format!("{b}_{a}")
    }
}

/// Turns raw user input into a safe prefix pattern for `LIKE`.
/// Wildcards in the input are escaped, never interpreted.
pub fn like_pattern(prefix: &str) -> String {
    let mut escaped = String::with_capacity(prefix.len() + 1);
    for c in prefix.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}
