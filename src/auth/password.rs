use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

/// Verified against when the email is unknown, so a miss costs as much as a wrong password.
const UNKNOWN_ACCOUNT_HASH: &str = "$argon2id$v=19$m=19456,t=2,p=1$bm9hY2NvdW50c2FsdDE2Yg$d470WmpPhVNitAuCjKY3DCvRIM3tzzQ+mBXCAhFgKrs";

pub fn hash_password(password: &str) -> Result<String, String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| e.to_string())
}

/// Ok(false) for a wrong password; Err only when the stored hash is malformed.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, String> {
    let parsed_hash = PasswordHash::new(hash).map_err(|e| e.to_string())?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// Login check. `stored` is the account's hash, `None` when no account matched the email.
/// An unreadable stored hash is logged and counts as a failed login.
pub fn check_login(password: &str, stored: Option<&str>) -> bool {
    match stored {
        Some(hash) => verify_password(password, hash).unwrap_or_else(|e| {
            log::error!("Stored password hash is unreadable: {e}");
            false
        }),
        None => {
            let _ = verify_password(password, UNKNOWN_ACCOUNT_HASH);
            false
        }
    }
}
