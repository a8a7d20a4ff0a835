//! Argon2id password hashing.
//!
//! Hashes are stored as PHC strings, so the salt and parameters travel with
//! the hash.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;

/// Hash `password` with a fresh random salt.
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    Ok(Argon2::default()
        .hash_password(password.as_bytes(), &salt)?
        .to_string())
}

/// `Ok(false)` on a mismatch; `Err` only when the stored hash is malformed.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, argon2::password_hash::Error> {
    let parsed = PasswordHash::new(hash)?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(e),
    }
}

/// Reject passwords shorter than `min_length` characters.
pub fn validate_password_strength(password: &str, min_length: usize) -> Result<(), String> {
    if password.chars().count() < min_length {
        return Err(format!(
            "Password must be at least {min_length} characters long"
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use buildwise_core::validation::MIN_PASSWORD_LEN;

    use super::*;

    #[test]
    fn hash_then_verify() {
        let hash = hash_password("site-office-2025").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("site-office-2025", &hash).unwrap());
        assert!(!verify_password("site-office-2024", &hash).unwrap());
    }

    #[test]
    fn malformed_hash_is_an_error() {
        assert!(verify_password("anything", "not-a-phc-string").is_err());
    }

    #[test]
    fn minimum_length_boundary() {
        assert!(validate_password_strength("12345", MIN_PASSWORD_LEN).is_err());
        assert!(validate_password_strength("123456", MIN_PASSWORD_LEN).is_ok());
        let msg = validate_password_strength("abc", MIN_PASSWORD_LEN).unwrap_err();
        assert!(msg.contains("at least 6 characters"));
    }
}
