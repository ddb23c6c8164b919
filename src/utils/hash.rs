use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use crate::error::AppError;

/// Argon2id hash in PHC string format. Used for account and private-inquiry passwords.
pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::InternalServerError(e.to_string()))
}

/// `Ok(false)` on a mismatch; `Err` only when the stored hash itself is unreadable.
pub fn verify_password(password: &str, password_hash: &str) -> Result<bool, AppError> {
    let parsed_hash = PasswordHash::new(password_hash)
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_verifies_only_the_original_password() {
        let hash = hash_password("1234").unwrap();
        assert!(verify_password("1234", &hash).unwrap());
        assert!(!verify_password("4321", &hash).unwrap());
    }

    #[test]
    fn garbage_hash_is_an_internal_error() {
        assert!(matches!(
            verify_password("1234", "not-a-hash"),
            Err(AppError::InternalServerError(_))
        ));
    }
}
