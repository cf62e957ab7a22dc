//! Account password hashing.
//!
//! Stored passwords are Argon2id PHC strings. Plain text never leaves this module
//! except as input to [`Password::new`] and [`Password::verify`].

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::config::MIN_PASSWORD_LENGTH;
use crate::errors::{AppError, AppResult};

/// Well-formed hash that never matches; verified against when the username is unknown
/// so a failed login costs the same whether or not the account exists.
pub(crate) const UNKNOWN_ACCOUNT_HASH: &str =
    "$argon2id$v=19$m=19456,t=2,p=1$c29tZXNhbHRzb21lc2FsdA$2dZ1qf3bG5kq0v7m8m1o6yZl8uS9wQ0Vb6V5d1mXo2E";

/// A hashed account password.
#[derive(Clone, PartialEq, Eq)]
pub struct Password {
    hash: String,
}

impl std::fmt::Debug for Password {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Password([REDACTED])")
    }
}

impl Password {
    /// Hash a new password chosen at registration.
    ///
    /// # Errors
    /// `Validation` when shorter than the minimum length.
    pub fn new(plain_text: &str) -> AppResult<Self> {
        if plain_text.chars().count() < MIN_PASSWORD_LENGTH as usize {
            return Err(AppError::validation(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LENGTH
            )));
        }

        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(plain_text.as_bytes(), &salt)
            .map_err(|e| AppError::internal(format!("Password hash failed: {}", e)))?
            .to_string();

        Ok(Self { hash })
    }

    /// Wrap a hash loaded from the `users` table.
    pub fn from_hash(hash: impl Into<String>) -> Self {
        Self { hash: hash.into() }
    }

    pub fn as_str(&self) -> &str {
        &self.hash
    }

    pub fn into_string(self) -> String {
        self.hash
    }

    /// Check a login attempt. A corrupt stored hash never verifies.
    pub fn verify(&self, plain_text: &str) -> bool {
        match PasswordHash::new(&self.hash) {
            Ok(parsed) => Argon2::default()
                .verify_password(plain_text.as_bytes(), &parsed)
                .is_ok(),
            Err(e) => {
                tracing::warn!("Stored password hash is malformed: {}", e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let password = Password::new("correct horse battery").unwrap();

        assert!(password.verify("correct horse battery"));
        assert!(!password.verify("wrong horse battery"));
    }

    #[test]
    fn test_round_trip_through_storage() {
        let stored = Password::new("SamePassword123").unwrap().into_string();
        assert!(Password::from_hash(stored).verify("SamePassword123"));
    }

    #[test]
    fn test_salted() {
        let a = Password::new("SamePassword123").unwrap();
        let b = Password::new("SamePassword123").unwrap();
        assert_ne!(a.as_str(), b.as_str());
    }

    #[test]
    fn test_too_short() {
        assert!(matches!(Password::new("short"), Err(AppError::Validation(_))));
        assert!(Password::new("12345678").is_ok());
    }

    #[test]
    fn test_unknown_account_hash_never_verifies() {
        let dummy = Password::from_hash(UNKNOWN_ACCOUNT_HASH);
        assert!(!dummy.verify(""));
        assert!(!dummy.verify("password"));
    }

    #[test]
    fn test_debug_is_redacted() {
        let password = Password::new("SamePassword123").unwrap();
        assert_eq!(format!("{:?}", password), "Password([REDACTED])");
    }
}
