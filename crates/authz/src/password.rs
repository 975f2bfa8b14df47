use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString},
    Argon2,
};
use once_cell::sync::OnceCell;

use crate::error::AuthError;

/// Argon2id password hashing.
///
/// Hashes are PHC strings carrying their own salt and parameters, so
/// verification does not depend on the hasher's configuration.
#[derive(Default)]
pub struct PasswordHasher {
    argon2: Argon2<'static>,
    decoy: OnceCell<String>,
}

impl PasswordHasher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hashes a password with a fresh random salt.
    pub fn hash(&self, password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);

        self.argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AuthError::Hash(e.to_string()))
    }

    /// Verifies a password against a stored PHC hash.
    ///
    /// Returns `Ok(false)` on mismatch and an error only when the stored hash
    /// cannot be parsed.
    pub fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
        let parsed_hash =
            PasswordHash::new(hash).map_err(|e| AuthError::MalformedHash(e.to_string()))?;

        Ok(self
            .argon2
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    /// Computes the decoy hash ahead of the first login so every unknown
    /// username costs exactly one verification.
    pub fn warm_up(&self) -> Result<(), AuthError> {
        self.decoy_hash().map(|_| ())
    }

    /// Burns one verification against a throwaway hash. Login calls this for
    /// unknown usernames so they take as long as a wrong password.
    pub fn verify_decoy(&self, password: &str) -> Result<(), AuthError> {
        let decoy = self.decoy_hash()?;
        self.verify(password, decoy)?;
        Ok(())
    }

    fn decoy_hash(&self) -> Result<&String, AuthError> {
        self.decoy
            .get_or_try_init(|| self.hash("bookshelf-decoy-password"))
    }
}
