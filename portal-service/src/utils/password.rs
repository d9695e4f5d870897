use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

/// Newtype for a plaintext secret. Deliberately has no `Display`/`Serialize`
/// so it cannot end up in a log line or a response body.
#[derive(Clone)]
pub struct Password(String);

impl Password {
    pub fn new(password: String) -> Self {
        Self(password)
    }

    /// Produce a salted Argon2id hash of this secret. The salt is generated
    /// here and embedded in the PHC string.
    pub fn hash(&self) -> Result<PasswordHashString, anyhow::Error> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(self.0.as_bytes(), &salt)
            .map_err(|e| anyhow::anyhow!("failed to hash password: {}", e))?
            .to_string();
        Ok(PasswordHashString(hash))
    }
}

impl std::fmt::Debug for Password {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Password(<redacted>)")
    }
}

/// Newtype for a stored password hash (PHC string).
#[derive(Debug, Clone)]
pub struct PasswordHashString(String);

impl PasswordHashString {
    pub fn new(hash: String) -> Self {
        Self(hash)
    }

    /// Placeholder for an account whose password has not been set yet.
    /// Such an account must never be persisted.
    pub fn empty() -> Self {
        Self(String::new())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Check a candidate secret against this hash.
    ///
    /// The comparison is delegated to the argon2 verifier, which is constant
    /// time with respect to the candidate. Returns `Ok(false)` on mismatch;
    /// a hash that cannot be parsed is an internal error, not a mismatch.
    pub fn verify(&self, candidate: &Password) -> Result<bool, anyhow::Error> {
        let parsed = PasswordHash::new(&self.0)
            .map_err(|e| anyhow::anyhow!("stored password hash is invalid: {}", e))?;

        match Argon2::default().verify_password(candidate.0.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(anyhow::anyhow!("password verification failed: {}", e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_produces_phc_string() {
        let hash = Password::new("mySecurePassword123".to_string())
            .hash()
            .unwrap();
        assert!(hash.as_str().starts_with("$argon2"));
    }

    #[test]
    fn correct_password_verifies() {
        let password = Password::new("mySecurePassword123".to_string());
        let hash = password.hash().unwrap();
        assert!(hash.verify(&password).unwrap());
    }

    #[test]
    fn wrong_password_is_a_clean_mismatch() {
        let hash = Password::new("mySecurePassword123".to_string())
            .hash()
            .unwrap();
        let wrong = Password::new("wrongPassword".to_string());
        assert!(!hash.verify(&wrong).unwrap());
    }

    #[test]
    fn same_password_hashes_differently_per_salt() {
        let password = Password::new("mySecurePassword123".to_string());
        let h1 = password.hash().unwrap();
        let h2 = password.hash().unwrap();
        assert_ne!(h1.as_str(), h2.as_str());
        assert!(h1.verify(&password).unwrap());
        assert!(h2.verify(&password).unwrap());
    }

    #[test]
    fn garbage_stored_hash_is_an_error_not_a_mismatch() {
        let hash = PasswordHashString::new("not-a-phc-string".to_string());
        assert!(hash.verify(&Password::new("x".to_string())).is_err());
    }

    #[test]
    fn debug_never_prints_the_secret() {
        let password = Password::new("top-secret".to_string());
        assert!(!format!("{:?}", password).contains("top-secret"));
    }
}
