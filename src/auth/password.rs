/// Password Hashing and Verification
///
/// bcrypt produces a self-describing hash string (`$2b$<cost>$<salt+digest>`),
/// so the salt and cost travel with the stored value.

use bcrypt::{hash, verify, DEFAULT_COST};

use crate::error::{AppError, AuthError};

#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    /// Create a hasher with an explicit bcrypt cost factor.
    ///
    /// The cost is not validated here; an out-of-range cost surfaces as
    /// `AuthError::Hashing` on the first call to [`PasswordHasher::hash`].
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    /// Hash a plaintext password
    ///
    /// # Errors
    /// Returns `AuthError::Hashing` if the password is empty or bcrypt
    /// rejects its parameters.
    pub fn hash(&self, password: &str) -> Result<String, AppError> {
        if password.is_empty() {
            return Err(AuthError::Hashing("password is empty".to_string()).into());
        }

        hash(password, self.cost).map_err(|e| AuthError::Hashing(e.to_string()).into())
    }

    /// Verify a password against its stored hash
    ///
    /// A mismatch is `Ok(false)`, not an error. Only a hash string that
    /// bcrypt cannot parse yields `AuthError::Verification`.
    pub fn verify(&self, password: &str, password_hash: &str) -> Result<bool, AppError> {
        verify(password, password_hash).map_err(|e| AuthError::Verification(e.to_string()).into())
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(DEFAULT_COST)
    }
}
