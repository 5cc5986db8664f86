/// Refresh Token Management
///
/// Refresh tokens are:
/// - 32 bytes from the operating system CSPRNG, hex encoded (64 characters)
/// - Stored only as a SHA-256 digest (never plaintext)
/// - Valid for 60 days from creation unless revoked first
/// - Soft-deleted on revoke; records are never physically removed

use chrono::{DateTime, Duration, Utc};
use rand::rngs::OsRng;
use rand::RngCore;
use serde::Serialize;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::error::{AppError, AuthError};

/// Bytes of randomness behind every refresh token
pub const REFRESH_TOKEN_BYTES: usize = 32;

/// Fixed validity window applied when a record is created
pub fn refresh_token_ttl() -> Duration {
    Duration::days(60)
}

/// Generate a new refresh token
///
/// The token is returned in plaintext; this is what the client keeps.
///
/// # Errors
/// Returns `AuthError::RandomnessUnavailable` if the OS entropy source fails
pub fn generate_refresh_token() -> Result<String, AppError> {
    let mut bytes = [0u8; REFRESH_TOKEN_BYTES];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| AuthError::RandomnessUnavailable(e.to_string()))?;

    Ok(hex::encode(bytes))
}

/// SHA-256 digest of a refresh token, as stored by persistence
pub fn hash_refresh_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

/// Persisted refresh token record
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct RefreshTokenRecord {
    #[serde(skip_serializing)]
    pub token_hash: String,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
}

impl RefreshTokenRecord {
    /// New active record for `token`, expiring 60 days after `now`
    pub fn new(token: &str, user_id: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            token_hash: hash_refresh_token(token),
            user_id,
            created_at: now,
            updated_at: now,
            expires_at: now + refresh_token_ttl(),
            revoked_at: None,
        }
    }

    /// Usable only while never revoked and strictly before expiry
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.revoked_at.is_none() && now < self.expires_at
    }

    pub fn state_at(&self, now: DateTime<Utc>) -> RefreshTokenState {
        if self.revoked_at.is_some() {
            RefreshTokenState::Revoked
        } else if now >= self.expires_at {
            RefreshTokenState::Expired
        } else {
            RefreshTokenState::Active
        }
    }
}

/// Lifecycle of a refresh token record; `Revoked` and `Expired` are terminal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshTokenState {
    Active,
    Expired,
    Revoked,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_generate_refresh_token() {
        let token = generate_refresh_token().unwrap();

        assert_eq!(token.len(), REFRESH_TOKEN_BYTES * 2);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(token, token.to_lowercase());
    }

    #[test]
    fn test_refresh_tokens_do_not_repeat() {
        let mut seen = HashSet::new();
        for _ in 0..10_000 {
            assert!(seen.insert(generate_refresh_token().unwrap()));
        }
    }

    #[test]
    fn test_token_hashing() {
        let token = generate_refresh_token().unwrap();
        let hash1 = hash_refresh_token(&token);
        let hash2 = hash_refresh_token(&token);

        assert_eq!(hash1, hash2);
        assert_ne!(token, hash1);
        assert_eq!(hash1.len(), 64);
    }

    #[test]
    fn test_token_hash_is_lowercase_sha256_hex() {
        assert_eq!(
            hash_refresh_token("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_record_lifecycle() {
        let now = Utc::now();
        let mut record = RefreshTokenRecord::new("token", Uuid::new_v4(), now);

        assert_eq!(record.expires_at - record.created_at, Duration::days(60));
        assert_eq!(record.state_at(now), RefreshTokenState::Active);
        assert!(record.is_active_at(now + Duration::days(59)));
        assert_eq!(record.state_at(now + Duration::days(60)), RefreshTokenState::Expired);
        assert!(!record.is_active_at(now + Duration::days(60)));

        record.revoked_at = Some(now);
        assert_eq!(record.state_at(now), RefreshTokenState::Revoked);
        assert!(!record.is_active_at(now));
    }

    #[test]
    fn test_record_never_holds_plaintext() {
        let record = RefreshTokenRecord::new("plaintext-token", Uuid::new_v4(), Utc::now());

        assert_ne!(record.token_hash, "plaintext-token");
        let json = serde_json::to_string(&record).unwrap();
        assert!(!json.contains(&record.token_hash));
    }
}
