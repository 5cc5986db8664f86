/// Persistence collaborator
///
/// The session layer only ever talks to these traits. Each call is a single
/// row-level operation; atomicity is the backend's job, and nothing here
/// retries.

mod memory;
mod postgres;

pub use memory::InMemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::auth::RefreshTokenRecord;
use crate::error::AppError;
use crate::models::{Chirp, NewUser, UserCredential};

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Fails with `DatabaseError::UniqueConstraintViolation` on a taken email
    async fn create_user(&self, user: NewUser, now: DateTime<Utc>) -> Result<UserCredential, AppError>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserCredential>, AppError>;

    /// Replace email and password hash; `None` if the user does not exist
    async fn update_user(
        &self,
        id: Uuid,
        user: NewUser,
        now: DateTime<Utc>,
    ) -> Result<Option<UserCredential>, AppError>;

    async fn upgrade_to_chirpy_red(
        &self,
        id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<UserCredential>, AppError>;
}

/// Refresh tokens are looked up by their SHA-256 digest; the plaintext is
/// hashed at this boundary and never stored.
#[async_trait]
pub trait RefreshTokenStore: Send + Sync {
    async fn create_refresh_token_record(&self, record: &RefreshTokenRecord) -> Result<(), AppError>;

    /// The record for `token` if it is neither revoked nor expired at `now`
    async fn find_active_refresh_token_record(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<RefreshTokenRecord>, AppError>;

    /// Stamp `revoked_at` (first revocation wins). `false` if no record matched.
    async fn revoke_refresh_token_record(&self, token: &str, now: DateTime<Utc>) -> Result<bool, AppError>;
}

#[async_trait]
pub trait ChirpStore: Send + Sync {
    async fn create_chirp(&self, user_id: Uuid, body: String, now: DateTime<Utc>) -> Result<Chirp, AppError>;

    /// Oldest first, optionally restricted to one author
    async fn list_chirps(&self, author_id: Option<Uuid>) -> Result<Vec<Chirp>, AppError>;

    async fn get_chirp(&self, id: Uuid) -> Result<Option<Chirp>, AppError>;

    /// `false` if no chirp matched
    async fn delete_chirp(&self, id: Uuid) -> Result<bool, AppError>;
}

/// Everything the HTTP layer needs from one backend
pub trait Store: UserStore + RefreshTokenStore + ChirpStore {}

impl<T: UserStore + RefreshTokenStore + ChirpStore> Store for T {}
