/// Session Orchestration
///
/// Login, refresh, revoke and request authentication. Credential-shape and
/// credential-correctness failures leave this module as one of a few
/// undifferentiated kinds; persistence and primitive failures pass through
/// untouched.

use std::sync::Arc;

use actix_web::http::header::HeaderMap;
use chrono::Duration;
use uuid::Uuid;

use crate::auth::credentials::extract_bearer;
use crate::auth::jwt::AccessTokenCodec;
use crate::auth::password::PasswordHasher;
use crate::auth::refresh_token::{generate_refresh_token, RefreshTokenRecord};
use crate::clock::Clock;
use crate::error::{AppError, AuthError, ConfigError};
use crate::models::UserView;
use crate::store::{RefreshTokenStore, UserStore};

/// Upper bound and default for access token lifetime
pub const MAX_ACCESS_TOKEN_TTL_SECS: i64 = 60 * 60;

/// Clamp a client-requested lifetime into `(0, 1h]`.
/// Anything absent or out of range falls back to the one hour default.
pub fn access_token_ttl(requested_secs: Option<i64>) -> Duration {
    match requested_secs {
        Some(secs) if secs > 0 && secs <= MAX_ACCESS_TOKEN_TTL_SECS => Duration::seconds(secs),
        _ => Duration::seconds(MAX_ACCESS_TOKEN_TTL_SECS),
    }
}

/// Result of a successful login
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    pub user: UserView,
}

pub struct SessionCoordinator<S: ?Sized> {
    store: Arc<S>,
    hasher: PasswordHasher,
    tokens: AccessTokenCodec,
    signing_secret: String,
    clock: Arc<dyn Clock>,
    // Verified against when the email is unknown
    dummy_hash: String,
}

impl<S> SessionCoordinator<S>
where
    S: UserStore + RefreshTokenStore + ?Sized,
{
    /// # Errors
    /// Returns `ConfigError::MissingRequired` for an empty signing secret
    pub fn new(
        store: Arc<S>,
        hasher: PasswordHasher,
        signing_secret: String,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, AppError> {
        if signing_secret.is_empty() {
            return Err(ConfigError::MissingRequired("auth.jwt_secret".to_string()).into());
        }

        let dummy_hash = hasher.hash(&Uuid::new_v4().to_string())?;

        Ok(Self {
            store,
            hasher,
            tokens: AccessTokenCodec::new(clock.clone()),
            signing_secret,
            clock,
            dummy_hash,
        })
    }

    pub fn hasher(&self) -> &PasswordHasher {
        &self.hasher
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    /// Verify email and password, then mint an access token and persist a
    /// fresh refresh token.
    ///
    /// # Errors
    /// - `AuthError::AuthFailed` for an unknown email or a wrong password
    /// - persistence, hashing and randomness failures unchanged
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        requested_ttl_secs: Option<i64>,
    ) -> Result<Session, AppError> {
        let user = match self.store.find_user_by_email(email).await? {
            Some(user) => user,
            None => {
                // Unknown emails pay for a full verification as well
                let _ = self.hasher.verify(password, &self.dummy_hash);
                return Err(AuthError::AuthFailed.into());
            }
        };

        if !self.hasher.verify(password, &user.hashed_password)? {
            tracing::warn!(user_id = %user.id, "Password mismatch on login");
            return Err(AuthError::AuthFailed.into());
        }

        let access_token = self.tokens.issue(
            user.id,
            &self.signing_secret,
            access_token_ttl(requested_ttl_secs),
        )?;

        let refresh_token = generate_refresh_token()?;
        let record = RefreshTokenRecord::new(&refresh_token, user.id, self.clock.now());
        self.store.create_refresh_token_record(&record).await?;

        tracing::info!(user_id = %user.id, "Session opened");

        Ok(Session {
            access_token,
            refresh_token,
            user: UserView::from(&user),
        })
    }

    /// Mint a one-hour access token from the bearer refresh token.
    /// The refresh token itself is not rotated.
    ///
    /// # Errors
    /// - `AuthError::MissingCredential` without a bearer header
    /// - `AuthError::SessionInvalid` if the token is unknown, expired or revoked
    pub async fn refresh(&self, headers: &HeaderMap) -> Result<String, AppError> {
        let refresh_token = extract_bearer(headers)?;

        let record = self
            .store
            .find_active_refresh_token_record(&refresh_token, self.clock.now())
            .await?
            .ok_or(AuthError::SessionInvalid)?;

        let access_token = self.tokens.issue(
            record.user_id,
            &self.signing_secret,
            Duration::seconds(MAX_ACCESS_TOKEN_TTL_SECS),
        )?;

        tracing::info!(user_id = %record.user_id, "Access token refreshed");
        Ok(access_token)
    }

    /// Revoke the bearer refresh token. Revoking twice is fine.
    ///
    /// # Errors
    /// - `AuthError::MissingCredential` without a bearer header
    /// - `AuthError::SessionInvalid` if no record matches the token
    pub async fn revoke(&self, headers: &HeaderMap) -> Result<(), AppError> {
        let refresh_token = extract_bearer(headers)?;

        if !self
            .store
            .revoke_refresh_token_record(&refresh_token, self.clock.now())
            .await?
        {
            return Err(AuthError::SessionInvalid.into());
        }

        tracing::info!("Refresh token revoked");
        Ok(())
    }

    /// Subject of the bearer access token.
    ///
    /// Token errors (`MissingCredential`, `MalformedToken`,
    /// `InvalidSignature`, `Expired`) are returned as they are.
    pub fn require_auth(&self, headers: &HeaderMap) -> Result<Uuid, AppError> {
        let token = extract_bearer(headers)?;
        self.tokens.verify(&token, &self.signing_secret)
    }
}
