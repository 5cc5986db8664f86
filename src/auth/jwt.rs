/// Access Token Issuance and Verification
///
/// Access tokens are HS256-signed JWTs. They are never stored: validity is
/// the signature plus the expiry, checked against the injected clock.

use std::sync::Arc;

use chrono::Duration;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::auth::claims::{Claims, ISSUER};
use crate::clock::{Clock, SystemClock};
use crate::error::{AppError, AuthError, ConfigError};

#[derive(Clone)]
pub struct AccessTokenCodec {
    clock: Arc<dyn Clock>,
}

impl AccessTokenCodec {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    /// Mint a signed access token for `user_id`
    ///
    /// # Errors
    /// - `ConfigError::MissingRequired` if the secret is empty
    /// - `ConfigError::InvalidValue` if `ttl` is not positive
    pub fn issue(&self, user_id: Uuid, secret: &str, ttl: Duration) -> Result<String, AppError> {
        ensure_secret(secret)?;
        if ttl <= Duration::zero() {
            return Err(ConfigError::InvalidValue("access token ttl must be positive".to_string()).into());
        }

        let claims = Claims::new(user_id, self.clock.now(), ttl);

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))
    }

    /// Verify a token and return its subject
    ///
    /// Signature is checked before anything in the payload is trusted.
    /// Expiry is checked here rather than by `jsonwebtoken` so that the
    /// injected clock decides.
    pub fn verify(&self, token: &str, secret: &str) -> Result<Uuid, AppError> {
        ensure_secret(secret)?;

        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["exp", "iat", "iss", "sub"]);
        validation.set_issuer(&[ISSUER]);

        let claims = decode::<Claims>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &validation,
        )
        .map(|data| data.claims)
        .map_err(|e| {
            tracing::debug!(error = %e, "Access token rejected");
            AppError::from(match e.kind() {
                ErrorKind::InvalidSignature => AuthError::InvalidSignature,
                ErrorKind::ExpiredSignature => AuthError::Expired,
                _ => AuthError::MalformedToken,
            })
        })?;

        if claims.is_expired_at(self.clock.now()) {
            return Err(AuthError::Expired.into());
        }

        claims.user_id()
    }
}

impl Default for AccessTokenCodec {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}

fn ensure_secret(secret: &str) -> Result<(), AppError> {
    if secret.is_empty() {
        return Err(ConfigError::MissingRequired("token signing secret".to_string()).into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::MockClock;

    const SECRET: &str = "test-secret-key-at-least-32-characters-long";

    fn codec_with_clock() -> (AccessTokenCodec, Arc<MockClock>) {
        let clock = Arc::new(MockClock::default());
        (AccessTokenCodec::new(clock.clone()), clock)
    }

    fn auth_kind(result: Result<Uuid, AppError>) -> AuthError {
        match result {
            Err(AppError::Auth(kind)) => kind,
            other => panic!("expected auth error, got {:?}", other),
        }
    }

    #[test]
    fn test_issue_and_verify_token() {
        let codec = AccessTokenCodec::default();
        let user_id = Uuid::new_v4();

        let token = codec
            .issue(user_id, SECRET, Duration::minutes(2))
            .expect("Failed to generate token");

        assert_eq!(codec.verify(&token, SECRET).unwrap(), user_id);
    }

    #[test]
    fn test_token_expires_after_ttl() {
        let (codec, clock) = codec_with_clock();
        let token = codec.issue(Uuid::new_v4(), SECRET, Duration::seconds(30)).unwrap();

        clock.advance(Duration::seconds(29));
        assert!(codec.verify(&token, SECRET).is_ok());

        clock.advance(Duration::seconds(1));
        assert!(matches!(auth_kind(codec.verify(&token, SECRET)), AuthError::Expired));
    }

    #[test]
    fn test_wrong_secret_is_invalid_signature() {
        let codec = AccessTokenCodec::default();
        let token = codec.issue(Uuid::new_v4(), SECRET, Duration::hours(1)).unwrap();

        let kind = auth_kind(codec.verify(&token, "another-secret"));
        assert!(matches!(kind, AuthError::InvalidSignature));
    }

    #[test]
    fn test_empty_secret_is_config_error() {
        let codec = AccessTokenCodec::default();

        let issued = codec.issue(Uuid::new_v4(), "", Duration::hours(1));
        assert!(matches!(issued, Err(AppError::Config(ConfigError::MissingRequired(_)))));

        let token = codec.issue(Uuid::new_v4(), SECRET, Duration::hours(1)).unwrap();
        assert!(matches!(
            codec.verify(&token, ""),
            Err(AppError::Config(ConfigError::MissingRequired(_)))
        ));
    }

    #[test]
    fn test_non_positive_ttl_is_rejected() {
        let codec = AccessTokenCodec::default();

        for ttl in [Duration::zero(), Duration::seconds(-5)] {
            assert!(matches!(
                codec.issue(Uuid::new_v4(), SECRET, ttl),
                Err(AppError::Config(ConfigError::InvalidValue(_)))
            ));
        }
    }

    #[test]
    fn test_garbage_is_malformed() {
        let codec = AccessTokenCodec::default();

        for token in ["", "invalid.token.here", "abc", "a.b"] {
            assert!(matches!(auth_kind(codec.verify(token, SECRET)), AuthError::MalformedToken));
        }
    }

    #[test]
    fn test_foreign_issuer_is_malformed() {
        let mut claims = Claims::new(Uuid::new_v4(), chrono::Utc::now(), Duration::hours(1));
        claims.iss = "someone-else".to_string();
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        let kind = auth_kind(AccessTokenCodec::default().verify(&token, SECRET));
        assert!(matches!(kind, AuthError::MalformedToken));
    }

    #[test]
    fn test_non_uuid_subject_is_malformed() {
        let mut claims = Claims::new(Uuid::new_v4(), chrono::Utc::now(), Duration::hours(1));
        claims.sub = "not-a-user".to_string();
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        let kind = auth_kind(AccessTokenCodec::default().verify(&token, SECRET));
        assert!(matches!(kind, AuthError::MalformedToken));
    }

    #[test]
    fn test_every_single_byte_mutation_is_rejected() {
        let codec = AccessTokenCodec::default();
        let token = codec.issue(Uuid::new_v4(), SECRET, Duration::hours(1)).unwrap();

        for position in 0..token.len() {
            let mut bytes = token.clone().into_bytes();
            bytes[position] = if bytes[position] == b'A' { b'B' } else { b'A' };
            let tampered = String::from_utf8(bytes).unwrap();

            assert!(
                codec.verify(&tampered, SECRET).is_err(),
                "mutation at byte {} was accepted",
                position
            );
        }
    }

    #[test]
    fn test_appended_byte_is_rejected() {
        let codec = AccessTokenCodec::default();
        let token = codec.issue(Uuid::new_v4(), SECRET, Duration::hours(1)).unwrap();

        assert!(codec.verify(&format!("{}X", token), SECRET).is_err());
    }
}
