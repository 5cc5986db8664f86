//! Authentication module
//!
//! Password hashing, access token issuance/verification, refresh token
//! generation, credential extraction and the session flows built on them.

mod claims;
mod credentials;
mod jwt;
mod password;
mod refresh_token;
mod session;

pub use claims::{Claims, ISSUER};
pub use credentials::{
    api_key_matches, extract_api_key, extract_bearer, extract_credential, BearerCredential,
};
pub use jwt::AccessTokenCodec;
pub use password::PasswordHasher;
pub use refresh_token::{
    generate_refresh_token, hash_refresh_token, refresh_token_ttl, RefreshTokenRecord,
    RefreshTokenState, REFRESH_TOKEN_BYTES,
};
pub use session::{access_token_ttl, Session, SessionCoordinator, MAX_ACCESS_TOKEN_TTL_SECS};
