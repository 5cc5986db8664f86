/// Credential Extraction
///
/// Pulls bearer tokens and API keys out of the `Authorization` header.
/// Pure parsing: no I/O, nothing is verified here.

use actix_web::http::header::{HeaderMap, AUTHORIZATION};
use sha2::{Digest, Sha256};

use crate::error::{AppError, AuthError};

const BEARER_SCHEME: &str = "Bearer";
const API_KEY_SCHEME: &str = "ApiKey";

/// Credential material carried by one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BearerCredential {
    Token(String),
    ApiKey(String),
}

/// `Authorization: Bearer <token>`
pub fn extract_bearer(headers: &HeaderMap) -> Result<String, AppError> {
    extract_scheme(headers, BEARER_SCHEME)
}

/// `Authorization: ApiKey <key>`
pub fn extract_api_key(headers: &HeaderMap) -> Result<String, AppError> {
    extract_scheme(headers, API_KEY_SCHEME)
}

/// Whichever credential the request carries
pub fn extract_credential(headers: &HeaderMap) -> Result<BearerCredential, AppError> {
    extract_bearer(headers)
        .map(BearerCredential::Token)
        .or_else(|_| extract_api_key(headers).map(BearerCredential::ApiKey))
}

/// Compare a presented API key with the configured one.
///
/// Both sides are reduced to SHA-256 digests and compared over every byte,
/// so the time taken depends on neither the key length nor the position of
/// the first difference.
pub fn api_key_matches(presented: &str, expected: &str) -> bool {
    let presented = Sha256::digest(presented.as_bytes());
    let expected = Sha256::digest(expected.as_bytes());

    presented
        .iter()
        .zip(expected.iter())
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}

fn extract_scheme(headers: &HeaderMap, scheme: &str) -> Result<String, AppError> {
    let value = headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or(AuthError::MissingCredential)?;

    // Scheme names are case-insensitive (RFC 9110 §11.1)
    let (given, credential) = value
        .trim()
        .split_once(char::is_whitespace)
        .ok_or(AuthError::MissingCredential)?;

    if !given.eq_ignore_ascii_case(scheme) {
        return Err(AuthError::MissingCredential.into());
    }

    let credential = credential.trim();
    if credential.is_empty() || credential.contains(char::is_whitespace) {
        return Err(AuthError::MissingCredential.into());
    }

    Ok(credential.to_string())
}
