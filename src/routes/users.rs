/// User Account Routes

use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::clock::Clock;
use crate::error::{AppError, DatabaseError, ErrorContext};
use crate::middleware::AuthenticatedUser;
use crate::models::{NewUser, UserView};
use crate::startup::Sessions;
use crate::store::{Store, UserStore};
use crate::validators::{is_valid_email, is_valid_password};

#[derive(Deserialize)]
pub struct CredentialsRequest {
    pub email: String,
    pub password: String,
}

impl CredentialsRequest {
    /// Validate and hash; the plaintext goes no further than this
    fn into_new_user(self, sessions: &Sessions) -> Result<NewUser, AppError> {
        let email = is_valid_email(&self.email)?;
        is_valid_password(&self.password)?;
        let hashed_password = sessions.hasher().hash(&self.password)?;

        Ok(NewUser {
            email,
            hashed_password,
        })
    }
}

/// POST /api/users
///
/// # Errors
/// - 400: Invalid email or password
/// - 409: Email already registered
pub async fn create_user(
    form: web::Json<CredentialsRequest>,
    store: web::Data<dyn Store>,
    sessions: web::Data<Sessions>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("user_registration");

    let new_user = form.into_inner().into_new_user(&sessions)?;
    let user = store.create_user(new_user, sessions.clock().now()).await?;

    tracing::info!(
        request_id = %context.request_id,
        operation = %context.operation,
        user_id = %user.id,
        "User registered successfully"
    );

    Ok(HttpResponse::Created().json(UserView::from(&user)))
}

/// PUT /api/users
///
/// Replaces the caller's email and password.
///
/// # Errors
/// - 400: Invalid email or password
/// - 401: Missing or invalid access token
/// - 404: The token's user no longer exists
/// - 409: Email taken by another account
pub async fn update_user(
    user: AuthenticatedUser,
    form: web::Json<CredentialsRequest>,
    store: web::Data<dyn Store>,
    sessions: web::Data<Sessions>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("user_update").with_user_id(user.id().to_string());

    let new_user = form.into_inner().into_new_user(&sessions)?;
    let updated = store
        .update_user(user.id(), new_user, sessions.clock().now())
        .await?
        .ok_or_else(|| DatabaseError::NotFound("user".to_string()))?;

    tracing::info!(
        request_id = %context.request_id,
        operation = %context.operation,
        user_id = ?context.user_id,
        "User credentials updated"
    );

    Ok(HttpResponse::Ok().json(UserView::from(&updated)))
}
