/// Session Routes
///
/// Login, access token refresh and refresh token revocation.

use actix_web::{web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AuthError, ErrorContext};
use crate::models::UserView;
use crate::startup::Sessions;

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    /// Requested access token lifetime; clamped to one hour
    pub expires_in_seconds: Option<i64>,
}

#[derive(Serialize)]
pub struct LoginResponse {
    #[serde(flatten)]
    pub user: UserView,
    pub token: String,
    pub refresh_token: String,
}

#[derive(Serialize)]
pub struct RefreshResponse {
    pub token: String,
}

/// POST /api/login
///
/// # Errors
/// - 401: Unknown email or wrong password (indistinguishable)
/// - 500: Hashing, randomness or persistence failure
pub async fn login(
    form: web::Json<LoginRequest>,
    sessions: web::Data<Sessions>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("login");
    let form = form.into_inner();

    let session = sessions
        .login(form.email.trim(), &form.password, form.expires_in_seconds)
        .await?;

    tracing::info!(
        request_id = %context.request_id,
        operation = %context.operation,
        user_id = %session.user.id,
        "User logged in successfully"
    );

    Ok(HttpResponse::Ok().json(LoginResponse {
        user: session.user,
        token: session.access_token,
        refresh_token: session.refresh_token,
    }))
}

/// POST /api/refresh
///
/// Requires `Authorization: Bearer <refresh_token>`.
///
/// # Errors
/// - 401: Missing, unknown, expired or revoked refresh token
pub async fn refresh(
    req: HttpRequest,
    sessions: web::Data<Sessions>,
) -> Result<HttpResponse, AppError> {
    let token = sessions.refresh(req.headers()).await?;

    Ok(HttpResponse::Ok().json(RefreshResponse { token }))
}

/// POST /api/revoke
///
/// Requires `Authorization: Bearer <refresh_token>`. An unknown token is
/// answered like a successful revoke.
///
/// # Errors
/// - 401: No bearer credential
pub async fn revoke(
    req: HttpRequest,
    sessions: web::Data<Sessions>,
) -> Result<HttpResponse, AppError> {
    match sessions.revoke(req.headers()).await {
        Ok(()) => Ok(HttpResponse::NoContent().finish()),
        Err(AppError::Auth(AuthError::SessionInvalid)) => {
            tracing::info!("Revoke requested for unknown refresh token");
            Ok(HttpResponse::NoContent().finish())
        }
        Err(e) => Err(e),
    }
}
