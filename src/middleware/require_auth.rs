/// Access token authentication for route handlers
///
/// Handlers that take an `AuthenticatedUser` argument only run when the
/// request carries a valid `Authorization: Bearer <access token>`.

use std::future::{ready, Ready};

use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use uuid::Uuid;

use crate::error::AppError;
use crate::startup::Sessions;

/// Subject of a verified access token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser(pub Uuid);

impl AuthenticatedUser {
    pub fn id(&self) -> Uuid {
        self.0
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let result = match req.app_data::<web::Data<Sessions>>() {
            Some(sessions) => sessions.require_auth(req.headers()).map(AuthenticatedUser),
            None => Err(AppError::Internal(
                "session coordinator is not registered".to_string(),
            )),
        };

        if let Ok(user) = &result {
            tracing::debug!(user_id = %user.0, "Access token verified");
        }

        ready(result)
    }
}
