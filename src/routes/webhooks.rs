/// Payment Provider Webhook
///
/// Authenticated with a static API key (`Authorization: ApiKey <key>`).

use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::{api_key_matches, extract_api_key};
use crate::clock::Clock;
use crate::configuration::AuthSettings;
use crate::error::{AppError, AuthError, DatabaseError, ValidationError};
use crate::startup::Sessions;
use crate::store::{Store, UserStore};

const USER_UPGRADED: &str = "user.upgraded";

#[derive(Deserialize)]
pub struct WebhookRequest {
    pub event: String,
    pub data: WebhookData,
}

#[derive(Deserialize)]
pub struct WebhookData {
    pub user_id: Uuid,
}

/// POST /api/polka/webhooks
///
/// The key is checked before the body is parsed.
///
/// # Errors
/// - 401: Missing or wrong API key
/// - 400: Unparseable body
/// - 404: `user.upgraded` for an unknown user
pub async fn polka_webhook(
    req: HttpRequest,
    body: web::Bytes,
    auth: web::Data<AuthSettings>,
    store: web::Data<dyn Store>,
    sessions: web::Data<Sessions>,
) -> Result<HttpResponse, AppError> {
    let key = extract_api_key(req.headers())?;
    if !api_key_matches(&key, &auth.polka_key) {
        return Err(AuthError::AuthFailed.into());
    }

    let event: WebhookRequest = serde_json::from_slice(&body)
        .map_err(|_| ValidationError::InvalidFormat("webhook body".to_string()))?;

    if event.event != USER_UPGRADED {
        tracing::debug!(event = %event.event, "Ignoring webhook event");
        return Ok(HttpResponse::NoContent().finish());
    }

    let user = store
        .upgrade_to_chirpy_red(event.data.user_id, sessions.clock().now())
        .await?
        .ok_or_else(|| DatabaseError::NotFound("user".to_string()))?;

    tracing::info!(user_id = %user.id, "User upgraded to Chirpy Red");
    Ok(HttpResponse::NoContent().finish())
}
