/// Chirp Routes
///
/// Short text posts. Writing and deleting require an access token; reading
/// is public.

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

use crate::clock::Clock;
use crate::error::{AppError, AuthError, DatabaseError, ValidationError};
use crate::middleware::AuthenticatedUser;
use crate::startup::Sessions;
use crate::store::{ChirpStore, Store};
use crate::validators::clean_chirp;

#[derive(Deserialize)]
pub struct ChirpRequest {
    pub body: String,
}

#[derive(Deserialize)]
pub struct ListChirpsQuery {
    pub author_id: Option<String>,
    pub sort: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SortOrder {
    Ascending,
    Descending,
}

impl ListChirpsQuery {
    fn author(&self) -> Result<Option<Uuid>, ValidationError> {
        match self.author_id.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(raw) => Uuid::parse_str(raw)
                .map(Some)
                .map_err(|_| ValidationError::InvalidFormat("author_id".to_string())),
        }
    }

    fn order(&self) -> Result<SortOrder, ValidationError> {
        match self.sort.as_deref() {
            None | Some("") | Some("asc") => Ok(SortOrder::Ascending),
            Some("desc") => Ok(SortOrder::Descending),
            Some(_) => Err(ValidationError::InvalidFormat("sort".to_string())),
        }
    }
}

/// POST /api/chirps
///
/// The author is always the token's subject.
pub async fn create_chirp(
    user: AuthenticatedUser,
    form: web::Json<ChirpRequest>,
    store: web::Data<dyn Store>,
    sessions: web::Data<Sessions>,
) -> Result<HttpResponse, AppError> {
    let body = clean_chirp(&form.body)?;
    let chirp = store
        .create_chirp(user.id(), body, sessions.clock().now())
        .await?;

    tracing::info!(user_id = %user.id(), chirp_id = %chirp.id, "Chirp created");
    Ok(HttpResponse::Created().json(chirp))
}

/// GET /api/chirps?author_id=<uuid>&sort=asc|desc
pub async fn list_chirps(
    query: web::Query<ListChirpsQuery>,
    store: web::Data<dyn Store>,
) -> Result<HttpResponse, AppError> {
    let author = query.author()?;
    let order = query.order()?;

    let mut chirps = store.list_chirps(author).await?;
    if order == SortOrder::Descending {
        chirps.reverse();
    }

    Ok(HttpResponse::Ok().json(chirps))
}

/// GET /api/chirps/{chirp_id}
pub async fn get_chirp(
    path: web::Path<Uuid>,
    store: web::Data<dyn Store>,
) -> Result<HttpResponse, AppError> {
    let chirp = store
        .get_chirp(path.into_inner())
        .await?
        .ok_or_else(|| DatabaseError::NotFound("chirp".to_string()))?;

    Ok(HttpResponse::Ok().json(chirp))
}

/// DELETE /api/chirps/{chirp_id}
///
/// # Errors
/// - 401: Missing or invalid access token
/// - 403: Caller is not the author
/// - 404: No such chirp
pub async fn delete_chirp(
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
    store: web::Data<dyn Store>,
) -> Result<HttpResponse, AppError> {
    let chirp_id = path.into_inner();
    let chirp = store
        .get_chirp(chirp_id)
        .await?
        .ok_or_else(|| DatabaseError::NotFound("chirp".to_string()))?;

    if chirp.user_id != user.id() {
        return Err(AuthError::Forbidden.into());
    }

    if !store.delete_chirp(chirp_id).await? {
        return Err(DatabaseError::NotFound("chirp".to_string()).into());
    }

    tracing::info!(user_id = %user.id(), chirp_id = %chirp_id, "Chirp deleted");
    Ok(HttpResponse::NoContent().finish())
}
