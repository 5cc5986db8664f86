/// In-process store backed by mutex-guarded maps.
///
/// Mirrors the Postgres semantics row for row: unique emails, digest-keyed
/// refresh tokens, soft revocation.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{ChirpStore, RefreshTokenStore, UserStore};
use crate::auth::{hash_refresh_token, RefreshTokenRecord};
use crate::error::{AppError, DatabaseError};
use crate::models::{Chirp, NewUser, UserCredential};

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, UserCredential>,
    refresh_tokens: HashMap<String, RefreshTokenRecord>,
    chirps: Vec<Chirp>,
}

#[derive(Default)]
pub struct InMemoryStore {
    tables: Mutex<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> Result<MutexGuard<'_, Tables>, AppError> {
        self.tables
            .lock()
            .map_err(|_| AppError::Internal("in-memory store lock poisoned".to_string()))
    }
}

impl Tables {
    fn email_taken_by_other(&self, email: &str, id: Option<Uuid>) -> bool {
        self.users
            .values()
            .any(|u| u.email == email && Some(u.id) != id)
    }
}

fn duplicate_email() -> AppError {
    DatabaseError::UniqueConstraintViolation("Email already registered".to_string()).into()
}

#[async_trait]
impl UserStore for InMemoryStore {
    async fn create_user(&self, user: NewUser, now: DateTime<Utc>) -> Result<UserCredential, AppError> {
        let mut tables = self.tables()?;
        if tables.email_taken_by_other(&user.email, None) {
            return Err(duplicate_email());
        }

        let created = UserCredential {
            id: Uuid::new_v4(),
            email: user.email,
            hashed_password: user.hashed_password,
            is_chirpy_red: false,
            created_at: now,
            updated_at: now,
        };
        tables.users.insert(created.id, created.clone());
        Ok(created)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserCredential>, AppError> {
        Ok(self.tables()?.users.values().find(|u| u.email == email).cloned())
    }

    async fn update_user(
        &self,
        id: Uuid,
        user: NewUser,
        now: DateTime<Utc>,
    ) -> Result<Option<UserCredential>, AppError> {
        let mut tables = self.tables()?;
        if tables.email_taken_by_other(&user.email, Some(id)) {
            return Err(duplicate_email());
        }

        Ok(tables.users.get_mut(&id).map(|existing| {
            existing.email = user.email;
            existing.hashed_password = user.hashed_password;
            existing.updated_at = now;
            existing.clone()
        }))
    }

    async fn upgrade_to_chirpy_red(
        &self,
        id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<UserCredential>, AppError> {
        Ok(self.tables()?.users.get_mut(&id).map(|existing| {
            existing.is_chirpy_red = true;
            existing.updated_at = now;
            existing.clone()
        }))
    }
}

#[async_trait]
impl RefreshTokenStore for InMemoryStore {
    async fn create_refresh_token_record(&self, record: &RefreshTokenRecord) -> Result<(), AppError> {
        let mut tables = self.tables()?;
        if tables.refresh_tokens.contains_key(&record.token_hash) {
            return Err(DatabaseError::UniqueConstraintViolation("refresh token".to_string()).into());
        }
        tables
            .refresh_tokens
            .insert(record.token_hash.clone(), record.clone());
        Ok(())
    }

    async fn find_active_refresh_token_record(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<RefreshTokenRecord>, AppError> {
        Ok(self
            .tables()?
            .refresh_tokens
            .get(&hash_refresh_token(token))
            .filter(|record| record.is_active_at(now))
            .cloned())
    }

    async fn revoke_refresh_token_record(&self, token: &str, now: DateTime<Utc>) -> Result<bool, AppError> {
        let mut tables = self.tables()?;
        match tables.refresh_tokens.get_mut(&hash_refresh_token(token)) {
            Some(record) => {
                record.revoked_at.get_or_insert(now);
                record.updated_at = now;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl ChirpStore for InMemoryStore {
    async fn create_chirp(&self, user_id: Uuid, body: String, now: DateTime<Utc>) -> Result<Chirp, AppError> {
        let chirp = Chirp {
            id: Uuid::new_v4(),
            body,
            user_id,
            created_at: now,
            updated_at: now,
        };
        self.tables()?.chirps.push(chirp.clone());
        Ok(chirp)
    }

    async fn list_chirps(&self, author_id: Option<Uuid>) -> Result<Vec<Chirp>, AppError> {
        let mut chirps: Vec<Chirp> = self
            .tables()?
            .chirps
            .iter()
            .filter(|c| author_id.map_or(true, |author| c.user_id == author))
            .cloned()
            .collect();
        chirps.sort_by_key(|c| c.created_at);
        Ok(chirps)
    }

    async fn get_chirp(&self, id: Uuid) -> Result<Option<Chirp>, AppError> {
        Ok(self.tables()?.chirps.iter().find(|c| c.id == id).cloned())
    }

    async fn delete_chirp(&self, id: Uuid) -> Result<bool, AppError> {
        let mut tables = self.tables()?;
        let before = tables.chirps.len();
        tables.chirps.retain(|c| c.id != id);
        Ok(tables.chirps.len() != before)
    }
}
