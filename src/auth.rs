use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use model::entities::{auth_token, user};
use rand::RngCore;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set,
};
use thiserror::Error;
use tracing::debug;

use crate::schemas::{AppState, ErrorResponse};

/// Failures while authenticating a request or preparing credentials.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Authentication credentials were not provided")]
    MissingCredentials,
    #[error("Invalid token")]
    InvalidToken,
    #[error("password hashing failed: {0}")]
    Hash(#[from] bcrypt::BcryptError),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            AuthError::MissingCredentials => (StatusCode::UNAUTHORIZED, "UNAUTHENTICATED"),
            AuthError::InvalidToken => (StatusCode::UNAUTHORIZED, "INVALID_TOKEN"),
            AuthError::Hash(_) | AuthError::Database(_) => {
                tracing::error!("Authentication backend error: {}", self);
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            }
        };
        let message = match status {
            StatusCode::INTERNAL_SERVER_ERROR => "Internal server error".to_string(),
            _ => self.to_string(),
        };
        (status, Json(ErrorResponse::new(message, code))).into_response()
    }
}

/// Hash a caller-supplied password for storage.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    Ok(bcrypt::hash(password, bcrypt::DEFAULT_COST)?)
}

/// Check a password against a stored hash. Malformed hashes count as a
/// failed verification rather than an error.
pub fn verify_password(password: &str, password_hash: &str) -> bool {
    bcrypt::verify(password, password_hash).unwrap_or(false)
}

/// 40 hex characters of fresh random key material.
fn generate_token_key() -> String {
    let mut bytes = [0u8; 20];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Get or create the bearer token for a user. When a token already exists
/// its `created` timestamp is refreshed to extend the validity window; the
/// key itself is stable across logins.
pub async fn issue_token(
    db: &DatabaseConnection,
    user_id: i32,
) -> Result<auth_token::Model, DbErr> {
    let existing = auth_token::Entity::find()
        .filter(auth_token::Column::UserId.eq(user_id))
        .one(db)
        .await?;

    match existing {
        Some(token) => {
            debug!("Refreshing existing token for user {}", user_id);
            let mut active: auth_token::ActiveModel = token.into();
            active.created = Set(Utc::now());
            active.update(db).await
        }
        None => {
            debug!("Issuing new token for user {}", user_id);
            auth_token::ActiveModel {
                key: Set(generate_token_key()),
                user_id: Set(user_id),
                created: Set(Utc::now()),
            }
            .insert(db)
            .await
        }
    }
}

/// The authenticated caller, extracted from the `Authorization` header.
/// Accepts both `Bearer <key>` and the DRF-style `Token <key>` schemes.
#[derive(Debug)]
pub struct AuthUser {
    pub user: user::Model,
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header_value = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or(AuthError::MissingCredentials)?;

        let key = header_value
            .strip_prefix("Bearer ")
            .or_else(|| header_value.strip_prefix("Token "))
            .ok_or(AuthError::MissingCredentials)?;

        let token = auth_token::Entity::find_by_id(key.to_string())
            .one(&state.db)
            .await?
            .ok_or(AuthError::InvalidToken)?;

        let user = user::Entity::find_by_id(token.user_id)
            .one(&state.db)
            .await?
            .ok_or(AuthError::InvalidToken)?;

        if !user.is_active {
            return Err(AuthError::InvalidToken);
        }

        Ok(AuthUser { user })
    }
}
