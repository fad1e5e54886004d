use axum::{extract::State, response::Json};
use model::entities::user;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use utoipa::ToSchema;

use crate::auth::{issue_token, verify_password};
use crate::permissions::resolve_role;
use crate::schemas::{bad_request, internal_error, ApiError, AppState, ErrorResponse, ValidJson};

/// Login credentials.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Login result: the bearer token plus the caller's role classification.
/// `session_status` is "seller" or "buyer" with `account_id` pointing at
/// the matching profile, or both null for a bare user account.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
    pub user_id: i32,
    pub email: String,
    pub session_status: Option<String>,
    pub account_id: Option<i32>,
}

/// Log in and obtain a bearer token
#[utoipa::path(
    post,
    path = "/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in successfully", body = LoginResponse),
        (status = 400, description = "Invalid credentials", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, request))]
pub async fn login(
    State(state): State<AppState>,
    ValidJson(request): ValidJson<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let invalid = || bad_request("Unable to log in with provided credentials.");

    let user_model = user::Entity::find()
        .filter(user::Column::Username.eq(request.username.clone()))
        .filter(user::Column::IsActive.eq(true))
        .one(&state.db)
        .await
        .map_err(internal_error)?
        .ok_or_else(|| {
            warn!("Login attempt for unknown user '{}'", request.username);
            invalid()
        })?;

    if !verify_password(&request.password, &user_model.password_hash) {
        warn!("Failed login for user '{}'", request.username);
        return Err(invalid());
    }

    let token = issue_token(&state.db, user_model.id)
        .await
        .map_err(internal_error)?;

    let role = resolve_role(&state.db, user_model.id)
        .await
        .map_err(internal_error)?;

    info!(
        "User '{}' logged in as {}",
        user_model.username,
        role.status().unwrap_or("unclassified")
    );

    Ok(Json(LoginResponse {
        token: token.key,
        user_id: user_model.id,
        email: user_model.email,
        session_status: role.status().map(str::to_string),
        account_id: role.account_id(),
    }))
}
