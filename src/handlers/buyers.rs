use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use model::entities::{buyer, user};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};
use utoipa::ToSchema;

use crate::auth::{hash_password, AuthUser};
use crate::handlers::sellers::{
    find_user_by_username_iexact, UpdateUserPayload, UserPayload, UserResponse,
};
use crate::permissions::is_account_owner;
use crate::schemas::{
    bad_request, forbidden, internal_error, internal_server_error, not_found, ApiError,
    ApiResponse, AppState, ErrorResponse, ValidJson,
};

/// Request body for registering a buyer.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CreateBuyerRequest {
    pub phone_number: String,
    pub profile: UserPayload,
}

/// Request body for updating a buyer profile.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct UpdateBuyerProfileRequest {
    pub phone_number: Option<String>,
    pub profile: UpdateUserPayload,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BuyerResponse {
    pub id: i32,
    pub profile: UserResponse,
    pub phone_number: String,
}

async fn buyer_response<C: ConnectionTrait>(
    db: &C,
    model: buyer::Model,
) -> Result<BuyerResponse, ApiError> {
    let profile = user::Entity::find_by_id(model.profile_id)
        .one(db)
        .await
        .map_err(internal_error)?
        .ok_or_else(|| not_found("User not found"))?;

    Ok(BuyerResponse {
        id: model.id,
        profile: UserResponse::from(profile),
        phone_number: model.phone_number,
    })
}

/// Register a new buyer.
///
/// The embedded user is resolved by username get-or-create, so an existing
/// seller identity can also become a buyer; a username already backing a
/// buyer is rejected.
#[utoipa::path(
    post,
    path = "/create_buyer",
    tag = "buyers",
    request_body = CreateBuyerRequest,
    responses(
        (status = 201, description = "Buyer created successfully", body = ApiResponse<BuyerResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, request))]
pub async fn create_buyer(
    State(state): State<AppState>,
    ValidJson(request): ValidJson<CreateBuyerRequest>,
) -> Result<(StatusCode, Json<ApiResponse<BuyerResponse>>), ApiError> {
    debug!("Registering buyer '{}'", request.profile.username);

    let txn = state.db.begin().await.map_err(internal_error)?;

    let user_model = match user::Entity::find()
        .filter(user::Column::Username.eq(&request.profile.username))
        .one(&txn)
        .await
        .map_err(internal_error)?
    {
        Some(existing) => {
            let already_buyer = buyer::Entity::find()
                .filter(buyer::Column::ProfileId.eq(existing.id))
                .one(&txn)
                .await
                .map_err(internal_error)?
                .is_some();
            if already_buyer {
                warn!(
                    "Rejected buyer registration: username '{}' already backs a buyer",
                    request.profile.username
                );
                return Err(bad_request("A user with this username already exists."));
            }
            existing
        }
        None => {
            let password_hash =
                hash_password(&request.profile.password).map_err(|_| internal_server_error())?;
            user::ActiveModel {
                username: Set(request.profile.username.clone()),
                email: Set(request.profile.email.clone()),
                password_hash: Set(password_hash),
                is_active: Set(true),
                ..Default::default()
            }
            .insert(&txn)
            .await
            .map_err(internal_error)?
        }
    };

    let buyer_model = buyer::ActiveModel {
        profile_id: Set(user_model.id),
        phone_number: Set(request.phone_number),
        ..Default::default()
    }
    .insert(&txn)
    .await
    .map_err(internal_error)?;

    txn.commit().await.map_err(internal_error)?;
    info!(
        "Buyer '{}' registered with ID {}",
        user_model.username, buyer_model.id
    );

    let response = BuyerResponse {
        id: buyer_model.id,
        profile: UserResponse::from(user_model),
        phone_number: buyer_model.phone_number,
    };
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(response, "Buyer created successfully")),
    ))
}

/// Get a specific buyer by ID
#[utoipa::path(
    get,
    path = "/buyers/{buyer_id}",
    tag = "buyers",
    params(
        ("buyer_id" = i32, Path, description = "Buyer ID"),
    ),
    responses(
        (status = 200, description = "Buyer retrieved successfully", body = ApiResponse<BuyerResponse>),
        (status = 404, description = "Buyer not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_buyer(
    Path(buyer_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<BuyerResponse>>, ApiError> {
    let buyer_model = buyer::Entity::find_by_id(buyer_id)
        .one(&state.db)
        .await
        .map_err(internal_error)?
        .ok_or_else(|| not_found("Buyer not found"))?;

    let response = buyer_response(&state.db, buyer_model).await?;
    Ok(Json(ApiResponse::new(
        response,
        "Buyer retrieved successfully",
    )))
}

/// Load a buyer and authorize the caller as its account owner.
async fn owned_buyer(
    state: &AppState,
    caller: &AuthUser,
    buyer_id: i32,
) -> Result<(buyer::Model, user::Model), ApiError> {
    let buyer_model = buyer::Entity::find_by_id(buyer_id)
        .one(&state.db)
        .await
        .map_err(internal_error)?
        .ok_or_else(|| not_found("Buyer not found"))?;

    if !is_account_owner(&caller.user, buyer_model.profile_id) {
        return Err(forbidden(
            "You do not have permission to access this buyer profile",
        ));
    }

    let profile = user::Entity::find_by_id(buyer_model.profile_id)
        .one(&state.db)
        .await
        .map_err(internal_error)?
        .ok_or_else(|| not_found("User not found"))?;

    Ok((buyer_model, profile))
}

/// Get the buyer profile (owner only)
#[utoipa::path(
    get,
    path = "/buyers/{buyer_id}/profile",
    tag = "buyers",
    params(
        ("buyer_id" = i32, Path, description = "Buyer ID"),
    ),
    security(("token" = [])),
    responses(
        (status = 200, description = "Buyer profile retrieved successfully", body = ApiResponse<BuyerResponse>),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Not the account owner", body = ErrorResponse),
        (status = 404, description = "Buyer not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state, caller))]
pub async fn get_buyer_profile(
    Path(buyer_id): Path<i32>,
    State(state): State<AppState>,
    caller: AuthUser,
) -> Result<Json<ApiResponse<BuyerResponse>>, ApiError> {
    let (buyer_model, profile) = owned_buyer(&state, &caller, buyer_id).await?;
    let response = BuyerResponse {
        id: buyer_model.id,
        profile: UserResponse::from(profile),
        phone_number: buyer_model.phone_number,
    };
    Ok(Json(ApiResponse::new(
        response,
        "Buyer profile retrieved successfully",
    )))
}

/// Update a buyer profile (owner only)
///
/// The nested identity update enforces username uniqueness against other
/// users, compared case-insensitively; re-casing one's own username is
/// allowed.
#[utoipa::path(
    put,
    path = "/buyers/{buyer_id}/profile",
    tag = "buyers",
    params(
        ("buyer_id" = i32, Path, description = "Buyer ID"),
    ),
    security(("token" = [])),
    request_body = UpdateBuyerProfileRequest,
    responses(
        (status = 200, description = "Buyer profile updated successfully", body = ApiResponse<BuyerResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Not the account owner", body = ErrorResponse),
        (status = 404, description = "Buyer not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state, caller, request))]
pub async fn update_buyer_profile(
    Path(buyer_id): Path<i32>,
    State(state): State<AppState>,
    caller: AuthUser,
    ValidJson(request): ValidJson<UpdateBuyerProfileRequest>,
) -> Result<Json<ApiResponse<BuyerResponse>>, ApiError> {
    let (buyer_model, profile) = owned_buyer(&state, &caller, buyer_id).await?;

    if let Some(other) = find_user_by_username_iexact(&state.db, &request.profile.username)
        .await
        .map_err(internal_error)?
    {
        if other.id != profile.id {
            warn!(
                "Rejected username change to '{}': held by user {}",
                request.profile.username, other.id
            );
            return Err(bad_request("A user with this username already exists."));
        }
    }

    let txn = state.db.begin().await.map_err(internal_error)?;

    let mut user_active: user::ActiveModel = profile.into();
    user_active.username = Set(request.profile.username.clone());
    user_active.email = Set(request.profile.email.clone());
    let updated_profile = user_active.update(&txn).await.map_err(internal_error)?;

    let mut buyer_active: buyer::ActiveModel = buyer_model.into();
    if let Some(phone_number) = request.phone_number {
        buyer_active.phone_number = Set(phone_number);
    }
    let updated_buyer = buyer_active.update(&txn).await.map_err(internal_error)?;

    txn.commit().await.map_err(internal_error)?;
    info!("Buyer {} profile updated", buyer_id);

    let response = BuyerResponse {
        id: updated_buyer.id,
        profile: UserResponse::from(updated_profile),
        phone_number: updated_buyer.phone_number,
    };
    Ok(Json(ApiResponse::new(
        response,
        "Buyer profile updated successfully",
    )))
}

/// Delete a buyer profile (owner only)
///
/// Hard delete; transactions where this buyer was the payer keep the
/// record with the payer nulled out.
#[utoipa::path(
    delete,
    path = "/buyers/{buyer_id}/profile",
    tag = "buyers",
    params(
        ("buyer_id" = i32, Path, description = "Buyer ID"),
    ),
    security(("token" = [])),
    responses(
        (status = 200, description = "Buyer deleted successfully", body = ApiResponse<String>),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Not the account owner", body = ErrorResponse),
        (status = 404, description = "Buyer not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state, caller))]
pub async fn delete_buyer_profile(
    Path(buyer_id): Path<i32>,
    State(state): State<AppState>,
    caller: AuthUser,
) -> Result<Json<ApiResponse<String>>, ApiError> {
    let (buyer_model, _) = owned_buyer(&state, &caller, buyer_id).await?;

    buyer::Entity::delete_by_id(buyer_model.id)
        .exec(&state.db)
        .await
        .map_err(internal_error)?;

    info!("Buyer {} deleted", buyer_id);
    Ok(Json(ApiResponse::new(
        format!("Buyer {} deleted", buyer_id),
        "Buyer deleted successfully",
    )))
}
