use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use chrono::{DateTime, Utc};
use model::entities::{county, seller, subcounty, user};
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, JoinType, QueryFilter,
    QuerySelect, RelationTrait, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};
use utoipa::ToSchema;

use crate::auth::{hash_password, AuthUser};
use crate::permissions::is_account_owner;
use crate::schemas::{
    bad_request, forbidden, internal_error, internal_server_error, not_found, ApiError,
    ApiResponse, AppState, ErrorResponse, ValidJson,
};

const DEFAULT_PROFILE_IMAGE: &str = "images/profile/profile.jpg";

/// Nested identity fields accepted at registration.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct UserPayload {
    pub username: String,
    pub password: String,
    pub email: String,
}

/// Nested identity fields accepted on profile update. The password is not
/// updatable through profile endpoints.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct UpdateUserPayload {
    pub username: String,
    pub email: String,
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CountyPayload {
    pub county_name: String,
    pub code: i32,
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct SubCountyPayload {
    pub subcounty_name: String,
    pub county: CountyPayload,
}

/// Request body for registering a seller. Embeds the identity and the
/// geography; counties and subcounties are created lazily by name.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CreateSellerRequest {
    pub business_name: String,
    pub business_reg_no: String,
    pub phone_number: String,
    pub sub_county: SubCountyPayload,
    pub town: String,
    pub local_area_name: String,
    pub street: String,
    pub building: String,
    pub business_reg_doc: Option<String>,
    pub profile_pic: Option<String>,
    pub profile: UserPayload,
}

/// Request body for updating a seller profile. Business-identifying fields
/// (name, registration number and document, subcounty, registration date)
/// are immutable and not accepted here.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct UpdateSellerProfileRequest {
    pub phone_number: Option<String>,
    pub town: Option<String>,
    pub local_area_name: Option<String>,
    pub street: Option<String>,
    pub building: Option<String>,
    pub profile_pic: Option<String>,
    pub profile: UpdateUserPayload,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: i32,
    pub username: String,
    pub email: String,
}

impl From<user::Model> for UserResponse {
    fn from(model: user::Model) -> Self {
        Self {
            id: model.id,
            username: model.username,
            email: model.email,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CountyResponse {
    pub id: i32,
    pub county_name: String,
    pub code: i32,
}

impl From<county::Model> for CountyResponse {
    fn from(model: county::Model) -> Self {
        Self {
            id: model.id,
            county_name: model.county_name,
            code: model.code,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SubCountyResponse {
    pub id: i32,
    pub subcounty_name: String,
    pub county: CountyResponse,
}

/// Public seller representation: the shape shown in listings and item
/// views. Registration number, document and date are not exposed.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SellerResponse {
    pub id: i32,
    pub profile_id: i32,
    pub business_name: String,
    pub phone_number: String,
    pub sub_county: SubCountyResponse,
    pub town: String,
    pub local_area_name: String,
    pub street: String,
    pub building: String,
    pub profile_pic: String,
}

/// Full seller representation returned to the account owner.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SellerProfileResponse {
    pub id: i32,
    pub profile: UserResponse,
    pub business_name: String,
    pub business_reg_no: String,
    pub phone_number: String,
    pub sub_county: SubCountyResponse,
    pub town: String,
    pub local_area_name: String,
    pub street: String,
    pub building: String,
    pub business_reg_doc: String,
    pub profile_pic: String,
    pub registration_date: DateTime<Utc>,
}

/// Load the subcounty and its county for a seller response.
pub(crate) async fn load_sub_county<C: ConnectionTrait>(
    db: &C,
    sub_county_id: i32,
) -> Result<SubCountyResponse, ApiError> {
    let sub_county = subcounty::Entity::find_by_id(sub_county_id)
        .one(db)
        .await
        .map_err(internal_error)?
        .ok_or_else(|| not_found("Subcounty not found"))?;
    let county = county::Entity::find_by_id(sub_county.county_id)
        .one(db)
        .await
        .map_err(internal_error)?
        .ok_or_else(|| not_found("County not found"))?;

    Ok(SubCountyResponse {
        id: sub_county.id,
        subcounty_name: sub_county.subcounty_name,
        county: CountyResponse::from(county),
    })
}

pub(crate) async fn seller_response<C: ConnectionTrait>(
    db: &C,
    model: seller::Model,
) -> Result<SellerResponse, ApiError> {
    let sub_county = load_sub_county(db, model.sub_county_id).await?;
    Ok(SellerResponse {
        id: model.id,
        profile_id: model.profile_id,
        business_name: model.business_name,
        phone_number: model.phone_number,
        sub_county,
        town: model.town,
        local_area_name: model.local_area_name,
        street: model.street,
        building: model.building,
        profile_pic: model.profile_pic,
    })
}

async fn seller_profile_response<C: ConnectionTrait>(
    db: &C,
    model: seller::Model,
    profile: user::Model,
) -> Result<SellerProfileResponse, ApiError> {
    let sub_county = load_sub_county(db, model.sub_county_id).await?;
    Ok(SellerProfileResponse {
        id: model.id,
        profile: UserResponse::from(profile),
        business_name: model.business_name,
        business_reg_no: model.business_reg_no,
        phone_number: model.phone_number,
        sub_county,
        town: model.town,
        local_area_name: model.local_area_name,
        street: model.street,
        building: model.building,
        business_reg_doc: model.business_reg_doc,
        profile_pic: model.profile_pic,
        registration_date: model.registration_date,
    })
}

/// Find a user whose username matches case-insensitively.
pub(crate) async fn find_user_by_username_iexact<C: ConnectionTrait>(
    db: &C,
    username: &str,
) -> Result<Option<user::Model>, sea_orm::DbErr> {
    user::Entity::find()
        .filter(
            Expr::expr(Func::lower(Expr::col(user::Column::Username)))
                .eq(username.to_lowercase()),
        )
        .one(db)
        .await
}

/// Register a new seller.
///
/// Resolves the county, subcounty and user by get-or-create so repeat
/// names never produce duplicate reference rows, then creates the seller
/// row. The whole cascade runs in one database transaction.
#[utoipa::path(
    post,
    path = "/create_seller_account",
    tag = "sellers",
    request_body = CreateSellerRequest,
    responses(
        (status = 201, description = "Seller created successfully", body = ApiResponse<SellerProfileResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, request))]
pub async fn create_seller(
    State(state): State<AppState>,
    ValidJson(request): ValidJson<CreateSellerRequest>,
) -> Result<(StatusCode, Json<ApiResponse<SellerProfileResponse>>), ApiError> {
    debug!("Registering seller '{}'", request.business_name);

    let txn = state.db.begin().await.map_err(internal_error)?;

    // County: get-or-create by name
    let county_model = match county::Entity::find()
        .filter(county::Column::CountyName.eq(&request.sub_county.county.county_name))
        .one(&txn)
        .await
        .map_err(internal_error)?
    {
        Some(existing) => existing,
        None => county::ActiveModel {
            county_name: Set(request.sub_county.county.county_name.clone()),
            code: Set(request.sub_county.county.code),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(internal_error)?,
    };

    // Subcounty: get-or-create by name, attached to the resolved county
    let sub_county_model = match subcounty::Entity::find()
        .filter(subcounty::Column::SubcountyName.eq(&request.sub_county.subcounty_name))
        .one(&txn)
        .await
        .map_err(internal_error)?
    {
        Some(existing) => existing,
        None => subcounty::ActiveModel {
            subcounty_name: Set(request.sub_county.subcounty_name.clone()),
            county_id: Set(county_model.id),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(internal_error)?,
    };

    // User: get-or-create by username. An existing user may back a new
    // seller (e.g. an established buyer), but never a second one.
    let user_model = match user::Entity::find()
        .filter(user::Column::Username.eq(&request.profile.username))
        .one(&txn)
        .await
        .map_err(internal_error)?
    {
        Some(existing) => {
            let already_seller = seller::Entity::find()
                .filter(seller::Column::ProfileId.eq(existing.id))
                .one(&txn)
                .await
                .map_err(internal_error)?
                .is_some();
            if already_seller {
                warn!(
                    "Rejected seller registration: username '{}' already backs a seller",
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

    let seller_model = seller::ActiveModel {
        profile_id: Set(user_model.id),
        business_name: Set(request.business_name),
        business_reg_no: Set(request.business_reg_no),
        phone_number: Set(request.phone_number),
        sub_county_id: Set(sub_county_model.id),
        town: Set(request.town),
        local_area_name: Set(request.local_area_name),
        street: Set(request.street),
        building: Set(request.building),
        business_reg_doc: Set(request
            .business_reg_doc
            .unwrap_or_else(|| DEFAULT_PROFILE_IMAGE.to_string())),
        profile_pic: Set(request
            .profile_pic
            .unwrap_or_else(|| DEFAULT_PROFILE_IMAGE.to_string())),
        registration_date: Set(Utc::now()),
        ..Default::default()
    }
    .insert(&txn)
    .await
    .map_err(internal_error)?;

    txn.commit().await.map_err(internal_error)?;
    info!(
        "Seller '{}' registered with ID {}",
        seller_model.business_name, seller_model.id
    );

    let response = seller_profile_response(&state.db, seller_model, user_model).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(response, "Seller created successfully")),
    ))
}

/// List all sellers with an active user account
#[utoipa::path(
    get,
    path = "/sellers",
    tag = "sellers",
    responses(
        (status = 200, description = "Sellers retrieved successfully", body = ApiResponse<Vec<SellerResponse>>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn list_sellers(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<SellerResponse>>>, ApiError> {
    let sellers = seller::Entity::find()
        .join(JoinType::InnerJoin, seller::Relation::User.def())
        .filter(user::Column::IsActive.eq(true))
        .all(&state.db)
        .await
        .map_err(internal_error)?;

    let mut responses = Vec::with_capacity(sellers.len());
    for model in sellers {
        responses.push(seller_response(&state.db, model).await?);
    }

    Ok(Json(ApiResponse::new(
        responses,
        "Sellers retrieved successfully",
    )))
}

/// Get a specific seller by ID (public view)
#[utoipa::path(
    get,
    path = "/sellers/{seller_id}",
    tag = "sellers",
    params(
        ("seller_id" = i32, Path, description = "Seller ID"),
    ),
    responses(
        (status = 200, description = "Seller retrieved successfully", body = ApiResponse<SellerResponse>),
        (status = 404, description = "Seller not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_seller(
    Path(seller_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<SellerResponse>>, ApiError> {
    let seller_model = seller::Entity::find_by_id(seller_id)
        .one(&state.db)
        .await
        .map_err(internal_error)?
        .ok_or_else(|| not_found("Seller not found"))?;

    let response = seller_response(&state.db, seller_model).await?;
    Ok(Json(ApiResponse::new(
        response,
        "Seller retrieved successfully",
    )))
}

/// Load a seller and authorize the caller as its account owner.
async fn owned_seller(
    state: &AppState,
    caller: &AuthUser,
    seller_id: i32,
) -> Result<(seller::Model, user::Model), ApiError> {
    let seller_model = seller::Entity::find_by_id(seller_id)
        .one(&state.db)
        .await
        .map_err(internal_error)?
        .ok_or_else(|| not_found("Seller not found"))?;

    if !is_account_owner(&caller.user, seller_model.profile_id) {
        return Err(forbidden(
            "You do not have permission to access this seller profile",
        ));
    }

    let profile = user::Entity::find_by_id(seller_model.profile_id)
        .one(&state.db)
        .await
        .map_err(internal_error)?
        .ok_or_else(|| not_found("User not found"))?;

    Ok((seller_model, profile))
}

/// Get the full profile of a seller (owner only)
#[utoipa::path(
    get,
    path = "/sellers/{seller_id}/profile",
    tag = "sellers",
    params(
        ("seller_id" = i32, Path, description = "Seller ID"),
    ),
    security(("token" = [])),
    responses(
        (status = 200, description = "Seller profile retrieved successfully", body = ApiResponse<SellerProfileResponse>),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Not the account owner", body = ErrorResponse),
        (status = 404, description = "Seller not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state, caller))]
pub async fn get_seller_profile(
    Path(seller_id): Path<i32>,
    State(state): State<AppState>,
    caller: AuthUser,
) -> Result<Json<ApiResponse<SellerProfileResponse>>, ApiError> {
    let (seller_model, profile) = owned_seller(&state, &caller, seller_id).await?;
    let response = seller_profile_response(&state.db, seller_model, profile).await?;
    Ok(Json(ApiResponse::new(
        response,
        "Seller profile retrieved successfully",
    )))
}

/// Update a seller profile (owner only)
///
/// Only mutable profile fields are accepted. The nested identity update
/// enforces username uniqueness against other users, compared
/// case-insensitively; swapping the case of one's own username is allowed.
#[utoipa::path(
    put,
    path = "/sellers/{seller_id}/profile",
    tag = "sellers",
    params(
        ("seller_id" = i32, Path, description = "Seller ID"),
    ),
    security(("token" = [])),
    request_body = UpdateSellerProfileRequest,
    responses(
        (status = 200, description = "Seller profile updated successfully", body = ApiResponse<SellerProfileResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Not the account owner", body = ErrorResponse),
        (status = 404, description = "Seller not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state, caller, request))]
pub async fn update_seller_profile(
    Path(seller_id): Path<i32>,
    State(state): State<AppState>,
    caller: AuthUser,
    ValidJson(request): ValidJson<UpdateSellerProfileRequest>,
) -> Result<Json<ApiResponse<SellerProfileResponse>>, ApiError> {
    let (seller_model, profile) = owned_seller(&state, &caller, seller_id).await?;

    // Reject usernames held by a different user (case-insensitive)
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

    let mut seller_active: seller::ActiveModel = seller_model.into();
    if let Some(phone_number) = request.phone_number {
        seller_active.phone_number = Set(phone_number);
    }
    if let Some(town) = request.town {
        seller_active.town = Set(town);
    }
    if let Some(local_area_name) = request.local_area_name {
        seller_active.local_area_name = Set(local_area_name);
    }
    if let Some(street) = request.street {
        seller_active.street = Set(street);
    }
    if let Some(building) = request.building {
        seller_active.building = Set(building);
    }
    if let Some(profile_pic) = request.profile_pic {
        seller_active.profile_pic = Set(profile_pic);
    }
    let updated_seller = seller_active.update(&txn).await.map_err(internal_error)?;

    txn.commit().await.map_err(internal_error)?;
    info!("Seller {} profile updated", seller_id);

    let response = seller_profile_response(&state.db, updated_seller, updated_profile).await?;
    Ok(Json(ApiResponse::new(
        response,
        "Seller profile updated successfully",
    )))
}

/// Delete a seller profile (owner only)
///
/// Hard delete; the seller's items and received transactions cascade away
/// with the row.
#[utoipa::path(
    delete,
    path = "/sellers/{seller_id}/profile",
    tag = "sellers",
    params(
        ("seller_id" = i32, Path, description = "Seller ID"),
    ),
    security(("token" = [])),
    responses(
        (status = 200, description = "Seller deleted successfully", body = ApiResponse<String>),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Not the account owner", body = ErrorResponse),
        (status = 404, description = "Seller not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state, caller))]
pub async fn delete_seller_profile(
    Path(seller_id): Path<i32>,
    State(state): State<AppState>,
    caller: AuthUser,
) -> Result<Json<ApiResponse<String>>, ApiError> {
    let (seller_model, _) = owned_seller(&state, &caller, seller_id).await?;

    seller::Entity::delete_by_id(seller_model.id)
        .exec(&state.db)
        .await
        .map_err(internal_error)?;

    info!("Seller {} deleted", seller_id);
    Ok(Json(ApiResponse::new(
        format!("Seller {} deleted", seller_id),
        "Seller deleted successfully",
    )))
}
