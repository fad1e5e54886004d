use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use model::entities::{county, item, item::ItemCategory, seller, subcounty};
use sea_orm::{
    ActiveEnum, ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, JoinType,
    QueryFilter, QuerySelect, RelationTrait, Set,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use utoipa::{IntoParams, ToSchema};

use crate::auth::AuthUser;
use crate::handlers::sellers::{seller_response, SellerResponse};
use crate::permissions::{find_seller_for, is_item_seller};
use crate::schemas::{
    bad_request, forbidden, internal_error, not_found, ApiError, ApiResponse, AppState,
    ErrorResponse, ValidJson,
};

const DEFAULT_MAIN_IMAGE: &str = "images/product/main.jpg";

/// Query parameters for catalog listings.
#[derive(Debug, Deserialize, IntoParams)]
pub struct ItemListQuery {
    /// Free-text search term.
    pub search: Option<String>,
    /// Exact category filter.
    pub category: Option<String>,
}

/// Request body for creating an item. The owning seller is always derived
/// from the authenticated caller; an `item_seller` field in the payload is
/// ignored.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CreateItemRequest {
    pub item_name: String,
    pub item_description: Option<String>,
    pub item_price: f64,
    pub item_measurement_unit: String,
    pub item_main_image: Option<String>,
    pub item_extra_image1: Option<String>,
    pub item_extra_image2: Option<String>,
    pub item_extra_image3: Option<String>,
    pub item_extra_image4: Option<String>,
    pub category: Option<String>,
    pub item_seller: Option<i32>,
}

/// Request body for updating an item.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct UpdateItemRequest {
    pub item_name: Option<String>,
    pub item_description: Option<String>,
    pub item_price: Option<f64>,
    pub item_measurement_unit: Option<String>,
    pub item_main_image: Option<String>,
    pub item_extra_image1: Option<String>,
    pub item_extra_image2: Option<String>,
    pub item_extra_image3: Option<String>,
    pub item_extra_image4: Option<String>,
    pub category: Option<String>,
}

/// Flat item representation used in seller-scoped listings.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ItemResponse {
    pub id: i32,
    pub item_name: String,
    pub item_description: Option<String>,
    pub item_seller: i32,
    pub item_price: f64,
    pub item_measurement_unit: String,
    pub item_main_image: String,
    pub item_extra_image1: Option<String>,
    pub item_extra_image2: Option<String>,
    pub item_extra_image3: Option<String>,
    pub item_extra_image4: Option<String>,
    pub category: String,
}

impl From<item::Model> for ItemResponse {
    fn from(model: item::Model) -> Self {
        Self {
            id: model.id,
            item_name: model.item_name,
            item_description: model.item_description,
            item_seller: model.item_seller_id,
            item_price: model.item_price,
            item_measurement_unit: model.item_measurement_unit,
            item_main_image: model.item_main_image,
            item_extra_image1: model.item_extra_image1,
            item_extra_image2: model.item_extra_image2,
            item_extra_image3: model.item_extra_image3,
            item_extra_image4: model.item_extra_image4,
            category: model.category.to_value(),
        }
    }
}

/// Item representation with the owning seller embedded, used on the
/// public catalog pages.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ItemViewResponse {
    pub id: i32,
    pub item_name: String,
    pub item_description: Option<String>,
    pub item_seller: SellerResponse,
    pub item_price: f64,
    pub item_measurement_unit: String,
    pub item_main_image: String,
    pub item_extra_image1: Option<String>,
    pub item_extra_image2: Option<String>,
    pub item_extra_image3: Option<String>,
    pub item_extra_image4: Option<String>,
    pub category: String,
}

async fn item_view_response<C: ConnectionTrait>(
    db: &C,
    model: item::Model,
) -> Result<ItemViewResponse, ApiError> {
    let seller_model = seller::Entity::find_by_id(model.item_seller_id)
        .one(db)
        .await
        .map_err(internal_error)?
        .ok_or_else(|| not_found("Seller not found"))?;
    let item_seller = seller_response(db, seller_model).await?;

    Ok(ItemViewResponse {
        id: model.id,
        item_name: model.item_name,
        item_description: model.item_description,
        item_seller,
        item_price: model.item_price,
        item_measurement_unit: model.item_measurement_unit,
        item_main_image: model.item_main_image,
        item_extra_image1: model.item_extra_image1,
        item_extra_image2: model.item_extra_image2,
        item_extra_image3: model.item_extra_image3,
        item_extra_image4: model.item_extra_image4,
        category: model.category.to_value(),
    })
}

fn parse_category(value: &str) -> Result<ItemCategory, ApiError> {
    ItemCategory::try_from_value(&value.to_string())
        .map_err(|_| bad_request(format!("Unknown category '{}'", value)))
}

/// Free-text match across the item fields and the owning seller's
/// business name and location fields.
fn catalog_search_condition(term: &str) -> Condition {
    Condition::any()
        .add(item::Column::ItemName.contains(term))
        .add(item::Column::ItemDescription.contains(term))
        .add(item::Column::Category.contains(term))
        .add(seller::Column::BusinessName.contains(term))
        .add(seller::Column::Town.contains(term))
        .add(seller::Column::LocalAreaName.contains(term))
        .add(seller::Column::Street.contains(term))
        .add(seller::Column::Building.contains(term))
        .add(subcounty::Column::SubcountyName.contains(term))
        .add(county::Column::CountyName.contains(term))
}

/// List all items in the catalog
#[utoipa::path(
    get,
    path = "/items",
    tag = "items",
    params(ItemListQuery),
    responses(
        (status = 200, description = "Items retrieved successfully", body = ApiResponse<Vec<ItemViewResponse>>),
        (status = 400, description = "Invalid filter", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn list_items(
    Query(params): Query<ItemListQuery>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<ItemViewResponse>>>, ApiError> {
    let mut query = item::Entity::find()
        .join(JoinType::InnerJoin, item::Relation::Seller.def())
        .join(JoinType::InnerJoin, seller::Relation::SubCounty.def())
        .join(JoinType::InnerJoin, subcounty::Relation::County.def());

    if let Some(category) = &params.category {
        let category = parse_category(category)?;
        query = query.filter(item::Column::Category.eq(category));
    }
    if let Some(term) = &params.search {
        query = query.filter(catalog_search_condition(term));
    }

    let items = query.all(&state.db).await.map_err(internal_error)?;

    let mut responses = Vec::with_capacity(items.len());
    for model in items {
        responses.push(item_view_response(&state.db, model).await?);
    }

    Ok(Json(ApiResponse::new(
        responses,
        "Items retrieved successfully",
    )))
}

/// Get a specific item with its seller
#[utoipa::path(
    get,
    path = "/items/{item_id}",
    tag = "items",
    params(
        ("item_id" = i32, Path, description = "Item ID"),
    ),
    responses(
        (status = 200, description = "Item retrieved successfully", body = ApiResponse<ItemViewResponse>),
        (status = 404, description = "Item not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_item(
    Path(item_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<ItemViewResponse>>, ApiError> {
    let item_model = item::Entity::find_by_id(item_id)
        .one(&state.db)
        .await
        .map_err(internal_error)?
        .ok_or_else(|| not_found("Item not found"))?;

    let response = item_view_response(&state.db, item_model).await?;
    Ok(Json(ApiResponse::new(
        response,
        "Item retrieved successfully",
    )))
}

/// List items belonging to a specific seller
#[utoipa::path(
    get,
    path = "/sellers/{seller_id}/items",
    tag = "items",
    params(
        ("seller_id" = i32, Path, description = "Seller ID"),
        ItemListQuery,
    ),
    responses(
        (status = 200, description = "Items retrieved successfully", body = ApiResponse<Vec<ItemResponse>>),
        (status = 400, description = "Invalid filter", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn list_seller_items(
    Path(seller_id): Path<i32>,
    Query(params): Query<ItemListQuery>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<ItemResponse>>>, ApiError> {
    let mut query = item::Entity::find().filter(item::Column::ItemSellerId.eq(seller_id));

    if let Some(category) = &params.category {
        let category = parse_category(category)?;
        query = query.filter(item::Column::Category.eq(category));
    }
    if let Some(term) = &params.search {
        query = query.filter(
            Condition::any()
                .add(item::Column::ItemName.contains(term))
                .add(item::Column::ItemDescription.contains(term))
                .add(item::Column::Category.contains(term)),
        );
    }

    let items = query.all(&state.db).await.map_err(internal_error)?;
    let responses = items.into_iter().map(ItemResponse::from).collect();

    Ok(Json(ApiResponse::new(
        responses,
        "Items retrieved successfully",
    )))
}

/// Create a new item in the caller's catalog
///
/// The caller must hold a seller profile. Ownership is server-derived: a
/// payload or path pointing at another seller is ignored.
#[utoipa::path(
    post,
    path = "/sellers/{seller_id}/items/add_item",
    tag = "items",
    params(
        ("seller_id" = i32, Path, description = "Seller ID (advisory; ownership is derived from the caller)"),
    ),
    security(("token" = [])),
    request_body = CreateItemRequest,
    responses(
        (status = 201, description = "Item created successfully", body = ApiResponse<ItemResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Caller has no seller profile", body = ErrorResponse)
    )
)]
#[instrument(skip(state, caller, request))]
pub async fn create_item(
    Path(_seller_id): Path<i32>,
    State(state): State<AppState>,
    caller: AuthUser,
    ValidJson(request): ValidJson<CreateItemRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ItemResponse>>), ApiError> {
    let seller_model = find_seller_for(&state.db, caller.user.id)
        .await
        .map_err(internal_error)?
        .ok_or_else(|| forbidden("Only registered sellers can add items"))?;

    if let Some(claimed) = request.item_seller {
        if claimed != seller_model.id {
            warn!(
                "Ignoring forged item_seller {} in payload; owner is seller {}",
                claimed, seller_model.id
            );
        }
    }

    if request.item_price < 0.0 {
        return Err(bad_request("item_price must be non-negative"));
    }

    let category = match &request.category {
        Some(value) => parse_category(value)?,
        None => ItemCategory::default(),
    };

    let item_model = item::ActiveModel {
        item_name: Set(request.item_name),
        item_description: Set(request.item_description),
        item_seller_id: Set(seller_model.id),
        item_price: Set(request.item_price),
        item_measurement_unit: Set(request.item_measurement_unit),
        item_main_image: Set(request
            .item_main_image
            .unwrap_or_else(|| DEFAULT_MAIN_IMAGE.to_string())),
        item_extra_image1: Set(request.item_extra_image1),
        item_extra_image2: Set(request.item_extra_image2),
        item_extra_image3: Set(request.item_extra_image3),
        item_extra_image4: Set(request.item_extra_image4),
        category: Set(category),
        ..Default::default()
    }
    .insert(&state.db)
    .await
    .map_err(internal_error)?;

    info!(
        "Item '{}' created with ID {} for seller {}",
        item_model.item_name, item_model.id, seller_model.id
    );

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(
            ItemResponse::from(item_model),
            "Item created successfully",
        )),
    ))
}

async fn find_seller_item(
    state: &AppState,
    seller_id: i32,
    item_id: i32,
) -> Result<item::Model, ApiError> {
    item::Entity::find_by_id(item_id)
        .filter(item::Column::ItemSellerId.eq(seller_id))
        .one(&state.db)
        .await
        .map_err(internal_error)?
        .ok_or_else(|| not_found("Item not found"))
}

/// Authorize the caller as the item's owner for write access.
async fn authorize_item_write(
    state: &AppState,
    caller: &AuthUser,
    item_model: &item::Model,
) -> Result<(), ApiError> {
    let owner = seller::Entity::find_by_id(item_model.item_seller_id)
        .one(&state.db)
        .await
        .map_err(internal_error)?
        .ok_or_else(|| not_found("Seller not found"))?;

    if !is_item_seller(&caller.user, &owner) {
        return Err(forbidden("You do not have permission to modify this item"));
    }
    Ok(())
}

/// Get a specific item in a specific seller page
#[utoipa::path(
    get,
    path = "/sellers/{seller_id}/items/{item_id}",
    tag = "items",
    params(
        ("seller_id" = i32, Path, description = "Seller ID"),
        ("item_id" = i32, Path, description = "Item ID"),
    ),
    responses(
        (status = 200, description = "Item retrieved successfully", body = ApiResponse<ItemResponse>),
        (status = 404, description = "Item not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_seller_item(
    Path((seller_id, item_id)): Path<(i32, i32)>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<ItemResponse>>, ApiError> {
    let item_model = find_seller_item(&state, seller_id, item_id).await?;
    Ok(Json(ApiResponse::new(
        ItemResponse::from(item_model),
        "Item retrieved successfully",
    )))
}

/// Update an item (owning seller only)
#[utoipa::path(
    put,
    path = "/sellers/{seller_id}/items/{item_id}",
    tag = "items",
    params(
        ("seller_id" = i32, Path, description = "Seller ID"),
        ("item_id" = i32, Path, description = "Item ID"),
    ),
    security(("token" = [])),
    request_body = UpdateItemRequest,
    responses(
        (status = 200, description = "Item updated successfully", body = ApiResponse<ItemResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Not the item's seller", body = ErrorResponse),
        (status = 404, description = "Item not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state, caller, request))]
pub async fn update_item(
    Path((seller_id, item_id)): Path<(i32, i32)>,
    State(state): State<AppState>,
    caller: AuthUser,
    ValidJson(request): ValidJson<UpdateItemRequest>,
) -> Result<Json<ApiResponse<ItemResponse>>, ApiError> {
    let item_model = find_seller_item(&state, seller_id, item_id).await?;
    authorize_item_write(&state, &caller, &item_model).await?;

    if let Some(price) = request.item_price {
        if price < 0.0 {
            return Err(bad_request("item_price must be non-negative"));
        }
    }

    let mut item_active: item::ActiveModel = item_model.into();
    if let Some(item_name) = request.item_name {
        item_active.item_name = Set(item_name);
    }
    if let Some(item_description) = request.item_description {
        item_active.item_description = Set(Some(item_description));
    }
    if let Some(item_price) = request.item_price {
        item_active.item_price = Set(item_price);
    }
    if let Some(item_measurement_unit) = request.item_measurement_unit {
        item_active.item_measurement_unit = Set(item_measurement_unit);
    }
    if let Some(item_main_image) = request.item_main_image {
        item_active.item_main_image = Set(item_main_image);
    }
    if let Some(image) = request.item_extra_image1 {
        item_active.item_extra_image1 = Set(Some(image));
    }
    if let Some(image) = request.item_extra_image2 {
        item_active.item_extra_image2 = Set(Some(image));
    }
    if let Some(image) = request.item_extra_image3 {
        item_active.item_extra_image3 = Set(Some(image));
    }
    if let Some(image) = request.item_extra_image4 {
        item_active.item_extra_image4 = Set(Some(image));
    }
    if let Some(category) = request.category {
        item_active.category = Set(parse_category(&category)?);
    }

    let updated = item_active.update(&state.db).await.map_err(internal_error)?;
    info!("Item {} updated", item_id);

    Ok(Json(ApiResponse::new(
        ItemResponse::from(updated),
        "Item updated successfully",
    )))
}

/// Delete an item (owning seller only)
#[utoipa::path(
    delete,
    path = "/sellers/{seller_id}/items/{item_id}",
    tag = "items",
    params(
        ("seller_id" = i32, Path, description = "Seller ID"),
        ("item_id" = i32, Path, description = "Item ID"),
    ),
    security(("token" = [])),
    responses(
        (status = 200, description = "Item deleted successfully", body = ApiResponse<String>),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Not the item's seller", body = ErrorResponse),
        (status = 404, description = "Item not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state, caller))]
pub async fn delete_item(
    Path((seller_id, item_id)): Path<(i32, i32)>,
    State(state): State<AppState>,
    caller: AuthUser,
) -> Result<Json<ApiResponse<String>>, ApiError> {
    let item_model = find_seller_item(&state, seller_id, item_id).await?;
    authorize_item_write(&state, &caller, &item_model).await?;

    item::Entity::delete_by_id(item_model.id)
        .exec(&state.db)
        .await
        .map_err(internal_error)?;

    info!("Item {} deleted", item_id);
    Ok(Json(ApiResponse::new(
        format!("Item {} deleted", item_id),
        "Item deleted successfully",
    )))
}
