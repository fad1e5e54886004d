use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use chrono::{DateTime, Utc};
use model::entities::{
    buyer, item, order, order_item, seller, transaction, transaction::TransactionMode,
};
use sea_orm::{
    ActiveEnum, ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, JoinType,
    QueryFilter, QuerySelect, RelationTrait, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};
use utoipa::ToSchema;

use crate::auth::AuthUser;
use crate::handlers::transactions::TransactionResponse;
use crate::permissions::{find_buyer_for, is_account_owner, is_order_payer, is_order_recipient};
use crate::schemas::{
    bad_request, forbidden, internal_error, not_found, ApiError, ApiResponse, AppState,
    ErrorResponse, ValidJson,
};

/// Payment details accompanying an order submission. The payer is always
/// derived from the authenticated caller; a `payer` field in the payload
/// is ignored.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct TransactionPayload {
    pub transaction_mode: String,
    pub amount: f64,
    pub transaction_code: String,
    pub recipient: i32,
    pub payer: Option<i32>,
}

/// Request body for submitting an order.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CreateOrderRequest {
    pub ordered_items: Vec<i32>,
    pub total_amount_payable: f64,
    pub payment_transaction: TransactionPayload,
}

/// Request body for editing an order (recipient seller only).
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct UpdateOrderRequest {
    pub total_amount_payable: Option<f64>,
    pub is_delivered: Option<bool>,
    pub date_delivered: Option<DateTime<Utc>>,
}

/// Order record with its item ids and payment transaction embedded.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderResponse {
    pub id: i32,
    pub date_placed: DateTime<Utc>,
    pub ordered_items: Vec<i32>,
    pub total_amount_payable: f64,
    pub is_delivered: bool,
    pub date_delivered: Option<DateTime<Utc>>,
    pub payment_transaction: Option<TransactionResponse>,
}

async fn order_response<C: ConnectionTrait>(
    db: &C,
    model: order::Model,
) -> Result<OrderResponse, ApiError> {
    let ordered_items = order_item::Entity::find()
        .filter(order_item::Column::OrderId.eq(model.id))
        .all(db)
        .await
        .map_err(internal_error)?
        .into_iter()
        .map(|link| link.item_id)
        .collect();

    let payment_transaction = match model.payment_transaction_id {
        Some(transaction_id) => transaction::Entity::find_by_id(transaction_id)
            .one(db)
            .await
            .map_err(internal_error)?
            .map(TransactionResponse::from),
        None => None,
    };

    Ok(OrderResponse {
        id: model.id,
        date_placed: model.date_placed,
        ordered_items,
        total_amount_payable: model.total_amount_payable,
        is_delivered: model.is_delivered,
        date_delivered: model.date_delivered,
        payment_transaction,
    })
}

/// The recipient seller of the order's payment transaction. Orders whose
/// transaction was deleted have no recipient and deny all access.
async fn load_recipient(
    state: &AppState,
    order_model: &order::Model,
) -> Result<Option<seller::Model>, ApiError> {
    let Some(transaction_id) = order_model.payment_transaction_id else {
        return Ok(None);
    };
    let Some(transaction_model) = transaction::Entity::find_by_id(transaction_id)
        .one(&state.db)
        .await
        .map_err(internal_error)?
    else {
        return Ok(None);
    };
    seller::Entity::find_by_id(transaction_model.recipient_id)
        .one(&state.db)
        .await
        .map_err(internal_error)
}

/// The payer buyer of the order's payment transaction, if still present.
async fn load_payer(
    state: &AppState,
    order_model: &order::Model,
) -> Result<Option<buyer::Model>, ApiError> {
    let Some(transaction_id) = order_model.payment_transaction_id else {
        return Ok(None);
    };
    let Some(transaction_model) = transaction::Entity::find_by_id(transaction_id)
        .one(&state.db)
        .await
        .map_err(internal_error)?
    else {
        return Ok(None);
    };
    let Some(payer_id) = transaction_model.payer_id else {
        return Ok(None);
    };
    buyer::Entity::find_by_id(payer_id)
        .one(&state.db)
        .await
        .map_err(internal_error)
}

async fn find_order(state: &AppState, order_id: i32) -> Result<order::Model, ApiError> {
    order::Entity::find_by_id(order_id)
        .one(&state.db)
        .await
        .map_err(internal_error)?
        .ok_or_else(|| not_found("Order not found"))
}

async fn authorize_recipient(
    state: &AppState,
    caller: &AuthUser,
    order_model: &order::Model,
) -> Result<(), ApiError> {
    let recipient = load_recipient(state, order_model).await?;
    match recipient {
        Some(ref seller_model) if is_order_recipient(&caller.user, seller_model) => Ok(()),
        _ => Err(forbidden("You do not have permission to access this order")),
    }
}

/// Submit an order with its payment transaction
///
/// The caller must hold a buyer profile; the transaction's payer is
/// always the caller's buyer account regardless of the payload.
#[utoipa::path(
    post,
    path = "/submit_order",
    tag = "orders",
    security(("token" = [])),
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order submitted successfully", body = ApiResponse<OrderResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Caller has no buyer profile", body = ErrorResponse)
    )
)]
#[instrument(skip(state, caller, request))]
pub async fn submit_order(
    State(state): State<AppState>,
    caller: AuthUser,
    ValidJson(request): ValidJson<CreateOrderRequest>,
) -> Result<(StatusCode, Json<ApiResponse<OrderResponse>>), ApiError> {
    let buyer_model = find_buyer_for(&state.db, caller.user.id)
        .await
        .map_err(internal_error)?
        .ok_or_else(|| forbidden("Only registered buyers can submit orders"))?;

    let payment = &request.payment_transaction;
    if let Some(claimed) = payment.payer {
        if claimed != buyer_model.id {
            warn!(
                "Ignoring forged payer {} in payload; payer is buyer {}",
                claimed, buyer_model.id
            );
        }
    }

    let transaction_mode = TransactionMode::try_from_value(&payment.transaction_mode)
        .map_err(|_| bad_request(format!("Unknown transaction mode '{}'", payment.transaction_mode)))?;

    if payment.amount < 0.0 || request.total_amount_payable < 0.0 {
        return Err(bad_request("Amounts must be non-negative"));
    }
    if request.ordered_items.is_empty() {
        return Err(bad_request("An order must contain at least one item"));
    }

    let recipient = seller::Entity::find_by_id(payment.recipient)
        .one(&state.db)
        .await
        .map_err(internal_error)?
        .ok_or_else(|| bad_request("Unknown recipient seller"))?;

    let items = item::Entity::find()
        .filter(item::Column::Id.is_in(request.ordered_items.clone()))
        .all(&state.db)
        .await
        .map_err(internal_error)?;
    if items.len() != request.ordered_items.len() {
        return Err(bad_request("One or more ordered items do not exist"));
    }

    let txn = state.db.begin().await.map_err(internal_error)?;

    let transaction_model = transaction::ActiveModel {
        transaction_mode: Set(transaction_mode),
        amount: Set(payment.amount),
        transaction_code: Set(payment.transaction_code.clone()),
        recipient_id: Set(recipient.id),
        payer_id: Set(Some(buyer_model.id)),
        ..Default::default()
    }
    .insert(&txn)
    .await
    .map_err(internal_error)?;

    let order_model = order::ActiveModel {
        date_placed: Set(Utc::now()),
        total_amount_payable: Set(request.total_amount_payable),
        is_delivered: Set(false),
        date_delivered: Set(None),
        payment_transaction_id: Set(Some(transaction_model.id)),
        ..Default::default()
    }
    .insert(&txn)
    .await
    .map_err(internal_error)?;

    let links: Vec<order_item::ActiveModel> = request
        .ordered_items
        .iter()
        .map(|&item_id| order_item::ActiveModel {
            order_id: Set(order_model.id),
            item_id: Set(item_id),
        })
        .collect();
    order_item::Entity::insert_many(links)
        .exec(&txn)
        .await
        .map_err(internal_error)?;

    let response = order_response(&txn, order_model).await?;
    txn.commit().await.map_err(internal_error)?;

    info!(
        "Order {} submitted by buyer {} to seller {}",
        response.id, buyer_model.id, recipient.id
    );

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(response, "Order submitted successfully")),
    ))
}

/// List orders received by a seller (recipient only)
#[utoipa::path(
    get,
    path = "/sellers/{seller_id}/orders",
    tag = "orders",
    params(
        ("seller_id" = i32, Path, description = "Seller ID"),
    ),
    security(("token" = [])),
    responses(
        (status = 200, description = "Orders retrieved successfully", body = ApiResponse<Vec<OrderResponse>>),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Not the recipient seller", body = ErrorResponse),
        (status = 404, description = "Seller not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state, caller))]
pub async fn list_seller_orders(
    Path(seller_id): Path<i32>,
    State(state): State<AppState>,
    caller: AuthUser,
) -> Result<Json<ApiResponse<Vec<OrderResponse>>>, ApiError> {
    let seller_model = seller::Entity::find_by_id(seller_id)
        .one(&state.db)
        .await
        .map_err(internal_error)?
        .ok_or_else(|| not_found("Seller not found"))?;

    if !is_order_recipient(&caller.user, &seller_model) {
        return Err(forbidden("You do not have permission to view these orders"));
    }

    let orders = order::Entity::find()
        .join(JoinType::InnerJoin, order::Relation::Transaction.def())
        .filter(transaction::Column::RecipientId.eq(seller_id))
        .all(&state.db)
        .await
        .map_err(internal_error)?;

    debug!("Found {} orders for seller {}", orders.len(), seller_id);

    let mut responses = Vec::with_capacity(orders.len());
    for model in orders {
        responses.push(order_response(&state.db, model).await?);
    }

    Ok(Json(ApiResponse::new(
        responses,
        "Orders retrieved successfully",
    )))
}

/// Get an order (recipient seller or paying buyer)
#[utoipa::path(
    get,
    path = "/sellers/{seller_id}/orders/{order_id}",
    tag = "orders",
    params(
        ("seller_id" = i32, Path, description = "Seller ID"),
        ("order_id" = i32, Path, description = "Order ID"),
    ),
    security(("token" = [])),
    responses(
        (status = 200, description = "Order retrieved successfully", body = ApiResponse<OrderResponse>),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Neither recipient nor payer", body = ErrorResponse),
        (status = 404, description = "Order not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state, caller))]
pub async fn get_order(
    Path((_seller_id, order_id)): Path<(i32, i32)>,
    State(state): State<AppState>,
    caller: AuthUser,
) -> Result<Json<ApiResponse<OrderResponse>>, ApiError> {
    let order_model = find_order(&state, order_id).await?;

    let recipient = load_recipient(&state, &order_model).await?;
    let payer = load_payer(&state, &order_model).await?;
    let allowed = recipient
        .as_ref()
        .is_some_and(|seller_model| is_order_recipient(&caller.user, seller_model))
        || is_order_payer(&caller.user, payer.as_ref());
    if !allowed {
        return Err(forbidden("You do not have permission to access this order"));
    }

    let response = order_response(&state.db, order_model).await?;
    Ok(Json(ApiResponse::new(
        response,
        "Order retrieved successfully",
    )))
}

/// Get an order for editing (recipient seller only)
#[utoipa::path(
    get,
    path = "/sellers/{seller_id}/orders/{order_id}/edit",
    tag = "orders",
    params(
        ("seller_id" = i32, Path, description = "Seller ID"),
        ("order_id" = i32, Path, description = "Order ID"),
    ),
    security(("token" = [])),
    responses(
        (status = 200, description = "Order retrieved successfully", body = ApiResponse<OrderResponse>),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Not the recipient seller", body = ErrorResponse),
        (status = 404, description = "Order not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state, caller))]
pub async fn get_order_for_edit(
    Path((_seller_id, order_id)): Path<(i32, i32)>,
    State(state): State<AppState>,
    caller: AuthUser,
) -> Result<Json<ApiResponse<OrderResponse>>, ApiError> {
    let order_model = find_order(&state, order_id).await?;
    authorize_recipient(&state, &caller, &order_model).await?;

    let response = order_response(&state.db, order_model).await?;
    Ok(Json(ApiResponse::new(
        response,
        "Order retrieved successfully",
    )))
}

/// Update an order's delivery state (recipient seller only)
#[utoipa::path(
    put,
    path = "/sellers/{seller_id}/orders/{order_id}/edit",
    tag = "orders",
    params(
        ("seller_id" = i32, Path, description = "Seller ID"),
        ("order_id" = i32, Path, description = "Order ID"),
    ),
    security(("token" = [])),
    request_body = UpdateOrderRequest,
    responses(
        (status = 200, description = "Order updated successfully", body = ApiResponse<OrderResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Not the recipient seller", body = ErrorResponse),
        (status = 404, description = "Order not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state, caller, request))]
pub async fn update_order(
    Path((_seller_id, order_id)): Path<(i32, i32)>,
    State(state): State<AppState>,
    caller: AuthUser,
    ValidJson(request): ValidJson<UpdateOrderRequest>,
) -> Result<Json<ApiResponse<OrderResponse>>, ApiError> {
    let order_model = find_order(&state, order_id).await?;
    authorize_recipient(&state, &caller, &order_model).await?;

    if let Some(total) = request.total_amount_payable {
        if total < 0.0 {
            return Err(bad_request("total_amount_payable must be non-negative"));
        }
    }

    let mut order_active: order::ActiveModel = order_model.into();
    if let Some(total) = request.total_amount_payable {
        order_active.total_amount_payable = Set(total);
    }
    if let Some(is_delivered) = request.is_delivered {
        order_active.is_delivered = Set(is_delivered);
    }
    if let Some(date_delivered) = request.date_delivered {
        order_active.date_delivered = Set(Some(date_delivered));
    }

    let updated = order_active
        .update(&state.db)
        .await
        .map_err(internal_error)?;
    info!("Order {} updated", order_id);

    let response = order_response(&state.db, updated).await?;
    Ok(Json(ApiResponse::new(
        response,
        "Order updated successfully",
    )))
}

/// Delete an order (recipient seller only)
#[utoipa::path(
    delete,
    path = "/sellers/{seller_id}/orders/{order_id}/edit",
    tag = "orders",
    params(
        ("seller_id" = i32, Path, description = "Seller ID"),
        ("order_id" = i32, Path, description = "Order ID"),
    ),
    security(("token" = [])),
    responses(
        (status = 200, description = "Order deleted successfully", body = ApiResponse<String>),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Not the recipient seller", body = ErrorResponse),
        (status = 404, description = "Order not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state, caller))]
pub async fn delete_order(
    Path((_seller_id, order_id)): Path<(i32, i32)>,
    State(state): State<AppState>,
    caller: AuthUser,
) -> Result<Json<ApiResponse<String>>, ApiError> {
    let order_model = find_order(&state, order_id).await?;
    authorize_recipient(&state, &caller, &order_model).await?;

    order::Entity::delete_by_id(order_model.id)
        .exec(&state.db)
        .await
        .map_err(internal_error)?;

    info!("Order {} deleted", order_id);
    Ok(Json(ApiResponse::new(
        format!("Order {} deleted", order_id),
        "Order deleted successfully",
    )))
}

/// List orders placed by a buyer (the buyer only)
#[utoipa::path(
    get,
    path = "/buyers/{buyer_id}/orders",
    tag = "orders",
    params(
        ("buyer_id" = i32, Path, description = "Buyer ID"),
    ),
    security(("token" = [])),
    responses(
        (status = 200, description = "Orders retrieved successfully", body = ApiResponse<Vec<OrderResponse>>),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Not this buyer", body = ErrorResponse),
        (status = 404, description = "Buyer not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state, caller))]
pub async fn list_buyer_orders(
    Path(buyer_id): Path<i32>,
    State(state): State<AppState>,
    caller: AuthUser,
) -> Result<Json<ApiResponse<Vec<OrderResponse>>>, ApiError> {
    let buyer_model = buyer::Entity::find_by_id(buyer_id)
        .one(&state.db)
        .await
        .map_err(internal_error)?
        .ok_or_else(|| not_found("Buyer not found"))?;

    if !is_account_owner(&caller.user, buyer_model.profile_id) {
        return Err(forbidden("You do not have permission to view these orders"));
    }

    let orders = order::Entity::find()
        .join(JoinType::InnerJoin, order::Relation::Transaction.def())
        .filter(transaction::Column::PayerId.eq(buyer_id))
        .all(&state.db)
        .await
        .map_err(internal_error)?;

    debug!("Found {} orders for buyer {}", orders.len(), buyer_id);

    let mut responses = Vec::with_capacity(orders.len());
    for model in orders {
        responses.push(order_response(&state.db, model).await?);
    }

    Ok(Json(ApiResponse::new(
        responses,
        "Orders retrieved successfully",
    )))
}
