use axum::{
    extract::{Path, State},
    response::Json,
};
use model::entities::{seller, transaction};
use sea_orm::{ActiveEnum, ColumnTrait, EntityTrait, QueryFilter};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use utoipa::ToSchema;

use crate::auth::AuthUser;
use crate::permissions::is_order_recipient;
use crate::schemas::{
    forbidden, internal_error, not_found, ApiError, ApiResponse, AppState, ErrorResponse,
};

/// Payment transaction record.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TransactionResponse {
    pub id: i32,
    pub transaction_mode: String,
    pub amount: f64,
    pub transaction_code: String,
    pub recipient: i32,
    pub payer: Option<i32>,
}

impl From<transaction::Model> for TransactionResponse {
    fn from(model: transaction::Model) -> Self {
        Self {
            id: model.id,
            transaction_mode: model.transaction_mode.to_value(),
            amount: model.amount,
            transaction_code: model.transaction_code,
            recipient: model.recipient_id,
            payer: model.payer_id,
        }
    }
}

/// List payments received by a seller (recipient only)
#[utoipa::path(
    get,
    path = "/sellers/{seller_id}/transactions",
    tag = "transactions",
    params(
        ("seller_id" = i32, Path, description = "Seller ID"),
    ),
    security(("token" = [])),
    responses(
        (status = 200, description = "Transactions retrieved successfully", body = ApiResponse<Vec<TransactionResponse>>),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Not the recipient seller", body = ErrorResponse),
        (status = 404, description = "Seller not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state, caller))]
pub async fn list_seller_transactions(
    Path(seller_id): Path<i32>,
    State(state): State<AppState>,
    caller: AuthUser,
) -> Result<Json<ApiResponse<Vec<TransactionResponse>>>, ApiError> {
    let seller_model = seller::Entity::find_by_id(seller_id)
        .one(&state.db)
        .await
        .map_err(internal_error)?
        .ok_or_else(|| not_found("Seller not found"))?;

    if !is_order_recipient(&caller.user, &seller_model) {
        return Err(forbidden(
            "You do not have permission to view these transactions",
        ));
    }

    let transactions = transaction::Entity::find()
        .filter(transaction::Column::RecipientId.eq(seller_id))
        .all(&state.db)
        .await
        .map_err(internal_error)?;

    debug!(
        "Found {} transactions for seller {}",
        transactions.len(),
        seller_id
    );

    let responses = transactions
        .into_iter()
        .map(TransactionResponse::from)
        .collect();

    Ok(Json(ApiResponse::new(
        responses,
        "Transactions retrieved successfully",
    )))
}
