use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    http::StatusCode,
    response::Json,
};
use sea_orm::{DatabaseConnection, DbErr};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi, ToSchema};

/// Application state shared across handlers
#[derive(Clone, Debug)]
pub struct AppState {
    /// Database connection
    pub db: DatabaseConnection,
}

/// API response wrapper
#[derive(Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    /// Response data
    pub data: T,
    /// Response message
    pub message: String,
    /// Success status
    pub success: bool,
}

impl<T> ApiResponse<T> {
    pub fn new(data: T, message: impl Into<String>) -> Self {
        Self {
            data,
            message: message.into(),
            success: true,
        }
    }
}

/// Error response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
    /// Error code
    pub code: String,
    /// Success status (always false for errors)
    pub success: bool,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: code.into(),
            success: false,
        }
    }
}

/// Uniform error shape for handlers: HTTP status plus a JSON body.
pub type ApiError = (StatusCode, Json<ErrorResponse>);

pub fn bad_request(message: impl Into<String>) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse::new(message, "VALIDATION_ERROR")),
    )
}

pub fn forbidden(message: impl Into<String>) -> ApiError {
    (
        StatusCode::FORBIDDEN,
        Json(ErrorResponse::new(message, "PERMISSION_DENIED")),
    )
}

pub fn not_found(message: impl Into<String>) -> ApiError {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse::new(message, "NOT_FOUND")),
    )
}

pub fn internal_error(db_error: DbErr) -> ApiError {
    tracing::error!("Database error: {}", db_error);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse::new("Internal server error", "DATABASE_ERROR")),
    )
}

pub fn internal_server_error() -> ApiError {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse::new("Internal server error", "INTERNAL_ERROR")),
    )
}

/// JSON extractor that reports malformed or incomplete bodies as a 400
/// validation error instead of axum's default 422.
pub struct ValidJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(ValidJson(value)),
            Err(rejection) => {
                let message = match &rejection {
                    JsonRejection::JsonDataError(err) => err.body_text(),
                    JsonRejection::JsonSyntaxError(err) => err.body_text(),
                    other => other.body_text(),
                };
                Err(bad_request(message))
            }
        }
    }
}

/// Health check response
#[derive(Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Service version
    pub version: String,
    /// Database connection status
    pub database: String,
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::health::health_check,
        crate::handlers::auth::login,
        crate::handlers::sellers::create_seller,
        crate::handlers::sellers::list_sellers,
        crate::handlers::sellers::get_seller,
        crate::handlers::sellers::get_seller_profile,
        crate::handlers::sellers::update_seller_profile,
        crate::handlers::sellers::delete_seller_profile,
        crate::handlers::buyers::create_buyer,
        crate::handlers::buyers::get_buyer,
        crate::handlers::buyers::get_buyer_profile,
        crate::handlers::buyers::update_buyer_profile,
        crate::handlers::buyers::delete_buyer_profile,
        crate::handlers::items::list_items,
        crate::handlers::items::get_item,
        crate::handlers::items::list_seller_items,
        crate::handlers::items::create_item,
        crate::handlers::items::get_seller_item,
        crate::handlers::items::update_item,
        crate::handlers::items::delete_item,
        crate::handlers::orders::submit_order,
        crate::handlers::orders::list_seller_orders,
        crate::handlers::orders::get_order,
        crate::handlers::orders::get_order_for_edit,
        crate::handlers::orders::update_order,
        crate::handlers::orders::delete_order,
        crate::handlers::orders::list_buyer_orders,
        crate::handlers::transactions::list_seller_transactions,
    ),
    components(
        schemas(
            ErrorResponse,
            HealthResponse,
            crate::handlers::auth::LoginRequest,
            crate::handlers::auth::LoginResponse,
            crate::handlers::sellers::UserPayload,
            crate::handlers::sellers::UserResponse,
            crate::handlers::sellers::CountyPayload,
            crate::handlers::sellers::CountyResponse,
            crate::handlers::sellers::SubCountyPayload,
            crate::handlers::sellers::SubCountyResponse,
            crate::handlers::sellers::CreateSellerRequest,
            crate::handlers::sellers::UpdateUserPayload,
            crate::handlers::sellers::UpdateSellerProfileRequest,
            crate::handlers::sellers::SellerResponse,
            crate::handlers::sellers::SellerProfileResponse,
            crate::handlers::buyers::CreateBuyerRequest,
            crate::handlers::buyers::UpdateBuyerProfileRequest,
            crate::handlers::buyers::BuyerResponse,
            crate::handlers::items::CreateItemRequest,
            crate::handlers::items::UpdateItemRequest,
            crate::handlers::items::ItemResponse,
            crate::handlers::items::ItemViewResponse,
            crate::handlers::orders::TransactionPayload,
            crate::handlers::orders::CreateOrderRequest,
            crate::handlers::orders::UpdateOrderRequest,
            crate::handlers::orders::OrderResponse,
            crate::handlers::transactions::TransactionResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Login and token issuance"),
        (name = "sellers", description = "Seller registration and profiles"),
        (name = "buyers", description = "Buyer registration and profiles"),
        (name = "items", description = "Item catalog endpoints"),
        (name = "orders", description = "Order submission and visibility"),
        (name = "transactions", description = "Payment transaction records"),
    ),
    modifiers(&TokenSecurity),
    info(
        title = "JengaBay API",
        description = "Marketplace backend connecting construction-material sellers and buyers",
        version = "0.1.0",
    )
)]
pub struct ApiDoc;

/// Registers the opaque-token auth scheme referenced by protected paths.
struct TokenSecurity;

impl Modify for TokenSecurity {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "token",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            );
        }
    }
}
