use crate::handlers::{
    auth::login,
    buyers::{
        create_buyer, delete_buyer_profile, get_buyer, get_buyer_profile, update_buyer_profile,
    },
    health::health_check,
    items::{
        create_item, delete_item, get_item, get_seller_item, list_items, list_seller_items,
        update_item,
    },
    orders::{
        delete_order, get_order, get_order_for_edit, list_buyer_orders, list_seller_orders,
        submit_order, update_order,
    },
    sellers::{
        create_seller, delete_seller_profile, get_seller, get_seller_profile, list_sellers,
        update_seller_profile,
    },
    transactions::list_seller_transactions,
};
use crate::schemas::{ApiDoc, AppState};
use axum::{
    routing::{delete, get, post, put},
    Router,
};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Create application router with all routes and middleware
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health_check))
        // Authentication
        .route("/login", post(login))
        // Seller registration and profiles
        .route("/create_seller_account", post(create_seller))
        .route("/sellers", get(list_sellers))
        .route("/sellers/:seller_id", get(get_seller))
        .route("/sellers/:seller_id/profile", get(get_seller_profile))
        .route("/sellers/:seller_id/profile", put(update_seller_profile))
        .route("/sellers/:seller_id/profile", delete(delete_seller_profile))
        // Buyer registration and profiles
        .route("/create_buyer", post(create_buyer))
        .route("/buyers/:buyer_id", get(get_buyer))
        .route("/buyers/:buyer_id/profile", get(get_buyer_profile))
        .route("/buyers/:buyer_id/profile", put(update_buyer_profile))
        .route("/buyers/:buyer_id/profile", delete(delete_buyer_profile))
        // Item catalog
        .route("/items", get(list_items))
        .route("/items/:item_id", get(get_item))
        .route("/sellers/:seller_id/items", get(list_seller_items))
        .route("/sellers/:seller_id/items/add_item", post(create_item))
        .route("/sellers/:seller_id/items/:item_id", get(get_seller_item))
        .route("/sellers/:seller_id/items/:item_id", put(update_item))
        .route("/sellers/:seller_id/items/:item_id", delete(delete_item))
        // Orders
        .route("/submit_order", post(submit_order))
        .route("/sellers/:seller_id/orders", get(list_seller_orders))
        .route("/sellers/:seller_id/orders/:order_id", get(get_order))
        .route(
            "/sellers/:seller_id/orders/:order_id/edit",
            get(get_order_for_edit),
        )
        .route(
            "/sellers/:seller_id/orders/:order_id/edit",
            put(update_order),
        )
        .route(
            "/sellers/:seller_id/orders/:order_id/edit",
            delete(delete_order),
        )
        .route("/buyers/:buyer_id/orders", get(list_buyer_orders))
        // Payment transactions
        .route(
            "/sellers/:seller_id/transactions",
            get(list_seller_transactions),
        )
        // Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Add middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(TimeoutLayer::new(Duration::from_secs(30)))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
