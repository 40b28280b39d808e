use axum::{
    http::Method,
    routing::{get, post, put},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod auth;
pub mod dashboard;
pub mod error;
pub mod middleware;
pub mod state;
pub mod webhook;

pub use state::AppState;

pub fn app(state: AppState) -> Router {
    // CORS Middleware for the dashboard frontend
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
        ]);

    let admin = Router::new()
        .route("/orders", get(dashboard::list_orders))
        .route("/orders/{id}", get(dashboard::get_order))
        .route("/orders/{id}/status", put(dashboard::set_order_status))
        .route("/orders/{id}/fulfill", post(dashboard::run_fulfillment))
        .route("/orders/{id}/vendor-status", get(dashboard::vendor_status))
        .route("/stats", get(dashboard::get_stats))
        .route("/customers/{id}/messages", get(dashboard::list_messages))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::operator_auth_middleware,
        ));

    Router::new()
        .route("/v1/webhooks/chat", post(webhook::handle_chat_webhook))
        .merge(auth::routes())
        .nest("/v1/admin", admin)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
