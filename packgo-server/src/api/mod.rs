//! API routes for packgo-server

pub mod health;
pub mod orders;
pub mod ws;

use axum::routing::{get, post};
use axum::{Router, middleware};
use http::HeaderValue;
use shared::error::AppError;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::auth::session_auth_middleware;
use crate::config::Config;
use crate::state::AppState;

pub type ApiResult<T> = Result<axum::Json<T>, AppError>;

fn cors_layer(config: &Config) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    match config
        .cors_origin
        .as_deref()
        .and_then(|o| o.parse::<HeaderValue>().ok())
    {
        Some(origin) => layer.allow_origin(origin),
        None => layer.allow_origin(Any),
    }
}

/// Create the combined router
pub fn create_router(state: AppState, config: &Config) -> Router {
    // Order API (session JWT in Authorization header)
    let orders = Router::new()
        .route(
            "/orders",
            get(orders::list_orders).post(orders::create_order),
        )
        .route(
            "/orders/{id}",
            get(orders::get_order)
                .put(orders::update_order)
                .delete(orders::delete_order),
        )
        .route("/orders/{id}/review", post(orders::submit_review))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            session_auth_middleware,
        ));

    Router::new()
        .route("/health", get(health::health_check))
        // Notification channel (JWT in query string)
        .route(&config.channel_path, get(ws::handle_channel_ws))
        .merge(orders)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(config))
        .with_state(state)
}
