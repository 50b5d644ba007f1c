//! Route definitions for the relay API.

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::{auth::auth_middleware, handlers, state::AppState};

/// Create the main API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::banner))
        .route("/health", get(handlers::health_check))
        .route("/v1/chat/completions", post(handlers::chat_completion))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
