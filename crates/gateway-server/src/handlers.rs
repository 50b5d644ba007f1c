//! HTTP request handlers for the relay API.

use axum::{
    body::Body,
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use gateway_core::{ChatRequest, ChatResponse, ResponseBody};
use serde::Serialize;
use tracing::{debug, instrument};

use crate::{
    error::ApiError,
    extractors::{JsonBody, SlotHeader},
    state::AppState,
};

/// Service banner
#[derive(Debug, Serialize)]
pub struct BannerResponse {
    /// Service name
    pub name: &'static str,
    /// Version
    pub version: &'static str,
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status
    pub status: &'static str,
    /// Version
    pub version: &'static str,
    /// Uptime in seconds
    pub uptime_seconds: u64,
}

/// `GET /`
pub async fn banner() -> Json<BannerResponse> {
    Json(BannerResponse {
        name: "llm-relay",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// `GET /health`
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        uptime_seconds: state.uptime().as_secs(),
    })
}

/// `POST /v1/chat/completions`
#[instrument(skip_all, fields(slot = ?slot, stream = body.stream))]
pub async fn chat_completion(
    State(state): State<AppState>,
    SlotHeader(slot): SlotHeader,
    JsonBody(body): JsonBody<ChatRequest>,
) -> Result<Response, ApiError> {
    debug!(messages = body.messages.len(), "Chat completion request");

    let response = state.pipeline().handle(body, slot).await?;
    Ok(into_http(response))
}

/// Convert a pipeline response into an HTTP response
fn into_http(response: ChatResponse) -> Response {
    let status = StatusCode::from_u16(response.status).unwrap_or(StatusCode::OK);

    match response.body {
        ResponseBody::Json(value) => (status, Json(value)).into_response(),
        ResponseBody::Stream(stream) => (
            status,
            [
                (header::CONTENT_TYPE, "text/event-stream"),
                (header::CACHE_CONTROL, "no-cache"),
            ],
            Body::from_stream(stream),
        )
            .into_response(),
    }
}
