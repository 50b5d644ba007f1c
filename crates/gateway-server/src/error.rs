//! HTTP error responses.

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use gateway_core::{GatewayError, UpstreamFailure};
use serde_json::json;
use tracing::{error, warn};

/// Header telling the caller whether the same request may be retried
pub const RETRYABLE_HEADER: &str = "x-relay-retryable";

/// Header naming the provider whose upstream call failed
pub const PROVIDER_HEADER: &str = "x-relay-provider";

/// API error wrapping a [`GatewayError`]
#[derive(Debug, Clone)]
pub struct ApiError(pub GatewayError);

impl ApiError {
    /// Malformed request body
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self(GatewayError::validation(message))
    }

    /// HTTP status for the wrapped error
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            GatewayError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            GatewayError::Validation { .. } => StatusCode::BAD_REQUEST,
            GatewayError::Upstream { kind, .. } => match kind {
                UpstreamFailure::Timeout => StatusCode::GATEWAY_TIMEOUT,
                UpstreamFailure::Connection(_) => StatusCode::BAD_GATEWAY,
                UpstreamFailure::Status { status, .. } => {
                    StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
                }
            },
            GatewayError::Config { .. }
            | GatewayError::UnknownRoute { .. }
            | GatewayError::UnknownProvider { .. }
            | GatewayError::Transform { .. }
            | GatewayError::DuplicateName { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<GatewayError> for ApiError {
    fn from(err: GatewayError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let err = self.0;

        match &err {
            GatewayError::Unauthorized { reason } => {
                return (status, reason.message()).into_response();
            }
            GatewayError::UnknownRoute { .. } | GatewayError::UnknownProvider { .. } => {
                error!(error = %err, "Routing table is out of sync with providers");
            }
            GatewayError::Upstream { .. } => {
                warn!(error = %err, retryable = err.is_retryable(), "Upstream request failed");
            }
            _ if status.is_server_error() => error!(error = %err, "Request failed"),
            _ => {}
        }

        let mut response = match &err {
            GatewayError::Upstream {
                kind: UpstreamFailure::Status { body, .. },
                ..
            } => upstream_body(status, body),
            _ => {
                let mut detail = json!({
                    "type": err.error_type(),
                    "message": err.to_string(),
                    "retryable": err.is_retryable(),
                });
                if let Some(provider) = err.provider() {
                    detail["provider"] = json!(provider);
                }
                (status, Json(json!({ "error": detail }))).into_response()
            }
        };

        if let GatewayError::Upstream { provider, .. } = &err {
            let headers = response.headers_mut();
            headers.insert(
                RETRYABLE_HEADER,
                HeaderValue::from_static(if err.is_retryable() { "true" } else { "false" }),
            );
            if let Ok(value) = HeaderValue::from_str(provider) {
                headers.insert(PROVIDER_HEADER, value);
            }
        }

        response
    }
}

/// Pass an upstream error body through with a fitting content type
fn upstream_body(status: StatusCode, body: &str) -> Response {
    let content_type = if serde_json::from_str::<serde_json::Value>(body).is_ok() {
        "application/json"
    } else {
        "text/plain; charset=utf-8"
    };
    (status, [(header::CONTENT_TYPE, content_type)], body.to_string()).into_response()
}
