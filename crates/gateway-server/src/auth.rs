//! Auth gate.
//!
//! Runs before routing or transformation. `/` and `/health` are always
//! public, and without a configured secret every request is allowed.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};
use gateway_core::{AuthFailure, GatewayError};
use secrecy::{ExposeSecret, SecretString};
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::{error::ApiError, state::AppState};

/// Paths that never require credentials
pub const PUBLIC_PATHS: [&str; 2] = ["/", "/health"];

/// Dedicated API-key header
pub const API_KEY_HEADER: &str = "x-api-key";

/// Whether `path` is always public
#[must_use]
pub fn is_public_path(path: &str) -> bool {
    PUBLIC_PATHS.contains(&path)
}

/// Single non-empty value of a header; repeated or non-UTF-8 values count
/// as absent
fn single_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    let mut values = headers.get_all(name).iter();
    let value = values.next()?;
    if values.next().is_some() {
        debug!(header = %name, "Ignoring repeated credential header");
        return None;
    }
    value.to_str().ok().filter(|v| !v.is_empty())
}

fn same_secret(presented: &str, secret: &str) -> bool {
    Sha256::digest(presented.as_bytes()) == Sha256::digest(secret.as_bytes())
}

/// Check a request against the configured secret
///
/// # Errors
/// Returns `Missing` when no usable credential header was sent and `Invalid`
/// when it does not match
pub fn check(
    path: &str,
    headers: &HeaderMap,
    secret: Option<&SecretString>,
) -> Result<(), AuthFailure> {
    if is_public_path(path) {
        return Ok(());
    }

    let Some(secret) = secret.filter(|s| !s.expose_secret().is_empty()) else {
        return Ok(());
    };

    let presented = single_value(headers, header::AUTHORIZATION.as_str())
        .or_else(|| single_value(headers, API_KEY_HEADER))
        .ok_or(AuthFailure::Missing)?;

    let token = presented
        .strip_prefix("Bearer ")
        .map_or(presented, str::trim);

    if same_secret(token, secret.expose_secret()) {
        Ok(())
    } else {
        Err(AuthFailure::Invalid)
    }
}

/// Middleware applying [`check`] with the secret held in [`AppState`]
pub async fn auth_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();

    match check(&path, request.headers(), state.config().secret()) {
        Ok(()) => next.run(request).await,
        Err(reason) => {
            warn!(path = %path, reason = ?reason, "Authentication failed");
            ApiError(GatewayError::unauthorized(reason)).into_response()
        }
    }
}
