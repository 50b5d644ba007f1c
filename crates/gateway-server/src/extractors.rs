//! Custom Axum extractors for the relay.

use axum::{
    async_trait,
    extract::{FromRequestParts, Request},
    http::request::Parts,
};
use gateway_core::RoutingSlot;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::ApiError;

/// Header carrying an explicit routing slot
pub const ROUTE_SLOT_HEADER: &str = "x-route-slot";

/// Routing slot requested through [`ROUTE_SLOT_HEADER`]
///
/// An absent header yields `None`; an unparseable one is a 400.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotHeader(pub Option<RoutingSlot>);

#[async_trait]
impl<S> FromRequestParts<S> for SlotHeader
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Some(value) = parts.headers.get(ROUTE_SLOT_HEADER) else {
            return Ok(Self(None));
        };

        let raw = value
            .to_str()
            .map_err(|_| ApiError::bad_request(format!("Invalid {ROUTE_SLOT_HEADER} header")))?;

        raw.trim().parse().map(|slot| Self(Some(slot))).map_err(ApiError)
    }
}

/// JSON body extractor reporting parse failures as 400 with the serde message
#[derive(Debug)]
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<S, T> axum::extract::FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = axum::body::Bytes::from_request(req, state)
            .await
            .map_err(|e| ApiError::bad_request(format!("Failed to read request body: {e}")))?;

        let value: T = serde_json::from_slice(&bytes).map_err(|e| {
            debug!(error = %e, "JSON parse error");
            ApiError::bad_request(format!("Invalid JSON: {e}"))
        })?;

        Ok(Self(value))
    }
}
