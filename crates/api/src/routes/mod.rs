//! HTTP route handlers.

pub mod health;
pub mod metrics;
pub mod orders;
pub mod payments;
pub mod trackings;

use axum::http::HeaderMap;
use common::OrderId;

use crate::error::ApiError;

/// Pulls the acting account's email from the `x-user-email` header.
///
/// Upstream token verification is assumed to have populated the header;
/// a request without it carries no actor and is refused.
pub(crate) fn require_actor(headers: &HeaderMap) -> Result<String, ApiError> {
    headers
        .get("x-user-email")
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|email| !email.is_empty())
        .map(str::to_owned)
        .ok_or_else(|| ApiError::Forbidden("missing x-user-email header".to_string()))
}

pub(crate) fn parse_order_id(id: &str) -> Result<OrderId, ApiError> {
    let uuid = uuid::Uuid::parse_str(id)
        .map_err(|e| ApiError::BadRequest(format!("Invalid order ID: {e}")))?;
    Ok(OrderId::from_uuid(uuid))
}
