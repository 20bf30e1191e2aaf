//! Checkout and settlement endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use payments::Settlement;
use serde::{Deserialize, Serialize};
use store::Datastore;

use crate::error::ApiError;
use crate::routes::orders::{AppState, OrderResponse};
use crate::routes::{parse_order_id, require_actor};

// -- Request types --

#[derive(Deserialize)]
pub struct ConfirmPaymentRequest {
    pub session_id: String,
}

// -- Response types --

#[derive(Serialize)]
pub struct CheckoutSessionResponse {
    pub session_id: String,
    pub url: String,
}

#[derive(Serialize)]
pub struct ConfirmPaymentResponse {
    pub success: bool,
    pub order: Option<OrderResponse>,
}

// -- Handlers --

/// POST /payments/checkout/:order_id — open a checkout session for a
/// payfirst order and return the provider's redirect URL.
#[tracing::instrument(skip(state, headers))]
pub async fn checkout<S: Datastore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(order_id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<CheckoutSessionResponse>, ApiError> {
    require_actor(&headers)?;
    let order_id = parse_order_id(&order_id)?;

    let session = state.payments.initiate(order_id).await?;
    Ok(Json(CheckoutSessionResponse {
        session_id: session.id,
        url: session.url,
    }))
}

/// PATCH /payments/success — confirm a checkout session after the
/// provider redirect.
///
/// `success` is false while the provider has not settled the session;
/// the caller may retry. Replays of a settled session are harmless.
#[tracing::instrument(skip(state, headers, req))]
pub async fn success<S: Datastore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    headers: HeaderMap,
    Json(req): Json<ConfirmPaymentRequest>,
) -> Result<Json<ConfirmPaymentResponse>, ApiError> {
    require_actor(&headers)?;

    let response = match state.payments.confirm(&req.session_id).await? {
        Settlement::Confirmed(order) => ConfirmPaymentResponse {
            success: true,
            order: Some(OrderResponse::from_order(&order)),
        },
        Settlement::Pending => ConfirmPaymentResponse {
            success: false,
            order: None,
        },
    };
    Ok(Json(response))
}
