//! Order placement, review, and cancellation endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use common::UserId;
use domain::{CancelOrder, Order, PaymentMethod, PlaceOrder, ProductId, ReviewOrder};
use orders::{OrderService, TrackingService};
use payments::{MockGateway, PaymentReconciler};
use serde::{Deserialize, Serialize};
use store::Datastore;

use crate::error::ApiError;
use crate::routes::{parse_order_id, require_actor};

/// Shared application state accessible from all handlers.
pub struct AppState<S: Datastore> {
    pub orders: OrderService<S>,
    pub tracking: TrackingService<S>,
    pub payments: PaymentReconciler<S, MockGateway>,
    pub gateway: MockGateway,
    pub store: S,
}

// -- Request types --

#[derive(Deserialize)]
pub struct CreateOrderRequest {
    pub product_id: String,
    pub quantity: u32,
    pub total_price: f64,
    #[serde(default)]
    pub payment_method: PaymentMethod,
    pub first_name: String,
    pub last_name: String,
    pub contact_number: String,
    pub delivery_address: String,
    #[serde(default)]
    pub note: String,
}

// -- Response types --

#[derive(Serialize)]
pub struct OrderResponse {
    pub id: String,
    pub buyer_id: String,
    pub buyer_email: String,
    pub product_id: String,
    pub product_title: String,
    pub quantity: u32,
    pub unit_price_cents: i64,
    pub total_price_cents: i64,
    pub first_name: String,
    pub last_name: String,
    pub contact_number: String,
    pub delivery_address: String,
    pub note: String,
    pub status: String,
    pub payment_method: String,
    pub payment_status: String,
    pub transaction_id: Option<String>,
    pub ordered_at: String,
    pub approved_at: Option<String>,
}

impl OrderResponse {
    pub(crate) fn from_order(order: &Order) -> Self {
        Self {
            id: order.id.to_string(),
            buyer_id: order.buyer.id.to_string(),
            buyer_email: order.buyer.email.clone(),
            product_id: order.product_id.to_string(),
            product_title: order.product_title.clone(),
            quantity: order.quantity,
            unit_price_cents: order.unit_price.cents(),
            total_price_cents: order.total_price.cents(),
            first_name: order.shipping.first_name.clone(),
            last_name: order.shipping.last_name.clone(),
            contact_number: order.shipping.contact_number.clone(),
            delivery_address: order.shipping.delivery_address.clone(),
            note: order.note.clone(),
            status: order.status.as_str().to_string(),
            payment_method: order.payment_method.as_str().to_string(),
            payment_status: order.payment_status.as_str().to_string(),
            transaction_id: order.transaction_id.as_ref().map(|id| id.to_string()),
            ordered_at: order.ordered_at.to_rfc3339(),
            approved_at: order.approved_at.map(|at| at.to_rfc3339()),
        }
    }
}

// -- Handlers --

/// POST /orders — place a new order for the acting buyer.
#[tracing::instrument(skip(state, headers, req))]
pub async fn create<S: Datastore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    headers: HeaderMap,
    Json(req): Json<CreateOrderRequest>,
) -> Result<(axum::http::StatusCode, Json<OrderResponse>), ApiError> {
    let buyer_email = require_actor(&headers)?;

    // Buyers without a directory record may still order; they get a
    // fresh id and the order is keyed on their email.
    let buyer_id = state
        .store
        .account(&buyer_email)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?
        .map(|account| account.id)
        .unwrap_or_else(UserId::new);

    let input = PlaceOrder {
        buyer_id,
        buyer_email,
        product_id: ProductId::new(req.product_id),
        quantity: req.quantity,
        total_price: req.total_price,
        payment_method: req.payment_method,
        first_name: req.first_name,
        last_name: req.last_name,
        contact_number: req.contact_number,
        delivery_address: req.delivery_address,
        note: req.note,
    };

    let order = state.orders.place(input).await?;

    Ok((
        axum::http::StatusCode::CREATED,
        Json(OrderResponse::from_order(&order)),
    ))
}

/// GET /orders/:id — load an order. Visible to its buyer and to managers.
#[tracing::instrument(skip(state, headers))]
pub async fn get<S: Datastore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<OrderResponse>, ApiError> {
    let actor = require_actor(&headers)?;
    let order_id = parse_order_id(&id)?;

    let order = state.orders.fetch(order_id, &actor).await?;
    Ok(Json(OrderResponse::from_order(&order)))
}

/// PATCH /orders/:id/approve — approve a pending order. Managers only.
#[tracing::instrument(skip(state, headers))]
pub async fn approve<S: Datastore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<OrderResponse>, ApiError> {
    let actor = require_actor(&headers)?;
    let order_id = parse_order_id(&id)?;

    let order = state
        .orders
        .approve(ReviewOrder::new(order_id, actor))
        .await?;
    Ok(Json(OrderResponse::from_order(&order)))
}

/// PATCH /orders/:id/reject — reject a pending order. Managers only.
#[tracing::instrument(skip(state, headers))]
pub async fn reject<S: Datastore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<OrderResponse>, ApiError> {
    let actor = require_actor(&headers)?;
    let order_id = parse_order_id(&id)?;

    let order = state
        .orders
        .reject(ReviewOrder::new(order_id, actor))
        .await?;
    Ok(Json(OrderResponse::from_order(&order)))
}

/// PATCH /orders/:id/cancel — cancel a pending order. Buyer only.
#[tracing::instrument(skip(state, headers))]
pub async fn cancel<S: Datastore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<OrderResponse>, ApiError> {
    let actor = require_actor(&headers)?;
    let order_id = parse_order_id(&id)?;

    let order = state
        .orders
        .cancel(CancelOrder::new(order_id, actor))
        .await?;
    Ok(Json(OrderResponse::from_order(&order)))
}
