//! HTTP API server with observability for the order tracking system.
//!
//! Provides REST endpoints for order placement, review, delivery
//! tracking, and payment settlement, with structured logging (tracing)
//! and Prometheus metrics.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, patch, post};
use metrics_exporter_prometheus::PrometheusHandle;
use orders::{DeliveryCompletion, EventRelay, OrderService, TrackingService};
use payments::{CheckoutConfig, MockGateway, PaymentReconciler};
use store::Datastore;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use routes::orders::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S: Datastore + Clone + 'static>(
    state: Arc<AppState<S>>,
    metrics_handle: PrometheusHandle,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/orders", post(routes::orders::create::<S>))
        .route("/orders/{id}", get(routes::orders::get::<S>))
        .route("/orders/{id}/approve", patch(routes::orders::approve::<S>))
        .route("/orders/{id}/reject", patch(routes::orders::reject::<S>))
        .route("/orders/{id}/cancel", patch(routes::orders::cancel::<S>))
        .route(
            "/trackings/{order_id}",
            post(routes::trackings::append::<S>),
        )
        .route(
            "/trackings/{order_id}",
            get(routes::trackings::timeline::<S>),
        )
        .route(
            "/payments/checkout/{order_id}",
            post(routes::payments::checkout::<S>),
        )
        .route("/payments/success", patch(routes::payments::success::<S>))
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates the application state over the given store, wiring the mock
/// payment gateway and the delivery completion handler.
pub fn create_state<S: Datastore + Clone + 'static>(
    store: S,
    checkout: CheckoutConfig,
) -> Arc<AppState<S>> {
    let orders = OrderService::new(store.clone());

    // A delivered milestone completes its order through the relay.
    let mut relay = EventRelay::new();
    relay.register(Arc::new(DeliveryCompletion::new(orders.clone())));
    let tracking = TrackingService::new(store.clone(), Arc::new(relay));

    let gateway = MockGateway::new();
    let payments = PaymentReconciler::new(store.clone(), gateway.clone(), checkout);

    Arc::new(AppState {
        orders,
        tracking,
        payments,
        gateway,
        store,
    })
}
