//! Order services for the marketplace.
//!
//! This crate holds the write-side flows that sit between the HTTP layer
//! and the storage traits:
//!
//! - [`OrderService`]: placement, review, cancellation, and completion
//! - [`StockLedger`]: reservation rules over the product catalog
//! - [`TrackingService`]: append-only delivery timelines
//! - [`EventRelay`]: in-process dispatch of order events to handlers
//!
//! Every status mutation is a compare-and-swap in the store, so racing
//! callers resolve to exactly one winner without locks at this layer.

pub mod error;
pub mod events;
pub mod inventory;
pub mod service;
pub mod tracking;

pub use error::{Result, ServiceError};
pub use events::{DeliveryCompletion, EventRelay, OrderEvent, OrderEventHandler};
pub use inventory::StockLedger;
pub use service::OrderService;
pub use tracking::TrackingService;
