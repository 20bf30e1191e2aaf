//! Domain layer for the order tracking system.
//!
//! This crate provides the core domain types:
//! - Order record with its status state machine
//! - Value objects (Money, ProductId, TransactionId)
//! - Payment vocabulary and settlement records
//! - Catalog and directory records consumed by the order flows
//! - Validated per-operation input structs
//! - The shared error taxonomy

pub mod account;
pub mod catalog;
pub mod error;
pub mod inputs;
pub mod order;
pub mod payment;
pub mod status;
pub mod tracking;
pub mod value_objects;

pub use account::{Role, UserAccount};
pub use catalog::Product;
pub use error::DomainError;
pub use inputs::{CancelOrder, PlaceOrder, RecordMilestone, ReviewOrder};
pub use order::{Buyer, Order, ShippingDetails};
pub use payment::{PaymentMethod, PaymentRecord, PaymentStatus};
pub use status::OrderStatus;
pub use tracking::TrackingEntry;
pub use value_objects::{Money, ProductId, TransactionId};
