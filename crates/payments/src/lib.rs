//! Payment reconciliation against a hosted checkout gateway.
//!
//! [`PaymentGateway`] is the port to the provider; [`MockGateway`] stands
//! in for it in tests and the default binary. [`PaymentReconciler`] opens
//! checkout sessions for payfirst orders and settles them when the
//! gateway reports payment. Settlement is idempotent end to end: the
//! order update is a conditional write and the ledger insert is keyed by
//! the gateway transaction id, so replayed confirmations change nothing.

pub mod error;
pub mod gateway;
pub mod reconcile;

pub use error::{GatewayError, PaymentError, Result};
pub use gateway::{CheckoutRequest, CheckoutSession, MockGateway, PaymentGateway, SessionState};
pub use reconcile::{CheckoutConfig, PaymentReconciler, Settlement};
