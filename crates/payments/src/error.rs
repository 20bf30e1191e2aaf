//! Payment error types.

use std::time::Duration;

use domain::DomainError;
use store::StoreError;
use thiserror::Error;

/// Errors at the payment gateway boundary.
///
/// These never carry domain meaning; the order is left untouched and the
/// caller may retry.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Provider rejected the call or could not be reached.
    #[error("Payment gateway unavailable: {0}")]
    Unavailable(String),

    /// Provider did not answer within the configured deadline.
    #[error("Payment gateway timed out after {0:?}")]
    TimedOut(Duration),

    /// Session id is not known to the provider.
    #[error("Unknown checkout session: {0}")]
    UnknownSession(String),
}

/// Errors that can occur during payment operations.
#[derive(Debug, Error)]
pub enum PaymentError {
    /// Domain rule violation.
    #[error("{0}")]
    Domain(#[from] DomainError),

    /// Storage failure with no domain meaning.
    #[error("Storage error: {0}")]
    Store(StoreError),

    /// Gateway failure, retryable.
    #[error("{0}")]
    Gateway(#[from] GatewayError),
}

impl PaymentError {
    /// Returns the domain error when this failure has one.
    pub fn as_domain(&self) -> Option<&DomainError> {
        match self {
            PaymentError::Domain(e) => Some(e),
            _ => None,
        }
    }

    /// Returns true for gateway-side failures.
    pub fn is_gateway(&self) -> bool {
        matches!(self, PaymentError::Gateway(_))
    }
}

/// The only conditional write in this crate is the settlement update, so
/// a status conflict always means the order can no longer be settled.
impl From<StoreError> for PaymentError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::OrderNotFound(id) => DomainError::order_not_found(id).into(),
            StoreError::StatusConflict { actual, .. } => DomainError::InvalidTransition {
                current: actual,
                action: "settle",
            }
            .into(),
            other => PaymentError::Store(other),
        }
    }
}

/// Convenience type alias for payment results.
pub type Result<T> = std::result::Result<T, PaymentError>;
