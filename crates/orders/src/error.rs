//! Service error types.

use domain::{DomainError, OrderStatus};
use store::StoreError;
use thiserror::Error;

/// Errors that can occur in the order and tracking services.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Domain rule violation.
    #[error("{0}")]
    Domain(#[from] DomainError),

    /// Storage failure with no domain meaning.
    #[error("Storage error: {0}")]
    Store(StoreError),
}

impl ServiceError {
    /// Returns the domain error when this failure has one.
    pub fn as_domain(&self) -> Option<&DomainError> {
        match self {
            ServiceError::Domain(e) => Some(e),
            ServiceError::Store(_) => None,
        }
    }
}

/// Conditional-update losers come back from the store as
/// `StockConflict`/`StatusConflict`; clients see those as
/// `InsufficientStock` and `InvalidTransition`.
impl From<StoreError> for ServiceError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::OrderNotFound(id) => DomainError::order_not_found(id).into(),
            StoreError::ProductNotFound(id) => DomainError::product_not_found(id).into(),
            StoreError::StockConflict {
                requested,
                available,
                ..
            } => DomainError::InsufficientStock {
                requested,
                available,
            }
            .into(),
            StoreError::StatusConflict {
                attempted, actual, ..
            } => DomainError::InvalidTransition {
                current: actual,
                action: transition_action(attempted),
            }
            .into(),
            other => ServiceError::Store(other),
        }
    }
}

/// Names the attempted transition for error messages.
fn transition_action(attempted: OrderStatus) -> &'static str {
    match attempted {
        OrderStatus::Pending => "reopen",
        OrderStatus::Approved => "approve",
        OrderStatus::Rejected => "reject",
        OrderStatus::Cancelled => "cancel",
        OrderStatus::Completed => "complete",
    }
}

/// Convenience type alias for service results.
pub type Result<T> = std::result::Result<T, ServiceError>;
