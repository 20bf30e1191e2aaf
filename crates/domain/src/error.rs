//! The shared error taxonomy.

use thiserror::Error;

use crate::status::OrderStatus;

/// Errors surfaced by the order, tracking, and payment operations.
///
/// Every variant maps to a client-visible failure; storage and gateway
/// faults live in their own layers and are wrapped by the services.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DomainError {
    /// Referenced entity does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Actor identity does not permit the operation.
    #[error("Forbidden: {reason}")]
    Forbidden { reason: String },

    /// Order is not in the expected status.
    #[error("Invalid transition: cannot {action} from {current} status")]
    InvalidTransition {
        current: OrderStatus,
        action: &'static str,
    },

    /// Requested quantity exceeds available stock.
    #[error("Insufficient stock: requested {requested}, available {available}")]
    InsufficientStock { requested: u32, available: u32 },

    /// Requested quantity is under the product's minimum order quantity.
    #[error("Below minimum order quantity: requested {requested}, minimum {minimum}")]
    BelowMinimumOrder { requested: u32, minimum: u32 },

    /// Input failed shape validation.
    #[error("Invalid {field}: {reason}")]
    InvalidInput {
        field: &'static str,
        reason: String,
    },
}

impl DomainError {
    /// Not-found error for an order.
    pub fn order_not_found(id: impl ToString) -> Self {
        Self::NotFound {
            entity: "order",
            id: id.to_string(),
        }
    }

    /// Not-found error for a product.
    pub fn product_not_found(id: impl ToString) -> Self {
        Self::NotFound {
            entity: "product",
            id: id.to_string(),
        }
    }

    /// Forbidden error with a reason.
    pub fn forbidden(reason: impl Into<String>) -> Self {
        Self::Forbidden {
            reason: reason.into(),
        }
    }
}
