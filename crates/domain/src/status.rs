//! Order status state machine.

use serde::{Deserialize, Serialize};

/// The status of an order in its lifecycle.
///
/// Status transitions:
/// ```text
/// Pending ──┬──► Approved ──► Completed
///           ├──► Rejected
///           └──► Cancelled
/// ```
///
/// Rejected, Cancelled, and Completed are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Order placed, awaiting manager review.
    #[default]
    Pending,

    /// Manager approved the order, fulfillment may proceed.
    Approved,

    /// Manager rejected the order (terminal state).
    Rejected,

    /// Buyer cancelled the order (terminal state).
    Cancelled,

    /// Order delivered and closed (terminal state).
    Completed,
}

impl OrderStatus {
    /// Returns true if a manager can approve or reject in this status.
    pub fn can_review(&self) -> bool {
        matches!(self, OrderStatus::Pending)
    }

    /// Returns true if the buyer can cancel in this status.
    pub fn can_cancel(&self) -> bool {
        matches!(self, OrderStatus::Pending)
    }

    /// Returns true if the order can be completed in this status.
    pub fn can_complete(&self) -> bool {
        matches!(self, OrderStatus::Approved)
    }

    /// Returns true if a payment settlement can be recorded in this status.
    pub fn can_settle(&self) -> bool {
        matches!(self, OrderStatus::Pending | OrderStatus::Approved)
    }

    /// Returns true if this is a terminal status (no further transitions possible).
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            OrderStatus::Rejected | OrderStatus::Cancelled | OrderStatus::Completed
        )
    }

    /// Returns the status name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Approved => "approved",
            OrderStatus::Rejected => "rejected",
            OrderStatus::Cancelled => "cancelled",
            OrderStatus::Completed => "completed",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(OrderStatus::Pending),
            "approved" => Ok(OrderStatus::Approved),
            "rejected" => Ok(OrderStatus::Rejected),
            "cancelled" => Ok(OrderStatus::Cancelled),
            "completed" => Ok(OrderStatus::Completed),
            other => Err(format!("unknown order status: {other}")),
        }
    }
}
