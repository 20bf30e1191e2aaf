//! Payment vocabulary and settlement records.

use chrono::{DateTime, Utc};
use common::OrderId;
use serde::{Deserialize, Serialize};

use crate::value_objects::{Money, TransactionId};

/// How the buyer chose to pay for an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// Cash on delivery. No gateway involvement.
    #[default]
    Cod,

    /// Pay up front through the checkout gateway.
    Payfirst,
}

impl PaymentMethod {
    /// Returns the payment status a fresh order starts in for this method.
    ///
    /// Pay-first orders start unpaid and settle through the gateway;
    /// cash-on-delivery orders carry the cod marker for their whole life.
    pub fn initial_payment_status(&self) -> PaymentStatus {
        match self {
            PaymentMethod::Cod => PaymentStatus::Cod,
            PaymentMethod::Payfirst => PaymentStatus::Unpaid,
        }
    }

    /// Returns the method name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cod => "cod",
            PaymentMethod::Payfirst => "payfirst",
        }
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cod" => Ok(PaymentMethod::Cod),
            "payfirst" => Ok(PaymentMethod::Payfirst),
            other => Err(format!("unknown payment method: {other}")),
        }
    }
}

/// Settlement state of an order's payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    /// Cash on delivery, settled outside the gateway.
    Cod,

    /// Awaiting gateway settlement.
    Unpaid,

    /// Gateway reported the payment settled.
    Paid,
}

impl PaymentStatus {
    /// Returns true once the gateway has settled the payment.
    pub fn is_paid(&self) -> bool {
        matches!(self, PaymentStatus::Paid)
    }

    /// Returns the status name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Cod => "cod",
            PaymentStatus::Unpaid => "unpaid",
            PaymentStatus::Paid => "paid",
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for PaymentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cod" => Ok(PaymentStatus::Cod),
            "unpaid" => Ok(PaymentStatus::Unpaid),
            "paid" => Ok(PaymentStatus::Paid),
            other => Err(format!("unknown payment status: {other}")),
        }
    }
}

/// A settled payment, keyed by the gateway transaction ID.
///
/// At most one record exists per transaction ID; records are never
/// updated or deleted after insertion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentRecord {
    /// Gateway transaction ID (idempotency key).
    pub transaction_id: TransactionId,

    /// The order this payment settles.
    pub order_id: OrderId,

    /// Email of the paying account.
    pub payer_email: String,

    /// Amount settled.
    pub amount: Money,

    /// Settlement status reported by the gateway.
    pub status: String,

    /// When the record was written.
    pub created_at: DateTime<Utc>,
}

impl PaymentRecord {
    /// Creates a completed settlement record.
    pub fn completed(
        transaction_id: TransactionId,
        order_id: OrderId,
        payer_email: impl Into<String>,
        amount: Money,
    ) -> Self {
        Self {
            transaction_id,
            order_id,
            payer_email: payer_email.into(),
            amount,
            status: "completed".to_string(),
            created_at: Utc::now(),
        }
    }
}
