//! Validated per-operation inputs.
//!
//! Each order operation takes a typed input struct and validates it
//! explicitly before any storage call, so malformed requests are
//! rejected without side effects.

use common::{OrderId, UserId};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::payment::PaymentMethod;
use crate::value_objects::ProductId;

fn require(field: &'static str, value: &str) -> Result<(), DomainError> {
    if value.trim().is_empty() {
        return Err(DomainError::InvalidInput {
            field,
            reason: "must not be empty".to_string(),
        });
    }
    Ok(())
}

/// Input for placing a new order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaceOrder {
    /// The buyer placing the order.
    pub buyer_id: UserId,

    /// Buyer email, the identity the order is keyed on.
    pub buyer_email: String,

    /// Product to order.
    pub product_id: ProductId,

    /// Units requested.
    pub quantity: u32,

    /// Total price in major units, as quoted to the buyer.
    pub total_price: f64,

    /// Chosen payment method.
    #[serde(default)]
    pub payment_method: PaymentMethod,

    /// Contact and delivery details.
    pub first_name: String,
    pub last_name: String,
    pub contact_number: String,
    pub delivery_address: String,

    /// Optional free-text note.
    #[serde(default)]
    pub note: String,
}

impl PlaceOrder {
    /// Validates the input. Quantity and price bounds against the catalog
    /// are checked later by the order service; this covers shape only.
    pub fn validate(&self) -> Result<(), DomainError> {
        require("buyer_email", &self.buyer_email)?;
        if !self.buyer_email.contains('@') {
            return Err(DomainError::InvalidInput {
                field: "buyer_email",
                reason: "must be an email address".to_string(),
            });
        }
        require("product_id", self.product_id.as_str())?;
        if self.quantity == 0 {
            return Err(DomainError::InvalidInput {
                field: "quantity",
                reason: "must be greater than 0".to_string(),
            });
        }
        if !self.total_price.is_finite() || self.total_price <= 0.0 {
            return Err(DomainError::InvalidInput {
                field: "total_price",
                reason: "must be a positive amount".to_string(),
            });
        }
        require("first_name", &self.first_name)?;
        require("last_name", &self.last_name)?;
        require("contact_number", &self.contact_number)?;
        require("delivery_address", &self.delivery_address)?;
        Ok(())
    }
}

/// Input for approving or rejecting a pending order.
#[derive(Debug, Clone)]
pub struct ReviewOrder {
    /// The order under review.
    pub order_id: OrderId,

    /// Email of the manager performing the review.
    pub reviewer: String,
}

impl ReviewOrder {
    /// Creates a new review input.
    pub fn new(order_id: OrderId, reviewer: impl Into<String>) -> Self {
        Self {
            order_id,
            reviewer: reviewer.into(),
        }
    }

    /// Validates the input.
    pub fn validate(&self) -> Result<(), DomainError> {
        require("reviewer", &self.reviewer)
    }
}

/// Input for cancelling a pending order.
#[derive(Debug, Clone)]
pub struct CancelOrder {
    /// The order to cancel.
    pub order_id: OrderId,

    /// Email of the account requesting cancellation. Must own the order.
    pub actor: String,
}

impl CancelOrder {
    /// Creates a new cancellation input.
    pub fn new(order_id: OrderId, actor: impl Into<String>) -> Self {
        Self {
            order_id,
            actor: actor.into(),
        }
    }

    /// Validates the input.
    pub fn validate(&self) -> Result<(), DomainError> {
        require("actor", &self.actor)
    }
}

/// Input for appending a milestone to an order's tracking timeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordMilestone {
    /// Short label for the fulfillment step.
    pub step: String,

    /// Where the step happened.
    #[serde(default)]
    pub location: String,

    /// Free-text details.
    #[serde(default)]
    pub note: String,

    /// Milestone status label.
    pub status: String,
}

impl RecordMilestone {
    /// Validates the input.
    pub fn validate(&self) -> Result<(), DomainError> {
        require("step", &self.step)?;
        require("status", &self.status)
    }

    /// Returns true if this milestone marks the order delivered.
    pub fn is_delivery(&self) -> bool {
        self.status.trim().eq_ignore_ascii_case("delivered")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn placement() -> PlaceOrder {
        PlaceOrder {
            buyer_id: UserId::new(),
            buyer_email: "buyer@example.com".to_string(),
            product_id: ProductId::new("SKU-001"),
            quantity: 2,
            total_price: 49.99,
            payment_method: PaymentMethod::Cod,
            first_name: "Rahim".to_string(),
            last_name: "Uddin".to_string(),
            contact_number: "01700000000".to_string(),
            delivery_address: "House 12, Road 5, Dhanmondi".to_string(),
            note: String::new(),
        }
    }

    #[test]
    fn test_valid_placement_passes() {
        assert!(placement().validate().is_ok());
    }

    #[test]
    fn test_zero_quantity_rejected() {
        let mut input = placement();
        input.quantity = 0;
        let err = input.validate().unwrap_err();
        assert!(matches!(
            err,
            DomainError::InvalidInput { field: "quantity", .. }
        ));
    }

    #[test]
    fn test_non_positive_price_rejected() {
        let mut input = placement();
        input.total_price = 0.0;
        assert!(input.validate().is_err());

        input.total_price = -10.0;
        assert!(input.validate().is_err());

        input.total_price = f64::NAN;
        assert!(input.validate().is_err());
    }

    #[test]
    fn test_malformed_email_rejected() {
        let mut input = placement();
        input.buyer_email = "not-an-email".to_string();
        let err = input.validate().unwrap_err();
        assert!(matches!(
            err,
            DomainError::InvalidInput {
                field: "buyer_email",
                ..
            }
        ));
    }

    #[test]
    fn test_blank_delivery_address_rejected() {
        let mut input = placement();
        input.delivery_address = "   ".to_string();
        assert!(input.validate().is_err());
    }

    #[test]
    fn test_payment_method_defaults_to_cod_in_json() {
        let json = r#"{
            "buyer_id": "550e8400-e29b-41d4-a716-446655440000",
            "buyer_email": "buyer@example.com",
            "product_id": "SKU-001",
            "quantity": 1,
            "total_price": 10.0,
            "first_name": "Rahim",
            "last_name": "Uddin",
            "contact_number": "01700000000",
            "delivery_address": "House 12"
        }"#;
        let input: PlaceOrder = serde_json::from_str(json).unwrap();
        assert_eq!(input.payment_method, PaymentMethod::Cod);
        assert!(input.note.is_empty());
    }

    #[test]
    fn test_review_requires_reviewer() {
        let input = ReviewOrder::new(OrderId::new(), "");
        assert!(input.validate().is_err());

        let input = ReviewOrder::new(OrderId::new(), "manager@example.com");
        assert!(input.validate().is_ok());
    }

    #[test]
    fn test_milestone_requires_step_and_status() {
        let milestone = RecordMilestone {
            step: String::new(),
            location: String::new(),
            note: String::new(),
            status: "in transit".to_string(),
        };
        assert!(milestone.validate().is_err());

        let milestone = RecordMilestone {
            step: "Carrier scan".to_string(),
            location: String::new(),
            note: String::new(),
            status: "Delivered".to_string(),
        };
        assert!(milestone.validate().is_ok());
        assert!(milestone.is_delivery());
    }
}
