//! The order record.

use chrono::{DateTime, Utc};
use common::{OrderId, UserId};
use serde::{Deserialize, Serialize};

use crate::catalog::Product;
use crate::inputs::PlaceOrder;
use crate::payment::{PaymentMethod, PaymentStatus};
use crate::status::OrderStatus;
use crate::value_objects::{Money, ProductId, TransactionId};

/// The account an order belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Buyer {
    /// Directory identifier of the buyer.
    pub id: UserId,

    /// Buyer email. Ownership checks compare against this.
    pub email: String,
}

/// Contact and delivery details captured at placement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingDetails {
    pub first_name: String,
    pub last_name: String,
    pub contact_number: String,
    pub delivery_address: String,
}

/// A marketplace order.
///
/// Owned by the order state machine; status and payment fields are only
/// mutated through its transition operations, never in place by callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    /// Unique order identifier.
    pub id: OrderId,

    /// The buyer who placed the order.
    pub buyer: Buyer,

    /// Product ordered.
    pub product_id: ProductId,

    /// Product title snapshotted at placement, so later catalog edits
    /// do not rewrite order history.
    pub product_title: String,

    /// Units ordered. Always greater than zero.
    pub quantity: u32,

    /// Unit price snapshotted from the catalog at placement.
    pub unit_price: Money,

    /// Total charged for the order.
    pub total_price: Money,

    /// Contact and delivery details.
    pub shipping: ShippingDetails,

    /// Free-text note from the buyer.
    pub note: String,

    /// Lifecycle status.
    pub status: OrderStatus,

    /// How the buyer chose to pay.
    pub payment_method: PaymentMethod,

    /// Settlement state of the payment.
    pub payment_status: PaymentStatus,

    /// Gateway transaction ID once a settlement was recorded.
    pub transaction_id: Option<TransactionId>,

    /// When the order was placed.
    pub ordered_at: DateTime<Utc>,

    /// When a manager approved the order, if it was approved.
    pub approved_at: Option<DateTime<Utc>>,
}

impl Order {
    /// Builds a fresh pending order from a validated placement input and
    /// the catalog product it targets.
    pub fn place(input: &PlaceOrder, product: &Product) -> Self {
        Self {
            id: OrderId::new(),
            buyer: Buyer {
                id: input.buyer_id,
                email: input.buyer_email.clone(),
            },
            product_id: product.id.clone(),
            product_title: product.title.clone(),
            quantity: input.quantity,
            unit_price: product.price,
            total_price: Money::from_major_units(input.total_price),
            shipping: ShippingDetails {
                first_name: input.first_name.clone(),
                last_name: input.last_name.clone(),
                contact_number: input.contact_number.clone(),
                delivery_address: input.delivery_address.clone(),
            },
            note: input.note.clone(),
            status: OrderStatus::Pending,
            payment_method: input.payment_method,
            payment_status: input.payment_method.initial_payment_status(),
            transaction_id: None,
            ordered_at: Utc::now(),
            approved_at: None,
        }
    }

    /// Returns true if the given email owns this order.
    pub fn is_owned_by(&self, email: &str) -> bool {
        self.buyer.email == email
    }
}
