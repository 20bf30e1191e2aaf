//! Catalog records consumed by the order flows.

use serde::{Deserialize, Serialize};

use crate::value_objects::{Money, ProductId};

/// A product as the order flows see it.
///
/// The order core never creates or deletes products; it reads them to
/// validate placement and applies stock deltas through the ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Catalog identifier.
    pub id: ProductId,

    /// Display title, snapshotted onto orders at placement.
    pub title: String,

    /// Current unit price.
    pub price: Money,

    /// Units in stock. Never negative.
    pub quantity: u32,

    /// Minimum order quantity. At least 1.
    pub moq: u32,
}

impl Product {
    /// Creates a product with the default minimum order quantity of 1.
    pub fn new(id: impl Into<ProductId>, title: impl Into<String>, price: Money, quantity: u32) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            price,
            quantity,
            moq: 1,
        }
    }

    /// Sets the minimum order quantity.
    pub fn with_moq(mut self, moq: u32) -> Self {
        self.moq = moq;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_moq_defaults_to_one() {
        let product = Product::new("SKU-001", "Widget", Money::from_cents(1000), 5);
        assert_eq!(product.moq, 1);
    }

    #[test]
    fn test_with_moq_overrides_default() {
        let product = Product::new("SKU-001", "Widget", Money::from_cents(1000), 5).with_moq(2);
        assert_eq!(product.moq, 2);
    }
}
