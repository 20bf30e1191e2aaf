//! Stock ledger over the product catalog.

use domain::{DomainError, Product, ProductId};
use store::ProductCatalog;

use crate::error::Result;

/// Enforces reservation rules in front of the catalog's conditional
/// stock updates.
///
/// The catalog decrement is the reservation itself; there is no separate
/// reservation record to reconcile. This type adds the minimum-order and
/// availability checks and turns store conflicts into domain errors.
#[derive(Clone)]
pub struct StockLedger<S> {
    catalog: S,
}

impl<S: ProductCatalog> StockLedger<S> {
    /// Creates a ledger over the given catalog.
    pub fn new(catalog: S) -> Self {
        Self { catalog }
    }

    /// Reserves `quantity` units of a product.
    ///
    /// Returns the product snapshot the checks ran against. The precheck
    /// gives precise errors, but the decrement in the store is still
    /// conditional, so a racing reservation that empties the shelf first
    /// surfaces here as `InsufficientStock` even after the precheck
    /// passed.
    pub async fn reserve(&self, product_id: &ProductId, quantity: u32) -> Result<Product> {
        let product = self
            .catalog
            .product(product_id)
            .await?
            .ok_or_else(|| DomainError::product_not_found(product_id))?;

        if quantity < product.moq {
            return Err(DomainError::BelowMinimumOrder {
                requested: quantity,
                minimum: product.moq,
            }
            .into());
        }
        if product.quantity < quantity {
            return Err(DomainError::InsufficientStock {
                requested: quantity,
                available: product.quantity,
            }
            .into());
        }

        self.catalog.reserve_stock(product_id, quantity).await?;
        metrics::counter!("stock_reservations_total").increment(1);
        Ok(product)
    }

    /// Returns previously reserved units to the shelf.
    pub async fn release(&self, product_id: &ProductId, quantity: u32) -> Result<()> {
        self.catalog.release_stock(product_id, quantity).await?;
        metrics::counter!("stock_releases_total").increment(1);
        Ok(())
    }
}
