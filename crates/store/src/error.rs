use common::OrderId;
use domain::{OrderStatus, ProductId};
use thiserror::Error;

/// Errors that can occur in the persistence layer.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The order does not exist.
    #[error("Order not found: {0}")]
    OrderNotFound(OrderId),

    /// The product does not exist.
    #[error("Product not found: {0}")]
    ProductNotFound(ProductId),

    /// A conditional stock update matched no rows.
    /// The requested quantity exceeded what was available.
    #[error("Stock conflict for product {product_id}: requested {requested}, available {available}")]
    StockConflict {
        product_id: ProductId,
        requested: u32,
        available: u32,
    },

    /// A conditional status update matched no rows.
    /// The order was not in the status the caller expected.
    #[error("Status conflict for order {order_id}: attempted {attempted}, found {actual}")]
    StatusConflict {
        order_id: OrderId,
        attempted: OrderStatus,
        actual: OrderStatus,
    },

    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A stored value could not be decoded into its domain type.
    #[error("Decode error: {0}")]
    Decode(String),

    /// The backend refused the operation. Raised by the in-memory
    /// store's failure toggles to exercise error paths in tests.
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// Result type for persistence operations.
pub type Result<T> = std::result::Result<T, StoreError>;
