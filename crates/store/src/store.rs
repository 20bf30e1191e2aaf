use async_trait::async_trait;
use common::OrderId;
use domain::{
    Order, OrderStatus, PaymentRecord, Product, ProductId, RecordMilestone, TrackingEntry,
    TransactionId, UserAccount,
};

use crate::Result;

/// Persistence port for order records.
///
/// Status mutations are compare-and-swap: they name the status the
/// caller expects and fail with `StatusConflict` when the stored row
/// has moved on. Implementations must apply each mutation as one
/// atomic update, never as a read followed by a write.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Persists a freshly placed order.
    async fn insert_order(&self, order: &Order) -> Result<()>;

    /// Fetches an order by ID.
    async fn order(&self, id: OrderId) -> Result<Option<Order>>;

    /// Moves an order from `expected` to `next` in one conditional update.
    ///
    /// Sets `approved_at` when the new status is `Approved`. Returns the
    /// updated order, `OrderNotFound` if the ID is unknown, or
    /// `StatusConflict` if the stored status was not `expected`.
    async fn transition_status(
        &self,
        id: OrderId,
        expected: OrderStatus,
        next: OrderStatus,
    ) -> Result<Order>;

    /// Records a gateway settlement in one conditional update.
    ///
    /// Sets `payment_status = paid`, stores the transaction ID, and moves
    /// the order to `Approved` (keeping the original approval time if a
    /// manager already approved it). Allowed from `Pending` or `Approved`,
    /// so replaying a settlement succeeds; terminal statuses yield
    /// `StatusConflict`.
    async fn record_settlement(&self, id: OrderId, transaction_id: &TransactionId)
    -> Result<Order>;
}

/// Persistence port for tracking timelines.
///
/// Timelines are append-only and created lazily on first append.
#[async_trait]
pub trait TrackingStore: Send + Sync {
    /// Appends a milestone, assigning the server-side timestamp.
    async fn append_entry(
        &self,
        order_id: OrderId,
        milestone: &RecordMilestone,
    ) -> Result<TrackingEntry>;

    /// Returns the full timeline in insertion order. Empty if no
    /// milestone was ever recorded for the order.
    async fn entries(&self, order_id: OrderId) -> Result<Vec<TrackingEntry>>;
}

/// Persistence port for settled payments.
#[async_trait]
pub trait PaymentLedger: Send + Sync {
    /// Inserts a settlement record unless its transaction ID is already
    /// present. Returns true if the record was inserted, false if a
    /// record with the same transaction ID already existed.
    async fn insert_payment(&self, record: &PaymentRecord) -> Result<bool>;

    /// Fetches a settlement record by transaction ID.
    async fn payment(&self, transaction_id: &TransactionId) -> Result<Option<PaymentRecord>>;
}

/// Persistence port for the product catalog.
///
/// The order core never creates or deletes products; it reads them and
/// applies stock deltas. Both deltas are single conditional updates.
#[async_trait]
pub trait ProductCatalog: Send + Sync {
    /// Fetches a product by ID.
    async fn product(&self, id: &ProductId) -> Result<Option<Product>>;

    /// Atomically decrements stock by `quantity`.
    ///
    /// Fails with `StockConflict` when fewer than `quantity` units are
    /// available at the moment of the update. The decrement is the
    /// reservation; there is no separate hold step.
    async fn reserve_stock(&self, id: &ProductId, quantity: u32) -> Result<()>;

    /// Atomically increments stock by `quantity`. Undoes a reservation.
    async fn release_stock(&self, id: &ProductId, quantity: u32) -> Result<()>;
}

/// Persistence port for directory accounts.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Looks up an account by email.
    async fn account(&self, email: &str) -> Result<Option<UserAccount>>;
}

/// Convenience trait for backends that persist every record set.
pub trait Datastore:
    OrderStore + TrackingStore + PaymentLedger + ProductCatalog + UserDirectory
{
}

// Blanket implementation for any backend covering all the ports
impl<T> Datastore for T where
    T: OrderStore + TrackingStore + PaymentLedger + ProductCatalog + UserDirectory
{
}
