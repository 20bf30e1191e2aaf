use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use common::OrderId;
use domain::{
    Order, OrderStatus, PaymentRecord, PaymentStatus, Product, ProductId, RecordMilestone,
    TrackingEntry, TransactionId, UserAccount,
};
use tokio::sync::RwLock;

use crate::{
    Result, StoreError,
    store::{OrderStore, PaymentLedger, ProductCatalog, TrackingStore, UserDirectory},
};

#[derive(Default)]
struct FailureFlags {
    insert_order: bool,
}

/// In-memory storage backend for tests and the default binary.
///
/// Each record set lives behind its own `RwLock`; conditional updates
/// take the write lock for the duration of the check and mutation, which
/// gives them the same atomicity the PostgreSQL statements have.
#[derive(Clone, Default)]
pub struct MemoryStore {
    orders: Arc<RwLock<HashMap<OrderId, Order>>>,
    timelines: Arc<RwLock<HashMap<OrderId, Vec<TrackingEntry>>>>,
    payments: Arc<RwLock<HashMap<TransactionId, PaymentRecord>>>,
    products: Arc<RwLock<HashMap<ProductId, Product>>>,
    accounts: Arc<RwLock<HashMap<String, UserAccount>>>,
    failures: Arc<RwLock<FailureFlags>>,
}

impl MemoryStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a catalog product.
    pub async fn upsert_product(&self, product: Product) {
        self.products
            .write()
            .await
            .insert(product.id.clone(), product);
    }

    /// Inserts or replaces a directory account.
    pub async fn upsert_account(&self, account: UserAccount) {
        self.accounts
            .write()
            .await
            .insert(account.email.clone(), account);
    }

    /// Returns the number of stored orders.
    pub async fn order_count(&self) -> usize {
        self.orders.read().await.len()
    }

    /// Returns the number of settlement records.
    pub async fn payment_count(&self) -> usize {
        self.payments.read().await.len()
    }

    /// Makes subsequent `insert_order` calls fail, for exercising the
    /// compensation path in tests.
    pub async fn set_fail_on_insert_order(&self, fail: bool) {
        self.failures.write().await.insert_order = fail;
    }

    /// Clears all record sets.
    pub async fn clear(&self) {
        self.orders.write().await.clear();
        self.timelines.write().await.clear();
        self.payments.write().await.clear();
        self.products.write().await.clear();
        self.accounts.write().await.clear();
    }
}

#[async_trait]
impl OrderStore for MemoryStore {
    async fn insert_order(&self, order: &Order) -> Result<()> {
        if self.failures.read().await.insert_order {
            return Err(StoreError::Unavailable(
                "order insertion disabled".to_string(),
            ));
        }
        self.orders.write().await.insert(order.id, order.clone());
        Ok(())
    }

    async fn order(&self, id: OrderId) -> Result<Option<Order>> {
        Ok(self.orders.read().await.get(&id).cloned())
    }

    async fn transition_status(
        &self,
        id: OrderId,
        expected: OrderStatus,
        next: OrderStatus,
    ) -> Result<Order> {
        let mut orders = self.orders.write().await;
        let order = orders.get_mut(&id).ok_or(StoreError::OrderNotFound(id))?;

        if order.status != expected {
            return Err(StoreError::StatusConflict {
                order_id: id,
                attempted: next,
                actual: order.status,
            });
        }

        order.status = next;
        if next == OrderStatus::Approved && order.approved_at.is_none() {
            order.approved_at = Some(Utc::now());
        }
        Ok(order.clone())
    }

    async fn record_settlement(
        &self,
        id: OrderId,
        transaction_id: &TransactionId,
    ) -> Result<Order> {
        let mut orders = self.orders.write().await;
        let order = orders.get_mut(&id).ok_or(StoreError::OrderNotFound(id))?;

        if !order.status.can_settle() {
            return Err(StoreError::StatusConflict {
                order_id: id,
                attempted: OrderStatus::Approved,
                actual: order.status,
            });
        }

        order.payment_status = PaymentStatus::Paid;
        order.transaction_id = Some(transaction_id.clone());
        order.status = OrderStatus::Approved;
        if order.approved_at.is_none() {
            order.approved_at = Some(Utc::now());
        }
        Ok(order.clone())
    }
}

#[async_trait]
impl TrackingStore for MemoryStore {
    async fn append_entry(
        &self,
        order_id: OrderId,
        milestone: &RecordMilestone,
    ) -> Result<TrackingEntry> {
        let mut timelines = self.timelines.write().await;
        let timeline = timelines.entry(order_id).or_default();

        // Timestamps within one timeline never decrease, even if the
        // clock jitters between appends.
        let mut recorded_at = Utc::now();
        if let Some(last) = timeline.last()
            && last.recorded_at > recorded_at
        {
            recorded_at = last.recorded_at;
        }

        let entry = TrackingEntry {
            step: milestone.step.clone(),
            location: milestone.location.clone(),
            note: milestone.note.clone(),
            status: milestone.status.clone(),
            recorded_at,
        };
        timeline.push(entry.clone());
        Ok(entry)
    }

    async fn entries(&self, order_id: OrderId) -> Result<Vec<TrackingEntry>> {
        Ok(self
            .timelines
            .read()
            .await
            .get(&order_id)
            .cloned()
            .unwrap_or_default())
    }
}

#[async_trait]
impl PaymentLedger for MemoryStore {
    async fn insert_payment(&self, record: &PaymentRecord) -> Result<bool> {
        let mut payments = self.payments.write().await;
        if payments.contains_key(&record.transaction_id) {
            return Ok(false);
        }
        payments.insert(record.transaction_id.clone(), record.clone());
        Ok(true)
    }

    async fn payment(&self, transaction_id: &TransactionId) -> Result<Option<PaymentRecord>> {
        Ok(self.payments.read().await.get(transaction_id).cloned())
    }
}

#[async_trait]
impl ProductCatalog for MemoryStore {
    async fn product(&self, id: &ProductId) -> Result<Option<Product>> {
        Ok(self.products.read().await.get(id).cloned())
    }

    async fn reserve_stock(&self, id: &ProductId, quantity: u32) -> Result<()> {
        let mut products = self.products.write().await;
        let product = products
            .get_mut(id)
            .ok_or_else(|| StoreError::ProductNotFound(id.clone()))?;

        if product.quantity < quantity {
            return Err(StoreError::StockConflict {
                product_id: id.clone(),
                requested: quantity,
                available: product.quantity,
            });
        }

        product.quantity -= quantity;
        Ok(())
    }

    async fn release_stock(&self, id: &ProductId, quantity: u32) -> Result<()> {
        let mut products = self.products.write().await;
        let product = products
            .get_mut(id)
            .ok_or_else(|| StoreError::ProductNotFound(id.clone()))?;

        product.quantity += quantity;
        Ok(())
    }
}

#[async_trait]
impl UserDirectory for MemoryStore {
    async fn account(&self, email: &str) -> Result<Option<UserAccount>> {
        Ok(self.accounts.read().await.get(email).cloned())
    }
}
