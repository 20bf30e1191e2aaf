//! Order placement and review service.

use common::OrderId;
use domain::{CancelOrder, DomainError, Order, OrderStatus, PlaceOrder, ReviewOrder, UserAccount};
use store::{Datastore, StoreError};

use crate::error::Result;
use crate::inventory::StockLedger;

/// Service for placing, reviewing, and cancelling orders.
///
/// Every mutation runs as a single conditional update in the store.
/// Authorization and input validation happen before the first write, so
/// a rejected request has no side effects.
#[derive(Clone)]
pub struct OrderService<S> {
    store: S,
    ledger: StockLedger<S>,
}

impl<S> OrderService<S>
where
    S: Datastore + Clone,
{
    /// Creates a new order service over the given store.
    pub fn new(store: S) -> Self {
        let ledger = StockLedger::new(store.clone());
        Self { store, ledger }
    }

    /// Places a new order.
    ///
    /// The stock decrement is the reservation, taken before the order row
    /// exists. If persisting the order then fails, the reservation is
    /// released again so no stock is held by an order nobody can see.
    #[tracing::instrument(
        skip(self, input),
        fields(buyer = %input.buyer_email, product = %input.product_id)
    )]
    pub async fn place(&self, input: PlaceOrder) -> Result<Order> {
        input.validate()?;

        // Unknown buyers may order; suspended ones may not.
        if let Some(account) = self.store.account(&input.buyer_email).await?
            && account.suspended
        {
            return Err(DomainError::forbidden(account.suspension_message()).into());
        }

        let product = self
            .ledger
            .reserve(&input.product_id, input.quantity)
            .await?;
        let order = Order::place(&input, &product);

        if let Err(e) = self.store.insert_order(&order).await {
            if let Err(release_err) = self
                .ledger
                .release(&input.product_id, input.quantity)
                .await
            {
                tracing::error!(
                    product = %input.product_id,
                    error = %release_err,
                    "failed to release reservation after insert failure"
                );
            }
            return Err(e.into());
        }

        metrics::counter!("orders_placed_total").increment(1);
        tracing::info!(order_id = %order.id, "order placed");
        Ok(order)
    }

    /// Loads an order. Visible to its buyer and to managers.
    #[tracing::instrument(skip(self, actor_email))]
    pub async fn fetch(&self, order_id: OrderId, actor_email: &str) -> Result<Order> {
        let order = self.require_order(order_id).await?;
        if order.is_owned_by(actor_email) {
            return Ok(order);
        }
        match self.store.account(actor_email).await? {
            Some(account) if account.role.can_review_orders() => Ok(order),
            _ => Err(DomainError::forbidden("not your order").into()),
        }
    }

    /// Approves a pending order. Managers only.
    #[tracing::instrument(skip(self, cmd), fields(order_id = %cmd.order_id))]
    pub async fn approve(&self, cmd: ReviewOrder) -> Result<Order> {
        cmd.validate()?;
        self.require_reviewer(&cmd.reviewer).await?;

        let order = self
            .store
            .transition_status(cmd.order_id, OrderStatus::Pending, OrderStatus::Approved)
            .await?;

        metrics::counter!("orders_approved_total").increment(1);
        tracing::info!(order_id = %order.id, "order approved");
        Ok(order)
    }

    /// Rejects a pending order. Managers only.
    ///
    /// Rejection keeps the stock decrement in place; cancellation is the
    /// only path that restocks.
    #[tracing::instrument(skip(self, cmd), fields(order_id = %cmd.order_id))]
    pub async fn reject(&self, cmd: ReviewOrder) -> Result<Order> {
        cmd.validate()?;
        self.require_reviewer(&cmd.reviewer).await?;

        let order = self
            .store
            .transition_status(cmd.order_id, OrderStatus::Pending, OrderStatus::Rejected)
            .await?;

        metrics::counter!("orders_rejected_total").increment(1);
        tracing::info!(order_id = %order.id, "order rejected");
        Ok(order)
    }

    /// Cancels a pending order and returns its reservation to the shelf.
    ///
    /// Only the buyer who placed the order may cancel it.
    #[tracing::instrument(skip(self, cmd), fields(order_id = %cmd.order_id))]
    pub async fn cancel(&self, cmd: CancelOrder) -> Result<Order> {
        cmd.validate()?;
        let order = self.require_order(cmd.order_id).await?;
        if !order.is_owned_by(&cmd.actor) {
            return Err(DomainError::forbidden("not your order").into());
        }
        if let Some(account) = self.store.account(&cmd.actor).await?
            && account.suspended
        {
            return Err(DomainError::forbidden(account.suspension_message()).into());
        }

        let order = self
            .store
            .transition_status(cmd.order_id, OrderStatus::Pending, OrderStatus::Cancelled)
            .await?;

        // The CAS admits one winner, so the release runs at most once.
        self.ledger
            .release(&order.product_id, order.quantity)
            .await?;

        metrics::counter!("orders_cancelled_total").increment(1);
        tracing::info!(order_id = %order.id, "order cancelled");
        Ok(order)
    }

    /// Completes an approved order.
    ///
    /// Driven by the delivery milestone event rather than a client call.
    /// An already-completed order counts as success so replayed milestones
    /// stay retry-safe.
    #[tracing::instrument(skip(self))]
    pub async fn complete(&self, order_id: OrderId) -> Result<Order> {
        match self
            .store
            .transition_status(order_id, OrderStatus::Approved, OrderStatus::Completed)
            .await
        {
            Ok(order) => {
                metrics::counter!("orders_completed_total").increment(1);
                tracing::info!(%order_id, "order completed");
                Ok(order)
            }
            Err(StoreError::StatusConflict {
                actual: OrderStatus::Completed,
                ..
            }) => self.require_order(order_id).await,
            Err(e) => Err(e.into()),
        }
    }

    async fn require_order(&self, order_id: OrderId) -> Result<Order> {
        let order = self.store.order(order_id).await?;
        order.ok_or_else(|| DomainError::order_not_found(order_id).into())
    }

    async fn require_reviewer(&self, email: &str) -> Result<UserAccount> {
        let account = self
            .store
            .account(email)
            .await?
            .ok_or_else(|| DomainError::forbidden("only managers can review orders"))?;
        if account.suspended {
            return Err(DomainError::forbidden(account.suspension_message()).into());
        }
        if !account.role.can_review_orders() {
            return Err(DomainError::forbidden("only managers can review orders").into());
        }
        Ok(account)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::UserId;
    use domain::{Money, PaymentMethod, PaymentStatus, Product, ProductId};
    use store::{MemoryStore, ProductCatalog};

    async fn service_with_product(quantity: u32, moq: u32) -> (OrderService<MemoryStore>, MemoryStore) {
        let store = MemoryStore::new();
        store
            .upsert_product(
                Product::new("SKU-001", "Ceramic mug", Money::from_cents(4999), quantity)
                    .with_moq(moq),
            )
            .await;
        (OrderService::new(store.clone()), store)
    }

    fn placement(quantity: u32) -> PlaceOrder {
        PlaceOrder {
            buyer_id: UserId::new(),
            buyer_email: "buyer@example.com".to_string(),
            product_id: ProductId::new("SKU-001"),
            quantity,
            total_price: 49.99 * quantity as f64,
            payment_method: PaymentMethod::Cod,
            first_name: "Rahim".to_string(),
            last_name: "Uddin".to_string(),
            contact_number: "01700000000".to_string(),
            delivery_address: "House 12, Road 5, Dhanmondi".to_string(),
            note: String::new(),
        }
    }

    #[tokio::test]
    async fn test_place_reserves_and_persists() {
        let (service, store) = service_with_product(5, 2).await;

        let order = service.place(placement(3)).await.unwrap();

        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.payment_status, PaymentStatus::Cod);
        assert_eq!(order.product_title, "Ceramic mug");
        assert_eq!(order.unit_price.cents(), 4999);

        let shelf = store.product(&"SKU-001".into()).await.unwrap().unwrap();
        assert_eq!(shelf.quantity, 2);
        assert_eq!(store.order_count().await, 1);
    }

    #[tokio::test]
    async fn test_place_validates_before_touching_stock() {
        let (service, store) = service_with_product(5, 1).await;

        let mut input = placement(1);
        input.delivery_address = String::new();
        assert!(service.place(input).await.is_err());

        let shelf = store.product(&"SKU-001".into()).await.unwrap().unwrap();
        assert_eq!(shelf.quantity, 5);
        assert_eq!(store.order_count().await, 0);
    }

    #[tokio::test]
    async fn test_suspended_buyer_cannot_place() {
        let (service, store) = service_with_product(5, 1).await;
        store
            .upsert_account(
                domain::UserAccount::buyer("buyer@example.com").suspend("payment disputes"),
            )
            .await;

        let err = service.place(placement(1)).await.unwrap_err();
        assert!(matches!(
            err.as_domain(),
            Some(DomainError::Forbidden { reason }) if reason == "payment disputes"
        ));
    }

    #[tokio::test]
    async fn test_insert_failure_releases_reservation() {
        let (service, store) = service_with_product(5, 1).await;
        store.set_fail_on_insert_order(true).await;

        assert!(service.place(placement(2)).await.is_err());

        let shelf = store.product(&"SKU-001".into()).await.unwrap().unwrap();
        assert_eq!(shelf.quantity, 5);
        assert_eq!(store.order_count().await, 0);
    }

    #[tokio::test]
    async fn test_buyer_cannot_review() {
        let (service, store) = service_with_product(5, 1).await;
        store
            .upsert_account(domain::UserAccount::buyer("buyer@example.com"))
            .await;
        let order = service.place(placement(1)).await.unwrap();

        let err = service
            .approve(ReviewOrder::new(order.id, "buyer@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(
            err.as_domain(),
            Some(DomainError::Forbidden { .. })
        ));
    }

    #[tokio::test]
    async fn test_unknown_reviewer_is_forbidden() {
        let (service, _store) = service_with_product(5, 1).await;
        let order = service.place(placement(1)).await.unwrap();

        let err = service
            .approve(ReviewOrder::new(order.id, "nobody@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(
            err.as_domain(),
            Some(DomainError::Forbidden { .. })
        ));
    }

    #[tokio::test]
    async fn test_complete_tolerates_replay() {
        let (service, store) = service_with_product(5, 1).await;
        store
            .upsert_account(domain::UserAccount::manager("manager@example.com"))
            .await;
        let order = service.place(placement(1)).await.unwrap();
        service
            .approve(ReviewOrder::new(order.id, "manager@example.com"))
            .await
            .unwrap();

        let first = service.complete(order.id).await.unwrap();
        assert_eq!(first.status, OrderStatus::Completed);

        let second = service.complete(order.id).await.unwrap();
        assert_eq!(second.status, OrderStatus::Completed);
    }

    #[tokio::test]
    async fn test_complete_requires_approval_first() {
        let (service, _store) = service_with_product(5, 1).await;
        let order = service.place(placement(1)).await.unwrap();

        let err = service.complete(order.id).await.unwrap_err();
        assert!(matches!(
            err.as_domain(),
            Some(DomainError::InvalidTransition {
                current: OrderStatus::Pending,
                action: "complete",
            })
        ));
    }
}
