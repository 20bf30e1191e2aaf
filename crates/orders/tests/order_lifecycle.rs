//! Integration tests for the order lifecycle.

use std::sync::Arc;

use common::UserId;
use domain::{
    CancelOrder, DomainError, Money, OrderStatus, PaymentMethod, PlaceOrder, Product, ProductId,
    RecordMilestone, ReviewOrder, UserAccount,
};
use orders::{DeliveryCompletion, EventRelay, OrderService, TrackingService};
use store::{MemoryStore, ProductCatalog};

struct TestHarness {
    store: MemoryStore,
    orders: OrderService<MemoryStore>,
    tracking: TrackingService<MemoryStore>,
}

impl TestHarness {
    async fn new() -> Self {
        let store = MemoryStore::new();
        let orders = OrderService::new(store.clone());

        let mut relay = EventRelay::new();
        relay.register(Arc::new(DeliveryCompletion::new(OrderService::new(
            store.clone(),
        ))));
        let tracking = TrackingService::new(store.clone(), Arc::new(relay));

        store
            .upsert_product(
                Product::new("SKU-001", "Ceramic mug", Money::from_cents(4999), 5).with_moq(2),
            )
            .await;
        store
            .upsert_account(UserAccount::buyer("buyer@example.com"))
            .await;
        store
            .upsert_account(UserAccount::manager("manager@example.com"))
            .await;

        Self {
            store,
            orders,
            tracking,
        }
    }

    fn placement(&self, quantity: u32) -> PlaceOrder {
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

    async fn stock(&self) -> u32 {
        self.store
            .product(&"SKU-001".into())
            .await
            .unwrap()
            .unwrap()
            .quantity
    }

    fn milestone(status: &str) -> RecordMilestone {
        RecordMilestone {
            step: "Carrier scan".to_string(),
            location: "Dhaka hub".to_string(),
            note: String::new(),
            status: status.to_string(),
        }
    }
}

#[tokio::test]
async fn test_place_approve_deliver_completes_the_order() {
    let h = TestHarness::new().await;

    let order = h.orders.place(h.placement(3)).await.unwrap();
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(h.stock().await, 2);

    let approved = h
        .orders
        .approve(ReviewOrder::new(order.id, "manager@example.com"))
        .await
        .unwrap();
    assert_eq!(approved.status, OrderStatus::Approved);
    assert!(approved.approved_at.is_some());

    h.tracking
        .append(order.id, TestHarness::milestone("in transit"))
        .await
        .unwrap();
    let after_transit = h
        .orders
        .fetch(order.id, "buyer@example.com")
        .await
        .unwrap();
    assert_eq!(after_transit.status, OrderStatus::Approved);

    // Casing of the delivered status does not matter.
    h.tracking
        .append(order.id, TestHarness::milestone("DELIVERED"))
        .await
        .unwrap();
    let delivered = h
        .orders
        .fetch(order.id, "buyer@example.com")
        .await
        .unwrap();
    assert_eq!(delivered.status, OrderStatus::Completed);

    let timeline = h.tracking.timeline(order.id).await.unwrap();
    assert_eq!(timeline.len(), 2);
}

#[tokio::test]
async fn test_cancel_returns_stock_to_the_shelf() {
    let h = TestHarness::new().await;

    let order = h.orders.place(h.placement(3)).await.unwrap();
    assert_eq!(h.stock().await, 2);

    let cancelled = h
        .orders
        .cancel(CancelOrder::new(order.id, "buyer@example.com"))
        .await
        .unwrap();
    assert_eq!(cancelled.status, OrderStatus::Cancelled);
    assert_eq!(h.stock().await, 5);
}

#[tokio::test]
async fn test_rejection_keeps_the_reservation() {
    let h = TestHarness::new().await;

    let order = h.orders.place(h.placement(2)).await.unwrap();
    assert_eq!(h.stock().await, 3);

    let rejected = h
        .orders
        .reject(ReviewOrder::new(order.id, "manager@example.com"))
        .await
        .unwrap();
    assert_eq!(rejected.status, OrderStatus::Rejected);

    // Rejected orders do not restock.
    assert_eq!(h.stock().await, 3);
}

#[tokio::test]
async fn test_below_minimum_order_quantity() {
    let h = TestHarness::new().await;
    h.store
        .upsert_product(
            Product::new("SKU-002", "Bud vase", Money::from_cents(1500), 1).with_moq(2),
        )
        .await;

    let mut input = h.placement(1);
    input.product_id = ProductId::new("SKU-002");

    let err = h.orders.place(input).await.unwrap_err();
    assert!(matches!(
        err.as_domain(),
        Some(DomainError::BelowMinimumOrder {
            requested: 1,
            minimum: 2,
        })
    ));

    let shelf = h
        .store
        .product(&"SKU-002".into())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(shelf.quantity, 1);
    assert_eq!(h.store.order_count().await, 0);
}

#[tokio::test]
async fn test_stranger_cannot_cancel() {
    let h = TestHarness::new().await;
    let order = h.orders.place(h.placement(2)).await.unwrap();

    let err = h
        .orders
        .cancel(CancelOrder::new(order.id, "other@example.com"))
        .await
        .unwrap_err();
    assert!(matches!(
        err.as_domain(),
        Some(DomainError::Forbidden { .. })
    ));
    assert_eq!(h.stock().await, 3);
}

#[tokio::test]
async fn test_double_cancel_loses_the_cas() {
    let h = TestHarness::new().await;
    let order = h.orders.place(h.placement(2)).await.unwrap();

    h.orders
        .cancel(CancelOrder::new(order.id, "buyer@example.com"))
        .await
        .unwrap();
    let err = h
        .orders
        .cancel(CancelOrder::new(order.id, "buyer@example.com"))
        .await
        .unwrap_err();

    assert!(matches!(
        err.as_domain(),
        Some(DomainError::InvalidTransition {
            current: OrderStatus::Cancelled,
            action: "cancel",
        })
    ));

    // Stock was released exactly once.
    assert_eq!(h.stock().await, 5);
}

#[tokio::test]
async fn test_review_after_approval_fails() {
    let h = TestHarness::new().await;
    let order = h.orders.place(h.placement(2)).await.unwrap();

    h.orders
        .approve(ReviewOrder::new(order.id, "manager@example.com"))
        .await
        .unwrap();

    let err = h
        .orders
        .reject(ReviewOrder::new(order.id, "manager@example.com"))
        .await
        .unwrap_err();
    assert!(matches!(
        err.as_domain(),
        Some(DomainError::InvalidTransition {
            current: OrderStatus::Approved,
            action: "reject",
        })
    ));

    let order = h.orders.fetch(order.id, "manager@example.com").await.unwrap();
    assert_eq!(order.status, OrderStatus::Approved);
}

#[tokio::test]
async fn test_delivered_milestone_on_pending_order_fails() {
    let h = TestHarness::new().await;
    let order = h.orders.place(h.placement(2)).await.unwrap();

    let err = h
        .tracking
        .append(order.id, TestHarness::milestone("delivered"))
        .await
        .unwrap_err();
    assert!(matches!(
        err.as_domain(),
        Some(DomainError::InvalidTransition {
            current: OrderStatus::Pending,
            action: "complete",
        })
    ));

    // The entry landed; only the completion failed, so a retry after
    // approval goes through the same path.
    assert_eq!(h.tracking.timeline(order.id).await.unwrap().len(), 1);
    let order = h.orders.fetch(order.id, "buyer@example.com").await.unwrap();
    assert_eq!(order.status, OrderStatus::Pending);
}

#[tokio::test]
async fn test_delivered_milestone_replay_is_retry_safe() {
    let h = TestHarness::new().await;
    let order = h.orders.place(h.placement(2)).await.unwrap();
    h.orders
        .approve(ReviewOrder::new(order.id, "manager@example.com"))
        .await
        .unwrap();

    h.tracking
        .append(order.id, TestHarness::milestone("Delivered"))
        .await
        .unwrap();
    h.tracking
        .append(order.id, TestHarness::milestone("Delivered"))
        .await
        .unwrap();

    let order = h.orders.fetch(order.id, "buyer@example.com").await.unwrap();
    assert_eq!(order.status, OrderStatus::Completed);
    assert_eq!(h.tracking.timeline(order.id).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_concurrent_placements_never_oversell() {
    let h = TestHarness::new().await;
    h.store
        .upsert_product(Product::new(
            "SKU-003",
            "Coaster set",
            Money::from_cents(1200),
            5,
        ))
        .await;

    let mut handles = Vec::new();
    for _ in 0..10 {
        let orders = h.orders.clone();
        let mut input = h.placement(1);
        input.product_id = ProductId::new("SKU-003");
        handles.push(tokio::spawn(
            async move { orders.place(input).await.is_ok() },
        ));
    }

    let mut successes = 0;
    for handle in handles {
        if handle.await.unwrap() {
            successes += 1;
        }
    }

    assert_eq!(successes, 5);
    let shelf = h
        .store
        .product(&"SKU-003".into())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(shelf.quantity, 0);
    assert_eq!(h.store.order_count().await, 5);
}

#[tokio::test]
async fn test_fetch_visibility() {
    let h = TestHarness::new().await;
    let order = h.orders.place(h.placement(2)).await.unwrap();

    assert!(h.orders.fetch(order.id, "buyer@example.com").await.is_ok());
    assert!(h.orders.fetch(order.id, "manager@example.com").await.is_ok());

    let err = h
        .orders
        .fetch(order.id, "other@example.com")
        .await
        .unwrap_err();
    assert!(matches!(
        err.as_domain(),
        Some(DomainError::Forbidden { .. })
    ));

    let err = h
        .orders
        .fetch(common::OrderId::new(), "buyer@example.com")
        .await
        .unwrap_err();
    assert!(matches!(
        err.as_domain(),
        Some(DomainError::NotFound { entity: "order", .. })
    ));
}
