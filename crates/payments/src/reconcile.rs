//! Reconciles checkout sessions with order payment state.

use std::future::Future;
use std::time::Duration;

use common::OrderId;
use domain::{DomainError, Money, Order, PaymentMethod, PaymentRecord, TransactionId};
use store::{OrderStore, PaymentLedger};

use crate::error::{GatewayError, Result};
use crate::gateway::{CheckoutRequest, CheckoutSession, PaymentGateway};

/// Configuration for the checkout flow.
#[derive(Debug, Clone)]
pub struct CheckoutConfig {
    /// Where the provider redirects the buyer after paying.
    pub success_url: String,
    /// Where the provider redirects the buyer on abandonment.
    pub cancel_url: String,
    /// Deadline for any single gateway call.
    pub gateway_timeout: Duration,
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            success_url: "http://localhost:3000/payments/success".to_string(),
            cancel_url: "http://localhost:3000/payments/cancel".to_string(),
            gateway_timeout: Duration::from_secs(5),
        }
    }
}

/// Outcome of a confirmation attempt.
#[derive(Debug, Clone)]
pub enum Settlement {
    /// The gateway reported settlement and the order is paid.
    Confirmed(Order),

    /// The session has not settled; nothing was changed.
    Pending,
}

impl Settlement {
    /// Returns true when this confirmation found the session settled.
    pub fn is_confirmed(&self) -> bool {
        matches!(self, Settlement::Confirmed(_))
    }
}

/// Drives payfirst orders through the hosted checkout flow.
///
/// `initiate` opens a session for an unpaid order; `confirm` queries the
/// session back and settles the order when the provider collected the
/// payment. Both sides of settlement are idempotent, so webhook-style
/// replays of `confirm` are harmless.
pub struct PaymentReconciler<S, G> {
    store: S,
    gateway: G,
    config: CheckoutConfig,
}

impl<S, G> PaymentReconciler<S, G>
where
    S: OrderStore + PaymentLedger,
    G: PaymentGateway,
{
    /// Creates a reconciler over the given store and gateway.
    pub fn new(store: S, gateway: G, config: CheckoutConfig) -> Self {
        Self {
            store,
            gateway,
            config,
        }
    }

    /// Opens a checkout session for a payfirst order.
    #[tracing::instrument(skip(self))]
    pub async fn initiate(&self, order_id: OrderId) -> Result<CheckoutSession> {
        let order = self
            .store
            .order(order_id)
            .await?
            .ok_or_else(|| DomainError::order_not_found(order_id))?;

        if order.payment_method != PaymentMethod::Payfirst {
            return Err(DomainError::InvalidInput {
                field: "payment_method",
                reason: "only payfirst orders go through checkout".to_string(),
            }
            .into());
        }
        if order.payment_status.is_paid() {
            return Err(DomainError::InvalidTransition {
                current: order.status,
                action: "initiate checkout",
            }
            .into());
        }

        let request = CheckoutRequest {
            order_id,
            buyer_email: order.buyer.email.clone(),
            amount: order.total_price,
            success_url: self.config.success_url.clone(),
            cancel_url: self.config.cancel_url.clone(),
        };
        let session = self
            .with_deadline(self.gateway.create_session(request))
            .await?;

        metrics::counter!("checkout_sessions_created").increment(1);
        tracing::info!(%order_id, session_id = %session.id, "checkout session created");
        Ok(session)
    }

    /// Confirms a checkout session, settling the order when paid.
    ///
    /// A session the provider has not settled yet is a `Pending` no-op.
    /// On settlement the order update is a single conditional write and
    /// the ledger insert is keyed by the transaction id, so calling this
    /// again for the same session settles nothing twice.
    #[tracing::instrument(skip(self))]
    pub async fn confirm(&self, session_id: &str) -> Result<Settlement> {
        let state = self
            .with_deadline(self.gateway.retrieve_session(session_id))
            .await?;

        if !state.settled {
            tracing::debug!(session_id, "session not settled yet");
            return Ok(Settlement::Pending);
        }

        let transaction_id = state.payment_intent.map(TransactionId::new).ok_or_else(|| {
            GatewayError::Unavailable("settled session carries no payment intent".to_string())
        })?;

        let order = self
            .store
            .record_settlement(state.order_id, &transaction_id)
            .await?;

        let record = PaymentRecord::completed(
            transaction_id.clone(),
            order.id,
            state.customer_email.clone(),
            Money::from_cents(state.amount_total),
        );
        if self.store.insert_payment(&record).await? {
            metrics::counter!("payments_recorded_total").increment(1);
        } else {
            tracing::debug!(transaction_id = %transaction_id, "payment already recorded");
        }

        tracing::info!(
            order_id = %order.id,
            transaction_id = %transaction_id,
            "payment settled"
        );
        Ok(Settlement::Confirmed(order))
    }

    /// Runs a gateway call under the configured deadline.
    async fn with_deadline<T, F>(&self, call: F) -> Result<T>
    where
        F: Future<Output = std::result::Result<T, GatewayError>>,
    {
        match tokio::time::timeout(self.config.gateway_timeout, call).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => {
                metrics::counter!("payment_gateway_failures").increment(1);
                Err(e.into())
            }
            Err(_) => {
                metrics::counter!("payment_gateway_failures").increment(1);
                Err(GatewayError::TimedOut(self.config.gateway_timeout).into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PaymentError;
    use crate::gateway::{MockGateway, SessionState};
    use async_trait::async_trait;
    use common::UserId;
    use domain::{OrderStatus, PaymentStatus, PlaceOrder, Product, ProductId};
    use store::MemoryStore;

    async fn stored_order(store: &MemoryStore, method: PaymentMethod) -> Order {
        let input = PlaceOrder {
            buyer_id: UserId::new(),
            buyer_email: "buyer@example.com".to_string(),
            product_id: ProductId::new("SKU-001"),
            quantity: 1,
            total_price: 49.99,
            payment_method: method,
            first_name: "Rahim".to_string(),
            last_name: "Uddin".to_string(),
            contact_number: "01700000000".to_string(),
            delivery_address: "House 12, Road 5".to_string(),
            note: String::new(),
        };
        let product = Product::new("SKU-001", "Ceramic mug", Money::from_cents(4999), 5);
        let order = Order::place(&input, &product);
        store.insert_order(&order).await.unwrap();
        order
    }

    fn reconciler(
        store: &MemoryStore,
        gateway: &MockGateway,
    ) -> PaymentReconciler<MemoryStore, MockGateway> {
        PaymentReconciler::new(store.clone(), gateway.clone(), CheckoutConfig::default())
    }

    #[tokio::test]
    async fn test_initiate_embeds_order_and_amount() {
        let store = MemoryStore::new();
        let gateway = MockGateway::new();
        let order = stored_order(&store, PaymentMethod::Payfirst).await;

        let session = reconciler(&store, &gateway)
            .initiate(order.id)
            .await
            .unwrap();

        let state = gateway.retrieve_session(&session.id).await.unwrap();
        assert_eq!(state.order_id, order.id);
        assert_eq!(state.customer_email, "buyer@example.com");
        // 49.99 in minor units, exactly.
        assert_eq!(state.amount_total, 4999);
    }

    #[tokio::test]
    async fn test_initiate_rejects_cod_orders() {
        let store = MemoryStore::new();
        let gateway = MockGateway::new();
        let order = stored_order(&store, PaymentMethod::Cod).await;

        let err = reconciler(&store, &gateway)
            .initiate(order.id)
            .await
            .unwrap_err();
        assert!(matches!(
            err.as_domain(),
            Some(DomainError::InvalidInput {
                field: "payment_method",
                ..
            })
        ));
        assert_eq!(gateway.session_count(), 0);
    }

    #[tokio::test]
    async fn test_initiate_unknown_order() {
        let store = MemoryStore::new();
        let gateway = MockGateway::new();

        let err = reconciler(&store, &gateway)
            .initiate(OrderId::new())
            .await
            .unwrap_err();
        assert!(matches!(
            err.as_domain(),
            Some(DomainError::NotFound { entity: "order", .. })
        ));
    }

    #[tokio::test]
    async fn test_unsettled_session_is_a_pending_no_op() {
        let store = MemoryStore::new();
        let gateway = MockGateway::new();
        let order = stored_order(&store, PaymentMethod::Payfirst).await;
        let r = reconciler(&store, &gateway);

        let session = r.initiate(order.id).await.unwrap();
        let outcome = r.confirm(&session.id).await.unwrap();

        assert!(!outcome.is_confirmed());
        let order = store.order(order.id).await.unwrap().unwrap();
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.payment_status, PaymentStatus::Unpaid);
        assert_eq!(store.payment_count().await, 0);
    }

    #[tokio::test]
    async fn test_settlement_pays_and_auto_approves() {
        let store = MemoryStore::new();
        let gateway = MockGateway::new();
        let order = stored_order(&store, PaymentMethod::Payfirst).await;
        let r = reconciler(&store, &gateway);

        let session = r.initiate(order.id).await.unwrap();
        let intent = gateway.settle(&session.id).unwrap();

        let outcome = r.confirm(&session.id).await.unwrap();
        assert!(outcome.is_confirmed());

        let order = store.order(order.id).await.unwrap().unwrap();
        assert_eq!(order.status, OrderStatus::Approved);
        assert_eq!(order.payment_status, PaymentStatus::Paid);
        assert_eq!(order.transaction_id, Some(TransactionId::new(intent.clone())));
        assert!(order.approved_at.is_some());

        let record = store
            .payment(&TransactionId::new(intent))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record.order_id, order.id);
        assert_eq!(record.amount.cents(), 4999);
    }

    #[tokio::test]
    async fn test_confirm_twice_keeps_one_record() {
        let store = MemoryStore::new();
        let gateway = MockGateway::new();
        let order = stored_order(&store, PaymentMethod::Payfirst).await;
        let r = reconciler(&store, &gateway);

        let session = r.initiate(order.id).await.unwrap();
        gateway.settle(&session.id).unwrap();

        let first = r.confirm(&session.id).await.unwrap();
        let second = r.confirm(&session.id).await.unwrap();
        assert!(first.is_confirmed());
        assert!(second.is_confirmed());

        assert_eq!(store.payment_count().await, 1);
        let order = store.order(order.id).await.unwrap().unwrap();
        assert_eq!(order.status, OrderStatus::Approved);
    }

    #[tokio::test]
    async fn test_settlement_after_cancellation_conflicts() {
        let store = MemoryStore::new();
        let gateway = MockGateway::new();
        let order = stored_order(&store, PaymentMethod::Payfirst).await;
        let r = reconciler(&store, &gateway);

        let session = r.initiate(order.id).await.unwrap();
        gateway.settle(&session.id).unwrap();
        store
            .transition_status(order.id, OrderStatus::Pending, OrderStatus::Cancelled)
            .await
            .unwrap();

        let err = r.confirm(&session.id).await.unwrap_err();
        assert!(matches!(
            err.as_domain(),
            Some(DomainError::InvalidTransition {
                current: OrderStatus::Cancelled,
                action: "settle",
            })
        ));
        assert_eq!(store.payment_count().await, 0);
    }

    #[tokio::test]
    async fn test_initiate_after_settlement_is_refused() {
        let store = MemoryStore::new();
        let gateway = MockGateway::new();
        let order = stored_order(&store, PaymentMethod::Payfirst).await;
        let r = reconciler(&store, &gateway);

        let session = r.initiate(order.id).await.unwrap();
        gateway.settle(&session.id).unwrap();
        r.confirm(&session.id).await.unwrap();

        let err = r.initiate(order.id).await.unwrap_err();
        assert!(matches!(
            err.as_domain(),
            Some(DomainError::InvalidTransition { .. })
        ));
    }

    #[tokio::test]
    async fn test_gateway_outage_leaves_order_untouched() {
        let store = MemoryStore::new();
        let gateway = MockGateway::new();
        let order = stored_order(&store, PaymentMethod::Payfirst).await;
        let r = reconciler(&store, &gateway);

        gateway.set_fail_on_create(true);
        let err = r.initiate(order.id).await.unwrap_err();
        assert!(err.is_gateway());

        let order = store.order(order.id).await.unwrap().unwrap();
        assert_eq!(order.payment_status, PaymentStatus::Unpaid);
    }

    /// Gateway that never answers, for exercising the deadline.
    struct StalledGateway;

    #[async_trait]
    impl PaymentGateway for StalledGateway {
        async fn create_session(
            &self,
            _request: CheckoutRequest,
        ) -> std::result::Result<CheckoutSession, GatewayError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            unreachable!("the deadline fires first")
        }

        async fn retrieve_session(
            &self,
            _session_id: &str,
        ) -> std::result::Result<SessionState, GatewayError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            unreachable!("the deadline fires first")
        }
    }

    #[tokio::test]
    async fn test_gateway_deadline_is_enforced() {
        let store = MemoryStore::new();
        let order = stored_order(&store, PaymentMethod::Payfirst).await;

        let config = CheckoutConfig {
            gateway_timeout: Duration::from_millis(20),
            ..CheckoutConfig::default()
        };
        let r = PaymentReconciler::new(store.clone(), StalledGateway, config);

        let err = r.initiate(order.id).await.unwrap_err();
        assert!(matches!(
            err,
            PaymentError::Gateway(GatewayError::TimedOut(_))
        ));
    }
}
