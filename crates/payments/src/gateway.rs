//! Payment gateway port and its mock implementation.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use common::OrderId;
use domain::Money;
use uuid::Uuid;

use crate::error::GatewayError;

/// Request to open a hosted checkout session.
#[derive(Debug, Clone)]
pub struct CheckoutRequest {
    /// Order being paid for; travels as session metadata.
    pub order_id: OrderId,
    /// Buyer identity for the provider's receipt.
    pub buyer_email: String,
    /// Amount to collect.
    pub amount: Money,
    /// Where the provider sends the buyer after payment.
    pub success_url: String,
    /// Where the provider sends the buyer on abandonment.
    pub cancel_url: String,
}

/// A checkout session the buyer gets redirected to.
#[derive(Debug, Clone)]
pub struct CheckoutSession {
    /// Provider-assigned session id.
    pub id: String,
    /// Hosted payment page URL.
    pub url: String,
}

/// Provider-side view of a session when queried back.
#[derive(Debug, Clone)]
pub struct SessionState {
    /// Provider-assigned session id.
    pub id: String,
    /// True once the provider has collected the payment.
    pub settled: bool,
    /// Transaction id, present once settled.
    pub payment_intent: Option<String>,
    /// Buyer identity echoed back from the session metadata.
    pub customer_email: String,
    /// Collected amount in minor units.
    pub amount_total: i64,
    /// Order id echoed back from the session metadata.
    pub order_id: OrderId,
}

/// Port to the hosted payment provider.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Opens a checkout session for an order.
    async fn create_session(
        &self,
        request: CheckoutRequest,
    ) -> Result<CheckoutSession, GatewayError>;

    /// Retrieves the current state of a session.
    async fn retrieve_session(&self, session_id: &str) -> Result<SessionState, GatewayError>;
}

#[derive(Debug)]
struct MockSession {
    request: CheckoutRequest,
    settled: bool,
    payment_intent: Option<String>,
}

#[derive(Debug, Default)]
struct MockGatewayState {
    sessions: HashMap<String, MockSession>,
    fail_on_create: bool,
    fail_on_retrieve: bool,
}

/// In-memory gateway for tests and the default binary.
///
/// Sessions start unsettled; tests drive settlement through [`settle`]
/// the way a buyer completing the hosted page would.
///
/// [`settle`]: MockGateway::settle
#[derive(Debug, Clone, Default)]
pub struct MockGateway {
    state: Arc<RwLock<MockGatewayState>>,
}

impl MockGateway {
    /// Creates a new mock gateway with no sessions.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the gateway to fail session creation.
    pub fn set_fail_on_create(&self, fail: bool) {
        self.state.write().unwrap().fail_on_create = fail;
    }

    /// Configures the gateway to fail session retrieval.
    pub fn set_fail_on_retrieve(&self, fail: bool) {
        self.state.write().unwrap().fail_on_retrieve = fail;
    }

    /// Marks a session settled and assigns it a payment intent.
    ///
    /// Returns the intent id, or None for an unknown session. Settling
    /// twice keeps the original intent.
    pub fn settle(&self, session_id: &str) -> Option<String> {
        let mut state = self.state.write().unwrap();
        let session = state.sessions.get_mut(session_id)?;
        session.settled = true;
        let intent = session
            .payment_intent
            .get_or_insert_with(|| format!("pi_{}", Uuid::new_v4()));
        Some(intent.clone())
    }

    /// Returns the number of sessions ever created.
    pub fn session_count(&self) -> usize {
        self.state.read().unwrap().sessions.len()
    }
}

#[async_trait]
impl PaymentGateway for MockGateway {
    async fn create_session(
        &self,
        request: CheckoutRequest,
    ) -> Result<CheckoutSession, GatewayError> {
        let mut state = self.state.write().unwrap();

        if state.fail_on_create {
            return Err(GatewayError::Unavailable("simulated outage".to_string()));
        }

        let id = format!("mock_cs_{}", Uuid::new_v4());
        let url = format!("https://checkout.example.com/pay/{id}");
        state.sessions.insert(
            id.clone(),
            MockSession {
                request,
                settled: false,
                payment_intent: None,
            },
        );

        Ok(CheckoutSession { id, url })
    }

    async fn retrieve_session(&self, session_id: &str) -> Result<SessionState, GatewayError> {
        let state = self.state.read().unwrap();

        if state.fail_on_retrieve {
            return Err(GatewayError::Unavailable("simulated outage".to_string()));
        }

        let session = state
            .sessions
            .get(session_id)
            .ok_or_else(|| GatewayError::UnknownSession(session_id.to_string()))?;

        Ok(SessionState {
            id: session_id.to_string(),
            settled: session.settled,
            payment_intent: session.payment_intent.clone(),
            customer_email: session.request.buyer_email.clone(),
            amount_total: session.request.amount.cents(),
            order_id: session.request.order_id,
        })
    }
}
