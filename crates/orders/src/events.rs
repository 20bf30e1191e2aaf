//! Order events and the in-process relay that delivers them.
//!
//! The tracking flow does not call back into the order service directly.
//! It emits an event through the relay and a registered handler performs
//! the follow-up, which keeps the coupling one-directional and lets tests
//! observe or replace the reaction.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::OrderId;
use store::Datastore;

use crate::error::Result;
use crate::service::OrderService;

/// Events emitted by the order flows.
#[derive(Debug, Clone)]
pub enum OrderEvent {
    /// A milestone with a delivered status landed on an order's timeline.
    DeliveryMilestoneRecorded {
        order_id: OrderId,
        status: String,
        recorded_at: DateTime<Utc>,
    },
}

impl OrderEvent {
    /// Returns the event type name for logging.
    pub fn event_type(&self) -> &'static str {
        match self {
            OrderEvent::DeliveryMilestoneRecorded { .. } => "DeliveryMilestoneRecorded",
        }
    }
}

/// Handles order events delivered through the relay.
#[async_trait]
pub trait OrderEventHandler: Send + Sync {
    /// Returns the handler name for logging.
    fn name(&self) -> &'static str;

    /// Handles a single event.
    async fn handle(&self, event: &OrderEvent) -> Result<()>;
}

/// Delivers order events to registered handlers.
///
/// Handlers run in registration order and dispatch is awaited; the first
/// handler error aborts the remainder so the caller observes the failure
/// and can retry.
#[derive(Default)]
pub struct EventRelay {
    handlers: Vec<Arc<dyn OrderEventHandler>>,
}

impl EventRelay {
    /// Creates an empty relay.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler with this relay.
    pub fn register(&mut self, handler: Arc<dyn OrderEventHandler>) {
        self.handlers.push(handler);
    }

    /// Returns the number of registered handlers.
    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    /// Delivers one event to every registered handler.
    #[tracing::instrument(skip(self, event), fields(event_type = event.event_type()))]
    pub async fn dispatch(&self, event: &OrderEvent) -> Result<()> {
        for handler in &self.handlers {
            handler.handle(event).await?;
            metrics::counter!("order_events_handled").increment(1);
            tracing::debug!(handler = handler.name(), "event handled");
        }
        Ok(())
    }
}

/// Completes an order when its delivery milestone is recorded.
pub struct DeliveryCompletion<S> {
    orders: OrderService<S>,
}

impl<S> DeliveryCompletion<S>
where
    S: Datastore + Clone + 'static,
{
    /// Creates the handler around an order service.
    pub fn new(orders: OrderService<S>) -> Self {
        Self { orders }
    }
}

#[async_trait]
impl<S> OrderEventHandler for DeliveryCompletion<S>
where
    S: Datastore + Clone + 'static,
{
    fn name(&self) -> &'static str {
        "DeliveryCompletion"
    }

    async fn handle(&self, event: &OrderEvent) -> Result<()> {
        match event {
            OrderEvent::DeliveryMilestoneRecorded { order_id, .. } => {
                self.orders.complete(*order_id).await?;
                Ok(())
            }
        }
    }
}
