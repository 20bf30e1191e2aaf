//! Delivery tracking timelines.

use std::sync::Arc;

use common::OrderId;
use domain::{DomainError, RecordMilestone, TrackingEntry};
use store::{OrderStore, TrackingStore};

use crate::error::Result;
use crate::events::{EventRelay, OrderEvent};

/// Appends and reads order tracking timelines.
#[derive(Clone)]
pub struct TrackingService<S> {
    store: S,
    relay: Arc<EventRelay>,
}

impl<S> TrackingService<S>
where
    S: OrderStore + TrackingStore,
{
    /// Creates a tracking service that dispatches through the given relay.
    pub fn new(store: S, relay: Arc<EventRelay>) -> Self {
        Self { store, relay }
    }

    /// Appends a milestone to an order's timeline.
    ///
    /// The timeline is created lazily on first append. A milestone whose
    /// status reads delivered (any casing) is relayed to the completion
    /// handler before this returns, so the caller observes either the
    /// full effect or the failure and can retry; the append itself is
    /// safe to repeat.
    #[tracing::instrument(skip(self, milestone), fields(status = %milestone.status))]
    pub async fn append(
        &self,
        order_id: OrderId,
        milestone: RecordMilestone,
    ) -> Result<TrackingEntry> {
        milestone.validate()?;
        if self.store.order(order_id).await?.is_none() {
            return Err(DomainError::order_not_found(order_id).into());
        }

        let entry = self.store.append_entry(order_id, &milestone).await?;
        metrics::counter!("tracking_entries_total").increment(1);

        if entry.is_delivery() {
            let event = OrderEvent::DeliveryMilestoneRecorded {
                order_id,
                status: entry.status.clone(),
                recorded_at: entry.recorded_at,
            };
            self.relay.dispatch(&event).await?;
        }

        Ok(entry)
    }

    /// Returns an order's timeline, oldest entry first.
    ///
    /// An order with no recorded milestones has an empty timeline; this
    /// never reports the order itself as missing.
    #[tracing::instrument(skip(self))]
    pub async fn timeline(&self, order_id: OrderId) -> Result<Vec<TrackingEntry>> {
        Ok(self.store.entries(order_id).await?)
    }
}
