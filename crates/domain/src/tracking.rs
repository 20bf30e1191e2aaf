//! Tracking timeline entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single milestone on an order's tracking timeline.
///
/// Timelines are append-only: entries keep insertion order and carry
/// server-assigned timestamps that never decrease within one timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackingEntry {
    /// Short label for the fulfillment step.
    pub step: String,

    /// Where the step happened.
    pub location: String,

    /// Free-text details.
    pub note: String,

    /// Milestone status label. Free text apart from the delivered marker.
    pub status: String,

    /// Server-assigned time of recording.
    pub recorded_at: DateTime<Utc>,
}

impl TrackingEntry {
    /// Returns true if this entry marks the order delivered.
    ///
    /// The match is case-insensitive, so "Delivered", "DELIVERED", and
    /// "delivered" all count.
    pub fn is_delivery(&self) -> bool {
        self.status.trim().eq_ignore_ascii_case("delivered")
    }
}
