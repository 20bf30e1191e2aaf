//! Tracking timeline endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use domain::{RecordMilestone, TrackingEntry};
use serde::{Deserialize, Serialize};
use store::Datastore;

use crate::error::ApiError;
use crate::routes::orders::AppState;
use crate::routes::{parse_order_id, require_actor};

// -- Request types --

#[derive(Deserialize)]
pub struct RecordMilestoneRequest {
    pub step: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub note: String,
    pub status: String,
}

// -- Response types --

#[derive(Serialize)]
pub struct TrackingEntryResponse {
    pub step: String,
    pub location: String,
    pub note: String,
    pub status: String,
    pub recorded_at: String,
}

impl TrackingEntryResponse {
    fn from_entry(entry: &TrackingEntry) -> Self {
        Self {
            step: entry.step.clone(),
            location: entry.location.clone(),
            note: entry.note.clone(),
            status: entry.status.clone(),
            recorded_at: entry.recorded_at.to_rfc3339(),
        }
    }
}

// -- Handlers --

/// POST /trackings/:order_id — append a milestone to an order's timeline.
#[tracing::instrument(skip(state, headers, req))]
pub async fn append<S: Datastore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(order_id): Path<String>,
    headers: HeaderMap,
    Json(req): Json<RecordMilestoneRequest>,
) -> Result<(axum::http::StatusCode, Json<TrackingEntryResponse>), ApiError> {
    require_actor(&headers)?;
    let order_id = parse_order_id(&order_id)?;

    let milestone = RecordMilestone {
        step: req.step,
        location: req.location,
        note: req.note,
        status: req.status,
    };

    let entry = state.tracking.append(order_id, milestone).await?;

    Ok((
        axum::http::StatusCode::CREATED,
        Json(TrackingEntryResponse::from_entry(&entry)),
    ))
}

/// GET /trackings/:order_id — read an order's timeline, oldest first.
///
/// An order without milestones yields an empty array, never a 404.
#[tracing::instrument(skip(state, headers))]
pub async fn timeline<S: Datastore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(order_id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<Vec<TrackingEntryResponse>>, ApiError> {
    require_actor(&headers)?;
    let order_id = parse_order_id(&order_id)?;

    let entries = state.tracking.timeline(order_id).await?;
    let responses = entries
        .iter()
        .map(TrackingEntryResponse::from_entry)
        .collect();
    Ok(Json(responses))
}
