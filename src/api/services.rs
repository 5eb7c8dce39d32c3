use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::debug;

use super::{
    models::{
        HealthResponse, InactivityRequest, LastSeenResponse, RecentEventsParams,
        RecentEventsResponse, RecordEventRequest,
    },
    state::AppState,
};
use crate::api::error::ApiError;
use crate::ledger::{Event, SubjectId, Timestamp};
use crate::query::{InactivityQuery, report_page};

/// Record one activity event (POST /events)
///
/// The event is applied in memory before the snapshot is saved. When the
/// save fails the caller gets 500 `PERSISTENCE_FAILED`, but reads served by
/// this process already include the event.
pub async fn record_event(
    State(state): State<AppState>,
    payload: Result<Json<RecordEventRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = payload?;
    let timestamp = request.timestamp.unwrap_or_else(Timestamp::now);
    let event = Event::new(request.subject_id, request.kind, timestamp);

    let result = state.ledger.record_event(event.clone()).await;
    state.metrics.event_recorded();
    if let Err(err) = result {
        state.metrics.persist_failed();
        return Err(err.into());
    }

    Ok((StatusCode::CREATED, Json(event)))
}

/// Most recent events, oldest first (GET /events/recent?limit=N)
pub async fn recent_events(
    State(state): State<AppState>,
    params: Result<Query<RecentEventsParams>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Query(params) = params?;
    let limit = params
        .limit
        .map(clamp_limit)
        .unwrap_or(state.config.query.recent_limit);

    let events = state.ledger.recent_events(limit).await;
    state.metrics.query_served();

    Ok(Json(RecentEventsResponse { events }))
}

/// Last-seen lookup (GET /subjects/{subject_id}/last-seen)
pub async fn last_seen(
    State(state): State<AppState>,
    Path(subject_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let subject_id = SubjectId::new(subject_id);
    state.metrics.query_served();

    let last_seen = state
        .ledger
        .last_seen(&subject_id)
        .await
        .ok_or_else(|| ApiError::NotFound(format!("subject {subject_id}")))?;

    Ok(Json(LastSeenResponse {
        subject_id,
        last_seen,
    }))
}

/// Inactivity report for a roster (POST /inactivity)
///
/// `now` is taken from the clock here; everything below works on the
/// injected value.
pub async fn inactivity(
    State(state): State<AppState>,
    payload: Result<Json<InactivityRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = payload?;

    let threshold = request
        .threshold
        .unwrap_or(state.config.query.inactivity_threshold);
    let query = InactivityQuery::try_new(threshold.as_duration())?;

    let classified = state
        .ledger
        .classify(&query, &request.roster, Timestamp::now())
        .await;
    let report = report_page(
        classified,
        request.include_active,
        state.config.query.page_size,
        request.page.unwrap_or(1),
    )?;

    debug!(
        roster = request.roster.len(),
        matches = report.total_matches,
        page = report.page,
        "Inactivity query served"
    );
    state.metrics.query_served();

    Ok(Json(report))
}

/// Health check endpoint (GET /health)
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let response = HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        metrics: state.metrics.snapshot(),
    };

    (StatusCode::OK, Json(response))
}

fn clamp_limit(limit: i64) -> usize {
    if limit <= 0 {
        return 0;
    }
    usize::try_from(limit).unwrap_or(usize::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_limit() {
        assert_eq!(clamp_limit(-3), 0);
        assert_eq!(clamp_limit(0), 0);
        assert_eq!(clamp_limit(25), 25);
    }
}
