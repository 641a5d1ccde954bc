//! Event management and check-in API endpoints.
//!
//! Event CRUD plus the two check-in surfaces: the check-in operation itself
//! and the attendance CSV export. A check-in always answers 200 once the
//! attempt resolved; a failed location capture is a recorded business
//! outcome, not an HTTP error. Only unknown events and unknown participant
//! ids are error responses.

use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use rollcall_core::{
    check_in, ledger, AttendanceStatus, CancelToken, Event, EventDraft, EventUpdate, LocationData,
    LocationError, Participant, ParticipantIdentity, ReportedLocation,
};

use crate::api::error::{ApiError, ApiResult};
use crate::state::SharedState;

/// Creates the events router with all endpoints.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/", get(list_events).post(create_event))
        .route("/range/{start}/{end}", get(events_in_range))
        .route(
            "/{id}",
            get(get_event).put(update_event).delete(delete_event),
        )
        .route("/{id}/check-in", axum::routing::post(check_in_participant))
        .route("/{id}/attendance/export", get(export_attendance))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Response after deleting an event.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({ "message": "Event deleted successfully" }))]
pub struct DeleteEventResponse {
    /// Confirmation message.
    #[schema(example = "Event deleted successfully")]
    pub message: String,
}

/// Request body for a check-in attempt.
///
/// The participant is identified by `participant_id` when known, or by
/// `email` (plus optional `name`) for walk-up check-in. The client performs
/// the platform geolocation call and reports either the captured fix in
/// `location_data` or the typed failure in `location_error`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[schema(example = json!({
    "participant_id": "user-1",
    "location_data": {
        "latitude": 34.052235,
        "longitude": -118.243683,
        "accuracy": 12.5,
        "timestamp": "2025-01-15T03:30:00Z"
    }
}))]
pub struct CheckInRequest {
    /// Known participant id on the event.
    #[serde(default)]
    pub participant_id: Option<String>,

    /// Walk-up email, used when `participant_id` is absent.
    #[serde(default)]
    pub email: Option<String>,

    /// Optional display name for a walk-up guest.
    #[serde(default)]
    pub name: Option<String>,

    /// The captured location fix, or null when acquisition failed.
    #[serde(default)]
    pub location_data: Option<LocationData>,

    /// Why acquisition failed, when `location_data` is null. Defaults to
    /// `permission_denied`, the dominant failure in practice.
    #[serde(default)]
    pub location_error: Option<LocationError>,
}

/// Response for a resolved check-in attempt.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "participant": {
        "id": "user-1",
        "name": "John Smith",
        "email": "john.smith@example.com",
        "role": "agent",
        "check_in_status": "success",
        "check_in_time": "2025-01-15T03:30:00Z",
        "check_in_location": { "latitude": 34.052235, "longitude": -118.243683, "accuracy": 12.5 },
        "check_in_error": null
    },
    "status": "success",
    "within_window": true,
    "range_warning": null
}))]
pub struct CheckInResponse {
    /// The participant with their projection refreshed.
    pub participant: Participant,

    /// Whether a location fix was captured.
    pub status: AttendanceStatus,

    /// Whether the attempt fell inside the event's check-in window.
    /// Advisory only.
    pub within_window: bool,

    /// Out-of-range warning for an otherwise successful check-in.
    #[schema(nullable)]
    pub range_warning: Option<String>,
}

// ============================================================================
// Handlers
// ============================================================================

/// List all events.
#[utoipa::path(
    get,
    path = "/events",
    tag = "events",
    operation_id = "listEvents",
    summary = "List all events",
    responses(
        (status = 200, description = "All events, ordered by start", body = [Event])
    )
)]
pub async fn list_events(State(state): State<SharedState>) -> ApiResult<Json<Vec<Event>>> {
    Ok(Json(state.store.list_events().await?))
}

/// Create an event.
///
/// Initializes the derived check-in window, the stable check-in URL, and an
/// empty attendance ledger.
#[utoipa::path(
    post,
    path = "/events",
    tag = "events",
    operation_id = "createEvent",
    summary = "Create an event",
    request_body = EventDraft,
    responses(
        (status = 201, description = "Event created", body = Event),
        (status = 400, description = "End not after start")
    )
)]
pub async fn create_event(
    State(state): State<SharedState>,
    Json(draft): Json<EventDraft>,
) -> ApiResult<(axum::http::StatusCode, Json<Event>)> {
    let event = Event::create(draft, &state.config.frontend.base_url)?;
    let event = state.store.create_event(event).await?;
    tracing::info!(event_id = %event.id, title = %event.title, "event created");
    Ok((axum::http::StatusCode::CREATED, Json(event)))
}

/// Get an event by id.
///
/// The response includes the derived `qr_code`, `check_in_window`, and the
/// full `attendance_log`.
#[utoipa::path(
    get,
    path = "/events/{id}",
    tag = "events",
    operation_id = "getEvent",
    summary = "Get an event",
    params(("id" = String, Path, description = "Event id")),
    responses(
        (status = 200, description = "The event", body = Event),
        (status = 404, description = "Event not found")
    )
)]
pub async fn get_event(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Event>> {
    let event = state
        .store
        .get_event(&id)
        .await?
        .ok_or_else(|| not_found(&id))?;
    Ok(Json(event))
}

/// Update an event.
///
/// Partial update: absent fields keep their value. The check-in window is
/// recomputed only when `start` or `end` is present; the check-in URL is
/// never regenerated (only backfilled when absent).
#[utoipa::path(
    put,
    path = "/events/{id}",
    tag = "events",
    operation_id = "updateEvent",
    summary = "Update an event",
    params(("id" = String, Path, description = "Event id")),
    request_body = EventUpdate,
    responses(
        (status = 200, description = "Updated event", body = Event),
        (status = 400, description = "End not after start"),
        (status = 404, description = "Event not found")
    )
)]
pub async fn update_event(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Json(update): Json<EventUpdate>,
) -> ApiResult<Json<Event>> {
    let mut event = state
        .store
        .get_event(&id)
        .await?
        .ok_or_else(|| not_found(&id))?;
    event.apply_update(update, &state.config.frontend.base_url)?;
    let event = state.store.update_event(event).await?;
    Ok(Json(event))
}

/// Delete an event and its attendance ledger.
#[utoipa::path(
    delete,
    path = "/events/{id}",
    tag = "events",
    operation_id = "deleteEvent",
    summary = "Delete an event",
    params(("id" = String, Path, description = "Event id")),
    responses(
        (status = 200, description = "Event deleted", body = DeleteEventResponse),
        (status = 404, description = "Event not found")
    )
)]
pub async fn delete_event(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> ApiResult<Json<DeleteEventResponse>> {
    state.store.delete_event(&id).await?;
    tracing::info!(event_id = %id, "event deleted");
    Ok(Json(DeleteEventResponse {
        message: "Event deleted successfully".to_string(),
    }))
}

/// List events in a date range.
#[utoipa::path(
    get,
    path = "/events/range/{start}/{end}",
    tag = "events",
    operation_id = "eventsInRange",
    summary = "List events starting within a range",
    params(
        ("start" = String, Path, description = "Range start, RFC 3339"),
        ("end" = String, Path, description = "Range end, RFC 3339")
    ),
    responses(
        (status = 200, description = "Events whose start falls within the range", body = [Event]),
        (status = 400, description = "Malformed range bound")
    )
)]
pub async fn events_in_range(
    State(state): State<SharedState>,
    Path((start, end)): Path<(String, String)>,
) -> ApiResult<Json<Vec<Event>>> {
    let start = parse_bound(&start)?;
    let end = parse_bound(&end)?;
    Ok(Json(state.store.events_in_range(start, end).await?))
}

/// Check a participant in to an event.
///
/// Always answers 200 once the attempt resolved, even when `status` is
/// `failed`; callers must inspect `status`, not rely on the HTTP code, to
/// tell a confirmed presence from a degraded one. Out-of-range and
/// out-of-window conditions are advisory flags on the response, never
/// rejections.
#[utoipa::path(
    post,
    path = "/events/{id}/check-in",
    tag = "check-in",
    operation_id = "checkInParticipant",
    summary = "Record a check-in attempt",
    params(("id" = String, Path, description = "Event id")),
    request_body = CheckInRequest,
    responses(
        (status = 200, description = "Attempt resolved and recorded", body = CheckInResponse),
        (status = 400, description = "No participant identification supplied"),
        (status = 404, description = "Event or participant not found")
    )
)]
pub async fn check_in_participant(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Json(request): Json<CheckInRequest>,
) -> ApiResult<Json<CheckInResponse>> {
    let identity = match (request.participant_id, request.email) {
        (Some(participant_id), _) => ParticipantIdentity::Id(participant_id),
        (None, Some(email)) => ParticipantIdentity::Email {
            email,
            name: request.name,
        },
        (None, None) => {
            return Err(ApiError::BadRequest {
                error_code: "participant_identity_required".to_string(),
                message: "Provide participant_id or email to check in".to_string(),
            });
        }
    };

    let provider = match request.location_data {
        Some(fix) => ReportedLocation::fix(fix),
        None => ReportedLocation::failure(
            request
                .location_error
                .unwrap_or(LocationError::PermissionDenied),
        ),
    };

    let outcome = check_in(
        state.store.as_ref(),
        &id,
        identity,
        &provider,
        state.config.check_in_params(),
        &CancelToken::new(),
    )
    .await?
    .ok_or_else(|| ApiError::InternalError {
        error_code: "check_in_abandoned".to_string(),
        message: "Check-in attempt was abandoned before resolving".to_string(),
        details: None,
    })?;

    tracing::info!(
        event_id = %id,
        participant_id = %outcome.participant.id,
        status = outcome.status.label(),
        within_window = outcome.within_window,
        "check-in recorded"
    );

    Ok(Json(CheckInResponse {
        participant: outcome.participant,
        status: outcome.status,
        within_window: outcome.within_window,
        range_warning: outcome.range_warning,
    }))
}

/// Export an event's attendance ledger as CSV.
#[utoipa::path(
    get,
    path = "/events/{id}/attendance/export",
    tag = "check-in",
    operation_id = "exportAttendance",
    summary = "Download the attendance ledger as CSV",
    params(("id" = String, Path, description = "Event id")),
    responses(
        (status = 200, description = "CSV export", content_type = "text/csv", body = String),
        (status = 404, description = "Event not found")
    )
)]
pub async fn export_attendance(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> ApiResult<Response> {
    let event = state
        .store
        .get_event(&id)
        .await?
        .ok_or_else(|| not_found(&id))?;

    let tz: chrono_tz::Tz = state.config.system.timezone;
    let csv = ledger::export_csv(&event, tz);
    let filename = ledger::export_filename(&event.title, Utc::now().with_timezone(&tz).date_naive());

    Ok((
        [
            (
                header::CONTENT_TYPE,
                "text/csv; charset=utf-8".to_string(),
            ),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        csv,
    )
        .into_response())
}

// ============================================================================
// Helpers
// ============================================================================

fn not_found(id: &str) -> ApiError {
    ApiError::NotFound {
        error_code: "event_not_found".to_string(),
        message: format!("Event not found: {id}"),
    }
}

fn parse_bound(value: &str) -> Result<DateTime<Utc>, ApiError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| ApiError::BadRequest {
            error_code: "invalid_date_range".to_string(),
            message: format!("'{value}' is not a valid RFC 3339 timestamp: {e}"),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_in_request_deserialization() {
        let json = r#"{"participant_id": "user-1", "location_data": null}"#;
        let request: CheckInRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.participant_id.as_deref(), Some("user-1"));
        assert!(request.location_data.is_none());
        assert!(request.location_error.is_none());
    }

    #[test]
    fn test_check_in_request_with_error_kind() {
        let json = r#"{"email": "guest@example.com", "location_error": "timeout"}"#;
        let request: CheckInRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.location_error, Some(LocationError::Timeout));
    }

    #[test]
    fn test_parse_bound() {
        assert!(parse_bound("2024-06-01T10:00:00Z").is_ok());
        assert!(parse_bound("not-a-date").is_err());
    }

    #[test]
    fn test_delete_response_serialization() {
        let response = DeleteEventResponse {
            message: "Event deleted successfully".to_string(),
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("deleted successfully"));
    }
}
