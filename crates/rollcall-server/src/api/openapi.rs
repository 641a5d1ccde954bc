//! OpenAPI specification generation for the rollcall API.
//!
//! The specification is consumed by the web frontend (TypeScript client
//! generation) and by anyone integrating a scanner or kiosk against the
//! check-in surface. Descriptions are written for both humans and tooling.

use axum::Json;
use utoipa::OpenApi;

use rollcall_core::{
    AttendanceRecord, AttendanceStatus, CheckInStatus, CheckInWindow, Coordinates, Event,
    EventDraft, EventStatus, EventType, EventUpdate, LocationData, LocationError, Participant,
    ParticipantRole, Property, RecordedLocation,
};

use super::error::ErrorResponse;
use super::events::{CheckInRequest, CheckInResponse, DeleteEventResponse};
use super::health::HealthResponse;
use super::participants::NewParticipantRequest;
use super::properties::NewPropertyRequest;

/// Serve the OpenAPI specification as JSON.
///
/// This endpoint is available at `/api/openapi.json` and returns the complete
/// OpenAPI 3.0 specification for the rollcall API.
pub async fn get_openapi_spec() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Returns the OpenAPI specification as a string (for writing to file).
/// Used by the gen-openapi binary.
#[allow(dead_code)]
pub fn get_openapi_json() -> String {
    ApiDoc::openapi()
        .to_pretty_json()
        .expect("Failed to serialize OpenAPI spec")
}

/// Main OpenAPI document structure for rollcall.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "rollcall API",
        version = "0.1.0",
        description = r#"
# rollcall API

rollcall manages real-estate events and records geolocated QR check-ins.

## Overview

1. **Events**: Create and manage appointments. Every event carries a derived
   check-in window (one hour either side of its scheduled times), a stable
   check-in URL for its QR code, and an append-only attendance ledger.
2. **Check-in**: A scanned QR code leads to `POST /events/{id}/check-in`.
   The attempt is recorded whether or not a location fix was captured;
   inspect `status` in the response, not the HTTP code.
3. **Directories**: Flat participant and property lookups used by event
   forms; property coordinates feed the check-in range check.

## Design Philosophy

- **Degrade, don't abort**: a failed location capture is a recorded outcome
- **Advisory gating**: window and range violations are flags, not rejections
- **Ledger first**: the attendance log is authoritative; participant
  check-in fields are a projection of its most recent entry
"#,
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "/api", description = "Local rollcall server")
    ),
    tags(
        (
            name = "system",
            description = "Health checks and system status"
        ),
        (
            name = "events",
            description = "Event management with derived check-in windows and QR URLs"
        ),
        (
            name = "check-in",
            description = "Geolocated check-in recording and attendance export"
        ),
        (
            name = "participants",
            description = "Participant directory"
        ),
        (
            name = "properties",
            description = "Property directory with coordinates for range checks"
        )
    ),
    paths(
        // Health endpoints
        super::health::health_check,
        // Event endpoints
        super::events::list_events,
        super::events::create_event,
        super::events::get_event,
        super::events::update_event,
        super::events::delete_event,
        super::events::events_in_range,
        // Check-in endpoints
        super::events::check_in_participant,
        super::events::export_attendance,
        // Directory endpoints
        super::participants::list_participants,
        super::participants::create_participant,
        super::properties::list_properties,
        super::properties::get_property,
        super::properties::create_property,
    ),
    components(
        schemas(
            // Error types
            ErrorResponse,
            // Health types
            HealthResponse,
            // Domain types
            Event,
            EventDraft,
            EventUpdate,
            EventType,
            EventStatus,
            Participant,
            ParticipantRole,
            CheckInStatus,
            CheckInWindow,
            Property,
            Coordinates,
            // Ledger types
            AttendanceRecord,
            AttendanceStatus,
            RecordedLocation,
            // Location types
            LocationData,
            LocationError,
            // Request/response types
            CheckInRequest,
            CheckInResponse,
            DeleteEventResponse,
            NewParticipantRequest,
            NewPropertyRequest,
        )
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_spec_generation() {
        let spec = ApiDoc::openapi();
        assert_eq!(spec.info.title, "rollcall API");
        assert!(!spec.paths.paths.is_empty());
    }

    #[test]
    fn test_openapi_json_serialization() {
        let json = get_openapi_json();
        assert!(json.contains("\"openapi\":"));
        assert!(json.contains("\"rollcall API\""));
    }

    #[test]
    fn test_check_in_path_is_documented() {
        let spec = ApiDoc::openapi();
        assert!(spec.paths.paths.contains_key("/events/{id}/check-in"));
        assert!(spec
            .paths
            .paths
            .contains_key("/events/{id}/attendance/export"));
    }
}
