//! The check-in protocol.
//!
//! Orchestrates one check-in attempt end to end: resolve the participant,
//! acquire a location fix, evaluate the advisory window and range checks,
//! append the attendance record, and refresh the participant's live
//! projection.
//!
//! The protocol never aborts on a location failure; it degrades. A failed
//! acquisition is a meaningful, loggable business event and produces a
//! `Failed` ledger entry; the operation itself still completes. The only hard
//! failures are an unknown event and an unresolvable participant, both of
//! which reject the call before anything is recorded.

use tracing::debug;
use uuid::Uuid;

use crate::config::is_valid_email;
use crate::error::{Result, RollcallError};
use crate::event::{Event, Participant, ParticipantRole};
use crate::geo::{self, Coordinates, DEFAULT_CHECK_IN_RANGE_KM};
use crate::ledger::{self, AttendanceRecord, AttendanceStatus, RecordedLocation};
use crate::location::{
    acquire_location, AcquireOptions, CancelToken, LocationProvider,
};
use crate::store::EventStore;

/// Warning attached to a successful check-in that happened too far from the
/// event location.
pub const OUT_OF_RANGE_WARNING: &str =
    "You appear to be too far from the event location. Check-in may not be accurate.";

/// Phases of one check-in attempt.
///
/// `Completed` is the terminal phase of every resolved attempt, success or
/// failure; a cancelled attempt never leaves `LocatingRequested` and records
/// nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckInPhase {
    /// Nothing requested yet.
    Idle,
    /// Location acquisition is in flight.
    LocatingRequested,
    /// A fix was captured.
    LocationAcquired,
    /// Acquisition failed; the attempt continues as a recorded failure.
    LocationFailed,
    /// The attempt is on the ledger.
    Completed,
}

impl CheckInPhase {
    /// Whether `next` is a legal successor of this phase.
    #[must_use]
    pub fn may_advance_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Idle, Self::LocatingRequested)
                | (Self::LocatingRequested, Self::LocationAcquired)
                | (Self::LocatingRequested, Self::LocationFailed)
                | (Self::LocationAcquired | Self::LocationFailed, Self::Completed)
        )
    }
}

/// How the caller identifies the participant checking in.
#[derive(Debug, Clone)]
pub enum ParticipantIdentity {
    /// A known participant id on the event.
    Id(String),
    /// Walk-up identification by email; resolved case-insensitively against
    /// the event's participants, synthesizing a guest when absent.
    Email {
        /// The email address entered at the check-in page.
        email: String,
        /// Optional display name for a synthesized guest.
        name: Option<String>,
    },
}

/// Tunables for one check-in attempt.
#[derive(Debug, Clone, Copy)]
pub struct CheckInParams {
    /// Location acquisition options.
    pub acquire: AcquireOptions,
    /// Range beyond which a successful check-in gets an out-of-range warning.
    pub range_km: f64,
}

impl Default for CheckInParams {
    fn default() -> Self {
        Self {
            acquire: AcquireOptions::default(),
            range_km: DEFAULT_CHECK_IN_RANGE_KM,
        }
    }
}

/// Result of a resolved check-in attempt.
#[derive(Debug, Clone)]
pub struct CheckInOutcome {
    /// The participant with their projection refreshed.
    pub participant: Participant,
    /// Whether a location fix was captured.
    pub status: AttendanceStatus,
    /// Whether the attempt fell inside the event's check-in window. Advisory:
    /// out-of-window attempts are labeled, never rejected.
    pub within_window: bool,
    /// Out-of-range warning for an otherwise successful check-in. Never
    /// affects `status`.
    pub range_warning: Option<String>,
}

struct FlowState {
    phase: CheckInPhase,
}

impl FlowState {
    fn new() -> Self {
        Self {
            phase: CheckInPhase::Idle,
        }
    }

    fn advance(&mut self, event_id: &str, next: CheckInPhase) {
        debug_assert!(self.phase.may_advance_to(next));
        debug!(event_id, from = ?self.phase, to = ?next, "check-in phase transition");
        self.phase = next;
    }
}

/// Run one check-in attempt for `identity` on the event `event_id`.
///
/// Returns `Ok(None)` when `cancel` fired while the location request was in
/// flight: the attempt is abandoned and no ledger entry is written.
///
/// # Errors
///
/// - [`RollcallError::EventNotFound`]: unknown event
/// - [`RollcallError::ParticipantNotFound`]: identification by id named a
///   participant that is not on the event
/// - [`RollcallError::InvalidEmail`]: walk-up identification with a
///   malformed email
///
/// All location-related failures are *recorded*, not returned: the call
/// succeeds with `status == Failed` and a `Failed` ledger entry carrying the
/// failure's message.
pub async fn check_in(
    store: &dyn EventStore,
    event_id: &str,
    identity: ParticipantIdentity,
    provider: &dyn LocationProvider,
    params: CheckInParams,
    cancel: &CancelToken,
) -> Result<Option<CheckInOutcome>> {
    let mut event = store
        .get_event(event_id)
        .await?
        .ok_or_else(|| RollcallError::EventNotFound(event_id.to_string()))?;

    let participant_index = resolve_participant(&mut event, identity)?;
    let participant_id = event.participants[participant_index].id.clone();

    let mut flow = FlowState::new();
    flow.advance(event_id, CheckInPhase::LocatingRequested);

    let Some(acquisition) = acquire_location(provider, params.acquire, cancel).await else {
        debug!(event_id, %participant_id, "check-in abandoned while locating");
        return Ok(None);
    };

    let now = chrono::Utc::now();
    let (status, location, error_message) = match acquisition {
        Ok(fix) => {
            flow.advance(event_id, CheckInPhase::LocationAcquired);
            (
                AttendanceStatus::Success,
                Some(RecordedLocation::from(fix)),
                None,
            )
        }
        Err(failure) => {
            flow.advance(event_id, CheckInPhase::LocationFailed);
            (AttendanceStatus::Failed, None, Some(failure.to_string()))
        }
    };

    // Advisory range check: flags, never blocks. Success is defined purely as
    // "a fix was captured", independent of geographic plausibility.
    let range_warning = match (location, event_coordinates(store, &event).await?) {
        (Some(fix), Some(venue)) => {
            let user = Coordinates {
                lat: fix.latitude,
                lng: fix.longitude,
            };
            (!geo::within_range(user, venue, params.range_km)).then(|| {
                debug!(
                    event_id,
                    %participant_id,
                    distance_km = geo::distance_km(user, venue),
                    "check-in outside expected range"
                );
                OUT_OF_RANGE_WARNING.to_string()
            })
        }
        _ => None,
    };

    let within_window = event.check_in_window.contains(now);

    event.attendance_log.push(AttendanceRecord {
        id: Uuid::new_v4().to_string(),
        participant_id: participant_id.clone(),
        timestamp: now,
        status,
        location,
        error_message,
    });

    // The projection mirrors the greatest-timestamp entry, which keeps it
    // deterministic when repeat attempts race.
    if let Some(latest) = ledger::latest_for(&event.attendance_log, &participant_id) {
        let latest = latest.clone();
        let participant = &mut event.participants[participant_index];
        participant.check_in_status = latest.status.into();
        participant.check_in_time = Some(latest.timestamp);
        participant.check_in_location = latest.location;
        participant.check_in_error = latest.error_message;
    }

    let participant = event.participants[participant_index].clone();
    store.update_event(event).await?;

    flow.advance(event_id, CheckInPhase::Completed);

    Ok(Some(CheckInOutcome {
        participant,
        status,
        within_window,
        range_warning,
    }))
}

/// Resolve the participant within the event, synthesizing a walk-up guest for
/// unknown emails. Returns the index into `event.participants`.
fn resolve_participant(event: &mut Event, identity: ParticipantIdentity) -> Result<usize> {
    match identity {
        ParticipantIdentity::Id(id) => event
            .participants
            .iter()
            .position(|p| p.id == id)
            .ok_or(RollcallError::ParticipantNotFound(id)),
        ParticipantIdentity::Email { email, name } => {
            if !is_valid_email(&email) {
                return Err(RollcallError::InvalidEmail(email));
            }
            if let Some(index) = event
                .participants
                .iter()
                .position(|p| p.email.eq_ignore_ascii_case(&email))
            {
                return Ok(index);
            }

            // Unregistered guest: walk-up check-in is permitted.
            let name = name
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| email.split('@').next().unwrap_or(&email).to_string());
            let guest = Participant::new(
                &format!("temp-{}", Uuid::new_v4()),
                &name,
                &email,
                ParticipantRole::Other,
            );
            debug!(event_id = %event.id, %email, "synthesized walk-up participant");
            event.participants.push(guest);
            Ok(event.participants.len() - 1)
        }
    }
}

async fn event_coordinates(store: &dyn EventStore, event: &Event) -> Result<Option<Coordinates>> {
    if let Some(coordinates) = event.coordinates {
        return Ok(Some(coordinates));
    }
    if let Some(property_id) = &event.property_id {
        return Ok(store
            .get_property(property_id)
            .await?
            .map(|p| p.coordinates));
    }
    Ok(None)
}
