//! Event, participant, and property domain types.
//!
//! An [`Event`] owns its derived check-in window, its stable check-in URL, and
//! its append-only attendance ledger. Participants are shared by id across
//! events; the per-event check-in projection on [`Participant`] belongs to the
//! event-participant association, not to the global directory entry.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::{Result, RollcallError};
use crate::geo::Coordinates;
use crate::ledger::{AttendanceRecord, RecordedLocation};
use crate::qr;
use crate::window::CheckInWindow;

/// What kind of appointment an event is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum EventType {
    /// Showing a property to prospective buyers.
    PropertyViewing,
    /// One-on-one client meeting.
    ClientMeeting,
    /// Contract signing appointment.
    ContractSigning,
    /// Internal team meeting.
    InternalMeeting,
    /// Follow-up on a lead or prior appointment.
    FollowUp,
}

/// Scheduling status of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    /// Confirmed and on the calendar.
    Scheduled,
    /// Awaiting confirmation.
    Pending,
    /// Took place.
    Completed,
    /// Called off.
    Cancelled,
}

/// Role of a participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ParticipantRole {
    /// Listing or selling agent.
    Agent,
    /// Client or prospect.
    Client,
    /// Back-office administrator.
    Admin,
    /// Walk-up guest or anyone else.
    Other,
}

impl ParticipantRole {
    /// The wire/CSV label for this role.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Agent => "agent",
            Self::Client => "client",
            Self::Admin => "admin",
            Self::Other => "other",
        }
    }
}

/// Live check-in state of a participant within one event.
///
/// A single tagged enum: the legacy "checked in without detail" boolean form
/// maps onto [`Success`](Self::Success) with no recorded location, never onto
/// a state of its own.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum CheckInStatus {
    /// No check-in attempt recorded yet.
    #[default]
    Unset,
    /// The most recent attempt captured a location fix.
    Success,
    /// The most recent attempt failed to capture a location.
    Failed,
}

impl From<crate::ledger::AttendanceStatus> for CheckInStatus {
    fn from(status: crate::ledger::AttendanceStatus) -> Self {
        match status {
            crate::ledger::AttendanceStatus::Success => Self::Success,
            crate::ledger::AttendanceStatus::Failed => Self::Failed,
        }
    }
}

/// A participant on an event.
///
/// The `check_in_*` fields are the live projection of this participant's most
/// recent ledger entry for the owning event. The ledger is authoritative; the
/// projection is refreshed by the check-in protocol after every append.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Participant {
    /// Participant identifier.
    pub id: String,

    /// Display name.
    #[schema(example = "John Smith")]
    pub name: String,

    /// Email address; the human-facing identity key for walk-up check-in.
    #[schema(example = "john.smith@example.com")]
    pub email: String,

    /// Role of this participant.
    pub role: ParticipantRole,

    /// Status of the most recent check-in attempt, if any.
    #[serde(default)]
    pub check_in_status: CheckInStatus,

    /// Time of the most recent check-in attempt.
    #[serde(default)]
    pub check_in_time: Option<DateTime<Utc>>,

    /// Location captured by the most recent attempt.
    #[serde(default)]
    pub check_in_location: Option<RecordedLocation>,

    /// Error message from the most recent attempt, when it failed.
    #[serde(default)]
    pub check_in_error: Option<String>,
}

impl Participant {
    /// A participant with no check-in history.
    #[must_use]
    pub fn new(id: &str, name: &str, email: &str, role: ParticipantRole) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            email: email.to_string(),
            role,
            check_in_status: CheckInStatus::Unset,
            check_in_time: None,
            check_in_location: None,
            check_in_error: None,
        }
    }
}

/// A property that events can link to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Property {
    /// Property identifier.
    pub id: String,
    /// Street address.
    #[schema(example = "123 Main Street")]
    pub address: String,
    /// City.
    pub city: String,
    /// State or region code.
    pub state: String,
    /// Postal code.
    pub zip_code: String,
    /// Listing price, when known.
    pub price: Option<f64>,
    /// Free-text property type ("Condo", "Single Family Home", ...).
    pub property_type: Option<String>,
    /// Geographic position, used to range-check check-ins.
    pub coordinates: Coordinates,
}

/// A calendar event with its check-in state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Event {
    /// Event identifier.
    pub id: String,

    /// Title shown on calendars and check-in pages.
    #[schema(example = "Viewing: 123 Main Street")]
    pub title: String,

    /// Kind of appointment.
    pub event_type: EventType,

    /// Scheduled start.
    pub start: DateTime<Utc>,

    /// Scheduled end; always after `start`.
    pub end: DateTime<Utc>,

    /// Whether the event spans the whole day.
    pub all_day: bool,

    /// Scheduling status.
    pub status: EventStatus,

    /// Human-readable location text.
    #[schema(example = "123 Main Street, Los Angeles, CA 90001")]
    pub location: String,

    /// Geographic position of the venue, when known.
    pub coordinates: Option<Coordinates>,

    /// Linked property, when the event concerns one.
    pub property_id: Option<String>,

    /// Participants. Order is irrelevant.
    pub participants: Vec<Participant>,

    /// Valid scan window; recomputed whenever `start` or `end` changes.
    pub check_in_window: CheckInWindow,

    /// Check-in URL encoded by the QR code. Generated once at creation and
    /// stable for the event's lifetime.
    pub qr_code: String,

    /// Append-only check-in history, in append order.
    pub attendance_log: Vec<AttendanceRecord>,

    /// Free-text description.
    pub description: Option<String>,

    /// Who created the event.
    pub created_by: Option<String>,

    /// Creation time.
    pub created_at: DateTime<Utc>,

    /// Last update time, if ever updated.
    pub updated_at: Option<DateTime<Utc>>,
}

/// Input for creating an event.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct EventDraft {
    /// Title.
    pub title: String,
    /// Kind of appointment.
    pub event_type: EventType,
    /// Scheduled start.
    pub start: DateTime<Utc>,
    /// Scheduled end; must be after `start`.
    pub end: DateTime<Utc>,
    /// Whether the event spans the whole day.
    #[serde(default)]
    pub all_day: bool,
    /// Scheduling status.
    #[serde(default = "default_status")]
    pub status: EventStatus,
    /// Human-readable location text.
    pub location: String,
    /// Geographic position of the venue.
    #[serde(default)]
    pub coordinates: Option<Coordinates>,
    /// Linked property.
    #[serde(default)]
    pub property_id: Option<String>,
    /// Initial participants.
    #[serde(default)]
    pub participants: Vec<Participant>,
    /// Free-text description.
    #[serde(default)]
    pub description: Option<String>,
    /// Creator.
    #[serde(default)]
    pub created_by: Option<String>,
}

fn default_status() -> EventStatus {
    EventStatus::Scheduled
}

impl Default for EventDraft {
    fn default() -> Self {
        let start = Utc::now();
        Self {
            title: String::new(),
            event_type: EventType::InternalMeeting,
            start,
            end: start + Duration::hours(1),
            all_day: false,
            status: EventStatus::Scheduled,
            location: String::new(),
            coordinates: None,
            property_id: None,
            participants: Vec::new(),
            description: None,
            created_by: None,
        }
    }
}

/// Partial update for an event. Absent fields keep their current value.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct EventUpdate {
    /// New title.
    pub title: Option<String>,
    /// New kind of appointment.
    pub event_type: Option<EventType>,
    /// New scheduled start; triggers a window recompute.
    pub start: Option<DateTime<Utc>>,
    /// New scheduled end; triggers a window recompute.
    pub end: Option<DateTime<Utc>>,
    /// New all-day flag.
    pub all_day: Option<bool>,
    /// New scheduling status.
    pub status: Option<EventStatus>,
    /// New location text.
    pub location: Option<String>,
    /// New venue position.
    pub coordinates: Option<Coordinates>,
    /// New linked property.
    pub property_id: Option<String>,
    /// Replacement participant set.
    pub participants: Option<Vec<Participant>>,
    /// New description.
    pub description: Option<String>,
}

impl Event {
    /// Create an event from a draft.
    ///
    /// Initializes the check-in window, the stable check-in URL (against
    /// `origin`), and an empty attendance ledger.
    ///
    /// # Errors
    ///
    /// Returns [`RollcallError::InvalidSchedule`] when `end` is not after
    /// `start`.
    pub fn create(draft: EventDraft, origin: &str) -> Result<Self> {
        if draft.end <= draft.start {
            return Err(RollcallError::InvalidSchedule);
        }

        let id = Uuid::new_v4().to_string();
        let check_in_window = CheckInWindow::compute(draft.start, draft.end);
        let qr_code = qr::check_in_url(origin, &id);

        Ok(Self {
            id,
            title: draft.title,
            event_type: draft.event_type,
            start: draft.start,
            end: draft.end,
            all_day: draft.all_day,
            status: draft.status,
            location: draft.location,
            coordinates: draft.coordinates,
            property_id: draft.property_id,
            participants: draft.participants,
            check_in_window,
            qr_code,
            attendance_log: Vec::new(),
            description: draft.description,
            created_by: draft.created_by,
            created_at: Utc::now(),
            updated_at: None,
        })
    }

    /// Apply a partial update.
    ///
    /// The check-in window is recomputed only when `start` or `end` is
    /// present in the update. The check-in URL is never regenerated, except
    /// backfilled against `origin` when absent.
    ///
    /// # Errors
    ///
    /// Returns [`RollcallError::InvalidSchedule`] when the resulting `end`
    /// would not be after the resulting `start`.
    pub fn apply_update(&mut self, update: EventUpdate, origin: &str) -> Result<()> {
        let start = update.start.unwrap_or(self.start);
        let end = update.end.unwrap_or(self.end);
        if end <= start {
            return Err(RollcallError::InvalidSchedule);
        }

        let schedule_changed = update.start.is_some() || update.end.is_some();

        if let Some(title) = update.title {
            self.title = title;
        }
        if let Some(event_type) = update.event_type {
            self.event_type = event_type;
        }
        self.start = start;
        self.end = end;
        if let Some(all_day) = update.all_day {
            self.all_day = all_day;
        }
        if let Some(status) = update.status {
            self.status = status;
        }
        if let Some(location) = update.location {
            self.location = location;
        }
        if let Some(coordinates) = update.coordinates {
            self.coordinates = Some(coordinates);
        }
        if let Some(property_id) = update.property_id {
            self.property_id = Some(property_id);
        }
        if let Some(participants) = update.participants {
            self.participants = participants;
        }
        if let Some(description) = update.description {
            self.description = Some(description);
        }

        if schedule_changed {
            self.check_in_window = CheckInWindow::compute(self.start, self.end);
        }
        if self.qr_code.is_empty() {
            self.qr_code = qr::check_in_url(origin, &self.id);
        }
        self.updated_at = Some(Utc::now());

        Ok(())
    }

    /// Find a participant by id.
    #[must_use]
    pub fn participant_by_id(&self, id: &str) -> Option<&Participant> {
        self.participants.iter().find(|p| p.id == id)
    }

    /// Find a participant by email, case-insensitively.
    #[must_use]
    pub fn participant_by_email(&self, email: &str) -> Option<&Participant> {
        self.participants
            .iter()
            .find(|p| p.email.eq_ignore_ascii_case(email))
    }
}
