//! The append-only attendance ledger.
//!
//! Every resolved check-in attempt, successful or not, appends one
//! [`AttendanceRecord`] to its event. Records are never mutated or removed;
//! repeat attempts by the same participant are separate entries. The ledger is
//! the authoritative history; the per-participant projection on the event is a
//! cache of the most recent entry.

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::event::Event;
use crate::location::LocationData;

/// Outcome of a resolved check-in attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    /// A location fix was captured.
    Success,
    /// Location acquisition failed; the attempt is still on record.
    Failed,
}

impl AttendanceStatus {
    /// Human-facing label, as rendered in the CSV export and table views.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Success => "Success",
            Self::Failed => "Failed",
        }
    }
}

/// A captured position as stored on a record or projection.
///
/// Unlike [`LocationData`] this carries no capture timestamp of its own; the
/// record's timestamp is the attempt time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RecordedLocation {
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
    /// Estimated accuracy radius in meters.
    pub accuracy: f64,
}

impl From<LocationData> for RecordedLocation {
    fn from(data: LocationData) -> Self {
        Self {
            latitude: data.latitude,
            longitude: data.longitude,
            accuracy: data.accuracy,
        }
    }
}

/// One entry in an event's attendance ledger. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AttendanceRecord {
    /// Record identifier.
    pub id: String,

    /// The participant this attempt belongs to (reference, not ownership).
    pub participant_id: String,

    /// Attempt time.
    pub timestamp: DateTime<Utc>,

    /// Whether a location fix was captured.
    pub status: AttendanceStatus,

    /// The captured position. Always present on success; may be present on a
    /// failed attempt when capture partially succeeded.
    pub location: Option<RecordedLocation>,

    /// Human-readable failure message. Present on failure.
    pub error_message: Option<String>,
}

/// The most recent ledger entry for a participant, by timestamp.
///
/// "Most recent" means greatest timestamp, not last appended: concurrent
/// repeat check-ins may append out of timestamp order, and the participant
/// projection must stay deterministic under that race. Ties resolve to the
/// later entry in append order.
#[must_use]
pub fn latest_for<'a>(
    records: &'a [AttendanceRecord],
    participant_id: &str,
) -> Option<&'a AttendanceRecord> {
    records
        .iter()
        .filter(|r| r.participant_id == participant_id)
        .max_by_key(|r| r.timestamp)
}

/// Render an event's ledger as CSV, joined with participant details.
///
/// One header row, then one row per ledger entry in append order: name,
/// email, role, check-in time (`yyyy-MM-dd HH:mm:ss` in `tz`), status label,
/// latitude, longitude. Every field is double-quoted. Pure formatting, no
/// side effects.
#[must_use]
pub fn export_csv(event: &Event, tz: Tz) -> String {
    let mut out = String::new();
    push_row(
        &mut out,
        [
            "Name",
            "Email",
            "Role",
            "Check-in Time",
            "Status",
            "Latitude",
            "Longitude",
        ],
    );

    for record in &event.attendance_log {
        let participant = event
            .participants
            .iter()
            .find(|p| p.id == record.participant_id);

        let (name, email, role) = participant.map_or_else(
            || ("Unknown".to_string(), String::new(), String::new()),
            |p| (p.name.clone(), p.email.clone(), p.role.as_str().to_string()),
        );

        let time = record
            .timestamp
            .with_timezone(&tz)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string();

        let (lat, lng) = record.location.map_or_else(
            || (String::new(), String::new()),
            |loc| (loc.latitude.to_string(), loc.longitude.to_string()),
        );

        push_row(
            &mut out,
            [
                name.as_str(),
                email.as_str(),
                role.as_str(),
                time.as_str(),
                record.status.label(),
                lat.as_str(),
                lng.as_str(),
            ],
        );
    }

    out
}

/// File name for a ledger export: `{title}-attendance-{yyyy-MM-dd}.csv`.
#[must_use]
pub fn export_filename(title: &str, date: NaiveDate) -> String {
    format!("{title}-attendance-{}.csv", date.format("%Y-%m-%d"))
}

fn push_row<const N: usize>(out: &mut String, fields: [&str; N]) {
    for (i, field) in fields.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push('"');
        out.push_str(&field.replace('"', "\"\""));
        out.push('"');
    }
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{Event, EventDraft, EventType, Participant, ParticipantRole};
    use chrono::TimeZone;

    fn record(participant_id: &str, ts: DateTime<Utc>, status: AttendanceStatus) -> AttendanceRecord {
        AttendanceRecord {
            id: uuid::Uuid::new_v4().to_string(),
            participant_id: participant_id.to_string(),
            timestamp: ts,
            status,
            location: matches!(status, AttendanceStatus::Success).then_some(RecordedLocation {
                latitude: 34.052235,
                longitude: -118.243683,
                accuracy: 8.0,
            }),
            error_message: matches!(status, AttendanceStatus::Failed)
                .then(|| "Location information is unavailable.".to_string()),
        }
    }

    fn utc(h: u32, mi: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, h, mi, 0).unwrap()
    }

    fn sample_event() -> Event {
        let draft = EventDraft {
            title: "Viewing: 123 Main Street".to_string(),
            event_type: EventType::PropertyViewing,
            start: utc(10, 0),
            end: utc(11, 0),
            location: "123 Main Street, Los Angeles, CA".to_string(),
            participants: vec![Participant::new(
                "user-1",
                "John Smith",
                "john.smith@example.com",
                ParticipantRole::Agent,
            )],
            ..EventDraft::default()
        };
        Event::create(draft, "http://localhost:5173").unwrap()
    }

    #[test]
    fn test_latest_for_prefers_greatest_timestamp() {
        // Appended out of timestamp order, as racing retries can be
        let records = vec![
            record("user-1", utc(10, 30), AttendanceStatus::Success),
            record("user-1", utc(10, 5), AttendanceStatus::Failed),
            record("user-2", utc(10, 45), AttendanceStatus::Success),
        ];

        let latest = latest_for(&records, "user-1").unwrap();
        assert_eq!(latest.timestamp, utc(10, 30));
        assert_eq!(latest.status, AttendanceStatus::Success);
    }

    #[test]
    fn test_latest_for_unknown_participant_is_none() {
        let records = vec![record("user-1", utc(10, 30), AttendanceStatus::Success)];
        assert!(latest_for(&records, "user-9").is_none());
    }

    #[test]
    fn test_latest_for_timestamp_tie_takes_later_append() {
        let mut a = record("user-1", utc(10, 30), AttendanceStatus::Failed);
        let b = record("user-1", utc(10, 30), AttendanceStatus::Success);
        a.id = "first".to_string();
        let records = vec![a, b];

        assert_eq!(
            latest_for(&records, "user-1").unwrap().status,
            AttendanceStatus::Success
        );
    }

    #[test]
    fn test_export_csv_shape() {
        let mut event = sample_event();
        event
            .attendance_log
            .push(record("user-1", utc(10, 12), AttendanceStatus::Success));
        event
            .attendance_log
            .push(record("user-1", utc(10, 20), AttendanceStatus::Failed));

        let csv = export_csv(&event, chrono_tz::UTC);
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[0],
            "\"Name\",\"Email\",\"Role\",\"Check-in Time\",\"Status\",\"Latitude\",\"Longitude\""
        );
        assert!(lines[1].starts_with("\"John Smith\",\"john.smith@example.com\",\"agent\""));
        assert!(lines[1].contains("\"2024-06-01 10:12:00\""));
        assert!(lines[1].contains("\"Success\""));
        assert!(lines[1].contains("\"34.052235\""));
        // Failed capture: status label present, coordinates empty
        assert!(lines[2].contains("\"Failed\""));
        assert!(lines[2].ends_with("\"\",\"\""));
    }

    #[test]
    fn test_export_csv_rows_match_ledger_order() {
        let mut event = sample_event();
        event
            .attendance_log
            .push(record("user-1", utc(10, 20), AttendanceStatus::Failed));
        event
            .attendance_log
            .push(record("user-1", utc(10, 12), AttendanceStatus::Success));

        let csv = export_csv(&event, chrono_tz::UTC);
        let lines: Vec<&str> = csv.lines().collect();

        // Append order, not timestamp order
        assert!(lines[1].contains("\"Failed\""));
        assert!(lines[2].contains("\"Success\""));
    }

    #[test]
    fn test_export_csv_quotes_embedded_quotes() {
        let mut event = sample_event();
        event.participants[0].name = "John \"Jack\" Smith".to_string();
        event
            .attendance_log
            .push(record("user-1", utc(10, 12), AttendanceStatus::Success));

        let csv = export_csv(&event, chrono_tz::UTC);
        assert!(csv.contains("\"John \"\"Jack\"\" Smith\""));
    }

    #[test]
    fn test_export_filename() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        assert_eq!(
            export_filename("Team Meeting", date),
            "Team Meeting-attendance-2024-06-01.csv"
        );
    }

    #[test]
    fn test_status_labels() {
        assert_eq!(AttendanceStatus::Success.label(), "Success");
        assert_eq!(AttendanceStatus::Failed.label(), "Failed");
    }
}
