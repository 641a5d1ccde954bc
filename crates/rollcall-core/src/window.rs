//! Check-in time window policy.
//!
//! Every event carries a derived window of one hour either side of its
//! scheduled times. The window is advisory: attempts outside it are labeled,
//! not rejected, and any blocking happens in the consuming UI.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// The valid scan window around an event's start and end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CheckInWindow {
    /// One hour before the event starts.
    pub window_start: DateTime<Utc>,

    /// One hour after the event ends.
    pub window_end: DateTime<Utc>,
}

impl CheckInWindow {
    /// Compute the window for the given scheduled times.
    ///
    /// Recomputed whenever an event's start or end changes.
    #[must_use]
    pub fn compute(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            window_start: start - Duration::hours(1),
            window_end: end + Duration::hours(1),
        }
    }

    /// Whether `now` falls within the window (inclusive on both ends).
    #[must_use]
    pub fn contains(&self, now: DateTime<Utc>) -> bool {
        self.window_start <= now && now <= self.window_end
    }
}
