//! Device location acquisition.
//!
//! Wraps a positioning capability behind the [`LocationProvider`] trait and
//! turns a single acquisition attempt into one awaitable outcome with a typed
//! failure taxonomy. One call, one attempt: no internal retry and no caching;
//! freshness is the caller's responsibility.
//!
//! Acquisition is cancellable through an explicit [`CancelToken`]. A cancelled
//! attempt yields no outcome at all (`None`), which is what lets the check-in
//! protocol guarantee that abandoned attempts never reach the ledger.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::watch;
use utoipa::ToSchema;

/// A single captured position fix.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct LocationData {
    /// Latitude in degrees.
    #[schema(example = 34.052235)]
    pub latitude: f64,

    /// Longitude in degrees.
    #[schema(example = -118.243683)]
    pub longitude: f64,

    /// Estimated accuracy radius in meters.
    #[schema(example = 12.5)]
    pub accuracy: f64,

    /// Capture instant.
    pub timestamp: DateTime<Utc>,
}

/// Why a location fix could not be acquired.
///
/// The variants mirror the failure modes of platform positioning APIs and are
/// distinguishable by the caller; the rendered messages are what end up as the
/// `error_message` of a failed attendance record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum LocationError {
    /// The user or platform refused the positioning request.
    #[error("Location access was denied. Please enable GPS and allow access.")]
    PermissionDenied,

    /// The platform could not produce a fix.
    #[error("Location information is unavailable.")]
    PositionUnavailable,

    /// The acquisition budget expired before a fix arrived.
    #[error("The request to get location timed out.")]
    Timeout,

    /// No positioning capability exists on this device.
    #[error("Geolocation is not supported on this device.")]
    Unsupported,

    /// Anything the platform did not classify.
    #[error("An unknown error occurred while getting location.")]
    Unknown,
}

/// A positioning capability.
///
/// Implementations perform exactly one acquisition attempt per call. The
/// timeout in [`AcquireOptions`] is enforced by [`acquire_location`], not by
/// the provider, so providers may block indefinitely.
#[async_trait]
pub trait LocationProvider: Send + Sync {
    /// Attempt to acquire the current position.
    async fn current_location(&self) -> Result<LocationData, LocationError>;
}

/// Options for one acquisition attempt.
#[derive(Debug, Clone, Copy)]
pub struct AcquireOptions {
    /// Acquisition budget; expiry fails the attempt with
    /// [`LocationError::Timeout`].
    pub timeout: Duration,
}

impl AcquireOptions {
    /// Default acquisition budget.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);
}

impl Default for AcquireOptions {
    fn default() -> Self {
        Self {
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }
}

/// Cancellation signal for an in-flight acquisition.
///
/// Clones observe the same signal. Once cancelled, a token stays cancelled.
#[derive(Debug, Clone)]
pub struct CancelToken {
    tx: Arc<watch::Sender<bool>>,
    rx: watch::Receiver<bool>,
}

impl CancelToken {
    /// Create a fresh, un-cancelled token.
    #[must_use]
    pub fn new() -> Self {
        let (tx, rx) = watch::channel(false);
        Self {
            tx: Arc::new(tx),
            rx,
        }
    }

    /// Signal cancellation to every clone of this token.
    pub fn cancel(&self) {
        let _ = self.tx.send(true);
    }

    /// Whether cancellation has been signalled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once cancellation is signalled.
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        // The sender lives inside every token clone, so wait_for only returns
        // Err after all tokens are gone, at which point nobody is awaiting.
        let _ = rx.wait_for(|cancelled| *cancelled).await;
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

/// Run one acquisition attempt against `provider`.
///
/// Returns:
/// - `Some(Ok(fix))`: position acquired within budget
/// - `Some(Err(e))`: the provider failed, or the budget expired
///   ([`LocationError::Timeout`])
/// - `None`: `cancel` fired first; the attempt is abandoned and produced no
///   outcome
pub async fn acquire_location(
    provider: &dyn LocationProvider,
    options: AcquireOptions,
    cancel: &CancelToken,
) -> Option<Result<LocationData, LocationError>> {
    tokio::select! {
        // Cancellation wins ties so an already-dismissed attempt never
        // produces an outcome.
        biased;

        () = cancel.cancelled() => None,
        outcome = tokio::time::timeout(options.timeout, provider.current_location()) => {
            Some(outcome.unwrap_or(Err(LocationError::Timeout)))
        }
    }
}

/// A provider backed by an already-resolved report.
///
/// The browser-side client performs the actual platform call and reports
/// either a fix or a typed failure; this adapter lets the server-side protocol
/// run that report through the same acquisition path as a live provider.
#[derive(Debug, Clone)]
pub struct ReportedLocation {
    outcome: Result<LocationData, LocationError>,
}

impl ReportedLocation {
    /// A successfully captured fix.
    #[must_use]
    pub fn fix(data: LocationData) -> Self {
        Self { outcome: Ok(data) }
    }

    /// A reported acquisition failure.
    #[must_use]
    pub fn failure(error: LocationError) -> Self {
        Self {
            outcome: Err(error),
        }
    }
}

#[async_trait]
impl LocationProvider for ReportedLocation {
    async fn current_location(&self) -> Result<LocationData, LocationError> {
        self.outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NeverResolves;

    #[async_trait]
    impl LocationProvider for NeverResolves {
        async fn current_location(&self) -> Result<LocationData, LocationError> {
            std::future::pending().await
        }
    }

    fn sample_fix() -> LocationData {
        LocationData {
            latitude: 34.052235,
            longitude: -118.243683,
            accuracy: 10.0,
            timestamp: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_reported_fix_resolves() {
        let provider = ReportedLocation::fix(sample_fix());
        let outcome = acquire_location(&provider, AcquireOptions::default(), &CancelToken::new())
            .await
            .expect("not cancelled")
            .expect("fix reported");
        assert!((outcome.latitude - 34.052235).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_reported_failure_resolves() {
        let provider = ReportedLocation::failure(LocationError::PermissionDenied);
        let outcome = acquire_location(&provider, AcquireOptions::default(), &CancelToken::new())
            .await
            .expect("not cancelled");
        assert_eq!(outcome, Err(LocationError::PermissionDenied));
    }

    #[tokio::test]
    async fn test_budget_expiry_fails_with_timeout() {
        let options = AcquireOptions {
            timeout: Duration::from_millis(10),
        };
        let outcome = acquire_location(&NeverResolves, options, &CancelToken::new())
            .await
            .expect("not cancelled");
        assert_eq!(outcome, Err(LocationError::Timeout));
    }

    #[tokio::test]
    async fn test_cancelled_attempt_yields_no_outcome() {
        let cancel = CancelToken::new();
        cancel.cancel();
        let outcome = acquire_location(&NeverResolves, AcquireOptions::default(), &cancel).await;
        assert!(outcome.is_none());
    }

    #[tokio::test]
    async fn test_cancel_reaches_clones() {
        let token = CancelToken::new();
        let clone = token.clone();
        assert!(!clone.is_cancelled());
        token.cancel();
        assert!(clone.is_cancelled());
        clone.cancelled().await;
    }

    #[test]
    fn test_denied_message_mentions_gps() {
        let msg = LocationError::PermissionDenied.to_string();
        assert!(msg.contains("Location access was denied"));
        assert!(msg.contains("GPS"));
    }

    #[test]
    fn test_error_kind_serialization() {
        let json = serde_json::to_string(&LocationError::PositionUnavailable).unwrap();
        assert_eq!(json, "\"position_unavailable\"");
    }
}
