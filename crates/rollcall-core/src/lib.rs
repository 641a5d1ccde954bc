//! # rollcall-core
//!
//! Core business logic for the rollcall event-attendance system.
//!
//! This crate provides:
//! - The geolocated check-in protocol (resolve → locate → record → project)
//! - Device location acquisition with a typed failure taxonomy
//! - The append-only attendance ledger and its CSV export
//! - Check-in window policy and great-circle range checks
//! - Check-in URL issuance and scanner-side recognition
//! - The repository trait with an in-memory backend
//! - Configuration management
//!
//! ## Architecture
//!
//! The crate is organized into the following modules:
//!
//! - [`checkin`] - The check-in protocol state machine
//! - [`config`] - Application configuration loading, saving, and validation
//! - [`error`] - Unified error types for the crate
//! - [`event`] - Event, participant, and property domain types
//! - [`geo`] - Haversine distance and range predicates
//! - [`ledger`] - Append-only attendance records and CSV export
//! - [`location`] - Location acquisition with timeout and cancellation
//! - [`qr`] - Check-in URL issuance and parsing
//! - [`store`] - The `EventStore` trait and the in-memory backend
//! - [`window`] - Check-in time window policy

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![warn(missing_docs)]

pub mod checkin;
pub mod config;
pub mod error;
pub mod event;
pub mod geo;
pub mod ledger;
pub mod location;
pub mod qr;
pub mod store;
pub mod window;

// Re-export primary types for convenience
pub use checkin::{
    check_in, CheckInOutcome, CheckInParams, CheckInPhase, ParticipantIdentity,
    OUT_OF_RANGE_WARNING,
};
pub use config::{
    is_valid_email, CheckInSettings, ConfigError, ConfigResult, FrontendConfig, RollcallConfig,
    ServerConfig, SystemConfig, FRONTEND_URL_ENV,
};
pub use error::{Result, RollcallError};
pub use event::{
    CheckInStatus, Event, EventDraft, EventStatus, EventType, EventUpdate, Participant,
    ParticipantRole, Property,
};
pub use geo::{
    distance_km, within_range, Coordinates, DEFAULT_CHECK_IN_RANGE_KM, DEFAULT_PREFILTER_RANGE_KM,
};
pub use ledger::{latest_for, AttendanceRecord, AttendanceStatus, RecordedLocation};
pub use location::{
    acquire_location, AcquireOptions, CancelToken, LocationData, LocationError, LocationProvider,
    ReportedLocation,
};
pub use qr::{check_in_url, parse_check_in_path};
pub use store::{EventStore, InMemoryEventStore};
pub use window::CheckInWindow;
