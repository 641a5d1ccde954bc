//! Unified error types for the rollcall core library.
//!
//! This module provides a unified error type [`RollcallError`] that covers the
//! failure modes of the rollcall system. Some modules also have their own
//! specific error types ([`LocationError`](crate::location::LocationError),
//! [`ConfigError`](crate::config::ConfigError)) for internal use.
//!
//! Location-acquisition failures are deliberately *not* represented here:
//! a failed location fix is a recorded business outcome (a `Failed` ledger
//! entry), never an operation failure. Only hard conditions (unknown event,
//! unresolvable participant, invalid input, persistence trouble) surface as
//! [`RollcallError`].

use std::path::PathBuf;
use thiserror::Error;

/// The unified error type for rollcall operations.
///
/// Each variant is designed to be:
///
/// 1. **Self-descriptive**: The variant name indicates the failure mode
/// 2. **Contextual**: Variants include relevant data for debugging
/// 3. **HTTP-ready**: [`http_status_code`](Self::http_status_code) and
///    [`error_code`](Self::error_code) map variants onto the API surface
#[derive(Debug, Error)]
pub enum RollcallError {
    // =========================================================================
    // DOMAIN ERRORS
    // =========================================================================
    /// No event exists with the given identifier.
    #[error("Event not found: {0}")]
    EventNotFound(String),

    /// The referenced participant is not registered on the event.
    #[error("Participant not found: {0}")]
    ParticipantNotFound(String),

    /// The referenced property does not exist.
    #[error("Property not found: {0}")]
    PropertyNotFound(String),

    /// An event's end time does not come after its start time.
    #[error("Invalid event schedule: end must be after start")]
    InvalidSchedule,

    /// A walk-up check-in supplied an email that is not a valid address.
    #[error("Invalid email address: '{0}'")]
    InvalidEmail(String),

    // =========================================================================
    // CONFIGURATION ERRORS
    // =========================================================================
    /// The configuration file was not found at the expected path.
    #[error("Configuration file not found at: {}", .0.display())]
    ConfigNotFound(PathBuf),

    /// The configuration file exists but could not be parsed.
    #[error("Failed to parse configuration: {0}")]
    ConfigParseError(String),

    /// The configuration was parsed but contains invalid values.
    #[error("Configuration validation failed: {0}")]
    ConfigValidationError(String),

    // =========================================================================
    // PERSISTENCE & I/O ERRORS
    // =========================================================================
    /// An error occurred while persisting or reading data.
    #[error("Persistence error: {0}")]
    PersistenceError(String),

    /// A low-level I/O error occurred.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

/// A specialized [`Result`] type for rollcall operations.
pub type Result<T> = std::result::Result<T, RollcallError>;

impl RollcallError {
    /// Returns `true` if this error means a referenced entity does not exist.
    #[inline]
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::EventNotFound(_) | Self::ParticipantNotFound(_) | Self::PropertyNotFound(_)
        )
    }

    /// Returns `true` if this error is caused by invalid caller input.
    #[inline]
    #[must_use]
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidSchedule | Self::InvalidEmail(_))
    }

    /// Returns `true` if this error is related to configuration.
    #[inline]
    #[must_use]
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            Self::ConfigNotFound(_) | Self::ConfigParseError(_) | Self::ConfigValidationError(_)
        )
    }

    /// Returns `true` if this error is related to I/O or persistence.
    #[inline]
    #[must_use]
    pub fn is_io_error(&self) -> bool {
        matches!(self, Self::PersistenceError(_) | Self::IoError(_))
    }

    /// Returns an HTTP-appropriate status code for this error.
    #[inline]
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            // 400 Bad Request - malformed input
            Self::InvalidSchedule | Self::InvalidEmail(_) => 400,

            // 404 Not Found
            Self::EventNotFound(_) | Self::ParticipantNotFound(_) | Self::PropertyNotFound(_) => {
                404
            }

            // 422 Unprocessable Entity - semantic errors
            Self::ConfigParseError(_) | Self::ConfigValidationError(_) => 422,

            // 500 Internal Server Error - server-side issues
            Self::ConfigNotFound(_) | Self::PersistenceError(_) | Self::IoError(_) => 500,
        }
    }

    /// Returns a machine-readable error code for API responses.
    #[inline]
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::EventNotFound(_) => "EVENT_NOT_FOUND",
            Self::ParticipantNotFound(_) => "PARTICIPANT_NOT_FOUND",
            Self::PropertyNotFound(_) => "PROPERTY_NOT_FOUND",
            Self::InvalidSchedule => "INVALID_SCHEDULE",
            Self::InvalidEmail(_) => "INVALID_EMAIL",
            Self::ConfigNotFound(_) => "CONFIG_NOT_FOUND",
            Self::ConfigParseError(_) => "CONFIG_PARSE_ERROR",
            Self::ConfigValidationError(_) => "CONFIG_VALIDATION_ERROR",
            Self::PersistenceError(_) => "PERSISTENCE_ERROR",
            Self::IoError(_) => "IO_ERROR",
        }
    }
}

// =============================================================================
// CONVERSIONS FROM MODULE-SPECIFIC ERRORS
// =============================================================================

impl From<crate::config::ConfigError> for RollcallError {
    fn from(err: crate::config::ConfigError) -> Self {
        use crate::config::ConfigError;
        match err {
            ConfigError::NotFound(path) => Self::ConfigNotFound(path),
            ConfigError::ReadError { path, source } => {
                Self::PersistenceError(format!("Failed to read {}: {}", path.display(), source))
            }
            ConfigError::WriteError { path, source } => {
                Self::PersistenceError(format!("Failed to write {}: {}", path.display(), source))
            }
            ConfigError::ParseError(e) => Self::ConfigParseError(e),
            ConfigError::SerializeError(e) => Self::ConfigParseError(e),
            ConfigError::ValidationError { field, message } => {
                Self::ConfigValidationError(format!("{field}: {message}"))
            }
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Error as IoErr, ErrorKind};

    #[test]
    fn test_not_found_classification() {
        assert!(RollcallError::EventNotFound("evt-1".into()).is_not_found());
        assert!(RollcallError::ParticipantNotFound("user-1".into()).is_not_found());
        assert!(RollcallError::PropertyNotFound("prop-1".into()).is_not_found());

        assert!(!RollcallError::InvalidSchedule.is_not_found());
    }

    #[test]
    fn test_invalid_input_classification() {
        assert!(RollcallError::InvalidSchedule.is_invalid_input());
        assert!(RollcallError::InvalidEmail("nope".into()).is_invalid_input());

        assert!(!RollcallError::EventNotFound("evt-1".into()).is_invalid_input());
    }

    #[test]
    fn test_config_error_classification() {
        assert!(RollcallError::ConfigNotFound(PathBuf::from("/test")).is_config_error());
        assert!(RollcallError::ConfigParseError("syntax error".into()).is_config_error());
        assert!(RollcallError::ConfigValidationError("invalid value".into()).is_config_error());

        assert!(!RollcallError::InvalidSchedule.is_config_error());
    }

    #[test]
    fn test_io_error_classification() {
        assert!(RollcallError::PersistenceError("store poisoned".into()).is_io_error());
        assert!(RollcallError::IoError(IoErr::new(ErrorKind::NotFound, "test")).is_io_error());

        assert!(!RollcallError::EventNotFound("evt-1".into()).is_io_error());
    }

    #[test]
    fn test_http_status_codes() {
        assert_eq!(RollcallError::InvalidSchedule.http_status_code(), 400);
        assert_eq!(
            RollcallError::EventNotFound("evt-1".into()).http_status_code(),
            404
        );
        assert_eq!(
            RollcallError::ParticipantNotFound("user-1".into()).http_status_code(),
            404
        );
        assert_eq!(
            RollcallError::ConfigValidationError("bad".into()).http_status_code(),
            422
        );
        assert_eq!(
            RollcallError::PersistenceError("error".into()).http_status_code(),
            500
        );
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(
            RollcallError::EventNotFound("evt-1".into()).error_code(),
            "EVENT_NOT_FOUND"
        );
        assert_eq!(RollcallError::InvalidSchedule.error_code(), "INVALID_SCHEDULE");
        assert_eq!(
            RollcallError::ConfigNotFound(PathBuf::new()).error_code(),
            "CONFIG_NOT_FOUND"
        );
    }

    #[test]
    fn test_error_display_messages() {
        let err = RollcallError::EventNotFound("evt-42".into());
        assert!(format!("{err}").contains("evt-42"));

        let err = RollcallError::InvalidSchedule;
        assert!(format!("{err}").contains("end must be after start"));
    }

    #[test]
    fn test_error_is_send_and_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<RollcallError>();
        assert_sync::<RollcallError>();
    }
}
