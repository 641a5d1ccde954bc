//! Great-circle distance between coordinates.
//!
//! Used to flag (not block) check-ins that happen suspiciously far from the
//! event location.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Mean Earth radius in kilometers.
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Default range for the check-in proximity warning.
pub const DEFAULT_CHECK_IN_RANGE_KM: f64 = 1.0;

/// Default range for silent pre-filters.
///
/// Intentionally a separate knob from [`DEFAULT_CHECK_IN_RANGE_KM`]; the two
/// serve distinct call sites with distinct tolerances.
pub const DEFAULT_PREFILTER_RANGE_KM: f64 = 0.5;

/// A geographic point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Coordinates {
    /// Latitude in degrees.
    #[schema(example = 34.052235)]
    pub lat: f64,

    /// Longitude in degrees.
    #[schema(example = -118.243683)]
    pub lng: f64,
}

/// Haversine great-circle distance between two points, in kilometers.
#[must_use]
pub fn distance_km(a: Coordinates, b: Coordinates) -> f64 {
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lng = (b.lng - a.lng).to_radians();

    let h = (d_lat / 2.0).sin().powi(2)
        + a.lat.to_radians().cos() * b.lat.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_KM * c
}

/// Whether `user` is within `max_km` of `event`.
#[must_use]
pub fn within_range(user: Coordinates, event: Coordinates, max_km: f64) -> bool {
    distance_km(user, event) <= max_km
}
