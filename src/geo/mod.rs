// src/geo/mod.rs
// Great-circle distance and nearest-candidate selection. Pure functions,
// no I/O; everything async lives in the places/chat clients.

use serde::{Deserialize, Serialize};

use crate::places::Candidate;

/// Mean Earth radius in meters (spherical approximation).
pub const EARTH_MEAN_RADIUS: f64 = 6_371_000.0;

/// A (latitude, longitude) pair in floating-point degrees. Immutable once
/// captured from an input event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{}", self.lat, self.lng)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CoordinateParseError {
    #[error("expected 'lat,lng', got '{0}'")]
    MissingSeparator(String),
    #[error("invalid latitude '{0}'")]
    InvalidLatitude(String),
    #[error("invalid longitude '{0}'")]
    InvalidLongitude(String),
    #[error("latitude {0} out of range")]
    LatitudeOutOfRange(f64),
    #[error("longitude {0} out of range")]
    LongitudeOutOfRange(f64),
}

impl std::str::FromStr for Coordinate {
    type Err = CoordinateParseError;

    /// Parses the `"lat,lng"` form used by the `/api/maps` query string.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (lat_s, lng_s) = s
            .split_once(',')
            .ok_or_else(|| CoordinateParseError::MissingSeparator(s.to_string()))?;
        let lat: f64 = lat_s
            .trim()
            .parse()
            .map_err(|_| CoordinateParseError::InvalidLatitude(lat_s.to_string()))?;
        let lng: f64 = lng_s
            .trim()
            .parse()
            .map_err(|_| CoordinateParseError::InvalidLongitude(lng_s.to_string()))?;
        if !(-90.0..=90.0).contains(&lat) {
            return Err(CoordinateParseError::LatitudeOutOfRange(lat));
        }
        if !(-180.0..=180.0).contains(&lng) {
            return Err(CoordinateParseError::LongitudeOutOfRange(lng));
        }
        Ok(Self { lat, lng })
    }
}

/// Haversine distance between two coordinates, in meters.
pub fn haversine_distance(a: Coordinate, b: Coordinate) -> f64 {
    let lat1_rad = a.lat.to_radians();
    let lat2_rad = b.lat.to_radians();
    let dlat = (b.lat - a.lat).to_radians();
    let dlon = (b.lng - a.lng).to_radians();

    let h = (dlat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (dlon / 2.0).sin().powi(2);
    // Floating error can push h past 1 for antipodal points, and asin of
    // anything above 1 is NaN; clamp to the half-circumference.
    let c = 2.0 * h.sqrt().min(1.0).asin();

    EARTH_MEAN_RADIUS * c
}

/// Returns the candidate nearest to `reference`, or `None` for an empty set.
/// Ties go to the candidate appearing first in input order (strict `<`), so
/// repeated calls over the same slice are deterministic.
pub fn select_nearest<'a>(
    reference: Coordinate,
    candidates: &'a [Candidate],
) -> Option<&'a Candidate> {
    let mut nearest: Option<(&Candidate, f64)> = None;
    for candidate in candidates {
        let distance = haversine_distance(reference, candidate.location);
        match nearest {
            Some((_, best)) if distance >= best => {}
            _ => nearest = Some((candidate, distance)),
        }
    }
    nearest.map(|(candidate, _)| candidate)
}
