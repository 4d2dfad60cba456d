use serde::{Deserialize, Serialize};
use std::{fmt, num::ParseFloatError};
use thiserror::Error;

/// Mean Earth radius used by the haversine formula, in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Why a latitude/longitude pair was rejected.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoordinateError {
    #[error("'{input}' is not a valid coordinate")]
    NotANumber {
        input: String,
        #[source]
        source: ParseFloatError,
    },

    #[error("latitude {0} is outside the range [-90, 90]")]
    LatitudeOutOfRange(f64),

    #[error("longitude {0} is outside the range [-180, 180]")]
    LongitudeOutOfRange(f64),
}

/// A WGS-84 latitude/longitude pair in decimal degrees.
///
/// The fields are private so a `GeoPoint` always holds coordinates in range;
/// build one with [`GeoPoint::new`] or [`GeoPoint::parse`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawPoint", into = "RawPoint")]
pub struct GeoPoint {
    latitude: f64,
    longitude: f64,
}

#[derive(Serialize, Deserialize)]
struct RawPoint {
    latitude: f64,
    longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, CoordinateError> {
        // `contains` is false for NaN, so NaN is rejected here as well.
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(CoordinateError::LatitudeOutOfRange(latitude));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(CoordinateError::LongitudeOutOfRange(longitude));
        }

        Ok(Self { latitude, longitude })
    }

    /// Parse a pair of decimal-degree strings, e.g. `("40.7128", "-74.0060")`.
    pub fn parse(latitude: &str, longitude: &str) -> Result<Self, CoordinateError> {
        Self::new(parse_degrees(latitude)?, parse_degrees(longitude)?)
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Great-circle distance to `other` in kilometers.
    pub fn distance_km(&self, other: &GeoPoint) -> f64 {
        distance(*self, *other)
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.latitude, self.longitude)
    }
}

impl TryFrom<RawPoint> for GeoPoint {
    type Error = CoordinateError;

    fn try_from(raw: RawPoint) -> Result<Self, Self::Error> {
        GeoPoint::new(raw.latitude, raw.longitude)
    }
}

impl From<GeoPoint> for RawPoint {
    fn from(point: GeoPoint) -> Self {
        RawPoint { latitude: point.latitude, longitude: point.longitude }
    }
}

fn parse_degrees(input: &str) -> Result<f64, CoordinateError> {
    input
        .trim()
        .parse::<f64>()
        .map_err(|source| CoordinateError::NotANumber { input: input.to_string(), source })
}

/// Haversine distance between two points on a sphere of radius
/// [`EARTH_RADIUS_KM`], in kilometers.
pub fn distance(a: GeoPoint, b: GeoPoint) -> f64 {
    let phi1 = a.latitude.to_radians();
    let phi2 = b.latitude.to_radians();
    let d_phi = (b.latitude - a.latitude).to_radians();
    let d_lambda = (b.longitude - a.longitude).to_radians();

    let h = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    // Rounding can push `h` just past 1 for near-antipodal points.
    let h = h.clamp(0.0, 1.0);

    2.0 * EARTH_RADIUS_KM * h.sqrt().atan2((1.0 - h).sqrt())
}
