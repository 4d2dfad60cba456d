use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

use crate::{
    error::{FetchError, LocationError},
    geo::GeoPoint,
};

/// Where the report is for. Produced once per run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedLocation {
    pub point: GeoPoint,
    pub city: Option<String>,
    pub region: Option<String>,
}

impl ResolvedLocation {
    pub fn new(point: GeoPoint) -> Self {
        Self { point, city: None, region: None }
    }

    /// Human-readable place name, e.g. "Boston, Massachusetts".
    /// Falls back to the coordinates when neither city nor region is known.
    pub fn label(&self) -> String {
        match (self.city.as_deref(), self.region.as_deref()) {
            (Some(city), Some(region)) => format!("{city}, {region}"),
            (Some(place), None) | (None, Some(place)) => place.to_string(),
            (None, None) => self.point.to_string(),
        }
    }
}

/// Explicit location supplied by the user (flags, environment or config).
///
/// Values are kept as raw text; they are only parsed when both coordinates
/// are present.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocationOverrides {
    pub latitude: Option<String>,
    pub longitude: Option<String>,
    pub city: Option<String>,
    pub region: Option<String>,
}

impl LocationOverrides {
    /// Both coordinates, if both are present and non-blank.
    fn coordinates(&self) -> Option<(&str, &str)> {
        let lat = non_blank(self.latitude.as_deref())?;
        let lon = non_blank(self.longitude.as_deref())?;
        Some((lat, lon))
    }

    pub fn has_coordinates(&self) -> bool {
        self.coordinates().is_some()
    }

    /// Fill every unset field from `fallback`, keeping values already set.
    ///
    /// Coordinates are taken as a pair so a latitude from one source is never
    /// combined with a longitude from another.
    pub fn or(self, fallback: LocationOverrides) -> LocationOverrides {
        if self.has_coordinates() {
            return LocationOverrides {
                city: self.city.or(fallback.city),
                region: self.region.or(fallback.region),
                ..self
            };
        }

        if fallback.has_coordinates() {
            return LocationOverrides {
                city: self.city.or(fallback.city),
                region: self.region.or(fallback.region),
                ..fallback
            };
        }

        self
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// IP-based geolocation capability.
#[async_trait]
pub trait IpLookup: Send + Sync + Debug {
    async fn lookup(&self) -> Result<ResolvedLocation, FetchError>;
}

/// Decide the operating location for this run.
///
/// Explicit coordinates win and are never second-guessed: a malformed
/// override is an error rather than a cue to fall back to IP lookup.
/// Otherwise `ip_lookup` is asked exactly once.
pub async fn resolve(
    overrides: &LocationOverrides,
    ip_lookup: &dyn IpLookup,
) -> Result<ResolvedLocation, LocationError> {
    if let Some((lat, lon)) = overrides.coordinates() {
        let point = GeoPoint::parse(lat, lon).map_err(LocationError::InvalidOverride)?;
        tracing::info!(%point, "using location override");

        return Ok(ResolvedLocation {
            point,
            city: overrides.city.clone(),
            region: overrides.region.clone(),
        });
    }

    let location = ip_lookup.lookup().await.map_err(LocationError::Detection)?;
    tracing::info!(point = %location.point, city = ?location.city, "detected location from IP");

    Ok(location)
}
