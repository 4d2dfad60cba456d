use serde::{Deserialize, Serialize};

use crate::{
    error::StationError,
    geo::{CoordinateError, GeoPoint},
};

/// A radar (or observation) station with a fixed location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "StationRecord", into = "StationRecord")]
pub struct Station {
    pub id: String,
    pub location: GeoPoint,
}

/// On-disk shape of a station: `{"id": "KOKX", "lat": 40.86, "lon": -72.86}`.
#[derive(Debug, Serialize, Deserialize)]
struct StationRecord {
    id: String,
    lat: f64,
    lon: f64,
}

impl Station {
    pub fn new(id: impl Into<String>, location: GeoPoint) -> Self {
        Self { id: id.into(), location }
    }
}

impl TryFrom<StationRecord> for Station {
    type Error = CoordinateError;

    fn try_from(record: StationRecord) -> Result<Self, Self::Error> {
        Ok(Station { id: record.id, location: GeoPoint::new(record.lat, record.lon)? })
    }
}

impl From<Station> for StationRecord {
    fn from(station: Station) -> Self {
        StationRecord {
            id: station.id,
            lat: station.location.latitude(),
            lon: station.location.longitude(),
        }
    }
}

/// Result of a nearest-station lookup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearestStation<'a> {
    pub station: &'a Station,
    pub distance_km: f64,
}

/// Ordered list of known stations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StationCatalog(Vec<Station>);

impl StationCatalog {
    pub fn new(stations: Vec<Station>) -> Self {
        Self(stations)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn stations(&self) -> &[Station] {
        &self.0
    }

    /// Station closest to `point` by great-circle distance.
    ///
    /// When several stations are equally close the first one in catalog order
    /// wins. An empty catalog is an error, not an absent answer.
    pub fn nearest(&self, point: GeoPoint) -> Result<NearestStation<'_>, StationError> {
        self.0
            .iter()
            .map(|station| NearestStation { station, distance_km: station.location.distance_km(&point) })
            .min_by(|a, b| a.distance_km.total_cmp(&b.distance_km))
            .ok_or(StationError::EmptyCatalog)
    }
}

impl From<Vec<Station>> for StationCatalog {
    fn from(stations: Vec<Station>) -> Self {
        Self(stations)
    }
}

impl FromIterator<Station> for StationCatalog {
    fn from_iter<T: IntoIterator<Item = Station>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
