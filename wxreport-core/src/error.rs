//! Error types produced by the core.
//!
//! Each operation returns its own enum so the CLI can decide how to present a
//! failure and whether the rest of the report can still run.

use std::path::PathBuf;

use reqwest::StatusCode;
use thiserror::Error;

use crate::geo::CoordinateError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StationError {
    #[error("station catalog is empty; cannot pick a nearest station")]
    EmptyCatalog,
}

#[derive(Debug, Error)]
pub enum LocationError {
    #[error("invalid LAT/LON override")]
    InvalidOverride(#[source] CoordinateError),

    #[error("error detecting location (set LAT and LON environment variables to skip detection)")]
    Detection(#[source] FetchError),
}

// Causes are reached through `source()`, never repeated in the message.

/// Failure talking to one of the remote JSON/binary endpoints.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to build HTTP client")]
    Client(#[source] reqwest::Error),

    #[error("request to {url} failed")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned status {status}: {body}")]
    Status { url: String, status: StatusCode, body: String },

    #[error("failed to parse response from {url}")]
    Parse {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("response from {url} is missing `{field}`")]
    MissingField { url: String, field: &'static str },

    #[error("response from {url} has invalid coordinates")]
    InvalidCoordinates {
        url: String,
        #[source]
        source: CoordinateError,
    },
}

/// Failure producing the station catalog, from cache or network.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to fetch radar stations")]
    Fetch(#[from] FetchError),

    #[error("failed to read station cache {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse station cache {}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Failure of a single report section.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Station(#[from] StationError),

    #[error("No observation stations found for this location.")]
    NoObservationStations,

    #[error("failed to write {}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
