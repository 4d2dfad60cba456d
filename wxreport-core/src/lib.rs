//! Core library for the `wxreport` CLI.
//!
//! This crate defines:
//! - Great-circle distance, nearest-station selection and moon phase
//! - Location resolution (explicit override or IP geolocation)
//! - Clients for api.weather.gov, ipinfo.io and api.sunrise-sunset.org
//! - The radar station cache and on-disk configuration
//! - The report orchestrator that sequences the lookups for each section
//!
//! It is used by `wxreport-cli`, but can also be reused by other binaries or services.

pub mod cache;
pub mod config;
pub mod error;
pub mod geo;
pub mod location;
pub mod model;
pub mod moon;
pub mod provider;
pub mod report;
pub mod station;

pub use cache::{CachedStationSource, StationSource};
pub use config::{Config, SavedLocation};
pub use error::{CatalogError, FetchError, LocationError, ReportError, StationError};
pub use geo::{CoordinateError, GeoPoint, distance};
pub use location::{IpLookup, LocationOverrides, ResolvedLocation, resolve};
pub use model::{
    Alert, CurrentConditions, ForecastPeriod, Forecasts, Observation, RadarImage, Sky, SunTimes,
    TemperatureBand,
};
pub use moon::{MoonPhase, moon_phase};
pub use provider::{IpInfoLookup, NwsClient, SunriseSunsetClient};
pub use report::WeatherReport;
pub use station::{NearestStation, Station, StationCatalog};
