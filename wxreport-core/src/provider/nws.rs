use chrono::{DateTime, FixedOffset};
use reqwest::Client;
use serde::Deserialize;

use crate::{
    error::FetchError,
    geo::GeoPoint,
    model::{Alert, ForecastPeriod, Observation},
    station::{Station, StationCatalog},
};

use super::{NWS_TIMEOUT, build_client, get_body, get_json};

pub const NWS_BASE_URL: &str = "https://api.weather.gov";
pub const RADAR_LOOP_BASE_URL: &str = "https://radar.weather.gov/ridge/lite/N0R";

const KMH_TO_MPH: f64 = 0.621_371;
const MPS_TO_MPH: f64 = 2.237;

/// Client for the National Weather Service API.
#[derive(Debug, Clone)]
pub struct NwsClient {
    http: Client,
    base_url: String,
    radar_base_url: String,
}

/// Per-point URLs returned by `/points/{lat},{lon}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PointMetadata {
    pub forecast: String,
    pub forecast_hourly: String,
    pub observation_stations: String,
}

impl NwsClient {
    pub fn new(user_agent: &str) -> Result<Self, FetchError> {
        Self::with_base_urls(user_agent, NWS_BASE_URL, RADAR_LOOP_BASE_URL)
    }

    pub fn with_base_urls(
        user_agent: &str,
        base_url: &str,
        radar_base_url: &str,
    ) -> Result<Self, FetchError> {
        Ok(Self {
            http: build_client(user_agent, NWS_TIMEOUT)?,
            base_url: base_url.trim_end_matches('/').to_string(),
            radar_base_url: radar_base_url.trim_end_matches('/').to_string(),
        })
    }

    pub async fn points(&self, point: GeoPoint) -> Result<PointMetadata, FetchError> {
        let url = format!("{}/points/{}", self.base_url, coords(point));
        let parsed: PointsResponse = get_json(&self.http, &url).await?;
        let props = parsed.properties;

        let missing = |field: &'static str| FetchError::MissingField { url: url.clone(), field };

        Ok(PointMetadata {
            forecast: props.forecast.ok_or_else(|| missing("forecast"))?,
            forecast_hourly: props.forecast_hourly.ok_or_else(|| missing("forecastHourly"))?,
            observation_stations: props
                .observation_stations
                .ok_or_else(|| missing("observationStations"))?,
        })
    }

    /// Station identifiers serving a point, nearest first.
    pub async fn observation_stations(&self, url: &str) -> Result<Vec<String>, FetchError> {
        let parsed: FeatureCollection<StationProperties> = get_json(&self.http, url).await?;

        Ok(parsed
            .features
            .into_iter()
            .map(|f| f.properties.station_identifier)
            .collect())
    }

    pub async fn latest_observation(&self, station_id: &str) -> Result<Observation, FetchError> {
        let url = format!("{}/stations/{}/observations/latest", self.base_url, station_id);
        let parsed: ObservationResponse = get_json(&self.http, &url).await?;
        let props = parsed.properties;

        Ok(Observation {
            description: props
                .text_description
                .filter(|d| !d.is_empty())
                .unwrap_or_else(|| "N/A".to_string()),
            temperature_c: props.temperature.and_then(Quantity::celsius),
            humidity_pct: props.relative_humidity.and_then(|q| q.value),
            wind_speed_mph: props.wind_speed.and_then(Quantity::mph),
        })
    }

    /// Periods of a forecast URL taken from [`PointMetadata`] (hourly or daily).
    pub async fn forecast_periods(&self, url: &str) -> Result<Vec<ForecastPeriod>, FetchError> {
        let parsed: ForecastResponse = get_json(&self.http, url).await?;

        Ok(parsed
            .properties
            .periods
            .into_iter()
            .map(|p| ForecastPeriod {
                name: p.name,
                start_time: p.start_time,
                temperature: p.temperature,
                temperature_unit: p.temperature_unit,
                short_forecast: p.short_forecast,
            })
            .collect())
    }

    pub async fn active_alerts(&self, point: GeoPoint) -> Result<Vec<Alert>, FetchError> {
        let url = format!("{}/alerts/active?point={}", self.base_url, coords(point));
        let parsed: FeatureCollection<AlertProperties> = get_json(&self.http, &url).await?;

        Ok(parsed
            .features
            .into_iter()
            .map(|f| Alert {
                event: f.properties.event,
                headline: f.properties.headline,
                description: f.properties.description,
                severity: f.properties.severity,
            })
            .collect())
    }

    /// Every NEXRAD/TDWR radar site known to the API.
    ///
    /// Sites published without a geometry are skipped.
    pub async fn radar_stations(&self) -> Result<StationCatalog, FetchError> {
        let url = format!("{}/radar/stations", self.base_url);
        let parsed: RadarStationsResponse = get_json(&self.http, &url).await?;

        let mut stations = Vec::with_capacity(parsed.features.len());
        for feature in parsed.features {
            let Some(geometry) = feature.geometry else {
                tracing::debug!(id = %feature.properties.id, "radar station has no geometry");
                continue;
            };

            // GeoJSON order is [longitude, latitude].
            let [lon, lat] = geometry.coordinates;
            let location = GeoPoint::new(lat, lon)
                .map_err(|source| FetchError::InvalidCoordinates { url: url.clone(), source })?;

            stations.push(Station::new(feature.properties.id, location));
        }

        tracing::info!(count = stations.len(), "fetched radar stations");
        Ok(StationCatalog::new(stations))
    }

    /// Animated GIF of the latest reflectivity loop for a radar site.
    pub async fn radar_loop(&self, station_id: &str) -> Result<Vec<u8>, FetchError> {
        let url = format!("{}/{}_loop.gif", self.radar_base_url, station_id);
        get_body(&self.http, &url).await
    }
}

/// The API only accepts up to four decimal places.
fn coords(point: GeoPoint) -> String {
    format!("{:.4},{:.4}", point.latitude(), point.longitude())
}

#[derive(Debug, Deserialize)]
struct FeatureCollection<P> {
    features: Vec<Feature<P>>,
}

#[derive(Debug, Deserialize)]
struct Feature<P> {
    properties: P,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PointsProperties {
    forecast: Option<String>,
    forecast_hourly: Option<String>,
    observation_stations: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PointsResponse {
    properties: PointsProperties,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StationProperties {
    station_identifier: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Quantity {
    value: Option<f64>,
    unit_code: Option<String>,
}

impl Quantity {
    fn unit(&self) -> &str {
        self.unit_code.as_deref().unwrap_or_default()
    }

    fn celsius(self) -> Option<f64> {
        let value = self.value?;
        if self.unit().ends_with("degF") {
            Some((value - 32.0) * 5.0 / 9.0)
        } else {
            Some(value)
        }
    }

    /// Unitless wind speeds are treated as m/s.
    fn mph(self) -> Option<f64> {
        let value = self.value?;
        if self.unit().ends_with("km_h-1") {
            Some(value * KMH_TO_MPH)
        } else {
            Some(value * MPS_TO_MPH)
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ObservationProperties {
    text_description: Option<String>,
    #[serde(default)]
    temperature: Option<Quantity>,
    #[serde(default)]
    relative_humidity: Option<Quantity>,
    #[serde(default)]
    wind_speed: Option<Quantity>,
}

#[derive(Debug, Deserialize)]
struct ObservationResponse {
    properties: ObservationProperties,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Period {
    #[serde(default)]
    name: String,
    start_time: DateTime<FixedOffset>,
    temperature: i32,
    temperature_unit: String,
    short_forecast: String,
}

#[derive(Debug, Deserialize)]
struct ForecastProperties {
    periods: Vec<Period>,
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    properties: ForecastProperties,
}

#[derive(Debug, Deserialize)]
struct AlertProperties {
    event: String,
    headline: Option<String>,
    description: Option<String>,
    severity: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RadarStationProperties {
    id: String,
}

#[derive(Debug, Deserialize)]
struct PointGeometry {
    coordinates: [f64; 2],
}

#[derive(Debug, Deserialize)]
struct RadarStationFeature {
    properties: RadarStationProperties,
    geometry: Option<PointGeometry>,
}

#[derive(Debug, Deserialize)]
struct RadarStationsResponse {
    features: Vec<RadarStationFeature>,
}
