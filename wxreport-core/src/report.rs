//! Sequences the remote lookups behind each section of the report.
//!
//! Sections are independent: each returns its own `Result`, and the caller
//! decides whether a failed section stops the run.

use chrono::NaiveDate;
use std::path::Path;

use crate::{
    cache::StationSource,
    error::ReportError,
    location::ResolvedLocation,
    model::{Alert, CurrentConditions, Forecasts, RadarImage},
    moon::moon_phase,
    provider::{NwsClient, SunriseSunsetClient},
};

#[derive(Debug, Clone, Copy)]
pub struct WeatherReport<'a> {
    nws: &'a NwsClient,
    sun: &'a SunriseSunsetClient,
    stations: &'a dyn StationSource,
    location: &'a ResolvedLocation,
}

impl<'a> WeatherReport<'a> {
    pub fn new(
        nws: &'a NwsClient,
        sun: &'a SunriseSunsetClient,
        stations: &'a dyn StationSource,
        location: &'a ResolvedLocation,
    ) -> Self {
        Self { nws, sun, stations, location }
    }

    pub fn location(&self) -> &ResolvedLocation {
        self.location
    }

    /// Latest observation from the first station serving the location, plus
    /// sun times and the moon phase for `today` (UTC).
    pub async fn current_conditions(&self, today: NaiveDate) -> Result<CurrentConditions, ReportError> {
        let point = self.location.point;
        let meta = self.nws.points(point).await?;

        let station_ids = self.nws.observation_stations(&meta.observation_stations).await?;
        let station_id = station_ids.into_iter().next().ok_or(ReportError::NoObservationStations)?;

        let observation = self.nws.latest_observation(&station_id).await?;

        let sun = match self.sun.sun_times(point).await {
            Ok(times) => Some(times),
            Err(e) => {
                tracing::warn!("Error fetching sun times: {e}");
                None
            }
        };

        Ok(CurrentConditions { station_id, observation, sun, moon_phase: moon_phase(today) })
    }

    /// The first `hours` hourly periods and the full daily forecast.
    pub async fn forecasts(&self, hours: usize) -> Result<Forecasts, ReportError> {
        let meta = self.nws.points(self.location.point).await?;

        let mut hourly = self.nws.forecast_periods(&meta.forecast_hourly).await?;
        hourly.truncate(hours);

        let daily = self.nws.forecast_periods(&meta.forecast).await?;

        Ok(Forecasts { hourly, daily })
    }

    pub async fn alerts(&self) -> Result<Vec<Alert>, ReportError> {
        Ok(self.nws.active_alerts(self.location.point).await?)
    }

    /// Download the loop for the nearest radar station into `output`.
    pub async fn radar(&self, output: &Path) -> Result<RadarImage, ReportError> {
        let catalog = self.stations.fetch_station_catalog().await?;
        let nearest = catalog.nearest(self.location.point)?;
        let station_id = nearest.station.id.clone();
        tracing::info!(station = %station_id, distance_km = nearest.distance_km, "nearest radar station");

        let bytes = self.nws.radar_loop(&station_id).await?;
        tokio::fs::write(output, &bytes)
            .await
            .map_err(|source| ReportError::Write { path: output.to_path_buf(), source })?;

        Ok(RadarImage {
            station_id,
            distance_km: nearest.distance_km,
            path: output.to_path_buf(),
            bytes: bytes.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::{CatalogError, StationError},
        geo::GeoPoint,
        moon::MoonPhase,
        provider::DEFAULT_USER_AGENT,
        station::{Station, StationCatalog},
    };
    use async_trait::async_trait;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[derive(Debug)]
    struct FixedStations(StationCatalog);

    #[async_trait]
    impl StationSource for FixedStations {
        async fn fetch_station_catalog(&self) -> Result<StationCatalog, CatalogError> {
            Ok(self.0.clone())
        }
    }

    struct Harness {
        server: MockServer,
        nws: NwsClient,
        sun: SunriseSunsetClient,
        location: ResolvedLocation,
    }

    impl Harness {
        async fn start() -> Self {
            let server = MockServer::start().await;
            let radar = format!("{}/ridge", server.uri());
            let nws = NwsClient::with_base_urls(DEFAULT_USER_AGENT, &server.uri(), &radar).unwrap();
            let sun = SunriseSunsetClient::with_base_url(DEFAULT_USER_AGENT, &server.uri()).unwrap();
            let location = ResolvedLocation::new(GeoPoint::new(40.8, -72.9).unwrap());
            Self { server, nws, sun, location }
        }

        async fn mount_points(&self) {
            let base = self.server.uri();
            Mock::given(method("GET"))
                .and(path("/points/40.8000,-72.9000"))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                    "properties": {
                        "forecast": format!("{base}/gridpoints/OKX/1,2/forecast"),
                        "forecastHourly": format!("{base}/gridpoints/OKX/1,2/forecast/hourly"),
                        "observationStations": format!("{base}/gridpoints/OKX/1,2/stations")
                    }
                })))
                .mount(&self.server)
                .await;
        }

        async fn mount_json(&self, route: &str, body: serde_json::Value) {
            Mock::given(method("GET"))
                .and(path(route))
                .respond_with(ResponseTemplate::new(200).set_body_json(body))
                .mount(&self.server)
                .await;
        }
    }

    fn periods(n: usize) -> serde_json::Value {
        let periods: Vec<_> = (0..n)
            .map(|i| {
                json!({
                    "name": format!("P{i}"),
                    "startTime": "2024-06-01T18:00:00-04:00",
                    "temperature": 60 + i,
                    "temperatureUnit": "F",
                    "shortForecast": "Sunny"
                })
            })
            .collect();
        json!({ "properties": { "periods": periods } })
    }

    #[tokio::test]
    async fn current_conditions_uses_first_station_and_tolerates_sun_failure() {
        let h = Harness::start().await;
        h.mount_points().await;
        h.mount_json(
            "/gridpoints/OKX/1,2/stations",
            json!({ "features": [
                { "properties": { "stationIdentifier": "KISP" } },
                { "properties": { "stationIdentifier": "KFOK" } }
            ]}),
        )
        .await;
        h.mount_json(
            "/stations/KISP/observations/latest",
            json!({ "properties": {
                "textDescription": "Clear",
                "temperature": { "unitCode": "wmoUnit:degC", "value": 30.0 }
            }}),
        )
        .await;
        // No sunrise mock: the sun lookup 404s.

        let stations = FixedStations(StationCatalog::default());
        let report = WeatherReport::new(&h.nws, &h.sun, &stations, &h.location);
        let today = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
        let current = report.current_conditions(today).await.unwrap();

        assert_eq!(current.station_id, "KISP");
        assert_eq!(current.observation.temperature_f(), Some(86.0));
        assert_eq!(current.sun, None);
        assert_eq!(current.moon_phase, MoonPhase::NewMoon);
    }

    #[tokio::test]
    async fn current_conditions_without_stations_fails() {
        let h = Harness::start().await;
        h.mount_points().await;
        h.mount_json("/gridpoints/OKX/1,2/stations", json!({ "features": [] })).await;

        let stations = FixedStations(StationCatalog::default());
        let report = WeatherReport::new(&h.nws, &h.sun, &stations, &h.location);
        let today = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
        let err = report.current_conditions(today).await.unwrap_err();

        assert!(matches!(err, ReportError::NoObservationStations));
    }

    #[tokio::test]
    async fn forecasts_limit_hourly_periods() {
        let h = Harness::start().await;
        h.mount_points().await;
        h.mount_json("/gridpoints/OKX/1,2/forecast/hourly", periods(24)).await;
        h.mount_json("/gridpoints/OKX/1,2/forecast", periods(14)).await;

        let stations = FixedStations(StationCatalog::default());
        let report = WeatherReport::new(&h.nws, &h.sun, &stations, &h.location);
        let forecasts = report.forecasts(12).await.unwrap();

        assert_eq!(forecasts.hourly.len(), 12);
        assert_eq!(forecasts.daily.len(), 14);
        assert_eq!(forecasts.hourly[11].name, "P11");
    }

    #[tokio::test]
    async fn no_alerts_is_an_empty_list() {
        let h = Harness::start().await;
        h.mount_json("/alerts/active", json!({ "features": [] })).await;

        let stations = FixedStations(StationCatalog::default());
        let report = WeatherReport::new(&h.nws, &h.sun, &stations, &h.location);

        assert!(report.alerts().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn radar_saves_loop_of_nearest_station() {
        let h = Harness::start().await;
        Mock::given(method("GET"))
            .and(path("/ridge/KOKX_loop.gif"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"GIF89a-loop".to_vec()))
            .mount(&h.server)
            .await;

        let stations = FixedStations(StationCatalog::new(vec![
            Station::new("KBOX", GeoPoint::new(41.9558, -71.1369).unwrap()),
            Station::new("KOKX", GeoPoint::new(40.8655, -72.8638).unwrap()),
        ]));
        let report = WeatherReport::new(&h.nws, &h.sun, &stations, &h.location);

        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("radar.gif");
        let image = report.radar(&out).await.unwrap();

        assert_eq!(image.station_id, "KOKX");
        assert!(image.distance_km < 10.0);
        assert_eq!(image.bytes, 11);
        assert_eq!(std::fs::read(&out).unwrap(), b"GIF89a-loop");
    }

    #[tokio::test]
    async fn radar_with_empty_catalog_surfaces_error() {
        let h = Harness::start().await;
        let stations = FixedStations(StationCatalog::default());
        let report = WeatherReport::new(&h.nws, &h.sun, &stations, &h.location);

        let dir = tempfile::tempdir().unwrap();
        let err = report.radar(&dir.path().join("radar.gif")).await.unwrap_err();

        assert!(matches!(err, ReportError::Station(StationError::EmptyCatalog)));
    }
}
