use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;

use crate::{error::FetchError, geo::GeoPoint, model::SunTimes};

use super::{LOOKUP_TIMEOUT, build_client, get_json};

pub const SUNRISE_SUNSET_BASE_URL: &str = "https://api.sunrise-sunset.org";

/// Today's sunrise and sunset from api.sunrise-sunset.org.
#[derive(Debug, Clone)]
pub struct SunriseSunsetClient {
    http: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct SunResults {
    sunrise: DateTime<Utc>,
    sunset: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct SunResponse {
    results: SunResults,
}

impl SunriseSunsetClient {
    pub fn new(user_agent: &str) -> Result<Self, FetchError> {
        Self::with_base_url(user_agent, SUNRISE_SUNSET_BASE_URL)
    }

    pub fn with_base_url(user_agent: &str, base_url: &str) -> Result<Self, FetchError> {
        Ok(Self {
            http: build_client(user_agent, LOOKUP_TIMEOUT)?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub async fn sun_times(&self, point: GeoPoint) -> Result<SunTimes, FetchError> {
        // formatted=0 returns RFC 3339 timestamps in UTC.
        let url = format!(
            "{}/json?lat={}&lng={}&formatted=0",
            self.base_url,
            point.latitude(),
            point.longitude()
        );
        let parsed: SunResponse = get_json(&self.http, &url).await?;

        Ok(SunTimes { sunrise: parsed.results.sunrise, sunset: parsed.results.sunset })
    }
}
