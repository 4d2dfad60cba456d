use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::{
    error::FetchError,
    geo::GeoPoint,
    location::{IpLookup, ResolvedLocation},
};

use super::{LOOKUP_TIMEOUT, build_client, get_json};

pub const IPINFO_URL: &str = "https://ipinfo.io/json";

/// Geolocation of the caller's public IP via ipinfo.io.
#[derive(Debug, Clone)]
pub struct IpInfoLookup {
    http: Client,
    url: String,
}

#[derive(Debug, Deserialize)]
struct IpInfoResponse {
    /// "lat,lon"
    loc: Option<String>,
    city: Option<String>,
    region: Option<String>,
}

impl IpInfoLookup {
    pub fn new(user_agent: &str) -> Result<Self, FetchError> {
        Self::with_url(user_agent, IPINFO_URL)
    }

    pub fn with_url(user_agent: &str, url: &str) -> Result<Self, FetchError> {
        Ok(Self { http: build_client(user_agent, LOOKUP_TIMEOUT)?, url: url.to_string() })
    }
}

#[async_trait]
impl IpLookup for IpInfoLookup {
    async fn lookup(&self) -> Result<ResolvedLocation, FetchError> {
        let parsed: IpInfoResponse = get_json(&self.http, &self.url).await?;

        let loc = parsed
            .loc
            .ok_or_else(|| FetchError::MissingField { url: self.url.clone(), field: "loc" })?;
        let (lat, lon) = loc
            .split_once(',')
            .ok_or_else(|| FetchError::MissingField { url: self.url.clone(), field: "loc" })?;

        let point = GeoPoint::parse(lat, lon)
            .map_err(|source| FetchError::InvalidCoordinates { url: self.url.clone(), source })?;

        Ok(ResolvedLocation {
            point,
            city: parsed.city.filter(|c| !c.is_empty()),
            region: parsed.region.filter(|r| !r.is_empty()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::DEFAULT_USER_AGENT;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn lookup_with(body: serde_json::Value) -> Result<ResolvedLocation, FetchError> {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&server)
            .await;

        let url = format!("{}/json", server.uri());
        IpInfoLookup::with_url(DEFAULT_USER_AGENT, &url).unwrap().lookup().await
    }

    #[tokio::test]
    async fn parses_loc_city_and_region() {
        let loc = lookup_with(json!({
            "ip": "203.0.113.7",
            "city": "Denver",
            "region": "Colorado",
            "loc": "39.7392,-104.9847"
        }))
        .await
        .unwrap();

        assert_eq!(loc.point, GeoPoint::new(39.7392, -104.9847).unwrap());
        assert_eq!(loc.label(), "Denver, Colorado");
    }

    #[tokio::test]
    async fn missing_loc_is_an_error() {
        let err = lookup_with(json!({ "ip": "203.0.113.7", "bogon": true })).await.unwrap_err();
        assert!(matches!(err, FetchError::MissingField { field: "loc", .. }));
    }

    #[tokio::test]
    async fn malformed_loc_is_an_error() {
        let err = lookup_with(json!({ "loc": "north,west" })).await.unwrap_err();
        assert!(matches!(err, FetchError::InvalidCoordinates { .. }));
    }
}
