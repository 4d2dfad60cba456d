//! HTTP collaborators: api.weather.gov, ipinfo.io and api.sunrise-sunset.org.
//!
//! Every client shares the same request shape: send, read the whole body,
//! reject non-2xx statuses with a truncated body, then parse JSON.

use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::error::FetchError;

pub mod ipinfo;
pub mod nws;
pub mod sunrise;

pub use ipinfo::IpInfoLookup;
pub use nws::{NwsClient, PointMetadata};
pub use sunrise::SunriseSunsetClient;

/// NWS asks every caller to identify itself with an app name and contact.
pub const DEFAULT_USER_AGENT: &str = "(wxreport, email@example.com)";

pub(crate) const NWS_TIMEOUT: Duration = Duration::from_secs(10);
pub(crate) const LOOKUP_TIMEOUT: Duration = Duration::from_secs(5);

pub(crate) fn build_client(user_agent: &str, timeout: Duration) -> Result<Client, FetchError> {
    Client::builder()
        .user_agent(user_agent)
        .timeout(timeout)
        .build()
        .map_err(FetchError::Client)
}

pub(crate) async fn get_json<T: DeserializeOwned>(http: &Client, url: &str) -> Result<T, FetchError> {
    let body = get_body(http, url).await?;

    serde_json::from_slice(&body).map_err(|source| FetchError::Parse { url: url.to_string(), source })
}

pub(crate) async fn get_body(http: &Client, url: &str) -> Result<Vec<u8>, FetchError> {
    tracing::debug!(url, "GET");

    let request_err = |source: reqwest::Error| FetchError::Request { url: url.to_string(), source };

    let res = http.get(url).send().await.map_err(request_err)?;
    let status = res.status();
    let body = res.bytes().await.map_err(request_err)?;

    if !status.is_success() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status,
            body: truncate_body(&String::from_utf8_lossy(&body)),
        });
    }

    Ok(body.to_vec())
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
