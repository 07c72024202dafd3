use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::{fmt::Debug, time::Duration};
use tracing::info;

use crate::{
    fetch::DEFAULT_FETCH_TIMEOUT,
    http::truncate_body,
    model::RadarRequest,
    urls::{NWS_API_BASE, USER_AGENT, points_url_at},
};

/// Turns coordinates into a radar station id such as `KOKX`.
#[async_trait]
pub trait StationResolver: Send + Sync + Debug {
    async fn resolve(&self, request: &RadarRequest) -> Result<String>;
}

/// Always answers with the same station.
#[derive(Debug, Clone)]
pub struct StaticStationResolver {
    station: String,
}

impl StaticStationResolver {
    pub fn new(station: impl Into<String>) -> Self {
        Self { station: station.into() }
    }
}

#[async_trait]
impl StationResolver for StaticStationResolver {
    async fn resolve(&self, _request: &RadarRequest) -> Result<String> {
        Ok(self.station.clone())
    }
}

/// Looks up `properties.radarStation` from the NWS points endpoint.
#[derive(Debug, Clone)]
pub struct NwsStationResolver {
    base_url: String,
    http: Client,
}

impl NwsStationResolver {
    pub fn new() -> Result<Self> {
        Self::with_timeout(DEFAULT_FETCH_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        Self::with_base_url(NWS_API_BASE, timeout)
    }

    pub fn with_base_url(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client for NWS points API")?;

        Ok(Self { base_url: base_url.into(), http })
    }
}

#[derive(Debug, Deserialize)]
struct PointsResponse {
    properties: PointsProperties,
}

#[derive(Debug, Deserialize)]
struct PointsProperties {
    #[serde(rename = "radarStation")]
    radar_station: Option<String>,
}

#[async_trait]
impl StationResolver for NwsStationResolver {
    async fn resolve(&self, request: &RadarRequest) -> Result<String> {
        let url = points_url_at(&self.base_url, &request.latitude, &request.longitude);

        let res = self
            .http
            .get(&url)
            .header("Accept", "application/geo+json")
            .send()
            .await
            .with_context(|| format!("Failed to send request to NWS points API ({url})"))?;

        let status = res.status();
        let body = res.text().await.context("Failed to read NWS points response body")?;

        if !status.is_success() {
            return Err(anyhow!(
                "NWS points request failed with status {}: {}",
                status,
                truncate_body(&body),
            ));
        }

        let parsed: PointsResponse =
            serde_json::from_str(&body).context("Failed to parse NWS points JSON")?;

        let station = parsed
            .properties
            .radar_station
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| {
                anyhow!(
                    "NWS points response for {},{} has no radar station",
                    request.latitude,
                    request.longitude
                )
            })?;

        info!(latitude = %request.latitude, longitude = %request.longitude, station = %station, "resolved radar station");
        Ok(station)
    }
}
