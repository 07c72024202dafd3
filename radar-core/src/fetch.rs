//! The radar image tool.
//!
//! Fetches one RIDGE still frame and packages it for a multimodal model. The
//! tool never returns `Err`: every failure is folded into
//! [`RadarImageResult::Error`] so the agent layer can branch on the tag alone.

use std::{error::Error as _, time::Duration};

use anyhow::Context;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::{Client, StatusCode, header::CONTENT_TYPE};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{
    model::{RadarImage, RadarImageResult, RadarMedia},
    urls::USER_AGENT,
};

pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(12);

/// Used when the server does not declare a content type.
pub const DEFAULT_MIME_TYPE: &str = "image/gif";

/// Instruction attached to every successful fetch.
pub const RADAR_GUIDANCE: &str = "You are looking at a single-frame radar reflectivity image. \
Write a very short, friendly nowcast like a weather update: \
1) say if precipitation is present or not; 2) rate intensity (light/moderate/heavy); \
3) mention any obvious danger signals (very intense cores). \
Avoid jargon and numbers; do NOT infer motion from a single frame; keep to 2-3 sentences; \
start with a brief headline (3-6 words).";

static STATION_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"/standard/([A-Za-z0-9]{3,4})_0\.gif$").expect("station pattern must compile")
});

#[derive(Debug, Error)]
enum FetchError {
    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    #[error("HTTP {status} from {url} (empty body)")]
    EmptyBody { status: u16, url: String },

    #[error("{0}")]
    Transport(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        // reqwest keeps the useful part ("operation timed out", "dns error")
        // in the source chain.
        let mut message = err.to_string();
        let mut source = err.source();
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }
        FetchError::Transport(message)
    }
}

/// Station code from a RIDGE standard still URL, upper-cased.
///
/// Returns `None` for anything that does not end in
/// `/standard/<3-4 alphanumerics>_0.gif`.
pub fn extract_radar_id(url: &str) -> Option<String> {
    STATION_PATTERN.captures(url).map(|caps| caps[1].to_ascii_uppercase())
}

#[derive(Debug, Clone)]
pub struct RadarImageFetcher {
    http: Client,
    timeout: Duration,
}

impl RadarImageFetcher {
    pub fn new() -> anyhow::Result<Self> {
        Self::with_timeout(DEFAULT_FETCH_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> anyhow::Result<Self> {
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client for radar images")?;

        Ok(Self { http, timeout })
    }

    /// Fetch `url` once and package the result. Single attempt, no retries.
    pub async fn fetch(&self, url: &str) -> RadarImageResult {
        match self.try_fetch(url).await {
            Ok(image) => {
                info!(
                    url,
                    radar_id = image.radar_id.as_deref().unwrap_or("-"),
                    mime_type = %image.media.mime_type,
                    "fetched radar image"
                );
                RadarImageResult::Success(image)
            }
            Err(err) => {
                warn!(url, error = %err, "radar image fetch failed");
                RadarImageResult::error(err.to_string())
            }
        }
    }

    async fn try_fetch(&self, url: &str) -> Result<RadarImage, FetchError> {
        debug!(url, timeout_secs = self.timeout.as_secs_f64(), "requesting radar image");

        let res = self.http.get(url).send().await?;
        let status = res.status();

        if status != StatusCode::OK {
            return Err(FetchError::Status { status: status.as_u16(), url: url.to_string() });
        }

        let mime_type = res
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .unwrap_or(DEFAULT_MIME_TYPE)
            .to_string();

        let body = res.bytes().await?;
        if body.is_empty() {
            return Err(FetchError::EmptyBody { status: status.as_u16(), url: url.to_string() });
        }

        Ok(RadarImage {
            radar_id: extract_radar_id(url),
            source_url: url.to_string(),
            media: RadarMedia::from_bytes(mime_type, &body),
            guidance: RADAR_GUIDANCE.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_station_from_standard_url() {
        let id = extract_radar_id("https://radar.weather.gov/ridge/standard/KOKX_0.gif");
        assert_eq!(id.as_deref(), Some("KOKX"));
    }

    #[test]
    fn extracts_three_char_station_and_uppercases() {
        let id = extract_radar_id("https://radar.weather.gov/ridge/standard/okx_0.gif");
        assert_eq!(id.as_deref(), Some("OKX"));
    }

    #[test]
    fn non_matching_urls_leave_station_unset() {
        for url in [
            "https://radar.weather.gov/ridge/standard/KOKX_loop.gif",
            "https://radar.weather.gov/ridge/standard/KOKX_0.gif?x=1",
            "https://radar.weather.gov/ridge/standard/TOOLONG_0.gif",
            "https://radar.weather.gov/ridge/standard/K-X_0.gif",
            "https://example.com/radar.png",
            "",
        ] {
            assert_eq!(extract_radar_id(url), None, "{url}");
        }
    }

    #[test]
    fn status_error_message_carries_code_and_url() {
        let err = FetchError::Status { status: 404, url: "https://x/y.gif".into() };
        assert_eq!(err.to_string(), "HTTP 404 from https://x/y.gif");
    }

    #[test]
    fn guidance_forbids_motion_and_caps_length() {
        assert!(RADAR_GUIDANCE.contains("light/moderate/heavy"));
        assert!(RADAR_GUIDANCE.contains("do NOT infer motion"));
        assert!(RADAR_GUIDANCE.contains("2-3 sentences"));
        assert!(RADAR_GUIDANCE.contains("headline"));
    }

    #[tokio::test]
    async fn unparseable_url_becomes_error_result() {
        let fetcher = RadarImageFetcher::new().unwrap();
        let result = fetcher.fetch("not a url").await;
        assert!(!result.is_success());
        assert!(!result.error_message().unwrap().is_empty());
    }
}
