use anyhow::{Context, Result};
use chrono::Utc;
use tracing::info;

use crate::{
    agent::{AgentSettings, NowcastAgent},
    fetch::RadarImageFetcher,
    model::{Nowcast, RadarImageResult, RadarRequest},
    station::StationResolver,
    urls::{RIDGE_STANDARD_BASE, radar_image_url_at},
};

/// Wires the radar tool to an agent.
///
/// Each call is independent: fetch once, hand the tagged result to the
/// agent, return its text.
#[derive(Debug)]
pub struct Relay {
    settings: AgentSettings,
    fetcher: RadarImageFetcher,
    agent: Box<dyn NowcastAgent>,
    image_base: String,
}

impl Relay {
    pub fn new(
        settings: AgentSettings,
        fetcher: RadarImageFetcher,
        agent: Box<dyn NowcastAgent>,
    ) -> Self {
        Self { settings, fetcher, agent, image_base: RIDGE_STANDARD_BASE.to_string() }
    }

    /// Point station lookups at a different still-image host.
    pub fn with_image_base(mut self, base: impl Into<String>) -> Self {
        self.image_base = base.into();
        self
    }

    pub fn settings(&self) -> &AgentSettings {
        &self.settings
    }

    pub async fn nowcast_url(&self, url: &str) -> Result<Nowcast> {
        let result = self.fetcher.fetch(url).await;
        self.relay(url, result).await
    }

    pub async fn nowcast_station(&self, station: &str) -> Result<Nowcast> {
        self.nowcast_url(&radar_image_url_at(&self.image_base, station)).await
    }

    pub async fn nowcast_point(
        &self,
        request: &RadarRequest,
        resolver: &dyn StationResolver,
    ) -> Result<Nowcast> {
        let station = resolver
            .resolve(request)
            .await
            .context("Failed to resolve radar station for coordinates")?;

        self.nowcast_station(&station).await
    }

    async fn relay(&self, url: &str, result: RadarImageResult) -> Result<Nowcast> {
        let radar_id = result.image().and_then(|image| image.radar_id.clone());

        let text = self
            .agent
            .nowcast(&self.settings, &result)
            .await
            .with_context(|| format!("Agent '{}' failed to produce a nowcast", self.settings.name))?;

        info!(url, success = result.is_success(), "nowcast relayed");

        Ok(Nowcast { radar_id, source_url: url.to_string(), text, generated_at: Utc::now() })
    }
}
