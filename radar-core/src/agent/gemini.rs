use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

use crate::{
    RadarImageResult,
    agent::{AgentSettings, NowcastAgent},
    http::truncate_body,
};

pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Gemini `generateContent` backend. Images go inline as base64.
#[derive(Debug, Clone)]
pub struct GeminiAgent {
    api_key: String,
    base_url: String,
    http: Client,
}

impl GeminiAgent {
    pub fn new(api_key: String) -> Result<Self> {
        Self::with_base_url(api_key, GEMINI_API_BASE)
    }

    pub fn with_base_url(api_key: String, base_url: impl Into<String>) -> Result<Self> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to build HTTP client for Gemini")?;

        Ok(Self { api_key, base_url: base_url.into(), http })
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/models/{}:generateContent", self.base_url.trim_end_matches('/'), model)
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    system_instruction: Content<'a>,
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
enum Part<'a> {
    Text(String),
    InlineData { mime_type: &'a str, data: &'a str },
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

fn user_parts(result: &RadarImageResult) -> Vec<Part<'_>> {
    match result {
        RadarImageResult::Success(image) => {
            let station = image.radar_id.as_deref().unwrap_or("unknown station");
            vec![
                Part::Text(image.guidance.clone()),
                Part::Text(format!("Radar image ({station}) from {}", image.source_url)),
                Part::InlineData { mime_type: &image.media.mime_type, data: &image.media.base64_data },
            ]
        }
        RadarImageResult::Error { error_message } => vec![Part::Text(format!(
            "The radar image tool failed: {error_message}. \
             Tell the user in one or two sentences that no radar nowcast is available right now."
        ))],
    }
}

#[async_trait]
impl NowcastAgent for GeminiAgent {
    async fn nowcast(&self, settings: &AgentSettings, result: &RadarImageResult) -> Result<String> {
        let request = GenerateRequest {
            system_instruction: Content {
                role: None,
                parts: vec![Part::Text(settings.instruction.clone())],
            },
            contents: vec![Content { role: Some("user"), parts: user_parts(result) }],
        };

        let url = self.endpoint(&settings.model);
        debug!(agent = %settings.name, model = %settings.model, success = result.is_success(), "calling Gemini");

        let res = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .context("Failed to send request to Gemini")?;

        let status = res.status();
        let body = res.text().await.context("Failed to read Gemini response body")?;

        if !status.is_success() {
            return Err(anyhow!(
                "Gemini request failed with status {}: {}",
                status,
                truncate_body(&body),
            ));
        }

        let parsed: GenerateResponse =
            serde_json::from_str(&body).context("Failed to parse Gemini response JSON")?;

        let text = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect::<Vec<_>>().join(""))
            .unwrap_or_default();

        let text = text.trim();
        if text.is_empty() {
            return Err(anyhow!("Gemini response contained no text"));
        }

        info!(model = %settings.model, chars = text.len(), "nowcast generated");
        Ok(text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{RadarImage, RadarMedia};

    #[test]
    fn success_parts_include_inline_image() {
        let result = RadarImageResult::Success(RadarImage {
            radar_id: Some("KOKX".into()),
            source_url: "https://radar.weather.gov/ridge/standard/KOKX_0.gif".into(),
            media: RadarMedia::from_bytes("image/gif", b"GIF89a"),
            guidance: "guide".into(),
        });

        let value = serde_json::to_value(user_parts(&result)).unwrap();
        assert_eq!(value[0]["text"], "guide");
        assert!(value[1]["text"].as_str().unwrap().contains("KOKX"));
        assert_eq!(value[2]["inline_data"]["mime_type"], "image/gif");
        assert_eq!(value[2]["inline_data"]["data"], "R0lGODlh");
    }

    #[test]
    fn error_parts_are_text_only() {
        let result = RadarImageResult::error("HTTP 404 from https://x");
        let parts = user_parts(&result);

        assert_eq!(parts.len(), 1);
        let value = serde_json::to_value(&parts).unwrap();
        assert!(value[0]["text"].as_str().unwrap().contains("HTTP 404"));
    }

    #[test]
    fn endpoint_includes_model() {
        let agent = GeminiAgent::with_base_url("k".into(), "http://localhost:1/").unwrap();
        assert_eq!(
            agent.endpoint("gemini-2.0-flash"),
            "http://localhost:1/models/gemini-2.0-flash:generateContent"
        );
    }
}
