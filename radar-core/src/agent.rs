use crate::{Config, RadarImageResult, agent::gemini::GeminiAgent};
use async_trait::async_trait;
use std::{convert::TryFrom, fmt::Debug};

pub mod gemini;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AgentId {
    Gemini,
}

impl AgentId {
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentId::Gemini => "gemini",
        }
    }

    pub const fn all() -> &'static [AgentId] {
        &[AgentId::Gemini]
    }
}

impl std::fmt::Display for AgentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for AgentId {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "gemini" => Ok(AgentId::Gemini),
            _ => Err(anyhow::anyhow!("Unknown agent '{value}'. Supported agents: gemini.")),
        }
    }
}

/// Fixed description of the nowcasting agent.
///
/// Built once and handed to [`crate::Relay`]; nothing mutates it afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentSettings {
    pub name: String,
    pub model: String,
    pub description: String,
    pub instruction: String,
}

impl AgentSettings {
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            name: "radar_nowcaster".to_string(),
            model: "gemini-2.0-flash".to_string(),
            description: "Given a RIDGE reflectivity image URL, produce a simple, newsy nowcast."
                .to_string(),
            instruction: "When a tool returns 'media', analyze the image directly. \
                Output a brief headline and a 2-3 sentence, plain-English nowcast. \
                Say whether it's dry or precipitating, approximate intensity, and any obvious hazard cues. \
                Avoid jargon and precise motion/timing claims from a single frame."
                .to_string(),
        }
    }
}

/// A model that turns one radar tool result into a short nowcast.
#[async_trait]
pub trait NowcastAgent: Send + Sync + Debug {
    async fn nowcast(
        &self,
        settings: &AgentSettings,
        result: &RadarImageResult,
    ) -> anyhow::Result<String>;
}

/// Construct an agent from config and explicit AgentId.
pub fn agent_from_config(id: AgentId, config: &Config) -> anyhow::Result<Box<dyn NowcastAgent>> {
    let api_key = config.agent_api_key(id).ok_or_else(|| {
        anyhow::anyhow!(
            "No API key configured for agent '{id}'.\n\
                 Hint: run `radar configure {id}` and enter your API key."
        )
    })?;

    let boxed: Box<dyn NowcastAgent> = match id {
        AgentId::Gemini => Box::new(GeminiAgent::new(api_key.to_owned())?),
    };

    Ok(boxed)
}

/// Construct the default agent from config, using the `default_agent` field.
pub fn default_agent_from_config(config: &Config) -> anyhow::Result<Box<dyn NowcastAgent>> {
    let id = config.default_agent_id()?;
    agent_from_config(id, config)
}
