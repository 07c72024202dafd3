use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fs, path::PathBuf, time::Duration};

use crate::{agent::AgentId, agent::AgentSettings, fetch::DEFAULT_FETCH_TIMEOUT};

/// Credentials for a single agent backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentCredentials {
    pub api_key: String,
}

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Optional default agent id, e.g. "gemini".
    pub default_agent: Option<String>,

    /// Overrides the model in [`AgentSettings::default`].
    pub model: Option<String>,

    /// Overrides the radar fetch timeout.
    pub fetch_timeout_secs: Option<u64>,

    /// Example TOML:
    /// [agents.gemini]
    /// api_key = "..."
    #[serde(default)]
    pub agents: HashMap<String, AgentCredentials>,
}

impl Config {
    /// Return the default agent as a strongly-typed AgentId.
    pub fn default_agent_id(&self) -> Result<AgentId> {
        let s = self.default_agent.as_ref().ok_or_else(|| {
            anyhow!(
                "No default agent configured.\n\
                 Hint: run `radar configure <agent>` (e.g. `radar configure gemini`) first."
            )
        })?;

        AgentId::try_from(s.as_str())
    }

    pub fn set_default_agent(&mut self, id: AgentId) {
        self.default_agent = Some(id.as_str().to_string());
    }

    /// Immutable agent settings with any configured model override applied.
    pub fn agent_settings(&self) -> AgentSettings {
        let settings = AgentSettings::default();
        match &self.model {
            Some(model) => settings.with_model(model.clone()),
            None => settings,
        }
    }

    pub fn fetch_timeout(&self) -> Duration {
        self.fetch_timeout_secs.map(Duration::from_secs).unwrap_or(DEFAULT_FETCH_TIMEOUT)
    }

    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "radar-nowcast", "radar-cli")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Set/replace an agent API key; the first configured agent becomes the default.
    pub fn upsert_agent_api_key(&mut self, id: AgentId, api_key: String) {
        self.agents.insert(id.as_str().to_string(), AgentCredentials { api_key });

        if self.default_agent.is_none() {
            self.default_agent = Some(id.to_string());
        }
    }

    pub fn agent_api_key(&self, id: AgentId) -> Option<&str> {
        self.agents.get(id.as_str()).map(|c| c.api_key.as_str())
    }

    pub fn is_agent_configured(&self, id: AgentId) -> bool {
        self.agent_api_key(id).is_some()
    }
}
