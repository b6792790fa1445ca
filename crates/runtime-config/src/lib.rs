//! Runtime configuration for the bridge.
//!
//! A [`BridgeConfig`] is built once (file, then environment, then CLI
//! overrides) and shared read-only. Settings changes never mutate it in
//! place; [`BridgeConfig::with_agent_update`] returns a new value that only
//! sessions started afterwards will see.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

/// Canonical config file name.
pub const CONFIG_FILE_NAME: &str = "oibridge.toml";

/// OpenAI-compatible endpoint used for custom local models.
pub const DEFAULT_LOCAL_API_BASE: &str = "http://localhost:1234/v1";

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("failed to read config at {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct BridgeConfig {
    #[serde(default)]
    pub agent: AgentSettings,
    #[serde(default)]
    pub stream: StreamSettings,
    #[serde(default)]
    pub server: ServerSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentSettings {
    #[serde(default = "default_model")]
    pub model: String,
    /// Model is served by a local OpenAI-compatible endpoint.
    #[serde(default)]
    pub custom: bool,
    #[serde(default = "default_context_window")]
    pub context_window: u32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Run generated code without asking for confirmation.
    #[serde(default = "default_true")]
    pub auto_run: bool,
    #[serde(default = "default_local_api_base")]
    pub local_api_base: String,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            model: default_model(),
            custom: false,
            context_window: default_context_window(),
            max_tokens: default_max_tokens(),
            auto_run: true,
            local_api_base: default_local_api_base(),
        }
    }
}

impl AgentSettings {
    pub fn custom_local(model: impl Into<String>, api_base: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            custom: true,
            local_api_base: api_base.into(),
            ..Self::default()
        }
    }

    /// Model id handed to the agent; local models go through the
    /// OpenAI-compatible adapter.
    pub fn resolved_model(&self) -> String {
        if self.custom {
            format!("openai/{}", self.model)
        } else {
            self.model.clone()
        }
    }

    pub fn offline(&self) -> bool {
        self.custom
    }

    /// Endpoint override; `None` means the hosted provider default.
    pub fn api_base(&self) -> Option<&str> {
        self.custom.then_some(self.local_api_base.as_str())
    }

    /// Endpoint reported to clients, falling back to the local default.
    pub fn effective_api_base(&self) -> &str {
        &self.local_api_base
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamSettings {
    /// Capacity of each session's delivery channel.
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
    /// JSONL transcript of raw chunks replayed by the bundled agent.
    #[serde(default)]
    pub replay_path: Option<PathBuf>,
    #[serde(default)]
    pub replay_delay_ms: u64,
}

impl Default for StreamSettings {
    fn default() -> Self {
        Self {
            channel_capacity: default_channel_capacity(),
            replay_path: None,
            replay_delay_ms: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Static frontend build served at `/`.
    #[serde(default)]
    pub web_dir: Option<PathBuf>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            web_dir: None,
        }
    }
}

/// Partial agent settings submitted by a client.
///
/// Numeric fields accept either JSON integers or digit-only strings; anything
/// else (floats, bools, objects) is accepted by the parser and then ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentUpdate {
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub custom: Option<bool>,
    #[serde(default)]
    pub context_window: Option<NumericSetting>,
    #[serde(default)]
    pub max_tokens: Option<NumericSetting>,
    #[serde(default)]
    pub auto_run: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NumericSetting {
    Int(i64),
    Text(String),
    Other(serde_json::Value),
}

impl NumericSetting {
    /// Positive value, if this is a usable count.
    pub fn positive(&self) -> Option<u32> {
        let value = match self {
            Self::Int(n) => u32::try_from(*n).ok()?,
            Self::Text(s) => parse_digits(s)?,
            Self::Other(_) => return None,
        };
        (value > 0).then_some(value)
    }
}

fn parse_digits(raw: &str) -> Option<u32> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}

impl BridgeConfig {
    /// Load from `path` (defaults when the file is missing), apply process
    /// environment overrides, and validate.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?;
            toml::from_str(&content).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?
        } else {
            Self::default()
        };
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Apply `DEFAULT_MODEL`, `CONTEXT_WINDOW`, `MAX_TOKENS` and
    /// `LOCAL_MODEL_API_BASE` from `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(model) = non_empty("DEFAULT_MODEL") {
            self.agent.model = model;
        }
        if let Some(raw) = non_empty("CONTEXT_WINDOW") {
            match parse_digits(&raw) {
                Some(n) => self.agent.context_window = n,
                None => warn!("ignoring non-numeric CONTEXT_WINDOW={raw}"),
            }
        }
        if let Some(raw) = non_empty("MAX_TOKENS") {
            match parse_digits(&raw) {
                Some(n) => self.agent.max_tokens = n,
                None => warn!("ignoring non-numeric MAX_TOKENS={raw}"),
            }
        }
        if let Some(base) = non_empty("LOCAL_MODEL_API_BASE") {
            self.agent.local_api_base = base;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.agent.model.trim().is_empty() {
            return Err(ConfigError::Invalid("agent.model must not be empty".into()));
        }
        if self.agent.context_window == 0 {
            return Err(ConfigError::Invalid(
                "agent.context_window must be positive".into(),
            ));
        }
        if self.agent.max_tokens == 0 {
            return Err(ConfigError::Invalid("agent.max_tokens must be positive".into()));
        }
        if self.stream.channel_capacity == 0 {
            return Err(ConfigError::Invalid(
                "stream.channel_capacity must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// New config with a client's agent settings applied.
    ///
    /// `custom` only takes effect together with a model name; switching
    /// model without `custom` returns to the hosted endpoint.
    pub fn with_agent_update(&self, update: &AgentUpdate) -> Self {
        let mut next = self.clone();
        if let Some(model) = update
            .model
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
        {
            next.agent.model = model.to_string();
            next.agent.custom = update.custom.unwrap_or(false);
        }
        if let Some(n) = update.context_window.as_ref().and_then(NumericSetting::positive) {
            next.agent.context_window = n;
        }
        if let Some(n) = update.max_tokens.as_ref().and_then(NumericSetting::positive) {
            next.agent.max_tokens = n;
        }
        if let Some(auto_run) = update.auto_run {
            next.agent.auto_run = auto_run;
        }
        next
    }
}

fn default_true() -> bool {
    true
}

fn default_model() -> String {
    "gpt-4".to_string()
}

fn default_context_window() -> u32 {
    8000
}

fn default_max_tokens() -> u32 {
    1000
}

fn default_local_api_base() -> String {
    DEFAULT_LOCAL_API_BASE.to_string()
}

fn default_channel_capacity() -> usize {
    64
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}
