//! Server configuration

use crate::cli::Cli;
use inboxsweep_classifier::{ChatSettings, DEFAULT_BASE_URL, DEFAULT_BATCH_SIZE};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Server configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Base URL of the local Ollama service
    #[serde(default = "default_ollama_url")]
    pub ollama_url: String,

    /// Model requested when a scan names none; also the one suggested to pull
    #[serde(default = "default_model")]
    pub default_model: String,

    /// Emails classified concurrently per group
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Bound on a health probe in milliseconds
    #[serde(default = "default_health_timeout_ms")]
    pub health_timeout_ms: u64,

    /// Bound on one classification call in seconds
    #[serde(default = "default_chat_timeout_secs")]
    pub chat_timeout_secs: u64,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum tokens generated per classification
    #[serde(default = "default_num_predict")]
    pub num_predict: u32,

    /// Listen address
    #[serde(default = "default_listen")]
    pub listen: String,

    /// Listen port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Allow cross-origin requests from any origin
    #[serde(default)]
    pub cors_allow_any: bool,
}

impl ServerConfig {
    /// Load configuration from file and CLI overrides
    pub fn load(config_path: &str, cli: &Cli) -> anyhow::Result<Self> {
        // Try to load from file, or use defaults
        let mut config = if Path::new(config_path).exists() {
            let content = std::fs::read_to_string(config_path)?;
            serde_yaml::from_str(&content)?
        } else {
            Self::default()
        };

        // Apply CLI overrides
        if let Some(url) = &cli.ollama_url {
            config.ollama_url = url.clone();
        }

        if let Some(model) = &cli.model {
            config.default_model = model.clone();
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject values the pipeline cannot run with
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.batch_size == 0 {
            anyhow::bail!("batch_size must be at least 1");
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            anyhow::bail!("temperature must be within [0, 2], got {}", self.temperature);
        }
        if self.default_model.trim().is_empty() {
            anyhow::bail!("default_model must not be empty");
        }
        if self.health_timeout_ms == 0 || self.chat_timeout_secs == 0 {
            anyhow::bail!("timeouts must be positive");
        }
        Ok(())
    }

    pub fn health_timeout(&self) -> Duration {
        Duration::from_millis(self.health_timeout_ms)
    }

    pub fn chat_settings(&self) -> ChatSettings {
        ChatSettings {
            temperature: self.temperature,
            num_predict: self.num_predict,
            timeout: Duration::from_secs(self.chat_timeout_secs),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            ollama_url: default_ollama_url(),
            default_model: default_model(),
            batch_size: default_batch_size(),
            health_timeout_ms: default_health_timeout_ms(),
            chat_timeout_secs: default_chat_timeout_secs(),
            temperature: default_temperature(),
            num_predict: default_num_predict(),
            listen: default_listen(),
            port: default_port(),
            cors_allow_any: false,
        }
    }
}

fn default_ollama_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_model() -> String {
    "mistral".to_string()
}

fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}

fn default_health_timeout_ms() -> u64 {
    3_000
}

fn default_chat_timeout_secs() -> u64 {
    120
}

fn default_temperature() -> f32 {
    0.1
}

fn default_num_predict() -> u32 {
    150
}

fn default_listen() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3001
}
