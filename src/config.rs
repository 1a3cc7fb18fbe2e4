//! Configuration structures and loading logic

use crate::client::DEFAULT_REGISTRY_URL;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Plugin configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct KeywordsConfig {
    pub api_port: u16,
    /// Directory holding the LoRA files offered for selection
    pub lora_dir: PathBuf,
    /// Directory of `<sha256>.json` keyword records
    pub cache_dir: PathBuf,
    pub registry_url: String,
    /// Unset means the HTTP transport default
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,
    pub extensions: Vec<String>,
    /// Include LoRA files in subdirectories
    pub recursive: bool,
}

impl Default for KeywordsConfig {
    fn default() -> Self {
        Self {
            api_port: default_api_port(),
            lora_dir: default_lora_dir(),
            cache_dir: default_cache_dir(),
            registry_url: DEFAULT_REGISTRY_URL.to_string(),
            request_timeout_secs: None,
            extensions: default_extensions(),
            recursive: true,
        }
    }
}

impl KeywordsConfig {
    /// Load configuration from file with environment variable overrides
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        let mut config = if let Some(path) = path {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            toml::from_str(&content).context("Failed to parse TOML config")?
        } else {
            Self::default()
        };

        // Environment variable overrides
        if let Ok(port) = std::env::var("LORA_KEYWORDS_API_PORT") {
            config.api_port = port
                .parse()
                .context("Invalid LORA_KEYWORDS_API_PORT value")?;
        }
        if let Ok(dir) = std::env::var("LORA_KEYWORDS_LORA_DIR") {
            config.lora_dir = PathBuf::from(dir);
        }
        if let Ok(dir) = std::env::var("LORA_KEYWORDS_CACHE_DIR") {
            config.cache_dir = PathBuf::from(dir);
        }
        if let Ok(url) = std::env::var("LORA_KEYWORDS_REGISTRY_URL") {
            config.registry_url = url;
        }
        if let Ok(timeout) = std::env::var("LORA_KEYWORDS_REQUEST_TIMEOUT") {
            config.request_timeout_secs = Some(
                timeout
                    .parse()
                    .context("Invalid LORA_KEYWORDS_REQUEST_TIMEOUT value")?,
            );
        }

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.api_port < 1024 {
            anyhow::bail!("API port must be >= 1024 (got {})", self.api_port);
        }

        if !(self.registry_url.starts_with("http://") || self.registry_url.starts_with("https://"))
        {
            anyhow::bail!(
                "Registry URL must be http(s) (got '{}')",
                self.registry_url
            );
        }

        if self.request_timeout_secs == Some(0) {
            anyhow::bail!("Request timeout must be > 0 seconds");
        }

        if self.extensions.is_empty() {
            anyhow::bail!("At least one LoRA file extension is required");
        }
        for ext in &self.extensions {
            if !ext.starts_with('.') || ext.len() < 2 {
                anyhow::bail!("Extension '{}' must look like '.safetensors'", ext);
            }
        }

        if self.lora_dir.exists() && !self.lora_dir.is_dir() {
            anyhow::bail!("LoRA path {:?} is not a directory", self.lora_dir);
        }

        Ok(())
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

// Default functions
fn default_api_port() -> u16 {
    7870
}
fn default_lora_dir() -> PathBuf {
    PathBuf::from("models/Lora")
}
fn default_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .map(|c| c.join("lora-keywords/known"))
        .unwrap_or_else(|| PathBuf::from("/tmp/lora-keywords/known"))
}
fn default_extensions() -> Vec<String> {
    vec![".pt".to_string(), ".safetensors".to_string()]
}
