//! Registry client for model-version lookups by file hash
//!
//! Talks to a Civitai-compatible API:
//! `GET {base}/api/v1/model-versions/by-hash/{sha256}` answering 200 with a
//! JSON object whose `trainedWords` field lists the keywords.

use crate::error::LookupError;
use crate::hasher::FileIdentifier;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_REGISTRY_URL: &str = "https://civitai.com";

/// Source of raw trained words for a file identifier
#[async_trait]
pub trait RegistryClient: Send + Sync {
    /// One request, no retry. An empty `Ok` means the entry exists with no words.
    async fn fetch(&self, identifier: &FileIdentifier) -> Result<Vec<String>, LookupError>;
}

/// Partial model-version response
#[derive(Debug, Deserialize)]
struct ModelVersionResponse {
    #[serde(rename = "trainedWords", default)]
    trained_words: Option<Vec<String>>,
}

/// HTTP client for the Civitai model-version API
pub struct CivitaiClient {
    http: Client,
    base_url: String,
}

impl CivitaiClient {
    /// Create a client against `base_url`, optionally with a request timeout.
    /// Without one the transport default applies.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> anyhow::Result<Self> {
        let mut builder = Client::builder().user_agent(concat!(
            env!("CARGO_PKG_NAME"),
            "/",
            env!("CARGO_PKG_VERSION")
        ));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        let http = builder
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to create HTTP client: {}", e))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Lookup URL for an identifier
    pub fn url_for(&self, identifier: &FileIdentifier) -> String {
        format!(
            "{}/api/v1/model-versions/by-hash/{}",
            self.base_url, identifier
        )
    }
}

#[async_trait]
impl RegistryClient for CivitaiClient {
    async fn fetch(&self, identifier: &FileIdentifier) -> Result<Vec<String>, LookupError> {
        let url = self.url_for(identifier);
        tracing::debug!(url = %url, "Querying registry");

        let response = self
            .http
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| LookupError::Unreachable(e.to_string()))?;

        match response.status() {
            StatusCode::OK => {}
            StatusCode::NOT_FOUND => return Err(LookupError::NotFound),
            status => {
                return Err(LookupError::Unreachable(format!("HTTP {}", status)));
            }
        }

        let body: ModelVersionResponse = response
            .json()
            .await
            .map_err(|e| LookupError::Malformed(e.to_string()))?;

        Ok(body.trained_words.unwrap_or_default())
    }
}

// ============================================================================
// Mock Implementation for Testing
// ============================================================================
