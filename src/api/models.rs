//! API request and response models

use crate::lookup::DisplayResult;
use serde::{Deserialize, Serialize};

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// LoRA files available for selection
#[derive(Debug, Serialize, Deserialize)]
pub struct LoraListResponse {
    pub files: Vec<String>,
}

/// Query for a keyword lookup; a missing `file` is an empty selection
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct KeywordsQuery {
    #[serde(default)]
    pub file: Option<String>,
}

/// Keyword lookup response
#[derive(Debug, Serialize, Deserialize)]
pub struct KeywordsResponse {
    pub file: String,
    /// One of `unselected`, `keywords`, `no_keywords`, `file_error`, `lookup_failed`
    pub outcome: String,
    /// Text for the keyword box
    pub text: String,
    pub keywords: Vec<String>,
}

impl KeywordsResponse {
    pub fn from_result(file: String, result: &DisplayResult) -> Self {
        Self {
            file,
            outcome: result.outcome().to_string(),
            text: result.text(),
            keywords: result.keywords().to_vec(),
        }
    }
}
