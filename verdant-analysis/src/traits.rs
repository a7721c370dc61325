use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use verdant_common::VerdantError;
use verdant_http::HttpError;

/// Body sent to the analysis service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub text: String,
    /// Page the text was taken from; empty when unknown.
    #[serde(default)]
    pub url: String,
}

impl AnalysisRequest {
    pub fn new(text: impl Into<String>, url: Option<String>) -> Self {
        Self {
            text: text.into(),
            url: url.unwrap_or_default(),
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum AnalysisError {
    #[error("analysis service failed{}: {message}", status_suffix(.status))]
    Upstream {
        status: Option<u16>,
        message: String,
    },

    #[error("Configuration error: {0}")]
    Config(String),
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" ({s})")).unwrap_or_default()
}

impl From<HttpError> for AnalysisError {
    fn from(e: HttpError) -> Self {
        match e {
            HttpError::Url(msg) | HttpError::Build(msg) => AnalysisError::Config(msg),
            other => AnalysisError::Upstream {
                status: other.status().map(|s| s.as_u16()),
                message: other.to_string(),
            },
        }
    }
}

impl From<AnalysisError> for VerdantError {
    fn from(e: AnalysisError) -> Self {
        match e {
            AnalysisError::Upstream { .. } => VerdantError::Upstream(e.to_string()),
            AnalysisError::Config(msg) => VerdantError::Config(msg),
        }
    }
}

/// The upstream seam: something that turns text into a raw JSON analysis.
///
/// Implementations return the payload as-is; reconciling its shape is the
/// normalizer's job.
#[async_trait]
pub trait AnalysisBackend: Send + Sync {
    async fn analyze(&self, request: &AnalysisRequest) -> Result<Value, AnalysisError>;

    /// Check if the analysis service is reachable
    async fn health_check(&self) -> bool;

    /// Short label for logs
    fn name(&self) -> &str;
}
