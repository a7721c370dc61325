//! [`AnalysisBackend`] backed by the remote analysis service over HTTP.

use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use verdant_config::UpstreamConfig;
use verdant_http::{Auth, HttpClient, RequestOpts};

use crate::traits::{AnalysisBackend, AnalysisError, AnalysisRequest};

pub struct HttpAnalysisBackend {
    client: HttpClient,
    analyze_path: String,
    status_path: String,
    api_key: Option<String>,
}

impl std::fmt::Debug for HttpAnalysisBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpAnalysisBackend")
            .field("base_url", &self.client.base_url().as_str())
            .field("analyze_path", &self.analyze_path)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// `join` drops the last path segment of a base without a trailing slash.
fn as_base(url: &str) -> String {
    let trimmed = url.trim();
    if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{trimmed}/")
    }
}

fn as_relative(path: &str) -> String {
    path.trim().trim_start_matches('/').to_string()
}

impl HttpAnalysisBackend {
    pub fn new(config: &UpstreamConfig) -> Result<Self, AnalysisError> {
        if config.base_url.trim().is_empty() {
            return Err(AnalysisError::Config("upstream.base_url is empty".into()));
        }
        let client = HttpClient::new(&as_base(&config.base_url))?
            .with_timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .with_retries(config.retries);
        tracing::debug!(
            base_url = %client.base_url(),
            analyze_path = %config.analyze_path,
            auth = if config.api_key().is_some() { "bearer" } else { "none" },
            "upstream.configured"
        );
        Ok(Self {
            client,
            analyze_path: as_relative(&config.analyze_path),
            status_path: as_relative(&config.status_path),
            api_key: config.api_key().map(str::to_string),
        })
    }

    fn opts(&self) -> RequestOpts<'_> {
        RequestOpts {
            auth: self.api_key.as_deref().map(Auth::Bearer),
            ..Default::default()
        }
    }
}

#[async_trait]
impl AnalysisBackend for HttpAnalysisBackend {
    async fn analyze(&self, request: &AnalysisRequest) -> Result<Value, AnalysisError> {
        let payload: Value = self
            .client
            .post_json(&self.analyze_path, request, self.opts())
            .await?;
        Ok(payload)
    }

    async fn health_check(&self) -> bool {
        match self
            .client
            .get_json::<Value>(&self.status_path, self.opts())
            .await
        {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!(error = %e, "upstream.health_check_failed");
                false
            }
        }
    }

    fn name(&self) -> &str {
        "http"
    }
}
