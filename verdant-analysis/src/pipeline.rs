//! Cache → upstream → normalize → store.
//!
//! Lookup, upstream call and store form one logical request with no
//! in-flight de-duplication: two concurrent requests for the same text can
//! both miss and both reach the backend. Each stores its own result; the
//! later insert wins.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

use crate::cache::ContentCache;
use crate::claim::CanonicalAnalysisResult;
use crate::fingerprint::Fingerprint;
use crate::local::placeholder_result;
use crate::normalize::normalize;
use crate::traits::{AnalysisBackend, AnalysisError, AnalysisRequest};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultSource {
    Cache,
    Upstream,
    /// Generated locally because the backend failed; not a real analysis.
    LocalPlaceholder,
}

/// What the pipeline hands back to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub result: CanonicalAnalysisResult,
    pub source: ResultSource,
    pub fingerprint: Fingerprint,
}

impl AnalysisReport {
    pub fn is_placeholder(&self) -> bool {
        self.source == ResultSource::LocalPlaceholder
    }
}

#[derive(Clone)]
pub struct Analyzer {
    backend: Arc<dyn AnalysisBackend>,
    cache: Arc<ContentCache>,
}

impl Analyzer {
    pub fn new(backend: Arc<dyn AnalysisBackend>, cache: Arc<ContentCache>) -> Self {
        Self { backend, cache }
    }

    pub fn cache(&self) -> &ContentCache {
        &self.cache
    }

    /// Returns the cached result for `text` or asks the backend.
    ///
    /// Only successful upstream results are cached; failures leave the
    /// cache untouched.
    pub async fn analyze(
        &self,
        text: &str,
        url: Option<&str>,
    ) -> Result<AnalysisReport, AnalysisError> {
        let fingerprint = Fingerprint::of(text);

        if let Some(entry) = self.cache.get(text) {
            tracing::debug!(%fingerprint, source = "cache", "analysis.hit");
            return Ok(AnalysisReport {
                result: entry.data.clone(),
                source: ResultSource::Cache,
                fingerprint,
            });
        }

        let started = Instant::now();
        let request = AnalysisRequest::new(text, url.map(str::to_string));
        let payload = match self.backend.analyze(&request).await {
            Ok(p) => p,
            Err(e) => {
                tracing::warn!(
                    %fingerprint,
                    backend = self.backend.name(),
                    error = %e,
                    "analysis.upstream_failed"
                );
                return Err(e);
            }
        };

        let result = normalize(&payload, Some(text));
        self.cache.put(text, result.clone());
        self.cache.sweep();

        tracing::info!(
            %fingerprint,
            source = "upstream",
            backend = self.backend.name(),
            claims = result.detected_claims.len(),
            risk_level = %result.risk_level,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "analysis.complete"
        );

        Ok(AnalysisReport {
            result,
            source: ResultSource::Upstream,
            fingerprint,
        })
    }

    /// Like [`Analyzer::analyze`], but a backend failure yields the labelled
    /// local placeholder instead of an error. Placeholders are never cached.
    pub async fn analyze_or_placeholder(&self, text: &str, url: Option<&str>) -> AnalysisReport {
        match self.analyze(text, url).await {
            Ok(report) => report,
            Err(e) => {
                tracing::info!(error = %e, source = "local_placeholder", "analysis.fallback");
                local_report(text)
            }
        }
    }
}

/// Placeholder report without touching any backend.
pub fn local_report(text: &str) -> AnalysisReport {
    AnalysisReport {
        result: placeholder_result(text),
        source: ResultSource::LocalPlaceholder,
        fingerprint: Fingerprint::of(text),
    }
}
