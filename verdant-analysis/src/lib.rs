//! Environmental-claim analysis core for Verdant.
//!
//! Leaves first:
//! - [`fingerprint`]: compact text fingerprints used as cache keys
//! - [`extract`]: rule-based claim extraction
//! - [`risk`]: score → level/percentage classification
//! - [`normalize`]: reconciles upstream payload shapes into one result
//! - [`cache`]: TTL cache in front of the upstream call
//! - [`pipeline`]: ties them together behind an [`traits::AnalysisBackend`]
//!
//! # Examples
//! ```no_run
//! use std::sync::Arc;
//! use verdant_analysis::{build_backend, cache::ContentCache, pipeline::Analyzer};
//! use verdant_config::UpstreamConfig;
//!
//! # #[tokio::main]
//! # async fn main() -> verdant_common::Result<()> {
//! let backend = build_backend(&UpstreamConfig::default())?;
//! let analyzer = Analyzer::new(backend, Arc::new(ContentCache::default()));
//! let report = analyzer
//!     .analyze_or_placeholder("Our packaging is fully biodegradable.", None)
//!     .await;
//! println!("{}", report.result.risk_level);
//! # Ok(())
//! # }
//! ```
pub mod cache;
pub mod claim;
pub mod extract;
pub mod fingerprint;
pub mod local;
pub mod normalize;
pub mod pipeline;
pub mod risk;
pub mod traits;
pub mod upstream;

use std::sync::Arc;
use std::time::Duration;

use cache::ContentCache;
use traits::AnalysisBackend;
use upstream::HttpAnalysisBackend;
use verdant_config::{CacheConfig, UpstreamConfig};

pub use claim::{CanonicalAnalysisResult, Claim, ClaimKind, ClaimOutcome};
pub use pipeline::{AnalysisReport, Analyzer, ResultSource};

/// Build the upstream backend described by `config`.
pub fn build_backend(
    config: &UpstreamConfig,
) -> verdant_common::Result<Arc<dyn AnalysisBackend>> {
    let backend = HttpAnalysisBackend::new(config)?;
    Ok(Arc::new(backend))
}

/// Build a cache with the configured TTL on the system clock.
pub fn build_cache(config: &CacheConfig) -> Arc<ContentCache> {
    Arc::new(ContentCache::new(Duration::from_secs(config.ttl_secs)))
}
