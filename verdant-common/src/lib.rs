//! Common types and utilities shared across Verdant crates.
//!
//! This crate defines the shared error type, the workspace `Result` alias and
//! the observability helpers used throughout the Verdant workspace. It is
//! intentionally lightweight so that every crate can depend on it without
//! introducing heavy transitive costs.
//!
//! # Overview
//!
//! - [`observability`]: Centralised tracing/logging initialisation
//! - [`VerdantError`] and [`Result`]: Shared error handling
//! - [`RiskLevel`]: The categorical risk label every layer agrees on
//!
//! # Examples
//!
//! ```rust
//! use verdant_common::RiskLevel;
//!
//! assert_eq!(RiskLevel::Medium.as_str(), "medium");
//! assert_eq!("high".parse::<RiskLevel>().unwrap(), RiskLevel::High);
//! ```
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub mod observability;

/// Categorical greenwashing risk attached to every canonical analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    /// No genuine score was available (e.g. a locally generated placeholder).
    #[default]
    Unknown,
}

impl RiskLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
            RiskLevel::Unknown => "unknown",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RiskLevel {
    type Err = VerdantError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(RiskLevel::Low),
            "medium" => Ok(RiskLevel::Medium),
            "high" => Ok(RiskLevel::High),
            "unknown" => Ok(RiskLevel::Unknown),
            other => Err(VerdantError::Config(format!("unknown risk level: {other}"))),
        }
    }
}

/// Error types used across the Verdant system.
#[derive(thiserror::Error, Debug)]
pub enum VerdantError {
    /// The upstream analysis service failed or could not be reached.
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// Configuration was incomplete or invalid.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Convenient alias for results that use [`VerdantError`].
pub type Result<T> = std::result::Result<T, VerdantError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn risk_level_serializes_lowercase() {
        let json = serde_json::to_string(&RiskLevel::High).unwrap();
        assert_eq!(json, "\"high\"");
        let back: RiskLevel = serde_json::from_str("\"unknown\"").unwrap();
        assert_eq!(back, RiskLevel::Unknown);
    }

    #[test]
    fn risk_level_parse_rejects_garbage() {
        assert!(" Low ".parse::<RiskLevel>().is_ok());
        assert!(matches!(
            "severe".parse::<RiskLevel>(),
            Err(VerdantError::Config(_))
        ));
    }
}
