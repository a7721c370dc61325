//! Claim and canonical-result types shared by the extractor, normalizer,
//! cache and pipeline.

use serde::{Deserialize, Serialize};
use std::fmt;
use verdant_common::RiskLevel;

pub const DEFAULT_CLAIM_CONFIDENCE: f64 = 0.8;

/// Type tag carried by every claim. Unrecognised upstream tags are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ClaimKind {
    /// Sentence matched one of the environmental-language patterns.
    EnvironmentalStatement,
    /// Sentence only mentioned environmental keywords.
    EnvironmentalMention,
    /// Claim supplied by the upstream service without its own tag.
    Environmental,
    /// Sentinel: upstream counted claims but did not itemize them.
    ApiLimitation,
    /// Sentinel: nothing was found.
    NoClaims,
    Other(String),
}

impl ClaimKind {
    pub fn as_str(&self) -> &str {
        match self {
            ClaimKind::EnvironmentalStatement => "environmental_statement",
            ClaimKind::EnvironmentalMention => "environmental_mention",
            ClaimKind::Environmental => "environmental",
            ClaimKind::ApiLimitation => "api_limitation",
            ClaimKind::NoClaims => "no_claims",
            ClaimKind::Other(s) => s,
        }
    }

    pub fn is_sentinel(&self) -> bool {
        matches!(self, ClaimKind::ApiLimitation | ClaimKind::NoClaims)
    }
}

impl From<String> for ClaimKind {
    fn from(s: String) -> Self {
        match s.as_str() {
            "environmental_statement" => ClaimKind::EnvironmentalStatement,
            "environmental_mention" => ClaimKind::EnvironmentalMention,
            "environmental" => ClaimKind::Environmental,
            "api_limitation" => ClaimKind::ApiLimitation,
            "no_claims" => ClaimKind::NoClaims,
            _ => ClaimKind::Other(s),
        }
    }
}

impl From<&str> for ClaimKind {
    fn from(s: &str) -> Self {
        ClaimKind::from(s.to_string())
    }
}

impl From<ClaimKind> for String {
    fn from(k: ClaimKind) -> Self {
        k.as_str().to_string()
    }
}

impl fmt::Display for ClaimKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn default_confidence() -> f64 {
    DEFAULT_CLAIM_CONFIDENCE
}

fn default_kind() -> ClaimKind {
    ClaimKind::Environmental
}

/// One candidate environmental statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claim {
    pub text: String,
    #[serde(default = "default_confidence")]
    pub confidence: f64,
    #[serde(rename = "type", default = "default_kind")]
    pub kind: ClaimKind,
}

impl Claim {
    /// Builds a claim, clamping `confidence` into `[0, 1]`.
    pub fn new(text: impl Into<String>, confidence: f64, kind: ClaimKind) -> Self {
        let confidence = if confidence.is_finite() {
            confidence.clamp(0.0, 1.0)
        } else {
            DEFAULT_CLAIM_CONFIDENCE
        };
        Self {
            text: text.into(),
            confidence,
            kind,
        }
    }
}

/// What a normalization pass learned about claims, before sentinels are
/// rendered into the wire-level list.
#[derive(Debug, Clone, PartialEq)]
pub enum ClaimOutcome {
    Found(Vec<Claim>),
    NoneDetected,
    /// Upstream reported this many claims without itemizing them.
    UpstreamLimited(u64),
}

impl ClaimOutcome {
    /// Renders the outcome into a never-empty claim list.
    pub fn into_claims(self) -> Vec<Claim> {
        match self {
            ClaimOutcome::Found(claims) => claims,
            ClaimOutcome::NoneDetected => vec![Claim::new(
                "No environmental claims were detected in this content",
                0.0,
                ClaimKind::NoClaims,
            )],
            ClaimOutcome::UpstreamLimited(count) => vec![Claim::new(
                format!(
                    "The analysis service counted {count} environmental claim(s) but did not return their text"
                ),
                0.0,
                ClaimKind::ApiLimitation,
            )],
        }
    }

    /// How many claims this outcome stands for when scoring by volume.
    /// An uncounted upstream report still stands for at least one.
    pub fn claim_volume(&self) -> usize {
        match self {
            ClaimOutcome::Found(claims) => claims.len(),
            ClaimOutcome::NoneDetected => 0,
            ClaimOutcome::UpstreamLimited(_) => 1,
        }
    }

    pub fn reported_count(&self) -> Option<u64> {
        match self {
            ClaimOutcome::UpstreamLimited(n) => Some(*n),
            _ => None,
        }
    }
}

/// The single shape every caller of the pipeline can rely on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalAnalysisResult {
    pub detected_claims: Vec<Claim>,
    pub risk_level: RiskLevel,
    pub risk_percentage: u8,
    pub summary: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub greenwashing_indicators: Vec<String>,
    /// Claim count reported by upstream when it did not itemize claims.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub claims_reported: Option<u64>,
}

impl CanonicalAnalysisResult {
    /// Recovers the tagged outcome from claim types.
    pub fn outcome(&self) -> ClaimOutcome {
        match self.detected_claims.first().map(|c| &c.kind) {
            None | Some(ClaimKind::NoClaims) => ClaimOutcome::NoneDetected,
            Some(ClaimKind::ApiLimitation) => {
                ClaimOutcome::UpstreamLimited(self.claims_reported.unwrap_or(0))
            }
            Some(_) => ClaimOutcome::Found(
                self.detected_claims
                    .iter()
                    .filter(|c| !c.kind.is_sentinel())
                    .cloned()
                    .collect(),
            ),
        }
    }

    /// Claims that are real statements rather than sentinels.
    pub fn genuine_claims(&self) -> impl Iterator<Item = &Claim> {
        self.detected_claims.iter().filter(|c| !c.kind.is_sentinel())
    }
}
