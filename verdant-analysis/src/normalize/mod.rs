//! Reconciles heterogeneous upstream payloads into a [`CanonicalAnalysisResult`].
//!
//! The normalizer never fails: an unrecognised payload falls through every
//! rule chain to its default (no claims, empty lists, claim-volume risk).
//! Payloads that are already canonical are returned as they are, so feeding
//! a result back in is a no-op.

pub mod rules;

use serde_json::Value;
use std::collections::HashSet;
use std::sync::LazyLock;

use crate::claim::{CanonicalAnalysisResult, Claim, ClaimKind, ClaimOutcome, DEFAULT_CLAIM_CONFIDENCE};
use crate::extract::extract_claims;
use crate::risk::{classify_risk, score_from_claim_count, RiskAssessment};
use rules::{first_match, PathSource, Rule, CLAIM_SOURCES, TEXT_SOURCES};

/// Marker text some upstream versions use for unnamed claims.
pub const PLACEHOLDER_MARKER: &str = "Environmental claim";
pub const DEFAULT_SUMMARY: &str = "Analysis completed; the analysis service did not provide a summary";
const MIN_CLAIM_CHARS: usize = 20;

static DEFAULT_NORMALIZER: LazyLock<Normalizer> = LazyLock::new(Normalizer::default);

/// Normalizes with the default rule tables.
pub fn normalize(payload: &Value, original_text: Option<&str>) -> CanonicalAnalysisResult {
    DEFAULT_NORMALIZER.normalize(payload, original_text)
}

/// Claim entry after shape reconciliation, before filtering.
#[derive(Debug, Clone)]
struct RawClaim {
    text: Option<String>,
    confidence: Option<f64>,
    kind: Option<String>,
}

impl RawClaim {
    fn from_entry(entry: &Value) -> Option<Self> {
        match entry {
            Value::String(s) => Some(Self {
                text: Some(s.trim().to_string()),
                confidence: None,
                kind: None,
            }),
            Value::Object(obj) => {
                let text = ["text", "claim_text"]
                    .iter()
                    .find_map(|k| obj.get(*k).and_then(Value::as_str))
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty());
                let confidence = ["confidence", "confidence_score"]
                    .iter()
                    .find_map(|k| obj.get(*k).and_then(rules::as_number));
                let kind = obj
                    .get("type")
                    .and_then(Value::as_str)
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string);
                Some(Self {
                    text,
                    confidence,
                    kind,
                })
            }
            _ => None,
        }
    }

    fn from_claim(claim: Claim) -> Self {
        Self {
            text: Some(claim.text),
            confidence: Some(claim.confidence),
            kind: Some(claim.kind.into()),
        }
    }

    /// `position` is 1-based and only used to label text-less entries.
    fn into_claim(self, position: usize) -> Claim {
        let text = self
            .text
            .unwrap_or_else(|| format!("Environmental statement {position}"));
        let kind = self
            .kind
            .map(ClaimKind::from)
            .unwrap_or(ClaimKind::Environmental);
        Claim::new(
            text,
            self.confidence.unwrap_or(DEFAULT_CLAIM_CONFIDENCE),
            kind,
        )
    }
}

fn is_displayable(text: &str) -> bool {
    text.chars().count() > MIN_CLAIM_CHARS && !text.contains(PLACEHOLDER_MARKER)
}

/// Rule tables driving normalization. Every chain is ordered and appendable.
pub struct Normalizer {
    pub summary: Vec<Rule<String>>,
    pub risk_score: Vec<Rule<f64>>,
    pub keywords: Vec<Rule<Vec<String>>>,
    pub indicators: Vec<Rule<Vec<String>>>,
    pub claim_count: Vec<Rule<u64>>,
    pub claim_sources: Vec<PathSource>,
    pub text_sources: Vec<PathSource>,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self {
            summary: rules::summary_rules(),
            risk_score: rules::risk_score_rules(),
            keywords: rules::keyword_rules(),
            indicators: rules::indicator_rules(),
            claim_count: rules::claim_count_rules(),
            claim_sources: CLAIM_SOURCES.to_vec(),
            text_sources: TEXT_SOURCES.to_vec(),
        }
    }
}

impl Normalizer {
    /// Adds a lowest-priority risk score source.
    pub fn with_risk_rule(mut self, rule: Rule<f64>) -> Self {
        self.risk_score.push(rule);
        self
    }

    /// Adds a lowest-priority claim array location.
    pub fn with_claim_source(mut self, source: PathSource) -> Self {
        self.claim_sources.push(source);
        self
    }

    pub fn normalize(&self, payload: &Value, original_text: Option<&str>) -> CanonicalAnalysisResult {
        if let Some(canonical) = already_canonical(payload) {
            tracing::trace!("normalize.passthrough");
            return canonical;
        }

        let summary = match first_match(&self.summary, payload) {
            Some((rule, s)) => {
                tracing::trace!(rule, "normalize.summary");
                s
            }
            None => DEFAULT_SUMMARY.to_string(),
        };

        let outcome = self.claim_outcome(payload, original_text);
        let claims_reported = outcome.reported_count();

        let risk = match first_match(&self.risk_score, payload) {
            Some((rule, score)) => {
                tracing::trace!(rule, score, "normalize.risk_score");
                classify_risk(score)
            }
            None => match outcome.claim_volume() {
                0 => RiskAssessment::unknown(),
                volume => classify_risk(score_from_claim_count(volume)),
            },
        };
        let detected_claims = outcome.into_claims();

        let keywords = first_match(&self.keywords, payload)
            .map(|(_, v)| v)
            .unwrap_or_default();
        let greenwashing_indicators = first_match(&self.indicators, payload)
            .map(|(_, v)| v)
            .unwrap_or_default();

        tracing::debug!(
            claims = detected_claims.len(),
            first_kind = %detected_claims.first().map(|c| c.kind.as_str()).unwrap_or("-"),
            risk_level = %risk.level,
            risk_percentage = risk.percentage,
            "normalize.result"
        );

        CanonicalAnalysisResult {
            detected_claims,
            risk_level: risk.level,
            risk_percentage: risk.percentage,
            summary,
            keywords,
            greenwashing_indicators,
            claims_reported,
        }
    }

    fn claim_outcome(&self, payload: &Value, original_text: Option<&str>) -> ClaimOutcome {
        let mut raw: Vec<RawClaim> = Vec::new();

        for source in &self.claim_sources {
            if let Some(items) = source.lookup(payload).and_then(Value::as_array) {
                tracing::trace!(source = source.name, entries = items.len(), "normalize.claim_source");
                raw.extend(items.iter().filter_map(RawClaim::from_entry));
            }
        }

        let texts: Vec<&str> = self
            .text_sources
            .iter()
            .filter_map(|s| s.lookup(payload).and_then(Value::as_str))
            .collect();
        let texts: Vec<&str> = if texts.is_empty() {
            original_text.into_iter().collect()
        } else {
            texts
        };
        for text in texts {
            raw.extend(extract_claims(text).into_iter().map(RawClaim::from_claim));
        }

        let mut seen: HashSet<String> = HashSet::new();
        let claims: Vec<Claim> = raw
            .into_iter()
            .enumerate()
            .map(|(i, r)| r.into_claim(i + 1))
            .filter(|c| is_displayable(&c.text))
            .filter(|c| seen.insert(c.text.clone()))
            .collect();

        if !claims.is_empty() {
            return ClaimOutcome::Found(claims);
        }

        match first_match(&self.claim_count, payload) {
            Some((_, n)) if n > 0 => ClaimOutcome::UpstreamLimited(n),
            _ => ClaimOutcome::NoneDetected,
        }
    }
}

/// A payload whose first `detected_claims` entry carries real text and which
/// decodes as a full canonical result.
fn already_canonical(payload: &Value) -> Option<CanonicalAnalysisResult> {
    let first = payload.get("detected_claims")?.as_array()?.first()?;
    let text = first.get("text")?.as_str()?;
    if text.contains(PLACEHOLDER_MARKER) {
        return None;
    }
    match serde_json::from_value::<CanonicalAnalysisResult>(payload.clone()) {
        Ok(result) => Some(result),
        Err(e) => {
            tracing::trace!(error = %e, "normalize.not_canonical");
            None
        }
    }
}
