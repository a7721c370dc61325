//! On-device fallback used when the analysis service cannot be reached.
//!
//! The result is clearly labelled: `risk_level` is `unknown`, the percentage
//! is 0 and the summary says it is a local placeholder. Claims come from the
//! rule-based extractor; keywords and indicators from fixed phrase lists.

use regex::Regex;
use std::sync::LazyLock;
use verdant_common::RiskLevel;

use crate::claim::{CanonicalAnalysisResult, ClaimOutcome};
use crate::extract::extract_claims;

pub const LOCAL_PLACEHOLDER_LABEL: &str = "Local placeholder";

/// Environmental vocabulary reported back as `keywords`.
pub const ENVIRONMENTAL_KEYWORDS: &[&str] = &[
    "carbon neutral",
    "renewable energy",
    "solar power",
    "wind energy",
    "sustainable",
    "eco-friendly",
    "biodegradable",
    "recycling",
    "green energy",
    "climate change",
    "environmental impact",
    "circular economy",
    "zero waste",
    "organic",
    "fair trade",
    "certifications",
    "verified",
    "audited",
];

/// Vague marketing terms that need backing evidence.
pub const VAGUE_TERMS: &[&str] = &[
    "eco-friendly",
    "natural",
    "green",
    "clean",
    "pure",
    "environmentally safe",
    "non-toxic",
    "chemical-free",
    "100% natural",
    "completely green",
    "totally sustainable",
];

pub const ABSOLUTE_TERMS: &[&str] = &["100%", "completely", "totally", "entirely", "perfectly"];

/// More occurrences than this are reported as frequent use.
const FREQUENT_USE_THRESHOLD: usize = 2;

fn term_regex(term: &str) -> Regex {
    let ends_in_word = term.chars().last().is_some_and(|c| c.is_alphanumeric());
    let tail = if ends_in_word { r"\b" } else { "" };
    Regex::new(&format!(r"(?i)\b{}{tail}", regex::escape(term))).expect("term pattern compiles")
}

static VAGUE_PATTERNS: LazyLock<Vec<(&'static str, Regex)>> =
    LazyLock::new(|| VAGUE_TERMS.iter().map(|t| (*t, term_regex(t))).collect());

static ABSOLUTE_PATTERNS: LazyLock<Vec<(&'static str, Regex)>> =
    LazyLock::new(|| ABSOLUTE_TERMS.iter().map(|t| (*t, term_regex(t))).collect());

/// Environmental keywords present in `text`, in list order.
pub fn environmental_keywords(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    ENVIRONMENTAL_KEYWORDS
        .iter()
        .filter(|kw| lower.contains(*kw))
        .map(|kw| kw.to_string())
        .collect()
}

/// Human-readable greenwashing warnings for vague and absolute wording.
pub fn greenwashing_indicators(text: &str) -> Vec<String> {
    let mut out = Vec::new();
    for (term, re) in VAGUE_PATTERNS.iter() {
        let count = re.find_iter(text).count();
        if count > FREQUENT_USE_THRESHOLD {
            out.push(format!("Frequent use of vague term: '{term}' ({count} times)"));
        } else if count > 0 {
            out.push(format!("Vague term found: '{term}' - requires verification"));
        }
    }
    for (term, re) in ABSOLUTE_PATTERNS.iter() {
        if re.is_match(text) {
            out.push(format!("Absolute claim: '{term}' - verify supporting evidence"));
        }
    }
    out
}

/// Builds the labelled stand-in result for `text`.
pub fn placeholder_result(text: &str) -> CanonicalAnalysisResult {
    let claims = extract_claims(text);
    let found = claims.len();
    let outcome = if claims.is_empty() {
        ClaimOutcome::NoneDetected
    } else {
        ClaimOutcome::Found(claims)
    };
    CanonicalAnalysisResult {
        detected_claims: outcome.into_claims(),
        risk_level: RiskLevel::Unknown,
        risk_percentage: 0,
        summary: format!(
            "{LOCAL_PLACEHOLDER_LABEL}: the analysis service was unavailable. \
             {found} candidate claim(s) were found by local rules; no risk score was computed."
        ),
        keywords: environmental_keywords(text),
        greenwashing_indicators: greenwashing_indicators(text),
        claims_reported: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::claim::ClaimKind;

    #[test]
    fn placeholder_is_labelled_and_unscored() {
        let r = placeholder_result("Our bottles are 100% recyclable. Buy two today!");
        assert_eq!(r.risk_level, RiskLevel::Unknown);
        assert_eq!(r.risk_percentage, 0);
        assert!(r.summary.starts_with(LOCAL_PLACEHOLDER_LABEL));
        assert_eq!(r.detected_claims.len(), 1);
        assert_eq!(r.detected_claims[0].kind, ClaimKind::EnvironmentalStatement);
        assert_eq!(r.greenwashing_indicators, vec!["Absolute claim: '100%' - verify supporting evidence"]);
    }

    #[test]
    fn placeholder_without_claims_has_sentinel() {
        let r = placeholder_result("Opening hours are nine to five on weekdays.");
        assert_eq!(r.detected_claims[0].kind, ClaimKind::NoClaims);
        assert!(r.keywords.is_empty());
    }

    #[test]
    fn vague_terms_are_counted_on_word_boundaries() {
        let text = "Green choices. Green living. Green homes. Evergreen trees.";
        let ind = greenwashing_indicators(text);
        assert_eq!(ind, vec!["Frequent use of vague term: 'green' (3 times)"]);

        let ind = greenwashing_indicators("A pure and natural soap.");
        assert_eq!(
            ind,
            vec![
                "Vague term found: 'natural' - requires verification",
                "Vague term found: 'pure' - requires verification",
            ]
        );
    }

    #[test]
    fn overlapping_terms_each_report() {
        let ind = greenwashing_indicators("It is 100% natural.");
        assert!(ind.contains(&"Vague term found: 'natural' - requires verification".to_string()));
        assert!(ind.contains(&"Vague term found: '100% natural' - requires verification".to_string()));
        assert!(ind.contains(&"Absolute claim: '100%' - verify supporting evidence".to_string()));
    }

    #[test]
    fn keywords_are_reported_in_list_order() {
        let kws = environmental_keywords("Zero waste stores, audited yearly, on Renewable Energy.");
        assert_eq!(kws, vec!["renewable energy", "zero waste", "audited"]);
    }
}
