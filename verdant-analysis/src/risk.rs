//! Greenwashing risk classification.
//!
//! Bands are closed at the bottom: `[0, 0.3)` low, `[0.3, 0.7)` medium,
//! `[0.7, 1]` high. Scores outside `[0, 1]` are clamped first.

use serde::{Deserialize, Serialize};
use verdant_common::RiskLevel;

pub const MEDIUM_THRESHOLD: f64 = 0.3;
pub const HIGH_THRESHOLD: f64 = 0.7;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub score: f64,
    pub level: RiskLevel,
    pub percentage: u8,
}

impl RiskAssessment {
    /// Nothing to score: no upstream score and no claims.
    pub fn unknown() -> Self {
        RiskAssessment {
            score: 0.0,
            level: RiskLevel::Unknown,
            percentage: 0,
        }
    }
}

/// Rounds `score * 100` half-up. The product is snapped to six decimals
/// first so values like `0.855 * 100 == 85.49999999999999` land on `86`.
pub fn to_percentage(score: f64) -> u8 {
    let scaled = ((score * 100.0) * 1e6).round() / 1e6;
    scaled.round().clamp(0.0, 100.0) as u8
}

/// Maps a score to its level and percentage. A non-finite score cannot be
/// placed in a band and classifies as [`RiskLevel::Unknown`] at 0%.
///
/// ```
/// use verdant_analysis::risk::classify_risk;
/// use verdant_common::RiskLevel;
///
/// assert_eq!(classify_risk(0.3).level, RiskLevel::Medium);
/// assert_eq!(classify_risk(0.855).percentage, 86);
/// ```
pub fn classify_risk(score: f64) -> RiskAssessment {
    if !score.is_finite() {
        return RiskAssessment::unknown();
    }
    let score = score.clamp(0.0, 1.0);
    let level = if score >= HIGH_THRESHOLD {
        RiskLevel::High
    } else if score >= MEDIUM_THRESHOLD {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    };
    RiskAssessment {
        score,
        level,
        percentage: to_percentage(score),
    }
}

/// Heuristic score used when upstream gave none: more claims, more risk.
pub fn score_from_claim_count(count: usize) -> f64 {
    match count {
        c if c > 10 => 0.7,
        c if c > 5 => 0.4,
        c if c > 0 => 0.2,
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn band_boundaries_are_inclusive_at_the_bottom() {
        assert_eq!(classify_risk(0.3).level, RiskLevel::Medium);
        assert_eq!(classify_risk(0.2999).level, RiskLevel::Low);
        assert_eq!(classify_risk(0.7).level, RiskLevel::High);
        assert_eq!(classify_risk(0.6999).level, RiskLevel::Medium);
        assert_eq!(classify_risk(0.0).level, RiskLevel::Low);
        assert_eq!(classify_risk(1.0).level, RiskLevel::High);
    }

    #[test]
    fn percentage_rounds_half_up() {
        assert_eq!(classify_risk(0.855).percentage, 86);
        assert_eq!(classify_risk(0.845).percentage, 85);
        assert_eq!(classify_risk(0.005).percentage, 1);
        assert_eq!(classify_risk(0.2999).percentage, 30);
        assert_eq!(classify_risk(0.7).percentage, 70);
    }

    #[test]
    fn out_of_range_scores_are_clamped() {
        let hi = classify_risk(3.5);
        assert_eq!((hi.level, hi.percentage), (RiskLevel::High, 100));
        let lo = classify_risk(-0.4);
        assert_eq!((lo.level, lo.percentage), (RiskLevel::Low, 0));
    }

    #[test]
    fn non_finite_scores_are_unknown() {
        assert_eq!(classify_risk(f64::NAN).level, RiskLevel::Unknown);
        assert_eq!(classify_risk(f64::INFINITY).percentage, 0);
    }

    #[test]
    fn claim_volume_fallback() {
        assert_eq!(score_from_claim_count(0), 0.0);
        assert_eq!(score_from_claim_count(1), 0.2);
        assert_eq!(score_from_claim_count(5), 0.2);
        assert_eq!(score_from_claim_count(6), 0.4);
        assert_eq!(score_from_claim_count(10), 0.4);
        assert_eq!(score_from_claim_count(11), 0.7);
    }
}
