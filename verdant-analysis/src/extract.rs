//! Rule-based environmental claim extraction.
//!
//! Text is split into sentences on runs of `.`, `!` and `?` only, so a
//! sentence joined by a conjunction ("... recyclable packaging and is carbon
//! neutral.") is a single sentence and yields at most one claim.
//!
//! Two passes:
//! 1. every sentence is tested against [`CLAIM_PATTERNS`]; any match makes it
//!    an `environmental_statement` with confidence 0.85;
//! 2. only if pass 1 found nothing, sentences are scored by how many distinct
//!    [`MENTION_KEYWORDS`] they contain and become `environmental_mention`s.

use regex::{Regex, RegexSet};
use std::collections::HashSet;
use std::sync::LazyLock;

use crate::claim::{Claim, ClaimKind};

pub const STATEMENT_CONFIDENCE: f64 = 0.85;
const MIN_SENTENCE_CHARS: usize = 10;
const MIN_STATEMENT_CHARS: usize = 20;
const MIN_MENTION_CHARS: usize = 25;
const MENTION_BASE_CONFIDENCE: f64 = 0.5;
const MENTION_STEP_CONFIDENCE: f64 = 0.1;
const MENTION_MAX_CONFIDENCE: f64 = 0.9;

/// Environmental-language patterns, most specific first. All case-insensitive.
pub const CLAIM_PATTERNS: &[&str] = &[
    // absolute sustainability claims
    r"(?i)(?:\b100\s*%|\b(?:completely|fully|totally|entirely))\s*(?:recyclable|biodegradable|sustainable|eco-friendly|green|renewable)\b",
    // carbon neutrality
    r"(?i)\bcarbon[\s-]+(?:neutral|negative|free)\b|\bnet[\s-]+zero\b",
    // zero waste / zero emission
    r"(?i)\bzero[\s-]+(?:waste|emissions?|carbon)\b",
    // renewable energy sources
    r"(?i)\b(?:renewable|solar|wind|clean|green)\s+(?:energy|power|electricity)\b",
    // organic / natural / non-toxic
    r"(?i)\b(?:certified\s+)?organic\b|\ball[\s-]natural\b|\b100\s*%\s*natural\b|\bnon[\s-]?toxic\b",
    // sustainable sourcing
    r"(?i)\bsustainabl[ey]\s+(?:sourced|produced|made|grown|harvested)\b",
    // environmentally *
    r"(?i)\benvironmentally\s+(?:friendly|responsible|conscious|safe)\b",
    r"(?i)\beco[\s-]?friendly\b",
    r"(?i)\bbiodegradable\b",
    r"(?i)\brecyclable\b",
    r"(?i)\bcarbon\s+footprint\b",
    r"(?i)\bgreen\s+technolog(?:y|ies)\b",
    // emission reduction
    r"(?i)\b(?:emissions?|carbon)\s+reductions?\b|\breduc(?:e|es|ed|ing)\s+(?:[\w-]+\s+){0,2}emissions?\b",
    r"(?i)\benvironmental\s+protection\b|\bprotect(?:s|ing)?\s+the\s+environment\b",
    r"(?i)\bclimate[\s-]+(?:friendly|positive|smart)\b",
    r"(?i)\benergy[\s-]+efficien(?:t|cy)\b",
    r"(?i)\bwater\s+(?:conservation|saving)\b|\bconserv(?:e|es|ing)\s+water\b",
    // waste reduction
    r"(?i)\bwaste\s+reductions?\b|\b(?:reduc|minimi[sz])(?:e|es|ed|ing)\s+(?:[\w-]+\s+){0,2}waste\b",
    // sustainability commitment
    r"(?i)\bcommit(?:s|ted|ment)?\s+to\s+(?:[\w-]+\s+){0,2}sustainab(?:ility|le)\b|\bsustainability\s+(?:commitments?|goals?|pledges?)\b",
];

/// Keywords counted by the fallback pass.
pub const MENTION_KEYWORDS: &[&str] = &[
    "sustainable",
    "eco-friendly",
    "green",
    "renewable",
    "biodegradable",
    "carbon neutral",
    "zero waste",
    "organic",
    "recyclable",
    "clean energy",
    "environmental",
    "climate",
    "planet",
    "earth-friendly",
    "natural",
    "emission",
    "footprint",
    "conservation",
    "preservation",
];

static CLAIM_SET: LazyLock<RegexSet> =
    LazyLock::new(|| RegexSet::new(CLAIM_PATTERNS).expect("claim patterns compile"));

static SENTENCE_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.!?]+").expect("sentence break pattern compiles"));

/// Splits on runs of terminal punctuation, trims, and drops fragments
/// shorter than 10 characters.
pub fn split_sentences(text: &str) -> Vec<&str> {
    SENTENCE_BREAK
        .split(text)
        .map(str::trim)
        .filter(|s| s.chars().count() >= MIN_SENTENCE_CHARS)
        .collect()
}

/// True if any environmental-language pattern matches.
pub fn is_environmental_statement(sentence: &str) -> bool {
    CLAIM_SET.is_match(sentence)
}

/// Number of distinct [`MENTION_KEYWORDS`] present, case-insensitively.
pub fn keyword_count(sentence: &str) -> usize {
    let lower = sentence.to_lowercase();
    MENTION_KEYWORDS
        .iter()
        .filter(|kw| lower.contains(*kw))
        .count()
}

fn strip_non_word(s: &str) -> &str {
    s.trim_matches(|c: char| !(c.is_alphanumeric() || c == '_'))
}

/// Extracts candidate claims in encounter order. Empty or blank input gives
/// an empty list. Pure: equal inputs give equal outputs.
///
/// ```
/// use verdant_analysis::extract::extract_claims;
///
/// let claims = extract_claims("Our cups are fully biodegradable and compostable.");
/// assert_eq!(claims.len(), 1);
/// assert_eq!(claims[0].text, "Our cups are fully biodegradable and compostable");
/// ```
pub fn extract_claims(text: &str) -> Vec<Claim> {
    if text.trim().is_empty() {
        return Vec::new();
    }

    let sentences = split_sentences(text);
    let mut seen: HashSet<&str> = HashSet::new();
    let mut claims = Vec::new();

    for sentence in &sentences {
        if !is_environmental_statement(sentence) {
            continue;
        }
        let cleaned = strip_non_word(sentence);
        if cleaned.chars().count() > MIN_STATEMENT_CHARS && seen.insert(cleaned) {
            claims.push(Claim::new(
                cleaned,
                STATEMENT_CONFIDENCE,
                ClaimKind::EnvironmentalStatement,
            ));
        }
    }

    if claims.is_empty() {
        for sentence in &sentences {
            let hits = keyword_count(sentence);
            if hits == 0 || sentence.chars().count() <= MIN_MENTION_CHARS {
                continue;
            }
            if seen.insert(*sentence) {
                let confidence = (MENTION_BASE_CONFIDENCE
                    + MENTION_STEP_CONFIDENCE * hits as f64)
                    .min(MENTION_MAX_CONFIDENCE);
                claims.push(Claim::new(
                    *sentence,
                    confidence,
                    ClaimKind::EnvironmentalMention,
                ));
            }
        }
    }

    tracing::trace!(
        sentences = sentences.len(),
        claims = claims.len(),
        "extract.claims"
    );
    claims
}
