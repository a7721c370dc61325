//! Ordered field-lookup rules over raw upstream payloads.
//!
//! Each chain is a slice of [`Rule`]s tried in order; the first one that
//! yields `Some` wins. A field that is present with a usable value wins even
//! when that value is falsy (`0`, `[]`), a `null` or wrongly-typed field falls
//! through to the next rule.

use serde_json::Value;

/// One named lookup: payload in, maybe a value out.
pub struct Rule<T> {
    pub name: &'static str,
    pub apply: fn(&Value) -> Option<T>,
}

impl<T> Rule<T> {
    pub const fn new(name: &'static str, apply: fn(&Value) -> Option<T>) -> Self {
        Self { name, apply }
    }
}

/// A location holding a claim-like array.
#[derive(Debug, Clone, Copy)]
pub struct PathSource {
    pub name: &'static str,
    pub path: &'static [&'static str],
}

impl PathSource {
    pub const fn new(name: &'static str, path: &'static [&'static str]) -> Self {
        Self { name, path }
    }

    pub fn lookup<'a>(&self, payload: &'a Value) -> Option<&'a Value> {
        at(payload, self.path)
    }
}

/// Applies `rules` in order and returns the first hit with the rule's name.
pub fn first_match<T>(rules: &[Rule<T>], payload: &Value) -> Option<(&'static str, T)> {
    rules
        .iter()
        .find_map(|rule| (rule.apply)(payload).map(|v| (rule.name, v)))
}

/// Walks nested objects; `null` counts as absent.
pub fn at<'a>(payload: &'a Value, path: &[&str]) -> Option<&'a Value> {
    let mut cur = payload;
    for key in path {
        cur = cur.as_object()?.get(*key)?;
    }
    (!cur.is_null()).then_some(cur)
}

/// Numbers, or strings that parse as numbers.
pub fn as_number(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|f| f.is_finite())
}

/// Non-negative whole counts; fractional values are truncated.
pub fn as_count(v: &Value) -> Option<u64> {
    as_number(v).filter(|f| *f >= 0.0).map(|f| f.trunc() as u64)
}

/// String members of an array, trimmed, blanks dropped. Non-arrays are absent.
pub fn as_string_list(v: &Value) -> Option<Vec<String>> {
    let items = v.as_array()?;
    Some(
        items
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
    )
}

pub fn summary_rules() -> Vec<Rule<String>> {
    vec![
        Rule::new("summary", |p| at(p, &["summary"])?.as_str().map(str::to_string)),
        Rule::new("analysis_summary", |p| {
            at(p, &["analysis_summary"])?.as_str().map(str::to_string)
        }),
        Rule::new("summary_object", |p| {
            let obj = at(p, &["summary"]).filter(|v| v.is_object())?;
            serde_json::to_string(obj).ok()
        }),
    ]
}

pub fn risk_score_rules() -> Vec<Rule<f64>> {
    vec![
        Rule::new("risk_score", |p| as_number(at(p, &["risk_score"])?)),
        Rule::new("avg_risk_score", |p| as_number(at(p, &["avg_risk_score"])?)),
        Rule::new("analysis_result.risk_score", |p| {
            as_number(at(p, &["analysis_result", "risk_score"])?)
        }),
    ]
}

pub fn keyword_rules() -> Vec<Rule<Vec<String>>> {
    vec![
        Rule::new("keywords", |p| as_string_list(at(p, &["keywords"])?)),
        Rule::new("analysis_result.keywords", |p| {
            as_string_list(at(p, &["analysis_result", "keywords"])?)
        }),
    ]
}

pub fn indicator_rules() -> Vec<Rule<Vec<String>>> {
    vec![
        Rule::new("greenwashing_indicators", |p| {
            as_string_list(at(p, &["greenwashing_indicators"])?)
        }),
        Rule::new("potential_greenwashing_indicators", |p| {
            as_string_list(at(p, &["potential_greenwashing_indicators"])?)
        }),
        Rule::new("analysis_result.greenwashing_indicators", |p| {
            as_string_list(at(p, &["analysis_result", "greenwashing_indicators"])?)
        }),
    ]
}

pub fn claim_count_rules() -> Vec<Rule<u64>> {
    vec![
        Rule::new("claims_found", |p| as_count(at(p, &["claims_found"])?)),
        Rule::new("claims_detected", |p| as_count(at(p, &["claims_detected"])?)),
    ]
}

/// Claim arrays, concatenated in this order.
pub const CLAIM_SOURCES: &[PathSource] = &[
    PathSource::new("claims", &["claims"]),
    PathSource::new("analysis_result.claims", &["analysis_result", "claims"]),
    PathSource::new("environmental_claims", &["environmental_claims"]),
    PathSource::new("detected_claims", &["detected_claims"]),
    PathSource::new(
        "analysis_result.detected_environmental_claims",
        &["analysis_result", "detected_environmental_claims"],
    ),
    PathSource::new(
        "analysis_result.environmental_statements",
        &["analysis_result", "environmental_statements"],
    ),
    PathSource::new(
        "analysis_result.sustainability_claims",
        &["analysis_result", "sustainability_claims"],
    ),
];

/// Free-text fields the extractor is run over, in this order.
pub const TEXT_SOURCES: &[PathSource] = &[
    PathSource::new("content_analyzed", &["content_analyzed"]),
    PathSource::new("original_input_text", &["original_input_text"]),
    PathSource::new("text", &["text"]),
];
