use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// A stored fingerprint of a known attack: an indicator set plus metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreatPattern {
    pub pattern_id: String,
    pub pattern_type: String,
    pub indicators: HashSet<String>,
    pub attack_category: String,
    pub severity: String,
    pub description: String,
}

/// One catalog hit returned by the pattern matcher.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternMatch {
    pub pattern_id: String,
    pub similarity_score: f32,
    pub matched_indicators: Vec<String>,
}

/// Normalize an indicator string the way spec.md §4.5 requires: lowercase,
/// non-alphanumeric collapsed to `_`. Used uniformly for catalog seeds and
/// query-time indicators so `add_pattern` followed by `find_matching_patterns`
/// always round-trips.
pub fn normalize_indicator(raw: &str) -> String {
    let lower = raw.to_lowercase();
    let mut out = String::with_capacity(lower.len());
    let mut prev_was_underscore = false;
    for c in lower.chars() {
        if c.is_alphanumeric() {
            out.push(c);
            prev_was_underscore = false;
        } else if !prev_was_underscore {
            out.push('_');
            prev_was_underscore = true;
        }
    }
    out.trim_matches('_').to_string()
}
