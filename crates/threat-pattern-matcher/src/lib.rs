//! Similarity-scored lookup of extracted indicators against a catalog of
//! known attack patterns.
//!
//! The catalog is a read-mostly `RwLock<HashMap<..>>`, the same shape the
//! teacher builds ad hoc analysis tables with in
//! `analyzer-basic::BasicAnalyzer::analyze` (grouping into `HashMap`s and
//! reading them back out), generalized here into a long-lived, concurrently
//! readable registry per spec.md §5's resource model.

use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use threat_common::pattern::normalize_indicator;
use threat_common::{PatternMatch, Result, ThreatError, ThreatPattern};

pub const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 0.6;

pub struct PatternMatcher {
    catalog: RwLock<HashMap<String, ThreatPattern>>,
}

impl PatternMatcher {
    /// A matcher seeded with the catalog spec.md §4.5 requires at minimum.
    pub fn with_seed_catalog() -> Self {
        let matcher = Self {
            catalog: RwLock::new(HashMap::new()),
        };
        for pattern in seed_patterns() {
            matcher
                .add_pattern(pattern)
                .expect("seed catalog must not contain duplicate ids");
        }
        matcher
    }

    pub fn empty() -> Self {
        Self {
            catalog: RwLock::new(HashMap::new()),
        }
    }

    /// Add a pattern to the catalog. Fails with `DuplicatePattern` if the
    /// id is already present.
    pub fn add_pattern(&self, pattern: ThreatPattern) -> Result<String> {
        let mut catalog = self.catalog.write().unwrap();
        if catalog.contains_key(&pattern.pattern_id) {
            return Err(ThreatError::DuplicatePattern(pattern.pattern_id));
        }
        let id = pattern.pattern_id.clone();
        catalog.insert(id.clone(), pattern);
        Ok(id)
    }

    pub fn pattern_count(&self) -> usize {
        self.catalog.read().unwrap().len()
    }

    /// Matches with `similarity_score >= threshold`, sorted by descending
    /// score and ascending `pattern_id` on ties. Never returns a match
    /// below `threshold`.
    pub fn find_matching_patterns(&self, indicators: &[String], threshold: f32) -> Vec<PatternMatch> {
        let input: HashSet<String> = indicators.iter().map(|s| normalize_indicator(s)).collect();
        let catalog = self.catalog.read().unwrap();

        let mut matches: Vec<PatternMatch> = catalog
            .values()
            .filter_map(|pattern| score_pattern(&input, pattern))
            .filter(|m| m.similarity_score >= threshold)
            .collect();

        matches.sort_by(|a, b| {
            b.similarity_score
                .partial_cmp(&a.similarity_score)
                .unwrap()
                .then_with(|| a.pattern_id.cmp(&b.pattern_id))
        });

        matches
    }

    pub fn find_matching_patterns_default(&self, indicators: &[String]) -> Vec<PatternMatch> {
        self.find_matching_patterns(indicators, DEFAULT_CONFIDENCE_THRESHOLD)
    }
}

fn score_pattern(input: &HashSet<String>, pattern: &ThreatPattern) -> Option<PatternMatch> {
    if pattern.indicators.is_empty() {
        return None;
    }
    let normalized_pattern: HashSet<String> =
        pattern.indicators.iter().map(|s| normalize_indicator(s)).collect();

    let matched: Vec<String> = normalized_pattern.intersection(input).cloned().collect();
    let mut score = matched.len() as f32 / normalized_pattern.len() as f32;
    if matched.len() == normalized_pattern.len() {
        score = (score + 0.1).min(1.0);
    }

    if matched.is_empty() {
        return None;
    }

    Some(PatternMatch {
        pattern_id: pattern.pattern_id.clone(),
        similarity_score: score,
        matched_indicators: matched,
    })
}

fn seed_patterns() -> Vec<ThreatPattern> {
    vec![
        ThreatPattern {
            pattern_id: "ceo_fraud_001".to_string(),
            pattern_type: "social_engineering".to_string(),
            indicators: indicator_set(&["urgent", "wire_transfer", "confidential", "executive_impersonation"]),
            attack_category: "business_email_compromise".to_string(),
            severity: "critical".to_string(),
            description: "Impersonated executive requests an urgent, confidential wire transfer.".to_string(),
        },
        ThreatPattern {
            pattern_id: "bec_payroll_update".to_string(),
            pattern_type: "social_engineering".to_string(),
            indicators: indicator_set(&["payroll", "update_account", "urgent", "direct_deposit"]),
            attack_category: "business_email_compromise".to_string(),
            severity: "high".to_string(),
            description: "Request to redirect payroll direct deposit to a new account.".to_string(),
        },
        ThreatPattern {
            pattern_id: "credential_phish_001".to_string(),
            pattern_type: "phishing".to_string(),
            indicators: indicator_set(&["credential_request", "verify_account", "suspicious_url", "urgent"]),
            attack_category: "phishing".to_string(),
            severity: "high".to_string(),
            description: "Credential-harvesting link disguised as an account verification request.".to_string(),
        },
        ThreatPattern {
            pattern_id: "invoice_fraud_001".to_string(),
            pattern_type: "financial_fraud".to_string(),
            indicators: indicator_set(&["invoice", "payment", "wire_transfer", "overdue"]),
            attack_category: "invoice_fraud".to_string(),
            severity: "medium".to_string(),
            description: "Fraudulent overdue invoice steering payment to an attacker-controlled account.".to_string(),
        },
    ]
}

fn indicator_set(values: &[&str]) -> HashSet<String> {
    values.iter().map(|s| s.to_string()).collect()
}
