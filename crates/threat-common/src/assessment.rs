use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::category::ThreatCategory;
use crate::pattern::PatternMatch;

/// The fused output of the threat scorer, pattern matcher, and (once
/// populated) the defense agent's recommendations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreatAssessment {
    pub overall_score: f32,
    pub category: ThreatCategory,
    pub confidence: f32,
    pub threat_type: String,
    pub attack_vector: String,
    pub contributing_factors: Vec<String>,
    pub matched_patterns: Vec<PatternMatch>,
    pub recommended_actions: Vec<String>,
    pub explanation: String,
    pub risk_breakdown: HashMap<String, f32>,
}
