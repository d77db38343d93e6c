use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::assessment::ThreatAssessment;
use crate::category::ThreatCategory;

/// The single unified result the orchestrator returns for one analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub analysis_id: Uuid,
    pub threat_score: f32,
    pub threat_category: ThreatCategory,
    pub threat_type: String,
    pub summary: String,
    pub detailed_report: String,
    pub actions_taken: Vec<String>,
    pub analysis_duration_ms: u64,
    pub threat_assessment: ThreatAssessment,
}

impl AnalysisResult {
    /// Constructs the result from an assessment, reading `threat_score` and
    /// `threat_category` off it so the two can never drift (spec.md §3
    /// invariant: `threat_score == threat_assessment.overall_score`).
    pub fn from_assessment(
        assessment: ThreatAssessment,
        summary: String,
        detailed_report: String,
        actions_taken: Vec<String>,
        analysis_duration_ms: u64,
    ) -> Self {
        Self {
            analysis_id: Uuid::new_v4(),
            threat_score: assessment.overall_score,
            threat_category: assessment.category,
            threat_type: assessment.threat_type.clone(),
            summary,
            detailed_report,
            actions_taken,
            analysis_duration_ms,
            threat_assessment: assessment,
        }
    }
}
