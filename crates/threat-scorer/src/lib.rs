//! Weighted fusion of perception outputs + LLM-assigned threat level into
//! a single score and category.
//!
//! Same two-step shape as `cvss::calculate_aggregate_score` +
//! `Severity::from_score` in `security_api/src/cvss.rs`: compute a weighted
//! numeric score first, then bucket it into a qualitative severity via one
//! shared mapping function (`ThreatCategory::from_score`, already in
//! `threat-common`) — generalized here from a single CVSS axis to five
//! independently-weighted perception factors.

use serde_json::json;
use threat_common::{PerceptionResults, ThreatAssessment, ThreatCategory, ThreatContext};
use threat_llm_client::{extract_json, LlmClient};

const WEIGHT_TEXT: f32 = 0.35;
const WEIGHT_IMAGE: f32 = 0.20;
const WEIGHT_VIDEO: f32 = 0.20;
const WEIGHT_SENDER: f32 = 0.15;
const WEIGHT_LLM: f32 = 0.10;

const DEFAULT_LLM_CONFIDENCE: f32 = 0.3;

pub struct ThreatScorer<'a> {
    llm: &'a dyn LlmClient,
    /// Whether missing-modality weights are renormalized away. Off by
    /// default, matching spec.md §9's instruction to make this an explicit,
    /// configurable choice rather than silently deviate from the source
    /// behavior (see SPEC_FULL.md §4.6 / §9).
    renormalize: bool,
}

impl<'a> ThreatScorer<'a> {
    pub fn new(llm: &'a dyn LlmClient) -> Self {
        Self {
            llm,
            renormalize: false,
        }
    }

    pub fn with_renormalization(mut self, renormalize: bool) -> Self {
        self.renormalize = renormalize;
        self
    }

    /// Runs spec.md §4.6: five weighted factors, LLM fusion opinion,
    /// top-three contributing factors, and the full risk breakdown.
    pub async fn calculate_threat_score(
        &self,
        perception: &PerceptionResults,
        _context: Option<&ThreatContext>,
    ) -> ThreatAssessment {
        let opinion = self.fusion_opinion(perception).await;

        let mut factors: Vec<(&'static str, f32, f32)> = Vec::new(); // (name, weight, raw_0_100)

        if let Some(text) = &perception.text {
            factors.push(("text.linguistic_risk_score", WEIGHT_TEXT, text.linguistic_risk_score.clamp(0.0, 100.0)));
        }
        if let Some(image) = &perception.image {
            factors.push(("image.visual_threat_score", WEIGHT_IMAGE, image.visual_threat_score.clamp(0.0, 100.0)));
        }
        if let Some(video) = &perception.video {
            factors.push(("video.deepfake_score", WEIGHT_VIDEO, video.deepfake_score.clamp(0.0, 100.0)));
        }
        factors.push((
            "sender_reputation",
            WEIGHT_SENDER,
            ((1.0 - perception.sender_reputation) * 100.0).clamp(0.0, 100.0),
        ));
        factors.push(("llm.level_score", WEIGHT_LLM, opinion.level_score));

        let active_weight: f32 = factors.iter().map(|(_, w, _)| *w).sum();
        let renorm_factor = if self.renormalize && active_weight > 0.0 {
            1.0 / active_weight
        } else {
            1.0
        };

        let mut risk_breakdown = std::collections::HashMap::new();
        let mut overall_score = 0.0f32;
        for (name, weight, raw) in &factors {
            let contribution = weight * renorm_factor * raw;
            risk_breakdown.insert(name.to_string(), contribution);
            overall_score += contribution;
        }
        overall_score = overall_score.clamp(0.0, 100.0);

        let category = ThreatCategory::from_score(overall_score);

        let mut ranked: Vec<(&String, &f32)> = risk_breakdown.iter().collect();
        ranked.sort_by(|a, b| b.1.partial_cmp(a.1).unwrap());
        let contributing_factors = ranked.into_iter().take(3).map(|(name, _)| name.clone()).collect();

        let attack_vector = infer_attack_vector(perception);

        ThreatAssessment {
            overall_score,
            category,
            confidence: opinion.confidence,
            threat_type: opinion.attack_type,
            attack_vector,
            contributing_factors,
            matched_patterns: Vec::new(),
            recommended_actions: opinion.recommended_actions,
            explanation: opinion.reasoning,
            risk_breakdown,
        }
    }

    async fn fusion_opinion(&self, perception: &PerceptionResults) -> FusionOpinion {
        let prompt = fusion_prompt(perception);
        match self.llm.analyze_text(&prompt).await {
            Ok(response) => parse_opinion(&response.text),
            Err(_) => FusionOpinion {
                level_score: 0.0,
                attack_type: "Unknown".to_string(),
                confidence: DEFAULT_LLM_CONFIDENCE,
                reasoning: "threat level opinion unavailable; upstream LLM unreachable".to_string(),
                recommended_actions: Vec::new(),
            },
        }
    }
}

struct FusionOpinion {
    level_score: f32,
    attack_type: String,
    confidence: f32,
    reasoning: String,
    recommended_actions: Vec<String>,
}

fn level_to_score(level: &str) -> f32 {
    match level.to_uppercase().as_str() {
        "LOW" => 20.0,
        "MEDIUM" => 50.0,
        "HIGH" => 75.0,
        "CRITICAL" => 95.0,
        _ => 0.0,
    }
}

fn fusion_prompt(perception: &PerceptionResults) -> String {
    let compact = json!({
        "text_linguistic_risk_score": perception.text.as_ref().map(|t| t.linguistic_risk_score),
        "image_visual_threat_score": perception.image.as_ref().map(|i| i.visual_threat_score),
        "video_deepfake_score": perception.video.as_ref().map(|v| v.deepfake_score),
        "sender_reputation": perception.sender_reputation,
    });
    format!(
        "You are a security analyst fusing multiple perception signals into a single \
         threat verdict. Perception summary:\n{compact}\n\n\
         Respond with a single fenced JSON code block matching this schema:\n\
         ```json\n{{\"threat_level\": \"LOW|MEDIUM|HIGH|CRITICAL\", \"attack_type\": <string>, \
         \"confidence\": <0-1>, \"reasoning\": <string>, \"recommended_actions\": [<string>]}}\n```"
    )
}

fn parse_opinion(text: &str) -> FusionOpinion {
    let value = extract_json(text);
    let level = value.get("threat_level").and_then(|v| v.as_str()).unwrap_or("LOW");
    let attack_type = value
        .get("attack_type")
        .and_then(|v| v.as_str())
        .unwrap_or("Unknown")
        .to_string();
    let confidence = value.get("confidence").and_then(|v| v.as_f64()).unwrap_or(0.5) as f32;
    let reasoning = value.get("reasoning").and_then(|v| v.as_str()).unwrap_or("").to_string();
    let recommended_actions = value
        .get("recommended_actions")
        .and_then(|v| v.as_array())
        .map(|arr| arr.iter().filter_map(|v| v.as_str().map(str::to_string)).collect())
        .unwrap_or_default();

    FusionOpinion {
        level_score: level_to_score(level),
        attack_type,
        confidence,
        reasoning,
        recommended_actions,
    }
}

fn infer_attack_vector(perception: &PerceptionResults) -> String {
    let present: Vec<&str> = [
        perception.text.as_ref().map(|_| "email"),
        perception.image.as_ref().map(|_| "image"),
        perception.video.as_ref().map(|_| "video"),
    ]
    .into_iter()
    .flatten()
    .collect();

    match present.len() {
        0 => "unknown".to_string(),
        1 => present[0].to_string(),
        _ => "multimodal".to_string(),
    }
}
