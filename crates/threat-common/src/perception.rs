use serde::{Deserialize, Serialize};

use crate::indicator::Indicator;

/// Per-request knobs. See spec.md §3.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisOptions {
    pub auto_respond: bool,
    pub deploy_decoy: bool,
    pub frame_interval_s: u32,
    pub confidence_threshold: f32,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            auto_respond: false,
            deploy_decoy: false,
            frame_interval_s: 2,
            confidence_threshold: 0.6,
        }
    }
}

/// One URL found in a text body, with a suspicion verdict and reason.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuspiciousUrl {
    pub url: String,
    pub is_suspicious: bool,
    pub reason: String,
}

/// Heuristic sender-domain assessment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SenderAnalysis {
    pub is_valid_domain: bool,
    pub reputation: f32,
}

/// Output of the text perception agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextAnalysisResult {
    pub linguistic_risk_score: f32,
    pub threat_indicators: Vec<Indicator>,
    pub suspicious_urls: Vec<SuspiciousUrl>,
    pub sender_analysis: SenderAnalysis,
    pub ai_generated_probability: f32,
    pub confidence: f32,
}

impl TextAnalysisResult {
    /// Neutral result used when the agent times out or the whole content
    /// field was absent.
    pub fn neutral() -> Self {
        Self {
            linguistic_risk_score: 0.0,
            threat_indicators: Vec::new(),
            suspicious_urls: Vec::new(),
            sender_analysis: SenderAnalysis {
                is_valid_domain: true,
                reputation: 0.5,
            },
            ai_generated_probability: 0.0,
            confidence: 0.0,
        }
    }
}

/// Deepfake verdict nested inside an image analysis result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeepfakeAnalysis {
    pub probability: f32,
    pub authenticity: String,
    pub indicators: Vec<String>,
}

/// Decoded-image metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageMetadata {
    pub format: String,
    pub size: [u32; 2],
    pub mode: String,
}

/// Output of the image perception agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageAnalysisResult {
    pub visual_threat_score: f32,
    pub deepfake_analysis: DeepfakeAnalysis,
    pub metadata: ImageMetadata,
    pub qr_payloads: Option<Vec<String>>,
    pub confidence: f32,
}

impl ImageAnalysisResult {
    pub fn neutral() -> Self {
        Self {
            visual_threat_score: 0.0,
            deepfake_analysis: DeepfakeAnalysis {
                probability: 0.0,
                authenticity: "unknown".to_string(),
                indicators: Vec::new(),
            },
            metadata: ImageMetadata {
                format: "unknown".to_string(),
                size: [0, 0],
                mode: "unknown".to_string(),
            },
            qr_payloads: None,
            confidence: 0.0,
        }
    }
}

/// Output of the video perception agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoAnalysisResult {
    pub deepfake_score: f32,
    pub manipulation_type: Option<String>,
    pub frame_analyses: Vec<String>,
    pub temporal_inconsistencies: Vec<String>,
    pub overall_confidence: f32,
}

impl VideoAnalysisResult {
    pub fn neutral() -> Self {
        Self {
            deepfake_score: 0.0,
            manipulation_type: None,
            frame_analyses: Vec::new(),
            temporal_inconsistencies: Vec::new(),
            overall_confidence: 0.0,
        }
    }
}

/// Tagged variant over the three perception modalities, per the DESIGN
/// NOTES in spec.md §9 ("avoid inheritance hierarchies").
#[derive(Debug, Clone)]
pub enum PerceptionOutcome {
    Text(TextAnalysisResult),
    Image(ImageAnalysisResult),
    Video(VideoAnalysisResult),
    Empty,
}

impl PerceptionOutcome {
    /// The 0-100 score this modality contributes to the fused threat score,
    /// or `None` when the modality was absent (contributes nothing, and the
    /// corresponding weight is not renormalized away — see
    /// `threat-scorer`).
    pub fn contribution_score(&self) -> Option<f32> {
        match self {
            PerceptionOutcome::Text(t) => Some(t.linguistic_risk_score),
            PerceptionOutcome::Image(i) => Some(i.visual_threat_score),
            PerceptionOutcome::Video(v) => Some(v.deepfake_score),
            PerceptionOutcome::Empty => None,
        }
    }
}

/// Bag of perception outputs plus sender reputation, handed to the scorer.
#[derive(Debug, Clone)]
pub struct PerceptionResults {
    pub text: Option<TextAnalysisResult>,
    pub image: Option<ImageAnalysisResult>,
    pub video: Option<VideoAnalysisResult>,
    pub sender_reputation: f32,
}

impl PerceptionResults {
    pub fn empty(sender_reputation: f32) -> Self {
        Self {
            text: None,
            image: None,
            video: None,
            sender_reputation,
        }
    }
}

/// Optional contextual signals fed into the scorer alongside perception
/// results.
#[derive(Debug, Clone, Default)]
pub struct ThreatContext {
    pub timestamp: Option<chrono::DateTime<chrono::Utc>>,
    pub prior_sightings: u32,
}
