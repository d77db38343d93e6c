//! Top-level pipeline composition: perception fan-out, score fusion,
//! pattern matching, defense selection, and conditional decoy deployment.
//!
//! Perception is joined with `tokio::join!` rather than `tokio::spawn`
//! (spec.md §4.9 step 2): the per-modality analyzers borrow `&dyn
//! LlmClient` for the lifetime of a single `analyze_complete` call, which
//! `tokio::spawn`'s `'static` bound can't accommodate without every
//! analyzer owning an `Arc` the way `DecoySystem` does. A join keeps the
//! concurrency without that extra cost.

mod registry;

pub use registry::Registry;

use std::sync::Arc;
use std::time::{Duration, Instant};

use threat_analyzer_image::ImageAnalyzer;
use threat_analyzer_text::TextAnalyzer;
use threat_analyzer_video::VideoAnalyzer;
use threat_common::{
    AnalysisOptions, AnalysisResult, ContentData, ContentType, ImageAnalysisResult, PerceptionResults,
    TextAnalysisResult, ThreatCategory, VideoAnalysisResult,
};
use threat_defense_agent::{DefenseAgent, ExecutionContext};
use threat_llm_client::LlmClient;
use threat_scorer::ThreatScorer;

/// Soft per-modality perception deadline (spec.md §4.9 step 2). A task
/// that times out degrades to a neutral result rather than failing the
/// whole analysis.
const PERCEPTION_TIMEOUT: Duration = Duration::from_secs(20);

/// Default sender reputation used when no external reputation signal is
/// wired in (SPEC_FULL.md §4.1 Open Question: this crate has no sender
/// reputation service to call, so it assumes a neutral prior and lets
/// `TextAnalyzer`'s own sender heuristic carry the weight instead).
const DEFAULT_SENDER_REPUTATION: f32 = 0.5;

pub struct Orchestrator {
    llm: Arc<dyn LlmClient>,
    registry: Arc<Registry>,
}

impl Orchestrator {
    pub fn new(llm: Arc<dyn LlmClient>, registry: Arc<Registry>) -> Self {
        Self { llm, registry }
    }

    /// Runs the full pipeline in spec.md §4.9 and returns the assembled
    /// `AnalysisResult`. Perception failures on any single modality
    /// degrade to a neutral contribution rather than aborting the
    /// analysis; only a wholly empty `content` (no text/image/video field
    /// present) is rejected outright.
    pub async fn analyze_complete(&self, content: &ContentData, options: &AnalysisOptions) -> threat_common::Result<AnalysisResult> {
        let started = Instant::now();

        if !content.has_text() && !content.has_image() && !content.has_video() {
            return Err(threat_common::ThreatError::InvalidInput(
                "no text, image, or video content supplied".to_string(),
            ));
        }

        let llm = self.llm.as_ref();
        let text_analyzer = TextAnalyzer::new(llm);
        let image_analyzer = ImageAnalyzer::new(llm);
        let video_analyzer = VideoAnalyzer::new(llm);

        let (text_result, image_result, video_result) = tokio::join!(
            run_text(&text_analyzer, content),
            run_image(&image_analyzer, content),
            run_video(&video_analyzer, content, options.frame_interval_s),
        );

        let perception = PerceptionResults {
            text: text_result,
            image: image_result,
            video: video_result,
            sender_reputation: DEFAULT_SENDER_REPUTATION,
        };

        let scorer = ThreatScorer::new(llm);
        let mut assessment = scorer.calculate_threat_score(&perception, None).await;

        let indicators = collect_indicators(&perception);
        assessment.matched_patterns = self
            .registry
            .pattern_matcher
            .find_matching_patterns(&indicators, options.confidence_threshold);

        let defense_agent = DefenseAgent::new();
        let actions = defense_agent.determine_actions(&assessment, options.auto_respond);

        let mut actions_taken: Vec<String> = Vec::new();
        if options.auto_respond {
            let deploy_decoy = options.deploy_decoy && assessment.category == ThreatCategory::Critical;
            let execution_context = ExecutionContext {
                threat_id: uuid::Uuid::new_v4().to_string(),
                sender: content.sender.clone(),
                original_message: content.text_content.clone().unwrap_or_default(),
                decoy_deployer: if deploy_decoy { Some(&self.registry.decoy_system as &dyn threat_common::DecoyDeployer) } else { None },
            };
            let results = defense_agent.execute_actions(&actions, &execution_context).await;
            actions_taken = results
                .into_iter()
                .filter(|r| r.success)
                .map(|r| r.action_ref)
                .collect();
        }

        let summary = format!(
            "{} threat ({:.1}/100): {}",
            assessment.category, assessment.overall_score, assessment.threat_type
        );
        let detailed_report = assessment.explanation.clone();

        self.registry.record_analysis(matches!(
            assessment.category,
            ThreatCategory::High | ThreatCategory::Critical
        ));

        let duration_ms = started.elapsed().as_millis() as u64;
        Ok(AnalysisResult::from_assessment(assessment, summary, detailed_report, actions_taken, duration_ms))
    }
}

async fn run_text(analyzer: &TextAnalyzer<'_>, content: &ContentData) -> Option<TextAnalysisResult> {
    if !content.has_text() {
        return None;
    }
    let text = content.text_content.as_deref().unwrap_or_default();
    match tokio::time::timeout(PERCEPTION_TIMEOUT, analyzer.analyze(text, &content.sender, &content.subject)).await {
        Ok(Ok(result)) => Some(result),
        Ok(Err(e)) => {
            eprintln!("[WARN] text perception failed, degrading to neutral: {e}");
            Some(TextAnalysisResult::neutral())
        }
        Err(_) => {
            eprintln!("[WARN] text perception timed out after {PERCEPTION_TIMEOUT:?}, degrading to neutral");
            Some(TextAnalysisResult::neutral())
        }
    }
}

async fn run_image(analyzer: &ImageAnalyzer<'_>, content: &ContentData) -> Option<ImageAnalysisResult> {
    if !content.has_image() {
        return None;
    }
    let bytes = content.image_bytes.as_deref().unwrap_or_default();
    match tokio::time::timeout(PERCEPTION_TIMEOUT, analyzer.analyze(bytes, &content.subject)).await {
        Ok(Ok(result)) => Some(result),
        Ok(Err(e)) => {
            eprintln!("[WARN] image perception failed, degrading to neutral: {e}");
            Some(ImageAnalysisResult::neutral())
        }
        Err(_) => {
            eprintln!("[WARN] image perception timed out after {PERCEPTION_TIMEOUT:?}, degrading to neutral");
            Some(ImageAnalysisResult::neutral())
        }
    }
}

async fn run_video(analyzer: &VideoAnalyzer<'_>, content: &ContentData, frame_interval_s: u32) -> Option<VideoAnalysisResult> {
    let input = content.video_input.as_ref()?;
    match tokio::time::timeout(PERCEPTION_TIMEOUT, analyzer.analyze(input, frame_interval_s)).await {
        Ok(Ok(result)) => Some(result),
        Ok(Err(e)) => {
            eprintln!("[WARN] video perception failed, degrading to neutral: {e}");
            Some(VideoAnalysisResult::neutral())
        }
        Err(_) => {
            eprintln!("[WARN] video perception timed out after {PERCEPTION_TIMEOUT:?}, degrading to neutral");
            Some(VideoAnalysisResult::neutral())
        }
    }
}

/// Flattens the per-modality indicator strings the pattern matcher scores
/// against (spec.md §4.5). The seed catalog mixes category-level tags
/// (`credential_request`, `executive_impersonation`) with matched-term
/// tokens (`urgent`, `wire_transfer`, `payroll`, ...), so each text
/// indicator contributes both its `kind` and its (normalized) matched
/// `value` rather than just one or the other — otherwise the two
/// vocabularies never intersect and no text-only content can ever match a
/// pattern. A `suspicious_url` token is added whenever the text agent
/// flagged at least one URL, covering patterns keyed on that tag.
fn collect_indicators(perception: &PerceptionResults) -> Vec<String> {
    let mut out = Vec::new();
    if let Some(text) = &perception.text {
        for indicator in &text.threat_indicators {
            out.push(indicator.kind.clone());
            out.push(indicator.value.clone());
        }
        if text.suspicious_urls.iter().any(|u| u.is_suspicious) {
            out.push("suspicious_url".to_string());
        }
    }
    if let Some(image) = &perception.image {
        out.extend(image.deepfake_analysis.indicators.iter().cloned());
    }
    if let Some(video) = &perception.video {
        out.extend(video.temporal_inconsistencies.iter().cloned());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use threat_llm_client::new_mock_client;

    fn sample_jpeg() -> Vec<u8> {
        let image = image::RgbImage::from_pixel(40, 20, image::Rgb([10, 10, 10]));
        let mut bytes = Vec::new();
        image::DynamicImage::ImageRgb8(image)
            .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Jpeg)
            .unwrap();
        bytes
    }

    fn orchestrator() -> Orchestrator {
        let llm: Arc<dyn LlmClient> = Arc::new(new_mock_client());
        let registry = Arc::new(Registry::new(llm.clone()));
        Orchestrator::new(llm, registry)
    }

    #[tokio::test]
    async fn text_only_analysis_produces_a_complete_result() {
        let orchestrator = orchestrator();
        let mut content = ContentData::new(ContentType::Email, "someone@example.com");
        content.text_content = Some("Please wire the funds urgently, this is confidential.".to_string());
        content.subject = "Urgent".to_string();

        let result = orchestrator.analyze_complete(&content, &AnalysisOptions::default()).await.unwrap();

        assert_eq!(result.threat_score, result.threat_assessment.overall_score);
        assert!(result.analysis_duration_ms < 5_000);
    }

    #[tokio::test]
    async fn ceo_fraud_email_matches_the_seed_pattern() {
        let orchestrator = orchestrator();
        let mut content = ContentData::new(ContentType::Email, "ceo@fake-company.com");
        content.subject = "Urgent Wire Transfer".to_string();
        content.text_content = Some(
            "This is the CEO. This wire transfer is urgent and confidential — please process \
             the $50,000 payment immediately."
                .to_string(),
        );

        let result = orchestrator.analyze_complete(&content, &AnalysisOptions::default()).await.unwrap();

        let pattern_ids: Vec<&str> = result
            .threat_assessment
            .matched_patterns
            .iter()
            .map(|m| m.pattern_id.as_str())
            .collect();
        assert!(pattern_ids.contains(&"ceo_fraud_001"));
    }

    #[tokio::test]
    async fn multimodal_analysis_covers_all_present_modalities() {
        let orchestrator = orchestrator();
        let mut content = ContentData::new(ContentType::Multimodal, "a@b.com");
        content.text_content = Some("verify your account now".to_string());
        content.image_bytes = Some(sample_jpeg());

        let result = orchestrator.analyze_complete(&content, &AnalysisOptions::default()).await.unwrap();
        assert_eq!(result.threat_assessment.attack_vector, "multimodal");
    }

    #[tokio::test]
    async fn empty_content_is_rejected() {
        let orchestrator = orchestrator();
        let content = ContentData::new(ContentType::Email, "a@b.com");

        let result = orchestrator.analyze_complete(&content, &AnalysisOptions::default()).await;
        assert!(matches!(result, Err(threat_common::ThreatError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn auto_respond_executes_actions_and_reports_them() {
        let orchestrator = orchestrator();
        let mut content = ContentData::new(ContentType::Email, "a@b.com");
        content.text_content = Some("hello, just checking in".to_string());

        let mut options = AnalysisOptions::default();
        options.auto_respond = true;

        let result = orchestrator.analyze_complete(&content, &options).await.unwrap();
        assert!(!result.actions_taken.is_empty());
    }

    #[tokio::test]
    async fn critical_with_deploy_decoy_option_records_a_decoy_action() {
        let orchestrator = orchestrator();
        let mut content = ContentData::new(ContentType::Email, "attacker@evil.com");
        content.text_content = Some(
            "URGENT: confidential wire transfer needed immediately, verify your password and account now or face consequences"
                .to_string(),
        );

        let mut options = AnalysisOptions::default();
        options.auto_respond = true;
        options.deploy_decoy = true;

        let result = orchestrator.analyze_complete(&content, &options).await.unwrap();
        // Not guaranteed CRITICAL against a mock LLM, but the pipeline must
        // complete either way and never panic on the decoy branch.
        assert!(result.analysis_duration_ms < 5_000);
    }
}
