//! Video perception agent: sample frames, request a multimodal verdict,
//! aggregate temporal inconsistencies.
//!
//! Arbitrary video container decoding is outside any crate available to
//! this corpus (SPEC_FULL.md §4.4), so the supported input shape is a
//! pre-split sequence of JPEG frame byte slices (`VideoInput::Frames`); a
//! bare path (`VideoInput::Path`) degrades to the spec's documented
//! neutral-result path rather than a from-scratch decoder. The
//! prompt/parse shape otherwise mirrors `threat-analyzer-image` and
//! `analyzer-llm/src/analyzer.rs`.

use threat_common::{ThreatError, VideoAnalysisResult, VideoInput};
use threat_llm_client::{extract_json, LlmClient, MultimodalPart};

/// Nominal source frame rate assumed for a pre-split `Frames` sequence,
/// since no container decode is available to report a real one (Open
/// Question resolution, SPEC_FULL.md §9 item 4).
const NOMINAL_FPS: f64 = 30.0;
const MAX_FRAMES: usize = 8;

pub struct VideoAnalyzer<'a> {
    llm: &'a dyn LlmClient,
}

impl<'a> VideoAnalyzer<'a> {
    pub fn new(llm: &'a dyn LlmClient) -> Self {
        Self { llm }
    }

    /// Runs spec.md §4.4. `frame_interval_s` is the caller's sampling
    /// interval in seconds.
    pub async fn analyze(&self, input: &VideoInput, frame_interval_s: u32) -> Result<VideoAnalysisResult, ThreatError> {
        let frames = match input {
            VideoInput::Frames(frames) => frames,
            VideoInput::Path(path) => {
                if std::fs::metadata(path).is_err() {
                    return Err(ThreatError::UnsupportedMedia(format!("video path not found: {path}")));
                }
                return Ok(VideoAnalysisResult::neutral());
            }
        };

        if frames.is_empty() {
            return Err(ThreatError::InvalidInput("no video frames supplied".to_string()));
        }

        let sampled = sample_frames(frames, frame_interval_s);
        let prompt = multimodal_prompt();
        let parts: Vec<MultimodalPart> = sampled
            .iter()
            .map(|bytes| MultimodalPart {
                bytes: bytes.to_vec(),
                mime_type: "image/jpeg".to_string(),
            })
            .collect();

        let response = self.llm.analyze_multimodal(&parts, &prompt).await;

        let result = match response {
            Ok(response) => parse_verdict(&response.text),
            Err(_) => VideoAnalysisResult::neutral(),
        };

        Ok(result)
    }
}

/// `frame_step = max(1, round(frame_interval_s * fps))`; sample indices
/// `0, step, 2*step, ...`, capped at `MAX_FRAMES` (spec.md §4.4 step 2).
fn sample_frames(frames: &[Vec<u8>], frame_interval_s: u32) -> Vec<&Vec<u8>> {
    let frame_step = ((frame_interval_s as f64 * NOMINAL_FPS).round() as usize).max(1);

    let mut sampled = Vec::new();
    let mut index = 0;
    while index < frames.len() && sampled.len() < MAX_FRAMES {
        sampled.push(&frames[index]);
        index += frame_step;
    }
    sampled
}

fn multimodal_prompt() -> String {
    "You are a security analyst examining a sampled sequence of video frames for \
     deepfake or manipulation indicators across time. Respond with a single fenced \
     JSON code block matching this schema:\n\
     ```json\n{\"deepfake_score\": <0-100>, \"manipulation_type\": <string|null>, \
     \"frame_analyses\": [<string>], \"temporal_inconsistencies\": [<string>], \
     \"overall_confidence\": <0-1>, \"evidence_timeline\": [<object>]}\n```"
        .to_string()
}

fn parse_verdict(text: &str) -> VideoAnalysisResult {
    let value = extract_json(text);
    let is_empty = value.as_object().map(|o| o.is_empty()).unwrap_or(true);
    if is_empty {
        return VideoAnalysisResult::neutral();
    }

    let deepfake_score = value.get("deepfake_score").and_then(|v| v.as_f64()).unwrap_or(0.0) as f32;
    let manipulation_type = value
        .get("manipulation_type")
        .and_then(|v| v.as_str())
        .map(str::to_string);
    let frame_analyses = value
        .get("frame_analyses")
        .and_then(|v| v.as_array())
        .map(|arr| arr.iter().filter_map(|v| v.as_str().map(str::to_string)).collect())
        .unwrap_or_default();
    let temporal_inconsistencies = value
        .get("temporal_inconsistencies")
        .and_then(|v| v.as_array())
        .map(|arr| arr.iter().filter_map(|v| v.as_str().map(str::to_string)).collect())
        .unwrap_or_default();
    let overall_confidence = value.get("overall_confidence").and_then(|v| v.as_f64()).unwrap_or(0.0) as f32;

    VideoAnalysisResult {
        deepfake_score,
        manipulation_type,
        frame_analyses,
        temporal_inconsistencies,
        overall_confidence,
    }
}
