//! Text perception agent: rule scan + URL extraction + sender heuristics,
//! fused with an LLM opinion. Mirrors the teacher's `LlmAnalyzer::analyze`
//! composition shape in `analyzer-llm/src/analyzer.rs` — local heuristics
//! computed first (infallible), then a single LLM call whose result is
//! folded in, with a documented fallback when the call fails.

mod rules;
mod sender;
mod urls;

use threat_common::{TextAnalysisResult, ThreatError};
use threat_llm_client::{extract_json, LlmClient};

/// Default confidence assigned when the LLM opinion is entirely unavailable
/// and the result falls back to rules-only (spec.md §4.2 "Failure
/// semantics").
const RULES_ONLY_CONFIDENCE: f32 = 0.3;
const DEFAULT_LLM_CONFIDENCE: f32 = 0.5;

pub struct TextAnalyzer<'a> {
    llm: &'a dyn LlmClient,
}

/// The LLM's opinion, extracted from its fenced or raw JSON response.
/// Missing fields default to neutral values per spec.md §4.2 step 4.
#[derive(Debug, Clone, Default)]
struct LlmOpinion {
    linguistic_score: f32,
    confidence: Option<f32>,
    ai_generated_prob: f32,
}

fn parse_llm_opinion(text: &str) -> LlmOpinion {
    let value = extract_json(text);
    LlmOpinion {
        linguistic_score: value.get("linguistic_score").and_then(|v| v.as_f64()).unwrap_or(0.0) as f32,
        confidence: value.get("confidence").and_then(|v| v.as_f64()).map(|v| v as f32),
        ai_generated_prob: value.get("ai_generated_prob").and_then(|v| v.as_f64()).unwrap_or(0.0) as f32,
    }
}

fn fusion_prompt(content: &str, sender: &str, subject: &str) -> String {
    format!(
        "You are a security analyst triaging a suspicious email. \
         Sender: {sender}\nSubject: {subject}\nBody:\n{content}\n\n\
         Respond with a single fenced JSON code block matching this schema:\n\
         ```json\n{{\"linguistic_score\": <0-100>, \"sentiment\": <string>, \
         \"intent\": <string>, \"urgency_score\": <0-100>, \
         \"ai_generated_prob\": <0-1>}}\n```"
    )
}

impl<'a> TextAnalyzer<'a> {
    pub fn new(llm: &'a dyn LlmClient) -> Self {
        Self { llm }
    }

    /// Runs the full algorithm in spec.md §4.2: rule scan, URL extraction,
    /// sender analysis, LLM opinion, fusion. `content` must be non-empty —
    /// the orchestrator only invokes this agent when the text field is
    /// present (spec.md §3 invariant).
    pub async fn analyze(&self, content: &str, sender: &str, subject: &str) -> Result<TextAnalysisResult, ThreatError> {
        if content.trim().is_empty() {
            return Err(ThreatError::InvalidInput("text content is empty".to_string()));
        }

        // Rule scan covers the subject line too: urgency/impersonation
        // language shows up there as often as in the body (spec.md §8
        // scenario 1's "Urgent Wire Transfer" subject).
        let scan_text = format!("{subject}\n{content}");
        let indicators = rules::scan(&scan_text);
        let rule_sum = rules::rule_sum(&indicators);
        let suspicious_urls = urls::extract(content);
        let url_penalty = url_penalty(&suspicious_urls);

        let claims_corporate = !sender.to_lowercase().contains("gmail")
            && !sender.to_lowercase().contains("yahoo")
            && !sender.to_lowercase().contains("hotmail");
        let sender_analysis = sender::analyze(sender, claims_corporate);
        let sender_penalty = (1.0 - sender_analysis.reputation) * 100.0;

        let opinion = match self.llm.analyze_text(&fusion_prompt(content, sender, subject)).await {
            Ok(response) => Some(parse_llm_opinion(&response.text)),
            Err(_) => None,
        };

        let (linguistic_risk_score, confidence, ai_generated_probability) = match &opinion {
            Some(opinion) => {
                let fused = 0.6 * opinion.linguistic_score
                    + 0.2 * rule_sum
                    + 0.1 * url_penalty
                    + 0.1 * sender_penalty;
                (
                    fused.clamp(0.0, 100.0),
                    opinion.confidence.unwrap_or(DEFAULT_LLM_CONFIDENCE),
                    opinion.ai_generated_prob,
                )
            }
            None => {
                let fused = 0.2 * rule_sum + 0.1 * url_penalty + 0.1 * sender_penalty;
                (fused.clamp(0.0, 100.0), RULES_ONLY_CONFIDENCE, 0.0)
            }
        };

        Ok(TextAnalysisResult {
            linguistic_risk_score,
            threat_indicators: indicators,
            suspicious_urls,
            sender_analysis,
            ai_generated_probability,
            confidence,
        })
    }
}

fn url_penalty(urls: &[threat_common::SuspiciousUrl]) -> f32 {
    if urls.is_empty() {
        return 0.0;
    }
    let suspicious = urls.iter().filter(|u| u.is_suspicious).count() as f32;
    ((suspicious / urls.len() as f32) * 100.0).clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use threat_llm_client::MockTransport;

    fn analyzer_with_response(response: &str) -> threat_llm_client::CachedClient<MockTransport> {
        let transport = MockTransport::new();
        transport.set_response("", response);
        threat_llm_client::CachedClient::new(transport, 16)
    }

    #[tokio::test]
    async fn credential_request_is_flagged_with_high_score() {
        let client = analyzer_with_response(r#"{"linguistic_score": 70}"#);
        let analyzer = TextAnalyzer::new(&client);

        let result = analyzer
            .analyze("Please verify your password by clicking here", "security@fake.com", "")
            .await
            .unwrap();

        assert!(result.threat_indicators.iter().any(|i| i.kind == "credential_request"));
        assert!(result.linguistic_risk_score > 40.0);
    }

    #[tokio::test]
    async fn legitimate_email_scores_low() {
        let client = analyzer_with_response(r#"{"linguistic_score": 10, "urgency_score": 0}"#);
        let analyzer = TextAnalyzer::new(&client);

        let result = analyzer
            .analyze("Thanks for the meeting today. Attached is the report.", "colleague@company.com", "Report")
            .await
            .unwrap();

        assert!(result.linguistic_risk_score < 30.0);
        assert!(result.confidence > 0.0);
    }

    #[tokio::test]
    async fn ip_url_is_flagged_with_ip_address_reason() {
        let client = analyzer_with_response(r#"{}"#);
        let analyzer = TextAnalyzer::new(&client);

        let result = analyzer
            .analyze("Click here: http://192.168.1.1/fake-login.php", "test@test.com", "")
            .await
            .unwrap();

        assert!(!result.suspicious_urls.is_empty());
        assert!(result.suspicious_urls[0].is_suspicious);
        assert!(result.suspicious_urls[0].reason.contains("IP address"));
    }

    #[tokio::test]
    async fn ai_generated_probability_comes_from_llm_opinion() {
        let client = analyzer_with_response(r#"{"linguistic_score": 60, "ai_generated_prob": 0.9}"#);
        let analyzer = TextAnalyzer::new(&client);

        let result = analyzer
            .analyze("Dear valued customer, please verify your credentials.", "test@test.com", "")
            .await
            .unwrap();

        assert!(result.ai_generated_probability > 0.6);
    }

    #[tokio::test]
    async fn empty_content_is_invalid_input() {
        let client = analyzer_with_response(r#"{}"#);
        let analyzer = TextAnalyzer::new(&client);

        let result = analyzer.analyze("   ", "a@b.com", "").await;
        assert!(matches!(result, Err(ThreatError::InvalidInput(_))));
    }
}
