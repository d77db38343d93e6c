//! Deterministic mock transport for development and tests, mirroring
//! `MockAnalyzer` in `analyzer-claude/src/llm/mock.rs`: a realistic,
//! delay-simulated stand-in that needs no API key.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use threat_common::Result;

use crate::client::CachedClient;
use crate::transport::Transport;
use crate::LlmResponse;

/// Canned responses matched by substring against the prompt, in
/// registration order (first match wins). Falls back to `"{}"` — callers
/// already treat missing JSON fields as neutral defaults (see
/// `threat_llm_client::extract_json`).
pub struct MockTransport {
    responses: Mutex<Vec<(String, String)>>,
    simulated_latency: Duration,
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(Vec::new()),
            simulated_latency: Duration::from_millis(0),
        }
    }

    /// Register a canned response: any prompt containing `pattern` gets
    /// `response` back verbatim.
    pub fn set_response(&self, pattern: impl Into<String>, response: impl Into<String>) {
        self.responses.lock().unwrap().push((pattern.into(), response.into()));
    }

    pub fn with_simulated_latency(mut self, latency: Duration) -> Self {
        self.simulated_latency = latency;
        self
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn call(&self, _method: &str, prompt: &str, _binary: Option<&[u8]>) -> Result<LlmResponse> {
        if !self.simulated_latency.is_zero() {
            tokio::time::sleep(self.simulated_latency).await;
        }

        let responses = self.responses.lock().unwrap();
        let text = responses
            .iter()
            .find(|(pattern, _)| prompt.contains(pattern.as_str()))
            .map(|(_, response)| response.clone())
            .unwrap_or_else(|| "{}".to_string());

        Ok(LlmResponse {
            text,
            usage: Default::default(),
        })
    }
}

/// Cached mock client — same cache/retry/metrics behavior as
/// `HttpLlmClient`, just backed by canned responses.
pub type MockLlmClient = CachedClient<MockTransport>;

pub fn new_mock_client() -> MockLlmClient {
    CachedClient::new(MockTransport::new(), 1024)
}
