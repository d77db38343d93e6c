//! Sole gateway to the external generative model.
//!
//! Modeled on `security-analyzer-llm`'s provider abstraction
//! (`analyzer-llm/src/analyzer.rs`) and on `security-analyzer-claude`'s
//! first-class mock (`analyzer-claude/src/llm/mock.rs`): a trait object any
//! perception agent can hold, with a real `reqwest`-backed implementation
//! and a deterministic mock shipped alongside it rather than gated behind
//! `#[cfg(test)]`.

mod cache;
mod client;
mod metrics;
mod mock;
mod parse;
mod real;
mod transport;

pub use cache::CacheKey;
pub use client::CachedClient;
pub use metrics::LlmMetrics;
pub use mock::{new_mock_client, MockLlmClient, MockTransport};
pub use parse::extract_json;
pub use real::{new_http_client, HttpLlmClient};
pub use transport::Transport;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use threat_common::Result;

/// Token accounting for one request. Zeroed when the upstream omits usage
/// metadata.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub candidate_tokens: u32,
}

/// The raw text (and usage) returned by the upstream model, before any
/// caller-side JSON parsing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmResponse {
    pub text: String,
    pub usage: Usage,
}

/// One part of a multimodal prompt: raw bytes plus a content-type hint.
#[derive(Debug, Clone)]
pub struct MultimodalPart {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

/// The narrow contract every perception agent and the decoy system depend
/// on, instead of each owning its own HTTP client.
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn analyze_text(&self, prompt: &str) -> Result<LlmResponse>;
    async fn analyze_image(&self, bytes: &[u8], prompt: &str) -> Result<LlmResponse>;
    async fn analyze_multimodal(&self, parts: &[MultimodalPart], prompt: &str) -> Result<LlmResponse>;
    fn get_metrics(&self) -> LlmMetrics;
}
