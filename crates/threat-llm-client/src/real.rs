//! `reqwest`-backed transport. The concrete upstream vendor is out of
//! scope (spec.md §1) — this posts to a configurable base URL using a
//! vendor-neutral request/response shape, the same "one HTTP POST, one
//! JSON body" posture as `GroqAnalyzer::call_groq_api` in
//! `analyzer-groq/src/lib.rs`.

use async_trait::async_trait;
use base64::Engine;
use serde::{Deserialize, Serialize};
use threat_common::{Result, ThreatError};

use crate::client::CachedClient;
use crate::transport::Transport;
use crate::{LlmResponse, Usage};

#[derive(Debug, Serialize)]
struct CompletionRequest {
    model: String,
    prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    image_b64: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    text: String,
    #[serde(default)]
    usage: Option<UsagePayload>,
}

#[derive(Debug, Deserialize)]
struct UsagePayload {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    candidate_tokens: u32,
}

pub struct HttpTransport {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
            model: model.into(),
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn call(&self, _method: &str, prompt: &str, binary: Option<&[u8]>) -> Result<LlmResponse> {
        let image_b64 = binary.map(|b| base64::engine::general_purpose::STANDARD.encode(b));
        let request = CompletionRequest {
            model: self.model.clone(),
            prompt: prompt.to_string(),
            image_b64,
        };

        let response = self
            .http
            .post(format!("{}/v1/complete", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| ThreatError::UpstreamUnavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ThreatError::UpstreamUnavailable(format!(
                "upstream returned {}",
                response.status()
            )));
        }

        let parsed: CompletionResponse = response
            .json()
            .await
            .map_err(|e| ThreatError::UpstreamUnavailable(e.to_string()))?;

        Ok(LlmResponse {
            text: parsed.text,
            usage: parsed
                .usage
                .map(|u| Usage {
                    prompt_tokens: u.prompt_tokens,
                    candidate_tokens: u.candidate_tokens,
                })
                .unwrap_or_default(),
        })
    }
}

/// Cached, retried client talking to the real upstream endpoint.
pub type HttpLlmClient = CachedClient<HttpTransport>;

pub fn new_http_client(base_url: impl Into<String>, api_key: impl Into<String>, model: impl Into<String>, cache_max_entries: usize) -> HttpLlmClient {
    CachedClient::new(HttpTransport::new(base_url, api_key, model), cache_max_entries)
}
