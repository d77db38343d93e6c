use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use threat_common::{Result, ThreatError};

use crate::cache::CacheKey;
use crate::metrics::{LlmMetrics, MetricsInner};
use crate::transport::Transport;
use crate::{LlmClient, LlmResponse, MultimodalPart};

const MAX_ATTEMPTS: u32 = 3;
const BASE_BACKOFF: Duration = Duration::from_secs(2);

struct Cache {
    entries: HashMap<CacheKey, LlmResponse>,
    order: VecDeque<CacheKey>,
    max_entries: usize,
}

impl Cache {
    fn new(max_entries: usize) -> Self {
        Self {
            entries: HashMap::new(),
            order: VecDeque::new(),
            max_entries,
        }
    }

    fn get(&self, key: &CacheKey) -> Option<LlmResponse> {
        self.entries.get(key).cloned()
    }

    fn insert(&mut self, key: CacheKey, response: LlmResponse) {
        if !self.entries.contains_key(&key) {
            self.order.push_back(key);
            while self.order.len() > self.max_entries {
                if let Some(oldest) = self.order.pop_front() {
                    self.entries.remove(&oldest);
                }
            }
        }
        self.entries.insert(key, response);
    }
}

/// Shared caching/retry/metrics wrapper around a raw `Transport`. Both
/// `HttpLlmClient` and `MockLlmClient` are instantiations of this type —
/// the teacher's pattern of one parse/dispatch core reused across
/// provider-specific calls (`LlmAnalyzer::parse_response` in
/// `analyzer-llm/src/analyzer.rs`), generalized one layer further.
pub struct CachedClient<T: Transport> {
    transport: T,
    cache: Mutex<Cache>,
    metrics: MetricsInner,
    base_backoff: Duration,
}

impl<T: Transport> CachedClient<T> {
    pub fn new(transport: T, cache_max_entries: usize) -> Self {
        Self {
            transport,
            cache: Mutex::new(Cache::new(cache_max_entries)),
            metrics: MetricsInner::default(),
            base_backoff: BASE_BACKOFF,
        }
    }

    /// Override the exponential backoff base delay. Exists so tests can
    /// exercise the retry path without actually sleeping for seconds.
    pub fn with_base_backoff(mut self, base: Duration) -> Self {
        self.base_backoff = base;
        self
    }

    async fn cached_call(
        &self,
        method: &str,
        prompt: &str,
        binary: Option<&[u8]>,
    ) -> Result<LlmResponse> {
        let key = CacheKey::new(method, prompt, binary);

        if let Some(hit) = self.cache.lock().unwrap().get(&key) {
            self.metrics.record_cache_hit();
            return Ok(hit);
        }

        let mut last_err = None;
        for attempt in 0..MAX_ATTEMPTS {
            let start = Instant::now();
            match self.transport.call(method, prompt, binary).await {
                Ok(response) => {
                    self.metrics
                        .record_request(start.elapsed().as_millis() as u64);
                    self.cache.lock().unwrap().insert(key, response.clone());
                    return Ok(response);
                }
                Err(e) => {
                    self.metrics.record_error();
                    last_err = Some(e);
                    if attempt + 1 < MAX_ATTEMPTS {
                        let delay = self.base_backoff * 2u32.pow(attempt);
                        tokio::time::sleep(delay).await;
                    }
                }
            }
        }

        Err(ThreatError::UpstreamUnavailable(
            last_err.map(|e| e.to_string()).unwrap_or_default(),
        ))
    }
}

#[async_trait]
impl<T: Transport> LlmClient for CachedClient<T> {
    async fn analyze_text(&self, prompt: &str) -> Result<LlmResponse> {
        self.cached_call("text", prompt, None).await
    }

    async fn analyze_image(&self, bytes: &[u8], prompt: &str) -> Result<LlmResponse> {
        self.cached_call("image", prompt, Some(bytes)).await
    }

    async fn analyze_multimodal(&self, parts: &[MultimodalPart], prompt: &str) -> Result<LlmResponse> {
        let fingerprint: Vec<u8> = parts.iter().flat_map(|p| p.bytes.iter().copied()).collect();
        self.cached_call("multimodal", prompt, Some(&fingerprint)).await
    }

    fn get_metrics(&self) -> LlmMetrics {
        self.metrics.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    struct FlakyTransport {
        fail_times: AtomicU32,
    }

    #[async_trait]
    impl Transport for FlakyTransport {
        async fn call(&self, _method: &str, _prompt: &str, _binary: Option<&[u8]>) -> Result<LlmResponse> {
            if self.fail_times.fetch_sub(1, Ordering::SeqCst) > 0 {
                return Err(ThreatError::Internal("simulated failure".into()));
            }
            Ok(LlmResponse {
                text: "ok".to_string(),
                usage: Default::default(),
            })
        }
    }

    struct CountingTransport {
        calls: Arc<AtomicU32>,
    }

    #[async_trait]
    impl Transport for CountingTransport {
        async fn call(&self, _method: &str, prompt: &str, _binary: Option<&[u8]>) -> Result<LlmResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(LlmResponse {
                text: format!("echo:{prompt}"),
                usage: Default::default(),
            })
        }
    }

    #[tokio::test]
    async fn identical_prompts_hit_the_cache() {
        let calls = Arc::new(AtomicU32::new(0));
        let client = CachedClient::new(
            CountingTransport { calls: calls.clone() },
            1024,
        );

        client.analyze_text("hello").await.unwrap();
        client.analyze_text("hello").await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        let metrics = client.get_metrics();
        assert_eq!(metrics.request_count, 1);
        assert_eq!(metrics.cache_hits, 1);
    }

    #[tokio::test]
    async fn retries_then_succeeds_within_attempt_budget() {
        let client = CachedClient::new(
            FlakyTransport { fail_times: AtomicU32::new(2) },
            1024,
        )
        .with_base_backoff(Duration::from_millis(1));

        let result = client.analyze_text("retry me").await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn gives_up_after_max_attempts() {
        let client = CachedClient::new(
            FlakyTransport { fail_times: AtomicU32::new(10) },
            1024,
        )
        .with_base_backoff(Duration::from_millis(1));

        let result = client.analyze_text("never works").await;
        assert!(matches!(result, Err(ThreatError::UpstreamUnavailable(_))));
    }

    #[tokio::test]
    async fn cache_evicts_oldest_entry_past_the_bound() {
        let calls = Arc::new(AtomicU32::new(0));
        let client = CachedClient::new(
            CountingTransport { calls: calls.clone() },
            2,
        );

        client.analyze_text("a").await.unwrap();
        client.analyze_text("b").await.unwrap();
        client.analyze_text("c").await.unwrap();
        // "a" should have been evicted; re-requesting it is a fresh call.
        client.analyze_text("a").await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }
}
