use async_trait::async_trait;
use threat_common::Result;

use crate::LlmResponse;

/// The raw, uncached, unretried call to an upstream model. Real and mock
/// clients differ only in this trait; caching, retry, and metrics are
/// shared (`CachedClient<T>`).
#[async_trait]
pub trait Transport: Send + Sync {
    async fn call(&self, method: &str, prompt: &str, binary: Option<&[u8]>) -> Result<LlmResponse>;
}
