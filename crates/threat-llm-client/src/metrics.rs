use std::sync::atomic::{AtomicU64, Ordering};

/// Snapshot returned by `LlmClient::get_metrics`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LlmMetrics {
    pub request_count: u64,
    pub cache_hits: u64,
    pub error_count: u64,
    pub avg_latency_ms: f64,
}

/// Shared counters behind an `Arc`, updated without a lock. Cache hits do
/// not increment `request_count`, matching spec.md §4.1 and §8's testable
/// properties.
#[derive(Debug, Default)]
pub struct MetricsInner {
    request_count: AtomicU64,
    cache_hits: AtomicU64,
    error_count: AtomicU64,
    latency_sum_ms: AtomicU64,
}

impl MetricsInner {
    pub fn record_request(&self, latency_ms: u64) {
        self.request_count.fetch_add(1, Ordering::Relaxed);
        self.latency_sum_ms.fetch_add(latency_ms, Ordering::Relaxed);
    }

    pub fn record_cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_error(&self) {
        self.error_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> LlmMetrics {
        let request_count = self.request_count.load(Ordering::Relaxed);
        let latency_sum = self.latency_sum_ms.load(Ordering::Relaxed);
        let avg_latency_ms = if request_count == 0 {
            0.0
        } else {
            latency_sum as f64 / request_count as f64
        };
        LlmMetrics {
            request_count,
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            error_count: self.error_count.load(Ordering::Relaxed),
            avg_latency_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_hits_do_not_affect_request_count() {
        let inner = MetricsInner::default();
        inner.record_request(10);
        inner.record_cache_hit();
        let snap = inner.snapshot();
        assert_eq!(snap.request_count, 1);
        assert_eq!(snap.cache_hits, 1);
    }

    #[test]
    fn average_latency_is_computed_over_requests() {
        let inner = MetricsInner::default();
        inner.record_request(10);
        inner.record_request(20);
        assert_eq!(inner.snapshot().avg_latency_ms, 15.0);
    }
}
