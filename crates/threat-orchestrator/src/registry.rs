//! Process-wide mutable state, encapsulated behind a single "Registry"
//! abstraction per concern (spec.md §9 DESIGN NOTES), rather than ambient
//! global singletons: the pattern catalog, the decoy store, and the
//! analysis counters all live here, constructed once by the host (e.g.
//! `threat-api`'s startup) and shared via `Arc<Registry>`.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use threat_decoy::DecoySystem;
use threat_llm_client::LlmClient;
use threat_pattern_matcher::PatternMatcher;

pub struct Registry {
    pub pattern_matcher: PatternMatcher,
    pub decoy_system: DecoySystem,
    total_analyses: AtomicU64,
    threats_detected: AtomicU64,
    started_at: Instant,
}

impl Registry {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self {
            pattern_matcher: PatternMatcher::with_seed_catalog(),
            decoy_system: DecoySystem::new(llm),
            total_analyses: AtomicU64::new(0),
            threats_detected: AtomicU64::new(0),
            started_at: Instant::now(),
        }
    }

    /// Loads newline-delimited JSON `ThreatPattern` records from `path`
    /// into the catalog. A missing file is not an error (spec.md §6).
    pub fn load_catalog_seed(&self, path: &str) -> threat_common::Result<usize> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(threat_common::ThreatError::Internal(e.to_string())),
        };

        let mut loaded = 0;
        for line in contents.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let pattern: threat_common::ThreatPattern = serde_json::from_str(line)
                .map_err(|e| threat_common::ThreatError::Internal(e.to_string()))?;
            self.pattern_matcher.add_pattern(pattern)?;
            loaded += 1;
        }
        Ok(loaded)
    }

    pub fn record_analysis(&self, is_threat: bool) {
        self.total_analyses.fetch_add(1, Ordering::Relaxed);
        if is_threat {
            self.threats_detected.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn total_analyses(&self) -> u64 {
        self.total_analyses.load(Ordering::Relaxed)
    }

    pub fn threats_detected(&self) -> u64 {
        self.threats_detected.load(Ordering::Relaxed)
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use threat_llm_client::new_mock_client;

    #[test]
    fn seeds_and_counters_start_at_known_defaults() {
        let registry = Registry::new(Arc::new(new_mock_client()));
        assert!(registry.pattern_matcher.pattern_count() >= 4);
        assert_eq!(registry.total_analyses(), 0);
        assert_eq!(registry.threats_detected(), 0);
    }

    #[test]
    fn missing_seed_file_is_not_an_error() {
        let registry = Registry::new(Arc::new(new_mock_client()));
        let loaded = registry.load_catalog_seed("/nonexistent/catalog.ndjson").unwrap();
        assert_eq!(loaded, 0);
    }

    #[test]
    fn record_analysis_increments_counters() {
        let registry = Registry::new(Arc::new(new_mock_client()));
        registry.record_analysis(true);
        registry.record_analysis(false);
        assert_eq!(registry.total_analyses(), 2);
        assert_eq!(registry.threats_detected(), 1);
    }
}
