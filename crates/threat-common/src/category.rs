use serde::{Deserialize, Serialize};
use std::fmt;

/// Qualitative bucket derived from `overall_score`. The mapping from score
/// to category lives in exactly one place (`from_score`) so no call site
/// can drift from the boundaries in spec.md §4.6.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ThreatCategory {
    Low,
    Medium,
    High,
    Critical,
}

impl ThreatCategory {
    /// `LOW` if `score < 30`; `MEDIUM` if `30 <= score < 60`; `HIGH` if
    /// `60 <= score < 85`; `CRITICAL` otherwise. Boundary values land in
    /// the higher category.
    pub fn from_score(score: f32) -> Self {
        if score < 30.0 {
            ThreatCategory::Low
        } else if score < 60.0 {
            ThreatCategory::Medium
        } else if score < 85.0 {
            ThreatCategory::High
        } else {
            ThreatCategory::Critical
        }
    }
}

impl fmt::Display for ThreatCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ThreatCategory::Low => write!(f, "LOW"),
            ThreatCategory::Medium => write!(f, "MEDIUM"),
            ThreatCategory::High => write!(f, "HIGH"),
            ThreatCategory::Critical => write!(f, "CRITICAL"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundaries_land_in_the_higher_category() {
        assert_eq!(ThreatCategory::from_score(29.0), ThreatCategory::Low);
        assert_eq!(ThreatCategory::from_score(30.0), ThreatCategory::Medium);
        assert_eq!(ThreatCategory::from_score(59.0), ThreatCategory::Medium);
        assert_eq!(ThreatCategory::from_score(60.0), ThreatCategory::High);
        assert_eq!(ThreatCategory::from_score(84.0), ThreatCategory::High);
        assert_eq!(ThreatCategory::from_score(85.0), ThreatCategory::Critical);
    }

    #[test]
    fn ordering_is_monotone() {
        assert!(ThreatCategory::Low < ThreatCategory::Medium);
        assert!(ThreatCategory::Medium < ThreatCategory::High);
        assert!(ThreatCategory::High < ThreatCategory::Critical);
    }
}
