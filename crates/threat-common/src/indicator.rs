use serde::{Deserialize, Serialize};

/// A named, weighted signal of suspicious content, emitted by perception
/// agents and consumed by the scorer and pattern matcher.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Indicator {
    #[serde(rename = "type")]
    pub kind: String,
    pub value: String,
    /// Weight in `[0, 1]`.
    pub weight: f32,
}

impl Indicator {
    pub fn new(kind: impl Into<String>, value: impl Into<String>, weight: f32) -> Self {
        Self {
            kind: kind.into(),
            value: value.into(),
            weight: weight.clamp(0.0, 1.0),
        }
    }
}
