// Shared data model for the threat analysis pipeline.
// Types here are created fresh per analysis and are cheap to clone; none of
// them own a connection or a lock themselves (registries live in threat-orchestrator).

pub mod action;
pub mod analysis_result;
pub mod assessment;
pub mod category;
pub mod config;
pub mod content;
pub mod decoy;
pub mod error;
pub mod indicator;
pub mod pattern;
pub mod perception;

pub use action::{Action, ActionResult, ActionType};
pub use analysis_result::AnalysisResult;
pub use assessment::ThreatAssessment;
pub use category::ThreatCategory;
pub use config::Config;
pub use content::{ContentData, ContentType, VideoInput};
pub use decoy::{DecoyDeployer, DecoyDeployment, DecoyIntel};
pub use error::ThreatError;
pub use indicator::Indicator;
pub use pattern::{PatternMatch, ThreatPattern};
pub use perception::{
    AnalysisOptions, DeepfakeAnalysis, ImageAnalysisResult, ImageMetadata, PerceptionOutcome,
    PerceptionResults, SenderAnalysis, SuspiciousUrl, TextAnalysisResult, ThreatContext,
    VideoAnalysisResult,
};

pub type Result<T> = std::result::Result<T, ThreatError>;
