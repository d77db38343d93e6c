use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// The set of defensive actions the defense agent can select.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    Log,
    AlertUser,
    Quarantine,
    BlockSender,
    DeployDecoy,
    NotifyAdmin,
}

impl ActionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionType::Log => "log",
            ActionType::AlertUser => "alert_user",
            ActionType::Quarantine => "quarantine",
            ActionType::BlockSender => "block_sender",
            ActionType::DeployDecoy => "deploy_decoy",
            ActionType::NotifyAdmin => "notify_admin",
        }
    }
}

/// One selected defensive action, with its dispatch priority (1..4, higher
/// fires first) and any parameters it needs at execution time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Action {
    #[serde(rename = "type")]
    pub kind: ActionType,
    pub priority: u8,
    pub params: HashMap<String, Value>,
}

impl Action {
    pub fn new(kind: ActionType, priority: u8) -> Self {
        Self {
            kind,
            priority,
            params: HashMap::new(),
        }
    }
}

/// The outcome of dispatching one `Action`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionResult {
    pub action_ref: String,
    pub success: bool,
    pub details: HashMap<String, Value>,
}
