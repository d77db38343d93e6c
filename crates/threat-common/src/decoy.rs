use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Result;

/// A generated deceptive reply tracked against an active threat.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecoyDeployment {
    pub decoy_id: String,
    pub threat_id: String,
    pub sender: String,
    pub generated_reply: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

/// Aggregated attacker-interaction intelligence for one decoy.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DecoyIntel {
    pub decoy_id: String,
    pub attacker_actions: Vec<String>,
    pub ip_addresses: HashSet<String>,
    pub user_agents: HashSet<String>,
    pub timestamps: Vec<DateTime<Utc>>,
}

impl DecoyIntel {
    pub fn new(decoy_id: impl Into<String>) -> Self {
        Self {
            decoy_id: decoy_id.into(),
            ..Default::default()
        }
    }
}

/// The defense agent's view of the decoy system: enough to dispatch a
/// `deploy_decoy` action without `threat-defense-agent` depending directly
/// on `threat-decoy` (spec.md §9 DESIGN NOTES "cyclic references" — only an
/// opaque id crosses the boundary, resolved through whichever registry
/// owns the concrete store).
#[async_trait]
pub trait DecoyDeployer: Send + Sync {
    async fn deploy(&self, threat_id: &str, sender: &str, original_message: &str) -> Result<DecoyDeployment>;
}
