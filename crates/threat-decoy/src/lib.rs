//! Decoy generation, attacker-interaction tracking, and intelligence
//! aggregation.
//!
//! Storage is a process-wide `RwLock<HashMap<..>>`, the same registry
//! shape as `threat-pattern-matcher`'s catalog, generalized to a per-key
//! read/write record instead of a read-mostly one (spec.md §5: "mutations
//! are serialized per-key"). The decoy-reply prompt reuses
//! `threat-llm-client::LlmClient` directly rather than owning a second
//! client — the same "one analyzer type, several call sites" reuse the
//! teacher draws on across its own analysis paths.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use chrono::Utc;
use threat_common::{DecoyDeployer, DecoyDeployment, DecoyIntel, Result, ThreatError};
use threat_llm_client::LlmClient;
use uuid::Uuid;

const DEFAULT_DECOY_TYPE: &str = "information_request";

/// Owns an `Arc<dyn LlmClient>` rather than borrowing one, so it can live
/// process-wide in `threat-orchestrator::Registry` alongside the pattern
/// catalog without tying the registry's lifetime to a single analysis call.
pub struct DecoySystem {
    llm: Arc<dyn LlmClient>,
    store: RwLock<HashMap<String, (DecoyDeployment, DecoyIntel)>>,
}

impl DecoySystem {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self {
            llm,
            store: RwLock::new(HashMap::new()),
        }
    }

    /// Drafts a plausible, information-eliciting reply and stores the
    /// deployment under a fresh `decoy_id` (spec.md §4.8).
    pub async fn deploy_decoy(
        &self,
        threat_id: &str,
        sender: &str,
        original_message: &str,
        decoy_type: Option<&str>,
    ) -> Result<DecoyDeployment> {
        let decoy_type = decoy_type.unwrap_or(DEFAULT_DECOY_TYPE);
        let prompt = decoy_prompt(sender, original_message, decoy_type);

        let generated_reply = match self.llm.analyze_text(&prompt).await {
            Ok(response) => response.text,
            Err(_) => fallback_reply(decoy_type),
        };

        let decoy_id = Uuid::new_v4().to_string();
        let deployment = DecoyDeployment {
            decoy_id: decoy_id.clone(),
            threat_id: threat_id.to_string(),
            sender: sender.to_string(),
            generated_reply,
            active: true,
            created_at: Utc::now(),
        };

        let intel = DecoyIntel::new(decoy_id.clone());
        self.store.write().unwrap().insert(decoy_id, (deployment.clone(), intel));

        Ok(deployment)
    }

    /// Records one attacker interaction against an existing decoy.
    pub fn track_decoy_interaction(&self, decoy_id: &str, action: &str, ip: Option<&str>, user_agent: Option<&str>) -> Result<()> {
        let mut store = self.store.write().unwrap();
        let (_, intel) = store
            .get_mut(decoy_id)
            .ok_or_else(|| ThreatError::NotFound(decoy_id.to_string()))?;

        intel.attacker_actions.push(action.to_string());
        if let Some(ip) = ip {
            intel.ip_addresses.insert(ip.to_string());
        }
        if let Some(ua) = user_agent {
            intel.user_agents.insert(ua.to_string());
        }
        intel.timestamps.push(Utc::now());

        Ok(())
    }

    /// Returns the aggregated intelligence record for one decoy.
    pub fn analyze_decoy_intelligence(&self, decoy_id: &str) -> Result<DecoyIntel> {
        let store = self.store.read().unwrap();
        store
            .get(decoy_id)
            .map(|(_, intel)| intel.clone())
            .ok_or_else(|| ThreatError::NotFound(decoy_id.to_string()))
    }

    pub fn get_deployment(&self, decoy_id: &str) -> Option<DecoyDeployment> {
        self.store.read().unwrap().get(decoy_id).map(|(d, _)| d.clone())
    }
}

#[async_trait]
impl DecoyDeployer for DecoySystem {
    async fn deploy(&self, threat_id: &str, sender: &str, original_message: &str) -> Result<DecoyDeployment> {
        self.deploy_decoy(threat_id, sender, original_message, None).await
    }
}

fn decoy_prompt(sender: &str, original_message: &str, decoy_type: &str) -> String {
    format!(
        "You are impersonating the victim of a suspected social-engineering attempt. \
         Draft a short, plausible reply of type \"{decoy_type}\" to the sender \"{sender}\" \
         that appears cooperative but elicits further information from them, in response to \
         their message:\n{original_message}\n\nReturn only the reply text."
    )
}

fn fallback_reply(decoy_type: &str) -> String {
    format!("Thanks for reaching out — could you share a few more details so I can follow up ({decoy_type})?")
}

#[cfg(test)]
mod tests {
    use super::*;
    use threat_llm_client::{new_mock_client, CachedClient, MockTransport};

    fn client_with_response(response: &str) -> CachedClient<MockTransport> {
        let transport = MockTransport::new();
        transport.set_response("", response);
        CachedClient::new(transport, 16)
    }

    #[tokio::test]
    async fn deploy_decoy_returns_an_active_deployment() {
        let client = Arc::new(client_with_response("Hi, I am looking into this. Can you verify your account number?"));
        let system = DecoySystem::new(client);

        let deployment = system
            .deploy_decoy("t1", "badguy@evil.com", "Wire me money now.", None)
            .await
            .unwrap();

        assert_eq!(deployment.sender, "badguy@evil.com");
        assert!(deployment.active);
        assert!(!deployment.generated_reply.is_empty());
    }

    #[tokio::test]
    async fn track_interaction_then_intelligence_reflects_it() {
        let client = Arc::new(new_mock_client());
        let system = DecoySystem::new(client);

        let deployment = system.deploy_decoy("t1", "s1", "msg", None).await.unwrap();
        system
            .track_decoy_interaction(&deployment.decoy_id, "clicked_link", Some("10.0.0.1"), Some("Mozilla/5.0"))
            .unwrap();

        let intel = system.analyze_decoy_intelligence(&deployment.decoy_id).unwrap();
        assert!(intel.attacker_actions.contains(&"clicked_link".to_string()));
        assert!(intel.ip_addresses.contains("10.0.0.1"));
    }

    #[tokio::test]
    async fn unknown_decoy_id_is_not_found() {
        let client = Arc::new(new_mock_client());
        let system = DecoySystem::new(client);

        let result = system.track_decoy_interaction("missing", "clicked", None, None);
        assert!(matches!(result, Err(ThreatError::NotFound(_))));

        let result = system.analyze_decoy_intelligence("missing");
        assert!(matches!(result, Err(ThreatError::NotFound(_))));
    }

    #[tokio::test]
    async fn deploy_via_decoy_deployer_trait_matches_direct_call() {
        let client = Arc::new(new_mock_client());
        let system = DecoySystem::new(client);

        let deployment = DecoyDeployer::deploy(&system, "t1", "s1", "msg").await.unwrap();
        assert!(deployment.active);
        assert!(system.get_deployment(&deployment.decoy_id).is_some());
    }
}
