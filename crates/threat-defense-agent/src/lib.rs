//! Category-driven defensive action selection and simulated execution.
//!
//! The action table is a plain `match` over `ThreatCategory` rather than a
//! data-driven lookup — there are only four categories and the table is
//! small and fixed, the same "small enum, direct match" posture the
//! teacher uses for `Severity`-keyed decisions in `security_api/src/cvss.rs`.
//! Stable ordering is produced with an explicit index-carrying comparator,
//! mirroring how the teacher avoids surprising reorderings when sorting
//! derived vectors in `api/src/main.rs`.

use std::collections::HashMap;

use serde_json::{json, Value};
use threat_common::{Action, ActionResult, ActionType, DecoyDeployer, ThreatAssessment, ThreatCategory};

pub struct DefenseAgent;

impl Default for DefenseAgent {
    fn default() -> Self {
        Self::new()
    }
}

impl DefenseAgent {
    pub fn new() -> Self {
        Self
    }

    /// Selects the category's action table (spec.md §4.7) and sorts it by
    /// descending priority, stable on insertion order for ties.
    /// `auto_execute` does not filter the selection — it only informs the
    /// caller's decision to subsequently call `execute_actions`, matching
    /// the source's `determine_actions(assessment, auto_execute)` signature
    /// which is always queried regardless of whether execution follows.
    pub fn determine_actions(&self, assessment: &ThreatAssessment, _auto_execute: bool) -> Vec<Action> {
        let mut indexed: Vec<(usize, Action)> = action_table(assessment.category).into_iter().enumerate().collect();
        indexed.sort_by(|(i, a), (j, b)| b.priority.cmp(&a.priority).then_with(|| i.cmp(j)));
        indexed.into_iter().map(|(_, action)| action).collect()
    }

    /// Dispatches each action in order, capturing a per-action result. One
    /// action failing does not abort the remainder (spec.md §4.7).
    /// `decoy_deployer` is consulted only for a `deploy_decoy` action, so
    /// every other action type works with `decoy_deployer: None`.
    pub async fn execute_actions(
        &self,
        actions: &[Action],
        context: &ExecutionContext<'_>,
    ) -> Vec<ActionResult> {
        let mut results = Vec::with_capacity(actions.len());
        for action in actions {
            results.push(self.execute_one(action, context).await);
        }
        results
    }

    async fn execute_one(&self, action: &Action, context: &ExecutionContext<'_>) -> ActionResult {
        let action_ref = action.kind.as_str().to_string();
        match action.kind {
            ActionType::Quarantine => success(action_ref, details([("status", "secured")])),
            ActionType::BlockSender => success(action_ref, details([("status", "blocked")])),
            ActionType::AlertUser => success(action_ref, details([("status", "alerted")])),
            ActionType::NotifyAdmin => success(action_ref, details([("status", "notified")])),
            ActionType::Log => success(action_ref, details([("status", "logged")])),
            ActionType::DeployDecoy => match context.decoy_deployer {
                Some(deployer) => {
                    match deployer
                        .deploy(&context.threat_id, &context.sender, &context.original_message)
                        .await
                    {
                        Ok(deployment) => success(
                            action_ref,
                            HashMap::from([
                                ("status".to_string(), json!("deployed")),
                                ("decoy_id".to_string(), json!(deployment.decoy_id)),
                            ]),
                        ),
                        Err(e) => failure(action_ref, details([("status", "failed"), ("error", &e.to_string())])),
                    }
                }
                None => failure(action_ref, details([("status", "skipped"), ("reason", "no decoy deployer configured")])),
            },
        }
    }
}

/// Per-analysis context `execute_actions` needs to dispatch a decoy
/// deployment. Everything else the defense agent needs comes from the
/// action itself.
pub struct ExecutionContext<'a> {
    pub threat_id: String,
    pub sender: String,
    pub original_message: String,
    pub decoy_deployer: Option<&'a dyn DecoyDeployer>,
}

fn action_table(category: ThreatCategory) -> Vec<Action> {
    match category {
        ThreatCategory::Low => vec![Action::new(ActionType::Log, 1)],
        ThreatCategory::Medium => vec![
            Action::new(ActionType::Log, 1),
            Action::new(ActionType::AlertUser, 2),
        ],
        ThreatCategory::High => vec![
            Action::new(ActionType::AlertUser, 2),
            Action::new(ActionType::BlockSender, 3),
            Action::new(ActionType::NotifyAdmin, 2),
        ],
        ThreatCategory::Critical => vec![
            Action::new(ActionType::Quarantine, 4),
            Action::new(ActionType::BlockSender, 3),
            Action::new(ActionType::DeployDecoy, 2),
            Action::new(ActionType::AlertUser, 2),
            Action::new(ActionType::NotifyAdmin, 2),
        ],
    }
}

fn details<const N: usize>(pairs: [(&str, &str); N]) -> HashMap<String, Value> {
    pairs.into_iter().map(|(k, v)| (k.to_string(), json!(v))).collect()
}

fn success(action_ref: String, details: HashMap<String, Value>) -> ActionResult {
    ActionResult {
        action_ref,
        success: true,
        details,
    }
}

fn failure(action_ref: String, details: HashMap<String, Value>) -> ActionResult {
    ActionResult {
        action_ref,
        success: false,
        details,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use threat_common::{PatternMatch, ThreatError};

    fn mock_assessment(category: ThreatCategory) -> ThreatAssessment {
        ThreatAssessment {
            overall_score: 85.0,
            category,
            confidence: 0.9,
            threat_type: "Phishing".to_string(),
            attack_vector: "email".to_string(),
            contributing_factors: Vec::new(),
            matched_patterns: Vec::<PatternMatch>::new(),
            recommended_actions: Vec::new(),
            explanation: "Test".to_string(),
            risk_breakdown: HashMap::new(),
        }
    }

    #[test]
    fn critical_actions_include_quarantine_block_and_decoy_with_quarantine_first() {
        let agent = DefenseAgent::new();
        let actions = agent.determine_actions(&mock_assessment(ThreatCategory::Critical), false);

        let kinds: Vec<ActionType> = actions.iter().map(|a| a.kind).collect();
        assert!(kinds.contains(&ActionType::Quarantine));
        assert!(kinds.contains(&ActionType::BlockSender));
        assert!(kinds.contains(&ActionType::DeployDecoy));
        assert_eq!(actions[0].kind, ActionType::Quarantine);
    }

    #[test]
    fn low_category_has_exactly_one_log_action() {
        let agent = DefenseAgent::new();
        let actions = agent.determine_actions(&mock_assessment(ThreatCategory::Low), false);

        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].kind, ActionType::Log);
    }

    #[test]
    fn ties_break_on_insertion_order() {
        let agent = DefenseAgent::new();
        let actions = agent.determine_actions(&mock_assessment(ThreatCategory::Critical), false);

        // deploy_decoy, alert_user, notify_admin all carry priority 2 and
        // must retain their table order among themselves.
        let priority_two: Vec<ActionType> = actions.iter().filter(|a| a.priority == 2).map(|a| a.kind).collect();
        assert_eq!(
            priority_two,
            vec![ActionType::DeployDecoy, ActionType::AlertUser, ActionType::NotifyAdmin]
        );
    }

    struct FakeDeployer;

    #[async_trait::async_trait]
    impl DecoyDeployer for FakeDeployer {
        async fn deploy(&self, threat_id: &str, sender: &str, _original_message: &str) -> threat_common::Result<threat_common::DecoyDeployment> {
            Ok(threat_common::DecoyDeployment {
                decoy_id: "decoy-1".to_string(),
                threat_id: threat_id.to_string(),
                sender: sender.to_string(),
                generated_reply: "ok".to_string(),
                active: true,
                created_at: chrono::Utc::now(),
            })
        }
    }

    struct FailingDeployer;

    #[async_trait::async_trait]
    impl DecoyDeployer for FailingDeployer {
        async fn deploy(&self, _threat_id: &str, _sender: &str, _original_message: &str) -> threat_common::Result<threat_common::DecoyDeployment> {
            Err(ThreatError::UpstreamUnavailable("simulated".to_string()))
        }
    }

    #[tokio::test]
    async fn execute_actions_reports_success_for_every_action_and_never_aborts() {
        let agent = DefenseAgent::new();
        let actions = vec![Action::new(ActionType::Quarantine, 1), Action::new(ActionType::AlertUser, 1)];
        let context = ExecutionContext {
            threat_id: "t1".to_string(),
            sender: "a@b.com".to_string(),
            original_message: "hi".to_string(),
            decoy_deployer: None,
        };

        let results = agent.execute_actions(&actions, &context).await;

        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.success));
        assert_eq!(results[0].details["status"], json!("secured"));
    }

    #[tokio::test]
    async fn deploy_decoy_action_calls_the_configured_deployer() {
        let agent = DefenseAgent::new();
        let deployer = FakeDeployer;
        let actions = vec![Action::new(ActionType::DeployDecoy, 2)];
        let context = ExecutionContext {
            threat_id: "t1".to_string(),
            sender: "bad@evil.com".to_string(),
            original_message: "wire money".to_string(),
            decoy_deployer: Some(&deployer),
        };

        let results = agent.execute_actions(&actions, &context).await;
        assert!(results[0].success);
        assert_eq!(results[0].details["decoy_id"], json!("decoy-1"));
    }

    #[tokio::test]
    async fn deploy_decoy_failure_is_captured_not_propagated() {
        let agent = DefenseAgent::new();
        let deployer = FailingDeployer;
        let actions = vec![Action::new(ActionType::DeployDecoy, 2), Action::new(ActionType::Log, 1)];
        let context = ExecutionContext {
            threat_id: "t1".to_string(),
            sender: "bad@evil.com".to_string(),
            original_message: "wire money".to_string(),
            decoy_deployer: Some(&deployer),
        };

        let results = agent.execute_actions(&actions, &context).await;
        assert!(!results[0].success);
        assert!(results[1].success);
    }
}
