//! Reference rule-based assessment over the fixed rule taxonomy.

use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;

use crate::capabilities::Capability;
use crate::config::RuleConfig;
use crate::error::CapabilityError;
use crate::pipeline::context::ExecutionContext;
use crate::store::CaseStore;
use crate::types::transaction::Transaction;

const RULE_ENGINE_VERSION: &str = "rule-engine-v2.1";

/// Checks a transaction against the fixed rule set and reports the
/// triggered rule identifiers in taxonomy order.
pub struct RuleEvaluator {
    config: RuleConfig,
    store: Arc<CaseStore>,
}

impl RuleEvaluator {
    pub fn new(config: RuleConfig, store: Arc<CaseStore>) -> Self {
        Self { config, store }
    }

    /// Identifiers of all triggered rules, in taxonomy order.
    pub fn triggered_rules(&self, transaction: &Transaction) -> Vec<&'static str> {
        let mut triggered = Vec::new();

        if transaction.amount > self.config.amount_ceiling {
            triggered.push("large_amount");
        }
        if transaction.is_realtime {
            triggered.push("realtime_transfer");
        }
        if self.config.is_night_hour(transaction.hour()) {
            triggered.push("unusual_time");
        }
        if !self
            .store
            .known_receivers(&transaction.sender_account)
            .contains(&transaction.receiver_account)
        {
            triggered.push("new_receiver");
        }
        if self.description_is_suspicious(transaction) {
            triggered.push("suspicious_description");
        }

        triggered
    }

    fn description_is_suspicious(&self, transaction: &Transaction) -> bool {
        let Some(description) = &transaction.description else {
            return false;
        };
        let description = description.to_lowercase();
        self.config
            .suspicious_keywords
            .iter()
            .any(|keyword| description.contains(&keyword.to_lowercase()))
    }
}

#[async_trait]
impl Capability for RuleEvaluator {
    fn name(&self) -> &str {
        "rule-evaluator"
    }

    async fn invoke(
        &self,
        transaction: &Transaction,
        _context: &ExecutionContext,
    ) -> Result<String, CapabilityError> {
        let triggered = self.triggered_rules(transaction);

        let assessment = json!({
            "is_flagged": !triggered.is_empty(),
            "rules_triggered": triggered,
            "version": RULE_ENGINE_VERSION,
        });

        Ok(assessment.to_string())
    }
}
