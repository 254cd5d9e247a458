//! Reference model assessment: a transparent heuristic scorer.
//!
//! Produces the same output shape as a served fraud model (probability,
//! threshold, binary flag, feature breakdown) from a handful of
//! deterministic signals, so runs are reproducible without a model host.

use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;

use crate::capabilities::Capability;
use crate::config::{AppConfig, RuleConfig};
use crate::error::CapabilityError;
use crate::pipeline::context::ExecutionContext;
use crate::store::CaseStore;
use crate::types::transaction::Transaction;

const MODEL_VERSION: &str = "heuristic-scorer-v1";

/// Scores a transaction from amount, receiver novelty, booking time and
/// transfer mode, calibrated against the sender's profile.
pub struct HeuristicScorer {
    threshold: f64,
    rules: RuleConfig,
    store: Arc<CaseStore>,
}

impl HeuristicScorer {
    pub fn new(config: &AppConfig, store: Arc<CaseStore>) -> Self {
        Self {
            threshold: config.scoring.threshold,
            rules: config.rules.clone(),
            store,
        }
    }
}

#[async_trait]
impl Capability for HeuristicScorer {
    fn name(&self) -> &str {
        "heuristic-scorer"
    }

    async fn invoke(
        &self,
        transaction: &Transaction,
        _context: &ExecutionContext,
    ) -> Result<String, CapabilityError> {
        let sender = &transaction.sender_account;

        // Unusually high relative to the sender's habits when a profile
        // exists, relative to the configured ceiling otherwise.
        let amount_unusually_high = match self.store.average_amount(sender) {
            Some(average) if average > 0.0 => transaction.amount > average * 3.0,
            _ => transaction.amount > self.rules.amount_ceiling,
        };
        let new_receiver = !self
            .store
            .known_receivers(sender)
            .contains(&transaction.receiver_account);
        let unusual_time = self.rules.is_night_hour(transaction.hour());

        let mut probability = 0.05;
        if amount_unusually_high {
            probability += 0.35;
        }
        if new_receiver {
            probability += 0.25;
        }
        if unusual_time {
            probability += 0.2;
        }
        if transaction.is_realtime {
            probability += 0.1;
        }
        let probability = f64::min(probability, 0.99);

        let assessment = json!({
            "probability": probability,
            "threshold": self.threshold,
            "is_fraud": probability >= self.threshold,
            "features": {
                "amount_unusually_high": amount_unusually_high,
                "new_receiver": new_receiver,
                "is_realtime": transaction.is_realtime,
                "unusual_time": unusual_time,
            },
            "model_version": MODEL_VERSION,
        });

        Ok(assessment.to_string())
    }
}
