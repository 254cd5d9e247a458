//! Reference automated decision for realtime transfers.

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::capabilities::Capability;
use crate::error::CapabilityError;
use crate::pipeline::context::ExecutionContext;
use crate::types::stage::StageKind;
use crate::types::transaction::Transaction;

/// Approves or declines on the upstream assessments: declines when the
/// model probability reaches the threshold or at least two rules fired,
/// approves otherwise. Confidence grows with the distance between the
/// probability and the threshold.
pub struct ThresholdDecider {
    threshold: f64,
}

impl ThresholdDecider {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }
}

#[async_trait]
impl Capability for ThresholdDecider {
    fn name(&self) -> &str {
        "threshold-decider"
    }

    async fn invoke(
        &self,
        _transaction: &Transaction,
        context: &ExecutionContext,
    ) -> Result<String, CapabilityError> {
        let ml = StageKind::MlAssessment.name();
        let rules = StageKind::RuleAssessment.name();

        // An unavailable model assessment reads as maximum uncertainty.
        let probability = context.number(ml, "probability").unwrap_or(0.5);
        let triggered: Vec<String> = context
            .value(rules, "rules_triggered")
            .and_then(Value::as_array)
            .map(|rules| {
                rules
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_owned)
                    .collect()
            })
            .unwrap_or_default();

        let decline = probability >= self.threshold || triggered.len() >= 2;
        let spread = (probability - self.threshold).abs();
        let confidence = (0.5 + spread).clamp(0.5, 0.99);

        let reasoning = if decline {
            format!(
                "fraud probability {:.2} against threshold {:.2}, triggered rules: {}",
                probability,
                self.threshold,
                if triggered.is_empty() {
                    "none".to_string()
                } else {
                    triggered.join(", ")
                }
            )
        } else {
            format!(
                "fraud probability {:.2} below threshold {:.2} with {} triggered rule(s)",
                probability,
                self.threshold,
                triggered.len()
            )
        };

        let decision = json!({
            "decision": if decline { "declined" } else { "approved" },
            "confidence": confidence,
            "reasoning": reasoning,
        });

        Ok(decision.to_string())
    }
}
