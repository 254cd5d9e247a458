//! Reference explanation writer for the review queue.

use async_trait::async_trait;
use serde_json::Value;

use crate::capabilities::Capability;
use crate::error::CapabilityError;
use crate::pipeline::context::ExecutionContext;
use crate::types::stage::StageKind;
use crate::types::transaction::Transaction;

/// Renders the upstream assessments as plain prose for a reviewer.
/// Output is intentionally unstructured; the pipeline carries it
/// verbatim instead of extracting it.
pub struct ReportWriter;

impl ReportWriter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ReportWriter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Capability for ReportWriter {
    fn name(&self) -> &str {
        "report-writer"
    }

    async fn invoke(
        &self,
        transaction: &Transaction,
        context: &ExecutionContext,
    ) -> Result<String, CapabilityError> {
        let ml = StageKind::MlAssessment.name();
        let rules = StageKind::RuleAssessment.name();

        let mut sentences = vec![format!(
            "Transaction {} over {:.2} from {} to {} was held for review.",
            transaction.transaction_id,
            transaction.amount,
            transaction.sender_account,
            transaction.receiver_account,
        )];

        match context.number(ml, "probability") {
            Some(probability) => sentences.push(format!(
                "The screening model estimates a fraud probability of {:.0}%.",
                probability * 100.0
            )),
            None => sentences.push("The model assessment was unavailable for this run.".to_string()),
        }

        let triggered: Vec<&str> = context
            .value(rules, "rules_triggered")
            .and_then(Value::as_array)
            .map(|rules| rules.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default();
        if triggered.is_empty() {
            sentences.push("No screening rules were triggered.".to_string());
        } else {
            sentences.push(format!(
                "The rule engine flagged: {}.",
                triggered.join(", ")
            ));
        }

        if let Some(description) = &transaction.description {
            sentences.push(format!("The stated purpose was \"{description}\"."));
        }

        Ok(sentences.join(" "))
    }
}
