//! Reference coordination: routes a run on the combined assessments.

use async_trait::async_trait;

use crate::capabilities::Capability;
use crate::error::CapabilityError;
use crate::pipeline::context::ExecutionContext;
use crate::types::stage::StageKind;
use crate::types::transaction::Transaction;

/// Emits exactly one routing label, as bare text: approval when neither
/// assessment raised suspicion, otherwise the automated decision route
/// for realtime transfers and the explanation route for everything else.
/// Missing assessments read as "no suspicion raised".
pub struct RoutingCoordinator;

impl RoutingCoordinator {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RoutingCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Capability for RoutingCoordinator {
    fn name(&self) -> &str {
        "routing-coordinator"
    }

    async fn invoke(
        &self,
        transaction: &Transaction,
        context: &ExecutionContext,
    ) -> Result<String, CapabilityError> {
        let model_suspicion = context.flag(StageKind::MlAssessment.name(), "is_fraud");
        let rule_suspicion = context.flag(StageKind::RuleAssessment.name(), "is_flagged");

        let label = if !model_suspicion && !rule_suspicion {
            "approve_transaction"
        } else if transaction.is_realtime {
            "decision_agent"
        } else {
            "generate_explanation"
        };

        Ok(label.to_string())
    }
}
