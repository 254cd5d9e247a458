//! Stage topology selection for a screening run

use crate::types::stage::{BranchDecision, StageKind};
use crate::types::transaction::Transaction;

/// Ordered set of stages a run can execute, fixed per transaction.
///
/// Both topologies run the two leaf assessments before coordination, and
/// coordination before the conditional stage. The conditional stage is
/// the automated decision for realtime transfers and the reviewer-facing
/// explanation otherwise; a routing label pointing at the stage the other
/// topology owns is an error, never a substitution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StagePlan {
    realtime: bool,
}

impl StagePlan {
    /// Select the topology for a transaction.
    pub fn for_transaction(transaction: &Transaction) -> Self {
        Self {
            realtime: transaction.is_realtime,
        }
    }

    /// The conditional stage reachable after coordination.
    pub fn conditional_stage(&self) -> StageKind {
        if self.realtime {
            StageKind::Decision
        } else {
            StageKind::Explanation
        }
    }

    /// All stages in dependency order. The first two are order-independent
    /// and may run concurrently; the last runs only when coordination
    /// routes to it.
    pub fn stages(&self) -> [StageKind; 4] {
        [
            StageKind::MlAssessment,
            StageKind::RuleAssessment,
            StageKind::Coordination,
            self.conditional_stage(),
        ]
    }

    /// Whether a routing label is reachable in this topology.
    pub fn allows(&self, decision: &BranchDecision) -> bool {
        match decision {
            BranchDecision::Approve => true,
            BranchDecision::Decide => self.conditional_stage() == StageKind::Decision,
            BranchDecision::Explain => self.conditional_stage() == StageKind::Explanation,
            BranchDecision::Unrecognized(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_realtime_topology_never_reaches_explanation() {
        let tx = Transaction::new("tx_1", "A", "B", 100.0).realtime();
        let plan = StagePlan::for_transaction(&tx);

        assert_eq!(plan.conditional_stage(), StageKind::Decision);
        assert!(!plan.stages().contains(&StageKind::Explanation));
        assert!(plan.allows(&BranchDecision::Decide));
        assert!(!plan.allows(&BranchDecision::Explain));
    }

    #[test]
    fn test_batch_topology_never_reaches_decision() {
        let tx = Transaction::new("tx_1", "A", "B", 100.0);
        let plan = StagePlan::for_transaction(&tx);

        assert_eq!(plan.conditional_stage(), StageKind::Explanation);
        assert!(!plan.stages().contains(&StageKind::Decision));
        assert!(plan.allows(&BranchDecision::Explain));
        assert!(!plan.allows(&BranchDecision::Decide));
    }

    #[test]
    fn test_approval_is_always_reachable() {
        let realtime = StagePlan::for_transaction(&Transaction::new("a", "A", "B", 1.0).realtime());
        let batch = StagePlan::for_transaction(&Transaction::new("b", "A", "B", 1.0));

        assert!(realtime.allows(&BranchDecision::Approve));
        assert!(batch.allows(&BranchDecision::Approve));
    }

    #[test]
    fn test_unrecognized_labels_are_never_reachable() {
        let plan = StagePlan::for_transaction(&Transaction::new("a", "A", "B", 1.0));
        assert!(!plan.allows(&BranchDecision::Unrecognized("escalate".to_string())));
    }

    #[test]
    fn test_assessments_precede_coordination() {
        let plan = StagePlan::for_transaction(&Transaction::new("a", "A", "B", 1.0));
        let stages = plan.stages();

        let coord = stages
            .iter()
            .position(|s| *s == StageKind::Coordination)
            .unwrap();
        let ml = stages
            .iter()
            .position(|s| *s == StageKind::MlAssessment)
            .unwrap();
        let rules = stages
            .iter()
            .position(|s| *s == StageKind::RuleAssessment)
            .unwrap();

        assert!(ml < coord);
        assert!(rules < coord);
        assert_eq!(coord, stages.len() - 2);
    }
}
