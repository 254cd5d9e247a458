//! Capability ports for the screening pipeline.
//!
//! Each port is a black box behind [`Capability`]: the core hands it the
//! transaction plus the execution context and gets opaque text back,
//! which only becomes structured data through extraction. The reference
//! implementations in this module are deterministic stand-ins with the
//! same observable output shape as their production counterparts; the
//! pipeline itself depends on nothing but the trait.

pub mod coordinator;
pub mod decision;
pub mod explanation;
pub mod ml;
pub mod query;
pub mod rules;

use async_trait::async_trait;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::error::CapabilityError;
use crate::pipeline::context::ExecutionContext;
use crate::store::CaseStore;
use crate::types::stage::StageKind;
use crate::types::transaction::Transaction;

pub use coordinator::RoutingCoordinator;
pub use decision::ThresholdDecider;
pub use explanation::ReportWriter;
pub use ml::HeuristicScorer;
pub use query::CaseResearcher;
pub use rules::RuleEvaluator;

/// A single assessment capability invoked by the pipeline.
#[async_trait]
pub trait Capability: Send + Sync {
    /// Short implementation name, for logging.
    fn name(&self) -> &str;

    /// Produce raw output for the transaction, given the results of
    /// completed upstream stages.
    async fn invoke(
        &self,
        transaction: &Transaction,
        context: &ExecutionContext,
    ) -> Result<String, CapabilityError>;
}

/// The full set of ports a screening run and its review session can reach.
#[derive(Clone)]
pub struct CapabilitySet {
    pub ml: Arc<dyn Capability>,
    pub rules: Arc<dyn Capability>,
    pub coordinator: Arc<dyn Capability>,
    pub decision: Arc<dyn Capability>,
    pub explanation: Arc<dyn Capability>,
    pub query: Arc<dyn Capability>,
}

impl CapabilitySet {
    /// Reference capabilities backed by the given store and configuration.
    pub fn reference(config: &AppConfig, store: Arc<CaseStore>) -> Self {
        Self {
            ml: Arc::new(HeuristicScorer::new(config, store.clone())),
            rules: Arc::new(RuleEvaluator::new(config.rules.clone(), store.clone())),
            coordinator: Arc::new(RoutingCoordinator::new()),
            decision: Arc::new(ThresholdDecider::new(config.scoring.threshold)),
            explanation: Arc::new(ReportWriter::new()),
            query: Arc::new(CaseResearcher::new(store)),
        }
    }

    /// The port owning a pipeline stage.
    pub fn for_stage(&self, stage: StageKind) -> &Arc<dyn Capability> {
        match stage {
            StageKind::MlAssessment => &self.ml,
            StageKind::RuleAssessment => &self.rules,
            StageKind::Coordination => &self.coordinator,
            StageKind::Decision => &self.decision,
            StageKind::Explanation => &self.explanation,
        }
    }
}
