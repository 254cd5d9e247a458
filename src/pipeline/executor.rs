//! Pipeline execution: the branching state machine of a screening run.
//!
//! Runs the stages of a [`StagePlan`] in dependency order, feeds each
//! completed result back into the execution context, resolves the
//! coordination stage's routing label and executes exactly one of the
//! conditional downstream stages. Leaf assessment failures degrade to
//! empty results; only an unusable routing label terminates a run in a
//! reported error state.

use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::timeout;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::capabilities::query::{QUESTION_KEY, QUESTION_STAGE};
use crate::capabilities::{Capability, CapabilitySet};
use crate::config::AppConfig;
use crate::error::CapabilityError;
use crate::metrics::PipelineMetrics;
use crate::pipeline::context::ExecutionContext;
use crate::pipeline::graph::StagePlan;
use crate::types::outcome::{FinalDecision, OutcomeRecord};
use crate::types::stage::{BranchDecision, StageKind, StageResult};
use crate::types::transaction::Transaction;

/// Progress of a screening run through its stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// Both leaf assessments are in flight
    Assessing,
    /// Waiting for the routing label
    Coordinating,
    /// Automated decision stage in flight
    Deciding,
    /// Explanation stage in flight
    Explaining,
    /// Approved without running a conditional stage
    Approved,
    /// Terminal: outcome assembled
    Done,
    /// Terminal: routing failed, outcome carries the error
    Failed,
}

impl RunState {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunState::Assessing => "assessing",
            RunState::Coordinating => "coordinating",
            RunState::Deciding => "deciding",
            RunState::Explaining => "explaining",
            RunState::Approved => "approved",
            RunState::Done => "done",
            RunState::Failed => "failed",
        }
    }
}

/// Executes screening runs against a fixed set of capability ports.
pub struct PipelineExecutor {
    capabilities: CapabilitySet,
    capability_timeout: Duration,
    metrics: Arc<PipelineMetrics>,
}

impl PipelineExecutor {
    pub fn new(
        capabilities: CapabilitySet,
        config: &AppConfig,
        metrics: Arc<PipelineMetrics>,
    ) -> Self {
        Self {
            capabilities,
            capability_timeout: config.pipeline.capability_timeout(),
            metrics,
        }
    }

    /// Run one transaction through its stage plan and assemble the outcome.
    ///
    /// Never fails: assessment-stage failures degrade to empty results and
    /// routing failures are reported through the outcome's `error` field.
    pub async fn run(&self, transaction: &Transaction) -> OutcomeRecord {
        let run_id = Uuid::new_v4();
        let started = Instant::now();
        let plan = StagePlan::for_transaction(transaction);
        let mut context = ExecutionContext::new();

        let mut outcome = OutcomeRecord {
            transaction: transaction.clone(),
            ml_assessment: Map::new(),
            rule_assessment: Map::new(),
            final_decision: None,
            explanation: None,
            error: None,
        };
        let mut branch_label: Option<&'static str> = None;

        info!(
            run_id = %run_id,
            transaction_id = %transaction.transaction_id,
            amount = transaction.amount,
            realtime = transaction.is_realtime,
            "Screening run started"
        );

        let mut state = RunState::Assessing;
        loop {
            state = match state {
                RunState::Assessing => {
                    // No data dependency between the leaf assessments;
                    // dispatch both at once.
                    let (ml, rules) = tokio::join!(
                        self.invoke_lenient(StageKind::MlAssessment, transaction, &context),
                        self.invoke_lenient(StageKind::RuleAssessment, transaction, &context),
                    );
                    outcome.ml_assessment = ml.structured.clone();
                    outcome.rule_assessment = rules.structured.clone();
                    context.record(ml);
                    context.record(rules);
                    RunState::Coordinating
                }

                RunState::Coordinating => {
                    match self
                        .invoke_strict(StageKind::Coordination, transaction, &context)
                        .await
                    {
                        Err(error) => {
                            warn!(run_id = %run_id, error = %error, "Coordination stage failed");
                            outcome.error = Some(format!("coordination failed: {error}"));
                            branch_label = Some("routing_error");
                            RunState::Failed
                        }
                        Ok(raw) => {
                            let branch = BranchDecision::parse(&raw);
                            let reachable = plan.allows(&branch);
                            debug!(run_id = %run_id, label = %branch.label(), "Routing label received");
                            match branch {
                                BranchDecision::Approve => {
                                    branch_label = Some("auto_approved");
                                    RunState::Approved
                                }
                                BranchDecision::Decide if reachable => {
                                    branch_label = Some("automated_decision");
                                    RunState::Deciding
                                }
                                BranchDecision::Explain if reachable => {
                                    branch_label = Some("manual_review");
                                    RunState::Explaining
                                }
                                rejected => {
                                    let message = match &rejected {
                                        BranchDecision::Unrecognized(raw) => {
                                            format!("unrecognized coordinator label: {raw:?}")
                                        }
                                        reachable_elsewhere => format!(
                                            "coordinator label '{}' is not reachable for this transaction",
                                            reachable_elsewhere.label()
                                        ),
                                    };
                                    warn!(run_id = %run_id, label = %rejected.label(), "Routing rejected");
                                    outcome.error = Some(message);
                                    branch_label = Some("routing_error");
                                    RunState::Failed
                                }
                            }
                        }
                    }
                }

                RunState::Approved => {
                    outcome.final_decision = Some(FinalDecision::Approved);
                    info!(run_id = %run_id, "Transaction approved automatically");
                    RunState::Done
                }

                RunState::Deciding => {
                    let result = self
                        .invoke_lenient(StageKind::Decision, transaction, &context)
                        .await;
                    outcome.final_decision = result
                        .structured
                        .get("decision")
                        .and_then(FinalDecision::from_value);
                    outcome.explanation = result
                        .structured
                        .get("reasoning")
                        .and_then(Value::as_str)
                        .map(str::to_owned);
                    if outcome.final_decision.is_none() {
                        warn!(
                            run_id = %run_id,
                            "Decision stage produced no usable decision; transaction held for review"
                        );
                    }
                    context.record(result);
                    RunState::Done
                }

                RunState::Explaining => {
                    let result = self
                        .invoke_lenient(StageKind::Explanation, transaction, &context)
                        .await;
                    // The explanation is natural language; carry it verbatim.
                    let text = result.raw_text.trim();
                    outcome.explanation = (!text.is_empty()).then(|| text.to_string());
                    context.record(result);
                    RunState::Done
                }

                RunState::Done | RunState::Failed => break,
            };
            debug!(run_id = %run_id, state = state.as_str(), "Run state advanced");
        }

        let branch_label = branch_label.unwrap_or("unrouted");
        self.metrics.record_run(branch_label, started.elapsed());
        info!(
            run_id = %run_id,
            branch = branch_label,
            decision = ?outcome.final_decision,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Screening run finished"
        );

        outcome
    }

    /// Run a reviewer's free-text question as a single-stage sub-pipeline
    /// against the query port. The question and the transaction's account
    /// identifiers are seeded into a fresh context.
    pub async fn run_query(
        &self,
        transaction: &Transaction,
        question: &str,
    ) -> Result<String, CapabilityError> {
        let mut fields = Map::new();
        fields.insert(QUESTION_KEY.to_string(), Value::String(question.to_string()));
        fields.insert(
            "sender_account".to_string(),
            Value::String(transaction.sender_account.clone()),
        );
        fields.insert(
            "receiver_account".to_string(),
            Value::String(transaction.receiver_account.clone()),
        );

        let mut context = ExecutionContext::new();
        context.record(StageResult::synthetic(QUESTION_STAGE, fields));

        let started = Instant::now();
        let result = match timeout(
            self.capability_timeout,
            self.capabilities.query.invoke(transaction, &context),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(CapabilityError::Timeout(self.capability_timeout)),
        };
        self.metrics.record_stage("query", started.elapsed());
        result
    }

    /// Invoke a stage and degrade any failure to an empty result.
    async fn invoke_lenient(
        &self,
        stage: StageKind,
        transaction: &Transaction,
        context: &ExecutionContext,
    ) -> StageResult {
        let started = Instant::now();
        let result = match self.invoke_with_timeout(stage, transaction, context).await {
            Ok(raw) => {
                let result = StageResult::from_raw(stage.name(), raw);
                if !result.extraction_ok {
                    debug!(
                        stage = stage.name(),
                        "No structured payload recovered from stage output"
                    );
                }
                result
            }
            Err(error) => {
                warn!(
                    stage = stage.name(),
                    error = %error,
                    "Stage degraded to an empty result"
                );
                StageResult::unavailable(stage.name())
            }
        };
        self.metrics.record_stage(stage.name(), started.elapsed());
        result
    }

    /// Invoke a stage whose failure must stay visible to the caller.
    async fn invoke_strict(
        &self,
        stage: StageKind,
        transaction: &Transaction,
        context: &ExecutionContext,
    ) -> Result<String, CapabilityError> {
        let started = Instant::now();
        let result = self.invoke_with_timeout(stage, transaction, context).await;
        self.metrics.record_stage(stage.name(), started.elapsed());
        result
    }

    async fn invoke_with_timeout(
        &self,
        stage: StageKind,
        transaction: &Transaction,
        context: &ExecutionContext,
    ) -> Result<String, CapabilityError> {
        let capability = self.capabilities.for_stage(stage);
        debug!(stage = stage.name(), capability = capability.name(), "Invoking stage");
        match timeout(
            self.capability_timeout,
            capability.invoke(transaction, context),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(CapabilityError::Timeout(self.capability_timeout)),
        }
    }
}
