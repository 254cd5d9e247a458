//! Stage identities, stage results and branch routing labels

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::extractor;

/// The stages a screening run can execute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StageKind {
    /// Model-based fraud probability assessment
    MlAssessment,
    /// Rule-based assessment against the fixed rule taxonomy
    RuleAssessment,
    /// Routing stage that inspects both assessments and emits a branch label
    Coordination,
    /// Automated approve/decline decision (realtime transfers only)
    Decision,
    /// Reviewer-facing explanation of the suspicion (non-realtime only)
    Explanation,
}

impl StageKind {
    /// Canonical stage name, used as the key under which the stage's
    /// result is recorded in the execution context.
    pub fn name(&self) -> &'static str {
        match self {
            StageKind::MlAssessment => "ml_assessment",
            StageKind::RuleAssessment => "rule_assessment",
            StageKind::Coordination => "coordination",
            StageKind::Decision => "decision",
            StageKind::Explanation => "explanation",
        }
    }
}

/// Result of one capability invocation, after extraction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageResult {
    /// Stage this result belongs to
    pub stage_name: String,

    /// Verbatim capability output
    pub raw_text: String,

    /// Structured payload recovered from the raw output; empty when
    /// extraction failed or the output carried no structured data
    pub structured: Map<String, Value>,

    /// Whether a structured payload was actually recovered. Lets callers
    /// tell "legitimately empty" apart from "parse failed".
    pub extraction_ok: bool,
}

impl StageResult {
    /// Build a stage result from raw capability output, running extraction.
    pub fn from_raw(stage_name: impl Into<String>, raw_text: impl Into<String>) -> Self {
        let raw_text = raw_text.into();
        let (structured, extraction_ok) = match extractor::try_extract(&raw_text) {
            Some(map) => (map, true),
            None => (Map::new(), false),
        };
        Self {
            stage_name: stage_name.into(),
            raw_text,
            structured,
            extraction_ok,
        }
    }

    /// An empty result for a stage that failed or timed out. Participates
    /// in the context like any other result; downstream stages tolerate
    /// the absent keys.
    pub fn unavailable(stage_name: impl Into<String>) -> Self {
        Self {
            stage_name: stage_name.into(),
            raw_text: String::new(),
            structured: Map::new(),
            extraction_ok: false,
        }
    }

    /// A result carrying caller-provided structured data, without any
    /// capability having run. Used to seed query sub-pipelines.
    pub fn synthetic(stage_name: impl Into<String>, structured: Map<String, Value>) -> Self {
        Self {
            stage_name: stage_name.into(),
            raw_text: String::new(),
            structured,
            extraction_ok: true,
        }
    }
}

/// Routing label emitted by the coordination stage.
///
/// Anything other than the three known labels is kept verbatim as
/// `Unrecognized` rather than silently mapped to a default route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BranchDecision {
    /// No suspicion: approve without further stages
    Approve,
    /// Hand off to the automated decision stage
    Decide,
    /// Hand off to the explanation stage for reviewer consumption
    Explain,
    /// Output did not match any known label (trimmed raw text)
    Unrecognized(String),
}

impl BranchDecision {
    /// Parse a coordinator's raw output. The match is exact and
    /// case-sensitive on the trimmed text.
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "approve_transaction" => BranchDecision::Approve,
            "decision_agent" => BranchDecision::Decide,
            "generate_explanation" => BranchDecision::Explain,
            other => BranchDecision::Unrecognized(other.to_string()),
        }
    }

    /// The wire label for the decision.
    pub fn label(&self) -> &str {
        match self {
            BranchDecision::Approve => "approve_transaction",
            BranchDecision::Decide => "decision_agent",
            BranchDecision::Explain => "generate_explanation",
            BranchDecision::Unrecognized(raw) => raw,
        }
    }
}
