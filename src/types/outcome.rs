//! Final outcome of a screening run

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

use crate::types::transaction::Transaction;

/// Terminal decision for a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FinalDecision {
    Approved,
    Declined,
}

impl FinalDecision {
    /// Read a decision out of a structured stage payload value.
    /// Unknown strings yield `None`, never a default decision.
    pub fn from_value(value: &Value) -> Option<Self> {
        value.as_str().and_then(|s| s.parse().ok())
    }
}

impl FromStr for FinalDecision {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "approved" => Ok(FinalDecision::Approved),
            "declined" => Ok(FinalDecision::Declined),
            _ => Err(()),
        }
    }
}

impl fmt::Display for FinalDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FinalDecision::Approved => write!(f, "approved"),
            FinalDecision::Declined => write!(f, "declined"),
        }
    }
}

/// Assembled result of one screening run.
///
/// Exactly one of the following shapes holds:
/// automatic approval (`final_decision = Approved`, no explanation),
/// an automated decision with its reasoning, an explanation awaiting
/// reviewer action (`final_decision = None`), or a routing error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutcomeRecord {
    /// The screened transaction
    pub transaction: Transaction,

    /// Structured result of the model assessment (empty if unavailable)
    pub ml_assessment: Map<String, Value>,

    /// Structured result of the rule assessment (empty if unavailable)
    pub rule_assessment: Map<String, Value>,

    /// Terminal decision, when one was reached automatically
    pub final_decision: Option<FinalDecision>,

    /// Reviewer-facing rationale, when one was produced
    pub explanation: Option<String>,

    /// Routing failure description; set only when the run could not be
    /// routed to a terminal state
    pub error: Option<String>,
}

impl OutcomeRecord {
    /// Whether a human reviewer still has to act on this transaction.
    pub fn requires_review(&self) -> bool {
        self.final_decision.is_none()
    }

    /// Fraud probability reported by the model assessment, if present.
    pub fn fraud_probability(&self) -> Option<f64> {
        self.ml_assessment.get("probability").and_then(Value::as_f64)
    }

    /// Whether the rule assessment flagged the transaction.
    pub fn is_flagged(&self) -> bool {
        self.rule_assessment
            .get("is_flagged")
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_final_decision_parsing() {
        assert_eq!(FinalDecision::from_value(&json!("approved")), Some(FinalDecision::Approved));
        assert_eq!(FinalDecision::from_value(&json!("declined")), Some(FinalDecision::Declined));
        assert_eq!(FinalDecision::from_value(&json!("maybe")), None);
        assert_eq!(FinalDecision::from_value(&json!(1)), None);
    }

    #[test]
    fn test_outcome_accessors() {
        let mut ml = Map::new();
        ml.insert("probability".to_string(), json!(0.82));
        let mut rules = Map::new();
        rules.insert("is_flagged".to_string(), json!(true));

        let outcome = OutcomeRecord {
            transaction: Transaction::new("tx_1", "A", "B", 100.0),
            ml_assessment: ml,
            rule_assessment: rules,
            final_decision: None,
            explanation: Some("suspicious".to_string()),
            error: None,
        };

        assert_eq!(outcome.fraud_probability(), Some(0.82));
        assert!(outcome.is_flagged());
        assert!(outcome.requires_review());
    }

    #[test]
    fn test_empty_assessments_read_as_absent() {
        let outcome = OutcomeRecord {
            transaction: Transaction::new("tx_1", "A", "B", 100.0),
            ml_assessment: Map::new(),
            rule_assessment: Map::new(),
            final_decision: Some(FinalDecision::Approved),
            explanation: None,
            error: None,
        };

        assert_eq!(outcome.fraud_probability(), None);
        assert!(!outcome.is_flagged());
        assert!(!outcome.requires_review());
    }
}
