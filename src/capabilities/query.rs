//! Reference query responder for the interactive review session.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

use crate::capabilities::Capability;
use crate::error::CapabilityError;
use crate::pipeline::context::ExecutionContext;
use crate::store::CaseStore;
use crate::types::transaction::Transaction;

/// Stage name under which a reviewer's question is seeded into the
/// context of a query sub-pipeline.
pub const QUESTION_STAGE: &str = "operator_question";

/// Key of the question text within [`QUESTION_STAGE`].
pub const QUESTION_KEY: &str = "question";

/// Answers free-text reviewer questions from the case store. Which
/// lookups run is this capability's own call; the core only hands over
/// the question and the account identifiers.
pub struct CaseResearcher {
    store: Arc<CaseStore>,
}

impl CaseResearcher {
    pub fn new(store: Arc<CaseStore>) -> Self {
        Self { store }
    }

    fn describe_history(&self, account_id: &str) -> String {
        let history = self.store.transaction_history(account_id);
        if history.is_empty() {
            return format!("No transaction history on record for {account_id}.");
        }

        let mut lines = vec![format!(
            "Last {} transactions of {}:",
            history.len(),
            account_id
        )];
        for entry in &history {
            lines.push(format!(
                "  {} | {:>10.2} | {} | {}",
                entry.get("timestamp").and_then(Value::as_str).unwrap_or("-"),
                entry.get("amount").and_then(Value::as_f64).unwrap_or(0.0),
                entry
                    .get("receiver_account")
                    .and_then(Value::as_str)
                    .unwrap_or("-"),
                entry
                    .get("description")
                    .and_then(Value::as_str)
                    .unwrap_or("-"),
            ));
        }
        lines.join("\n")
    }

    fn describe_profile(&self, account_id: &str) -> String {
        let profile = self.store.profile(account_id);
        format!(
            "Profile of {}: account age {} days, risk score {}, average transfer {:.2}, {} previous flag(s).",
            account_id,
            profile.get("account_age_days").and_then(Value::as_i64).unwrap_or(0),
            profile.get("risk_score").and_then(Value::as_f64).unwrap_or(0.0),
            profile
                .get("average_transaction_amount")
                .and_then(Value::as_f64)
                .unwrap_or(0.0),
            profile.get("previous_flags").and_then(Value::as_i64).unwrap_or(0),
        )
    }

    fn describe_similar_cases(&self, context: &ExecutionContext) -> String {
        // Reuse the model's feature breakdown when the main run is in
        // context; an empty feature set matches the whole archive.
        let features = context
            .value("ml_assessment", "features")
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default();

        let cases = self.store.similar_cases(&features);
        if cases.is_empty() {
            return "No similar cases found in the archive.".to_string();
        }

        let mut lines = vec!["Similar archived cases:".to_string()];
        for case in &cases {
            lines.push(format!(
                "  {} | similarity {:.2} | {}",
                case.get("case_id").and_then(Value::as_str).unwrap_or("-"),
                case.get("similarity_score").and_then(Value::as_f64).unwrap_or(0.0),
                case.get("outcome").and_then(Value::as_str).unwrap_or("-"),
            ));
        }
        lines.join("\n")
    }
}

#[async_trait]
impl Capability for CaseResearcher {
    fn name(&self) -> &str {
        "case-researcher"
    }

    async fn invoke(
        &self,
        transaction: &Transaction,
        context: &ExecutionContext,
    ) -> Result<String, CapabilityError> {
        let question = context
            .text(QUESTION_STAGE, QUESTION_KEY)
            .unwrap_or("")
            .to_lowercase();
        let sender = &transaction.sender_account;

        let answer = if question.contains("history") || question.contains("transaction") {
            self.describe_history(sender)
        } else if question.contains("similar") || question.contains("case") {
            self.describe_similar_cases(context)
        } else if question.contains("profile")
            || question.contains("account")
            || question.contains("risk")
        {
            self.describe_profile(sender)
        } else {
            format!(
                "{}\n{}",
                self.describe_profile(sender),
                self.describe_history(sender)
            )
        };

        Ok(answer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::stage::StageResult;
    use serde_json::{json, Map};

    fn researcher() -> CaseResearcher {
        CaseResearcher::new(Arc::new(CaseStore::with_sample_data()))
    }

    fn question_context(question: &str) -> ExecutionContext {
        let mut fields = Map::new();
        fields.insert(QUESTION_KEY.to_string(), json!(question));
        let mut context = ExecutionContext::new();
        context.record(StageResult::synthetic(QUESTION_STAGE, fields));
        context
    }

    fn sample_transaction() -> Transaction {
        Transaction::new("tx_1", "DE55500105173984217489", "FR7630006000011234", 2500.0)
    }

    #[tokio::test]
    async fn test_history_question() {
        let answer = researcher()
            .invoke(&sample_transaction(), &question_context("show the transaction history"))
            .await
            .unwrap();

        assert!(answer.contains("t123456"));
        assert!(answer.contains("Monthly rent December"));
    }

    #[tokio::test]
    async fn test_similar_cases_question() {
        let answer = researcher()
            .invoke(&sample_transaction(), &question_context("any similar cases?"))
            .await
            .unwrap();

        assert!(answer.contains("f987654"));
        assert!(answer.contains("confirmed_fraud"));
    }

    #[tokio::test]
    async fn test_profile_question() {
        let answer = researcher()
            .invoke(&sample_transaction(), &question_context("what is the sender risk profile"))
            .await
            .unwrap();

        assert!(answer.contains("account age 730 days"));
    }

    #[tokio::test]
    async fn test_unclassified_question_gets_overview() {
        let answer = researcher()
            .invoke(&sample_transaction(), &question_context("why?"))
            .await
            .unwrap();

        assert!(answer.contains("Profile of"));
        assert!(answer.contains("transactions of"));
    }
}
