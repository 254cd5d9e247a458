//! Run-scoped context propagation between stages

use serde_json::{Map, Value};

use crate::types::stage::StageResult;

/// Append-only collection of completed stage results for one run.
///
/// Insertion order is completion order. Exclusively owned by a single
/// pipeline run; downstream stages read upstream results strictly by
/// stage name and must tolerate absent stages and absent keys.
#[derive(Debug, Default)]
pub struct ExecutionContext {
    results: Vec<StageResult>,
}

impl ExecutionContext {
    /// An empty context for a fresh run.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a completed stage result.
    pub fn record(&mut self, result: StageResult) {
        self.results.push(result);
    }

    /// Full result of a stage, if it has completed.
    pub fn get(&self, stage_name: &str) -> Option<&StageResult> {
        self.results.iter().find(|r| r.stage_name == stage_name)
    }

    /// Structured payload of a completed stage.
    pub fn structured(&self, stage_name: &str) -> Option<&Map<String, Value>> {
        self.get(stage_name).map(|r| &r.structured)
    }

    /// One value out of a stage's structured payload.
    pub fn value(&self, stage_name: &str, key: &str) -> Option<&Value> {
        self.structured(stage_name)?.get(key)
    }

    /// Boolean payload value; absent stages and keys read as `false`.
    pub fn flag(&self, stage_name: &str, key: &str) -> bool {
        self.value(stage_name, key)
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    /// Numeric payload value.
    pub fn number(&self, stage_name: &str, key: &str) -> Option<f64> {
        self.value(stage_name, key).and_then(Value::as_f64)
    }

    /// String payload value.
    pub fn text(&self, stage_name: &str, key: &str) -> Option<&str> {
        self.value(stage_name, key).and_then(Value::as_str)
    }

    /// Names of completed stages, in completion order.
    pub fn completed_stages(&self) -> impl Iterator<Item = &str> {
        self.results.iter().map(|r| r.stage_name.as_str())
    }

    /// Number of completed stages.
    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// Whether any stage has completed yet.
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_and_lookup() {
        let mut context = ExecutionContext::new();
        context.record(StageResult::from_raw(
            "ml_assessment",
            r#"{"probability": 0.8, "is_fraud": true}"#,
        ));

        assert_eq!(context.len(), 1);
        assert_eq!(context.number("ml_assessment", "probability"), Some(0.8));
        assert!(context.flag("ml_assessment", "is_fraud"));
    }

    #[test]
    fn test_absent_lookups_are_tolerated() {
        let mut context = ExecutionContext::new();
        context.record(StageResult::unavailable("rule_assessment"));

        // The failed stage is present with an empty payload.
        assert!(context.get("rule_assessment").is_some());
        assert!(!context.flag("rule_assessment", "is_flagged"));
        assert_eq!(context.number("rule_assessment", "probability"), None);

        // A stage that never ran reads the same way.
        assert!(context.get("ml_assessment").is_none());
        assert!(!context.flag("ml_assessment", "is_fraud"));
    }

    #[test]
    fn test_completion_order_is_preserved() {
        let mut context = ExecutionContext::new();
        context.record(StageResult::unavailable("rule_assessment"));
        context.record(StageResult::unavailable("ml_assessment"));

        let order: Vec<&str> = context.completed_stages().collect();
        assert_eq!(order, vec!["rule_assessment", "ml_assessment"]);
    }
}
