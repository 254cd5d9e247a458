//! Simulated lookup store for account data and historical fraud cases.
//!
//! Stands in for the transaction/user/case data stores. The query
//! capability (and the reference assessors) consult it through the same
//! lookup boundary a real store would expose: mappings in, mappings out.

use serde_json::{json, Map, Value};
use std::collections::HashMap;

fn obj(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

/// In-memory account profiles, transaction history and fraud case archive.
#[derive(Debug, Default)]
pub struct CaseStore {
    profiles: HashMap<String, Map<String, Value>>,
    history: HashMap<String, Vec<Map<String, Value>>>,
    cases: Vec<Map<String, Value>>,
}

impl CaseStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// A store seeded with representative sample data.
    pub fn with_sample_data() -> Self {
        let mut store = Self::new();

        let account = "DE55500105173984217489";
        store.profiles.insert(
            account.to_string(),
            obj(json!({
                "account_id": account,
                "account_age_days": 730,
                "account_type": "private",
                "risk_score": 0.15,
                "average_transaction_amount": 450.75,
                "transaction_frequency": 12.5,
                "previous_flags": 1,
                "typical_countries": ["DE", "FR", "ES"],
                "typical_receivers": [
                    "DE89370400440532013000",
                    "DE12500105170648489890"
                ]
            })),
        );

        store.history.insert(
            account.to_string(),
            vec![
                obj(json!({
                    "transaction_id": "t123456",
                    "amount": 1250.00,
                    "timestamp": "2023-12-01T15:30:00Z",
                    "receiver_account": "DE89370400440532013000",
                    "description": "Monthly rent December"
                })),
                obj(json!({
                    "transaction_id": "t123457",
                    "amount": 89.99,
                    "timestamp": "2023-12-03T10:15:00Z",
                    "receiver_account": "DE12500105170648489890",
                    "description": "Online purchase, electronics"
                })),
                obj(json!({
                    "transaction_id": "t123458",
                    "amount": 50.00,
                    "timestamp": "2023-12-05T09:20:00Z",
                    "receiver_account": "DE13600501017832594242",
                    "description": "Transfer to a friend"
                })),
            ],
        );

        store.cases = vec![
            obj(json!({
                "case_id": "f987654",
                "similarity_score": 0.85,
                "features": {
                    "amount_unusually_high": true,
                    "new_receiver": true,
                    "unusual_time": true
                },
                "outcome": "confirmed_fraud"
            })),
            obj(json!({
                "case_id": "f987655",
                "similarity_score": 0.78,
                "features": {
                    "amount_unusually_high": true,
                    "new_receiver": false,
                    "unusual_time": true
                },
                "outcome": "false_positive"
            })),
        ];

        store
    }

    /// Recent transactions of an account, newest last. Unknown accounts
    /// have no history.
    pub fn transaction_history(&self, account_id: &str) -> Vec<Map<String, Value>> {
        self.history.get(account_id).cloned().unwrap_or_default()
    }

    /// Profile of an account. Unknown accounts get a minimal profile
    /// rather than an error.
    pub fn profile(&self, account_id: &str) -> Map<String, Value> {
        self.profiles.get(account_id).cloned().unwrap_or_else(|| {
            obj(json!({
                "account_id": account_id,
                "account_age_days": 0,
                "risk_score": 0.5,
                "average_transaction_amount": 0.0,
                "previous_flags": 0,
                "typical_receivers": []
            }))
        })
    }

    /// Archived fraud cases resembling the given feature set, most similar
    /// first. An empty feature set matches everything.
    pub fn similar_cases(&self, features: &Map<String, Value>) -> Vec<Map<String, Value>> {
        let mut matches: Vec<Map<String, Value>> = self
            .cases
            .iter()
            .filter(|case| {
                if features.is_empty() {
                    return true;
                }
                let case_features = case.get("features").and_then(Value::as_object);
                match case_features {
                    Some(cf) => features
                        .iter()
                        .any(|(key, value)| cf.get(key) == Some(value)),
                    None => false,
                }
            })
            .cloned()
            .collect();

        matches.sort_by(|a, b| {
            let sa = a.get("similarity_score").and_then(Value::as_f64).unwrap_or(0.0);
            let sb = b.get("similarity_score").and_then(Value::as_f64).unwrap_or(0.0);
            sb.partial_cmp(&sa).unwrap_or(std::cmp::Ordering::Equal)
        });

        matches
    }

    /// Receivers the account has transferred to before.
    pub fn known_receivers(&self, account_id: &str) -> Vec<String> {
        self.profile(account_id)
            .get("typical_receivers")
            .and_then(Value::as_array)
            .map(|receivers| {
                receivers
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_owned)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Average historical transfer amount of the account, if known.
    pub fn average_amount(&self, account_id: &str) -> Option<f64> {
        self.profiles
            .get(account_id)?
            .get("average_transaction_amount")
            .and_then(Value::as_f64)
    }
}
