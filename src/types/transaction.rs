//! Transaction data structures for payment fraud screening

use chrono::{DateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};

/// A payment transaction submitted for fraud screening.
///
/// Immutable for the duration of a screening run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique transaction identifier
    pub transaction_id: String,

    /// Account number of the sender
    pub sender_account: String,

    /// Account number of the receiver
    pub receiver_account: String,

    /// Transfer amount in currency units (non-negative)
    pub amount: f64,

    /// Booking timestamp (UTC)
    pub timestamp: DateTime<Utc>,

    /// Free-text payment description, if any
    #[serde(default)]
    pub description: Option<String>,

    /// Realtime transfers require an immediate automated outcome
    /// instead of deferral to a human reviewer
    pub is_realtime: bool,
}

impl Transaction {
    /// Create a new transaction with the current timestamp.
    pub fn new(
        transaction_id: impl Into<String>,
        sender_account: impl Into<String>,
        receiver_account: impl Into<String>,
        amount: f64,
    ) -> Self {
        Self {
            transaction_id: transaction_id.into(),
            sender_account: sender_account.into(),
            receiver_account: receiver_account.into(),
            amount,
            timestamp: Utc::now(),
            description: None,
            is_realtime: false,
        }
    }

    /// Set the payment description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Mark the transaction as a realtime transfer.
    pub fn realtime(mut self) -> Self {
        self.is_realtime = true;
        self
    }

    /// Set the booking timestamp.
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Booking hour of day (0-23)
    pub fn hour(&self) -> u32 {
        self.timestamp.hour()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transaction_serialization() {
        let tx = Transaction::new("tx_123", "DE55500105173984217489", "FR7630006000011234", 2500.0)
            .with_description("Monthly rent");

        let json = serde_json::to_string(&tx).unwrap();
        let deserialized: Transaction = serde_json::from_str(&json).unwrap();

        assert_eq!(tx.transaction_id, deserialized.transaction_id);
        assert_eq!(tx.amount, deserialized.amount);
        assert_eq!(deserialized.description.as_deref(), Some("Monthly rent"));
        assert!(!deserialized.is_realtime);
    }

    #[test]
    fn test_description_defaults_to_none() {
        let json = r#"{
            "transaction_id": "tx_1",
            "sender_account": "A",
            "receiver_account": "B",
            "amount": 10.0,
            "timestamp": "2023-12-15T22:45:00Z",
            "is_realtime": true
        }"#;

        let tx: Transaction = serde_json::from_str(json).unwrap();
        assert!(tx.description.is_none());
        assert!(tx.is_realtime);
        assert_eq!(tx.hour(), 22);
    }
}
