//! Type definitions for the fraud screening pipeline

pub mod outcome;
pub mod stage;
pub mod transaction;

pub use outcome::{FinalDecision, OutcomeRecord};
pub use stage::{BranchDecision, StageKind, StageResult};
pub use transaction::Transaction;
