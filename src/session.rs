//! Interactive review session for screened transactions.
//!
//! Runs the full pipeline once, renders a fixed summary and then hands
//! control to the reviewer: terminating commands close the session with
//! a verdict, anything else is dispatched to the query port as a
//! single-shot sub-pipeline. Queries run one at a time; the loop reads
//! the next command only after the previous answer was printed.

use anyhow::Result;
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{info, warn};

use crate::pipeline::executor::PipelineExecutor;
use crate::types::outcome::OutcomeRecord;
use crate::types::transaction::Transaction;

/// Verdict a reviewer ends a session with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewVerdict {
    Approved,
    Declined,
    Aborted,
}

impl ReviewVerdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewVerdict::Approved => "approved",
            ReviewVerdict::Declined => "declined",
            ReviewVerdict::Aborted => "aborted",
        }
    }
}

/// Drives one screening run and the subsequent reviewer dialog.
pub struct ReviewSession {
    executor: PipelineExecutor,
}

impl ReviewSession {
    pub fn new(executor: PipelineExecutor) -> Self {
        Self { executor }
    }

    /// Screen the transaction and loop over reviewer commands until a
    /// terminating command (or end of input) closes the session.
    pub async fn run<R, W>(
        &self,
        transaction: &Transaction,
        input: R,
        output: &mut W,
    ) -> Result<ReviewVerdict>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        let outcome = self.executor.run(transaction).await;
        render_summary(&outcome, output)?;
        writeln!(output, "\nCommands: APPROVE, DECLINE, HELP, ABORT")?;
        writeln!(output, "Anything else is answered as a question about the case.")?;

        let mut lines = input.lines();
        loop {
            write!(output, "\nreviewer> ")?;
            output.flush()?;

            let Some(line) = lines.next_line().await? else {
                info!(
                    transaction_id = %transaction.transaction_id,
                    "Input closed without a verdict; session aborted"
                );
                return Ok(ReviewVerdict::Aborted);
            };
            let command = line.trim();

            if command.is_empty() {
                continue;
            }
            if command.eq_ignore_ascii_case("approve") {
                return Ok(ReviewVerdict::Approved);
            }
            if command.eq_ignore_ascii_case("decline") {
                return Ok(ReviewVerdict::Declined);
            }
            if command.eq_ignore_ascii_case("abort") {
                return Ok(ReviewVerdict::Aborted);
            }
            if command.eq_ignore_ascii_case("help") {
                writeln!(output, "\nAvailable commands:")?;
                writeln!(output, "  APPROVE - release the transaction")?;
                writeln!(output, "  DECLINE - reject the transaction")?;
                writeln!(output, "  ABORT   - close the session without a decision")?;
                writeln!(output, "  HELP    - show this list")?;
                writeln!(output, "Any other input is treated as a question about the case.")?;
                continue;
            }

            // One query at a time; the answer (or the degradation notice)
            // lands before the next prompt.
            match self.executor.run_query(transaction, command).await {
                Ok(answer) => writeln!(output, "\n{answer}")?,
                Err(error) => {
                    warn!(error = %error, "Reviewer query failed");
                    writeln!(output, "\nThe question could not be answered: {error}")?;
                }
            }
        }
    }
}

/// Render the fixed outcome summary.
///
/// The error state renders as an explicit manual-review notice; a missing
/// final decision is never presented as an approval.
pub fn render_summary(outcome: &OutcomeRecord, output: &mut impl Write) -> std::io::Result<()> {
    writeln!(output, "===== FRAUD SCREENING =====")?;
    writeln!(output, "Transaction: {}", outcome.transaction.transaction_id)?;
    writeln!(output, "Amount:      {:.2}", outcome.transaction.amount)?;
    match outcome.fraud_probability() {
        Some(probability) => writeln!(
            output,
            "Model:       {:.1}% fraud probability",
            probability * 100.0
        )?,
        None => writeln!(output, "Model:       assessment unavailable")?,
    }
    writeln!(
        output,
        "Rules:       {}",
        if outcome.is_flagged() { "flagged" } else { "unflagged" }
    )?;

    if let Some(error) = &outcome.error {
        writeln!(output, "\nRouting failed: {error}")?;
        writeln!(output, "This transaction requires manual review.")?;
    } else if let Some(decision) = outcome.final_decision {
        writeln!(output, "\nAutomatic decision: {decision}")?;
        if let Some(explanation) = &outcome.explanation {
            writeln!(output, "Reasoning: {explanation}")?;
        }
    } else if let Some(explanation) = &outcome.explanation {
        writeln!(output, "\nExplanation:")?;
        writeln!(output, "{explanation}")?;
    } else {
        writeln!(output, "\nNo explanation available; awaiting reviewer action.")?;
    }

    Ok(())
}
