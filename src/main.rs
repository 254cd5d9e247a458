//! Fraud Screening Pipeline - Main Entry Point
//!
//! Screens a transaction through the staged pipeline, either fully
//! automatic (default) or as an interactive reviewer session
//! (`--interactive`).

use anyhow::Result;
use fraud_screening_pipeline::{
    capabilities::CapabilitySet, config::AppConfig, metrics::PipelineMetrics,
    pipeline::executor::PipelineExecutor, session::{self, ReviewSession},
    store::CaseStore, types::transaction::Transaction,
};
use std::sync::Arc;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("fraud_screening_pipeline=info".parse()?),
        )
        .init();

    info!("Starting Fraud Screening Pipeline");

    // Load configuration
    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(error) => {
            warn!(error = %error, "Configuration not loaded, using defaults");
            AppConfig::default()
        }
    };
    info!(
        amount_ceiling = config.rules.amount_ceiling,
        threshold = config.scoring.threshold,
        timeout_ms = config.pipeline.capability_timeout_ms,
        "Configuration loaded"
    );

    // Initialize components
    let store = Arc::new(CaseStore::with_sample_data());
    let metrics = Arc::new(PipelineMetrics::new());
    let capabilities = CapabilitySet::reference(&config, store);
    let executor = PipelineExecutor::new(capabilities, &config, metrics.clone());

    let transaction = example_transaction()?;
    let interactive = std::env::args().any(|arg| arg == "--interactive");

    if interactive {
        info!(
            transaction_id = %transaction.transaction_id,
            "Starting interactive review session"
        );
        let session = ReviewSession::new(executor);
        let stdin = tokio::io::BufReader::new(tokio::io::stdin());
        let mut stdout = std::io::stdout();

        let verdict = session.run(&transaction, stdin, &mut stdout).await?;
        info!(verdict = verdict.as_str(), "Review session closed");
        println!("\nFinal verdict: {}", verdict.as_str().to_uppercase());
    } else {
        let outcome = executor.run(&transaction).await;
        let mut stdout = std::io::stdout();
        session::render_summary(&outcome, &mut stdout)?;
    }

    metrics.print_summary();

    Ok(())
}

/// The worked example case: a batch transfer to a first-time receiver
/// with a description the rule set considers suspicious.
fn example_transaction() -> Result<Transaction> {
    let timestamp = "2023-12-15T22:45:00Z".parse()?;
    Ok(Transaction::new(
        "tx98766",
        "DE55500105173984217489",
        "FR7630006000011234567890189",
        2500.00,
    )
    .with_description("Urgent payment")
    .with_timestamp(timestamp))
}
