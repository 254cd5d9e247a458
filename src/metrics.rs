//! Performance metrics and statistics tracking for the screening pipeline.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;
use std::time::{Duration, Instant};
use tracing::info;

/// Metrics collector for screening runs
pub struct PipelineMetrics {
    /// Total screening runs completed
    pub runs_completed: AtomicU64,
    /// Completed runs by taken branch
    runs_by_branch: RwLock<HashMap<String, u64>>,
    /// Run durations (in microseconds)
    run_times: RwLock<Vec<u64>>,
    /// Per-stage invocation durations (in microseconds)
    stage_times: RwLock<HashMap<String, Vec<u64>>>,
    /// Start time for rate calculation
    start_time: Instant,
}

impl PipelineMetrics {
    /// Create a new metrics collector
    pub fn new() -> Self {
        Self {
            runs_completed: AtomicU64::new(0),
            runs_by_branch: RwLock::new(HashMap::new()),
            run_times: RwLock::new(Vec::with_capacity(64)),
            stage_times: RwLock::new(HashMap::new()),
            start_time: Instant::now(),
        }
    }

    /// Record a completed screening run and the branch it took
    pub fn record_run(&self, branch: &str, duration: Duration) {
        self.runs_completed.fetch_add(1, Ordering::Relaxed);

        if let Ok(mut by_branch) = self.runs_by_branch.write() {
            *by_branch.entry(branch.to_string()).or_insert(0) += 1;
        }

        if let Ok(mut times) = self.run_times.write() {
            times.push(duration.as_micros() as u64);
            // Keep only the most recent samples for memory efficiency
            if times.len() > 10_000 {
                times.drain(0..5_000);
            }
        }
    }

    /// Record a single stage invocation
    pub fn record_stage(&self, stage: &str, duration: Duration) {
        if let Ok(mut times) = self.stage_times.write() {
            let stage_times = times.entry(stage.to_string()).or_default();
            stage_times.push(duration.as_micros() as u64);
            if stage_times.len() > 1_000 {
                stage_times.drain(0..500);
            }
        }
    }

    /// Completed runs by branch
    pub fn runs_by_branch(&self) -> HashMap<String, u64> {
        self.runs_by_branch
            .read()
            .map(|m| m.clone())
            .unwrap_or_default()
    }

    /// Run duration statistics
    pub fn run_stats(&self) -> TimingStats {
        let times = self.run_times.read().map(|t| t.clone()).unwrap_or_default();
        TimingStats::from_samples(&times)
    }

    /// Per-stage duration statistics
    pub fn stage_stats(&self) -> HashMap<String, TimingStats> {
        let times = self.stage_times.read().map(|t| t.clone()).unwrap_or_default();
        times
            .into_iter()
            .filter(|(_, samples)| !samples.is_empty())
            .map(|(stage, samples)| (stage, TimingStats::from_samples(&samples)))
            .collect()
    }

    /// Current throughput (runs per second since startup)
    pub fn throughput(&self) -> f64 {
        let elapsed = self.start_time.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            self.runs_completed.load(Ordering::Relaxed) as f64 / elapsed
        } else {
            0.0
        }
    }

    /// Print summary statistics
    pub fn print_summary(&self) {
        let run_count = self.runs_completed.load(Ordering::Relaxed);
        if run_count == 0 {
            info!("No screening runs recorded");
            return;
        }

        let run_stats = self.run_stats();
        info!(
            "Screening runs: {} ({:.2} runs/s), timing (us): mean={} p50={} p99={} max={}",
            run_count,
            self.throughput(),
            run_stats.mean_us,
            run_stats.p50_us,
            run_stats.p99_us,
            run_stats.max_us
        );

        for (branch, count) in &self.runs_by_branch() {
            let pct = (*count as f64 / run_count as f64) * 100.0;
            info!("  {}: {} ({:.1}%)", branch, count, pct);
        }

        let stage_stats = self.stage_stats();
        if !stage_stats.is_empty() {
            info!("Stage timing (us):");
            for (stage, stats) in &stage_stats {
                info!(
                    "  {}: mean={} p50={} p99={} (calls={})",
                    stage, stats.mean_us, stats.p50_us, stats.p99_us, stats.count
                );
            }
        }
    }
}

impl Default for PipelineMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Duration statistics over a sample window
#[derive(Debug, Default, Clone, Copy)]
pub struct TimingStats {
    pub count: u64,
    pub mean_us: u64,
    pub p50_us: u64,
    pub p99_us: u64,
    pub max_us: u64,
}

impl TimingStats {
    fn from_samples(samples: &[u64]) -> Self {
        if samples.is_empty() {
            return Self::default();
        }

        let mut sorted: Vec<u64> = samples.to_vec();
        sorted.sort_unstable();

        let sum: u64 = sorted.iter().sum();
        let count = sorted.len();

        Self {
            count: count as u64,
            mean_us: sum / count as u64,
            p50_us: sorted[count / 2],
            p99_us: sorted[((count as f64 * 0.99) as usize).min(count - 1)],
            max_us: *sorted.last().unwrap_or(&0),
        }
    }
}
