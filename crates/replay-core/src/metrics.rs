//! Result types produced by workers and the aggregator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// The result of one statement attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionOutcome {
    /// Whether the attempt completed without error.
    pub success: bool,
    /// Wall-clock time of this attempt.
    pub latency: Duration,
    /// Error text when the attempt failed.
    pub error: Option<String>,
}

/// Per-worker accumulator, owned exclusively by its worker during the run and
/// handed to the aggregator once the worker terminates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerResult {
    pub worker_id: usize,
    /// Statements whose terminal attempt has been counted.
    pub queries_executed: u64,
    pub success_count: u64,
    pub failure_count: u64,
    /// Time from worker start to loop exit.
    pub total_run_time: Duration,
    /// Latency of every attempt, terminal or not, in execution order.
    pub latencies: Vec<Duration>,
    pub errors: Vec<String>,
}

impl WorkerResult {
    pub fn new(worker_id: usize) -> Self {
        Self {
            worker_id,
            queries_executed: 0,
            success_count: 0,
            failure_count: 0,
            total_run_time: Duration::ZERO,
            latencies: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Record the latency of one attempt.
    pub(crate) fn record_attempt(&mut self, outcome: &ExecutionOutcome) {
        self.latencies.push(outcome.latency);
    }

    /// Fold the terminal attempt of a statement into the counts.
    ///
    /// Maintains `success_count + failure_count == queries_executed`.
    pub(crate) fn record_terminal(&mut self, outcome: ExecutionOutcome) {
        self.queries_executed += 1;
        if outcome.success {
            self.success_count += 1;
        } else {
            self.failure_count += 1;
            if let Some(error) = outcome.error {
                self.errors.push(error);
            }
        }
    }

    /// Record a failure that prevented the worker from executing anything,
    /// e.g. a connection that never opened.
    pub(crate) fn record_fatal(&mut self, error: String) {
        self.errors.push(error);
    }

    /// Fraction of executed statements that succeeded; 0 when nothing ran.
    pub fn success_rate(&self) -> f64 {
        if self.queries_executed > 0 {
            self.success_count as f64 / self.queries_executed as f64
        } else {
            0.0
        }
    }

    /// Per-worker throughput in statements per second; 0 when nothing ran.
    pub fn queries_per_second(&self) -> f64 {
        if self.total_run_time.as_secs_f64() > 0.0 {
            self.queries_executed as f64 / self.total_run_time.as_secs_f64()
        } else {
            0.0
        }
    }
}

/// Aggregate of every worker's result, created once after all workers have
/// reported and never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Wall-clock run time as measured by the coordinator.
    pub wall_time: Duration,
    pub worker_count: usize,
    pub total_executed: u64,
    pub total_success: u64,
    pub total_failure: u64,
    /// `total_success / total_executed`; 0 when nothing ran.
    pub success_rate: f64,
    /// `total_executed / wall_time`; 0 when the run took no measurable time.
    pub queries_per_second: f64,
    /// Latency stats over the union of all workers' attempt samples.
    pub min_latency: Duration,
    pub avg_latency: Duration,
    pub max_latency: Duration,
    /// First few error strings across all workers.
    pub error_sample: Vec<String>,
    /// How many further errors were not included in the sample.
    pub errors_truncated: u64,
    /// Per-worker results, ordered by worker id.
    pub workers: Vec<WorkerResult>,
}

impl RunSummary {
    /// Total number of errors across all workers.
    pub fn total_errors(&self) -> u64 {
        self.error_sample.len() as u64 + self.errors_truncated
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_counting_keeps_invariant() {
        let mut result = WorkerResult::new(0);
        result.record_terminal(ExecutionOutcome {
            success: true,
            latency: Duration::from_millis(10),
            error: None,
        });
        result.record_terminal(ExecutionOutcome {
            success: false,
            latency: Duration::from_millis(20),
            error: Some("boom".to_string()),
        });

        assert_eq!(result.queries_executed, 2);
        assert_eq!(result.success_count + result.failure_count, result.queries_executed);
        assert_eq!(result.errors, vec!["boom".to_string()]);
    }

    #[test]
    fn test_attempt_latencies_recorded_for_failures_too() {
        let mut result = WorkerResult::new(0);
        let outcome = ExecutionOutcome {
            success: false,
            latency: Duration::from_millis(5),
            error: Some("transient".to_string()),
        };
        result.record_attempt(&outcome);
        result.record_attempt(&outcome);

        // Two attempts, no terminal yet: nothing counted, both latencies kept.
        assert_eq!(result.queries_executed, 0);
        assert_eq!(result.latencies.len(), 2);
    }

    #[test]
    fn test_rates_with_zero_executions() {
        let result = WorkerResult::new(3);
        assert_eq!(result.success_rate(), 0.0);
        assert_eq!(result.queries_per_second(), 0.0);
    }

    #[test]
    fn test_worker_result_serializes() {
        let mut result = WorkerResult::new(1);
        result.record_terminal(ExecutionOutcome {
            success: true,
            latency: Duration::from_millis(1),
            error: None,
        });
        let json = serde_json::to_string(&result).unwrap();
        let back: WorkerResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back.queries_executed, 1);
        assert_eq!(back.worker_id, 1);
    }
}
