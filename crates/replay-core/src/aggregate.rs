//! Merging worker results into a run summary.

use crate::metrics::{RunSummary, WorkerResult};
use chrono::{DateTime, Utc};
use std::time::Duration;

/// Maximum number of error strings carried verbatim in the summary; the rest
/// are only counted.
pub const ERROR_SAMPLE_LIMIT: usize = 10;

/// Merge all worker results into one [`RunSummary`].
///
/// Pure and deterministic: no I/O, no randomness, no shared state. Latency
/// stats are computed over the union of all workers' samples; cross-worker
/// ordering is irrelevant. Zero executions yield zero rates, never a division
/// error.
pub fn aggregate(
    results: Vec<WorkerResult>,
    started_at: DateTime<Utc>,
    finished_at: DateTime<Utc>,
    wall_time: Duration,
) -> RunSummary {
    let total_executed: u64 = results.iter().map(|r| r.queries_executed).sum();
    let total_success: u64 = results.iter().map(|r| r.success_count).sum();
    let total_failure: u64 = results.iter().map(|r| r.failure_count).sum();

    let success_rate = if total_executed > 0 {
        total_success as f64 / total_executed as f64
    } else {
        0.0
    };

    let queries_per_second = if wall_time.as_secs_f64() > 0.0 {
        total_executed as f64 / wall_time.as_secs_f64()
    } else {
        0.0
    };

    let mut sample_count: u32 = 0;
    let mut latency_sum = Duration::ZERO;
    let mut min_latency: Option<Duration> = None;
    let mut max_latency = Duration::ZERO;
    for latency in results.iter().flat_map(|r| r.latencies.iter()) {
        sample_count += 1;
        latency_sum += *latency;
        min_latency = Some(min_latency.map_or(*latency, |m| m.min(*latency)));
        max_latency = max_latency.max(*latency);
    }
    let avg_latency = if sample_count > 0 {
        latency_sum / sample_count
    } else {
        Duration::ZERO
    };

    let mut error_sample = Vec::new();
    let mut errors_truncated: u64 = 0;
    for error in results.iter().flat_map(|r| r.errors.iter()) {
        if error_sample.len() < ERROR_SAMPLE_LIMIT {
            error_sample.push(error.clone());
        } else {
            errors_truncated += 1;
        }
    }

    RunSummary {
        started_at,
        finished_at,
        wall_time,
        worker_count: results.len(),
        total_executed,
        total_success,
        total_failure,
        success_rate,
        queries_per_second,
        min_latency: min_latency.unwrap_or(Duration::ZERO),
        avg_latency,
        max_latency,
        error_sample,
        errors_truncated,
        workers: results,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::ExecutionOutcome;

    fn worker(id: usize, success: u64, failure: u64, latency_ms: u64) -> WorkerResult {
        let mut result = WorkerResult::new(id);
        for _ in 0..success {
            let outcome = ExecutionOutcome {
                success: true,
                latency: Duration::from_millis(latency_ms),
                error: None,
            };
            result.record_attempt(&outcome);
            result.record_terminal(outcome);
        }
        for i in 0..failure {
            let outcome = ExecutionOutcome {
                success: false,
                latency: Duration::from_millis(latency_ms),
                error: Some(format!("error {i} from worker {id}")),
            };
            result.record_attempt(&outcome);
            result.record_terminal(outcome);
        }
        result.total_run_time = Duration::from_secs(1);
        result
    }

    #[test]
    fn test_totals_are_sums_of_worker_counts() {
        let summary = aggregate(
            vec![worker(0, 5, 1, 10), worker(1, 3, 2, 30)],
            Utc::now(),
            Utc::now(),
            Duration::from_secs(2),
        );
        assert_eq!(summary.total_executed, 11);
        assert_eq!(summary.total_success, 8);
        assert_eq!(summary.total_failure, 3);
        assert_eq!(
            summary.total_executed,
            summary.total_success + summary.total_failure
        );
        assert_eq!(summary.worker_count, 2);
    }

    #[test]
    fn test_success_rate_and_throughput() {
        let summary = aggregate(
            vec![worker(0, 8, 2, 10)],
            Utc::now(),
            Utc::now(),
            Duration::from_secs(2),
        );
        assert!((summary.success_rate - 0.8).abs() < f64::EPSILON);
        assert!((summary.queries_per_second - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_latency_stats_over_union_of_samples() {
        let summary = aggregate(
            vec![worker(0, 2, 0, 10), worker(1, 2, 0, 30)],
            Utc::now(),
            Utc::now(),
            Duration::from_secs(1),
        );
        assert_eq!(summary.min_latency, Duration::from_millis(10));
        assert_eq!(summary.max_latency, Duration::from_millis(30));
        assert_eq!(summary.avg_latency, Duration::from_millis(20));
    }

    #[test]
    fn test_empty_input_is_all_zeroes() {
        let summary = aggregate(vec![], Utc::now(), Utc::now(), Duration::ZERO);
        assert_eq!(summary.total_executed, 0);
        assert_eq!(summary.success_rate, 0.0);
        assert_eq!(summary.queries_per_second, 0.0);
        assert_eq!(summary.min_latency, Duration::ZERO);
        assert_eq!(summary.avg_latency, Duration::ZERO);
        assert_eq!(summary.max_latency, Duration::ZERO);
    }

    #[test]
    fn test_workers_with_zero_executions_do_not_divide_by_zero() {
        let summary = aggregate(
            vec![WorkerResult::new(0), WorkerResult::new(1)],
            Utc::now(),
            Utc::now(),
            Duration::from_secs(1),
        );
        assert_eq!(summary.total_executed, 0);
        assert_eq!(summary.success_rate, 0.0);
        assert_eq!(summary.avg_latency, Duration::ZERO);
    }

    #[test]
    fn test_error_sample_capped_with_remainder_count() {
        let summary = aggregate(
            vec![worker(0, 0, 9, 5), worker(1, 0, 6, 5)],
            Utc::now(),
            Utc::now(),
            Duration::from_secs(1),
        );
        assert_eq!(summary.error_sample.len(), ERROR_SAMPLE_LIMIT);
        assert_eq!(summary.errors_truncated, 5);
        assert_eq!(summary.total_errors(), 15);
        // Sample preserves worker order, worker 0 first.
        assert!(summary.error_sample[0].contains("worker 0"));
    }
}
