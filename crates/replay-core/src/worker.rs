//! The worker loop: one connection, one result accumulator.

use crate::config::{RunConfig, Termination};
use crate::corpus::Corpus;
use crate::metrics::{ExecutionOutcome, WorkerResult};
use crate::session::{Session, SessionFactory};
use crate::stop::StopSignal;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Derive an independent RNG substream for a worker from the process seed.
fn worker_seed(seed: u64, worker_id: usize) -> u64 {
    seed.wrapping_add((worker_id as u64 + 1).wrapping_mul(0x9E37_79B9_7F4A_7C15))
}

/// Execute statements until the stop condition trips, then hand back the
/// accumulated result.
///
/// A failed connect is fatal to this worker only: it is recorded in the
/// result and the worker returns without executing anything. Statement
/// failures never end the loop.
pub(crate) async fn run_worker(
    worker_id: usize,
    corpus: Corpus,
    config: Arc<RunConfig>,
    factory: Arc<dyn SessionFactory>,
    stop: Arc<StopSignal>,
) -> WorkerResult {
    let mut result = WorkerResult::new(worker_id);
    let started = Instant::now();

    let mut session = match factory.connect(worker_id).await {
        Ok(session) => session,
        Err(e) => {
            error!(worker_id, "connection failed: {e}");
            result.record_fatal(format!("fatal connect error: {e}"));
            result.total_run_time = started.elapsed();
            return result;
        }
    };
    info!(worker_id, "connected");

    let mut rng = StdRng::seed_from_u64(worker_seed(config.seed, worker_id));
    let count_target = match config.termination {
        Termination::CountPerWorker(n) => Some(n),
        Termination::Duration(_) => None,
    };

    loop {
        if stop.should_stop() {
            break;
        }
        if matches!(count_target, Some(n) if result.queries_executed >= n) {
            break;
        }

        let statement = corpus.choose(&mut rng);
        execute_with_retry(
            worker_id,
            session.as_mut(),
            statement,
            config.max_retries,
            config.retry_backoff,
            &mut result,
        )
        .await;

        if result.queries_executed % 100 == 0 {
            debug!(
                worker_id,
                executed = result.queries_executed,
                "progress checkpoint"
            );
        }
    }

    result.total_run_time = started.elapsed();
    session.close().await;

    info!(
        worker_id,
        executed = result.queries_executed,
        succeeded = result.success_count,
        failed = result.failure_count,
        "worker finished"
    );
    result
}

/// Run one statement with up to `max_retries` attempts.
///
/// Every attempt's latency is recorded; only the terminal attempt is folded
/// into the success/failure counts. Between failed non-terminal attempts the
/// worker sleeps for the fixed backoff.
async fn execute_with_retry(
    worker_id: usize,
    session: &mut dyn Session,
    statement: &str,
    max_retries: u32,
    backoff: std::time::Duration,
    result: &mut WorkerResult,
) {
    let attempts = max_retries.max(1);
    let mut last = None;

    for attempt in 1..=attempts {
        let start = Instant::now();
        let execution = session.execute(statement).await;
        let outcome = ExecutionOutcome {
            success: execution.is_ok(),
            latency: start.elapsed(),
            error: execution.err().map(|e| e.to_string()),
        };
        result.record_attempt(&outcome);

        if outcome.success {
            result.record_terminal(outcome);
            return;
        }

        if attempt < attempts {
            tokio::time::sleep(backoff).await;
        }
        last = Some(outcome);
    }

    let mut outcome = last.expect("at least one attempt was made");
    let error = outcome.error.take().unwrap_or_else(|| "unknown error".to_string());
    warn!(worker_id, "statement failed after {attempts} attempts: {error}");
    outcome.error = Some(format!("statement failed after {attempts} attempts: {error}"));
    result.record_terminal(outcome);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_worker_seeds_are_distinct() {
        let seeds: Vec<u64> = (0..64).map(|id| worker_seed(1234, id)).collect();
        let unique: std::collections::HashSet<_> = seeds.iter().collect();
        assert_eq!(unique.len(), seeds.len());
    }

    #[test]
    fn test_worker_seed_depends_on_process_seed() {
        assert_ne!(worker_seed(1, 0), worker_seed(2, 0));
    }
}
