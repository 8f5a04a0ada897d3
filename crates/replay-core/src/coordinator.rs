//! Run coordination: spawn workers, wait for all of them, aggregate.

use crate::aggregate::aggregate;
use crate::config::{RunConfig, Termination};
use crate::corpus::Corpus;
use crate::error::ReplayError;
use crate::metrics::{RunSummary, WorkerResult};
use crate::session::{MySqlFactory, SessionFactory};
use crate::stop::StopSignal;
use crate::worker::run_worker;
use chrono::Utc;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

/// Run a full replay against the configured MySQL endpoint.
pub async fn run_mysql(config: RunConfig, corpus: Corpus) -> Result<RunSummary, ReplayError> {
    let factory = Arc::new(MySqlFactory::new(&config));
    run(config, corpus, factory).await
}

/// Run a full replay with the given session factory.
///
/// Spawns `worker_count` workers sharing the corpus and one stop signal,
/// blocks until every worker has returned, and merges their results. A worker
/// that terminates outside its normal control flow is recorded with a
/// placeholder result instead of aborting the run; the summary always
/// reflects best-effort completion.
pub async fn run(
    config: RunConfig,
    corpus: Corpus,
    factory: Arc<dyn SessionFactory>,
) -> Result<RunSummary, ReplayError> {
    config.validate()?;

    let started_at = Utc::now();
    let run_start = Instant::now();

    let stop = Arc::new(match config.termination {
        Termination::Duration(d) => StopSignal::with_deadline(run_start + d),
        Termination::CountPerWorker(_) => StopSignal::unbounded(),
    });

    info!(
        workers = config.worker_count,
        statements = corpus.len(),
        termination = ?config.termination,
        "starting replay run"
    );

    let config = Arc::new(config);
    let mut handles = Vec::with_capacity(config.worker_count);
    for worker_id in 0..config.worker_count {
        let corpus = corpus.clone();
        let config = Arc::clone(&config);
        let factory = Arc::clone(&factory);
        let stop = Arc::clone(&stop);
        handles.push(tokio::spawn(async move {
            run_worker(worker_id, corpus, config, factory, stop).await
        }));
    }

    // Waits for every worker; duration-terminated runs overrun the deadline
    // by at most one in-flight statement per worker.
    let mut results = Vec::with_capacity(handles.len());
    for (worker_id, handle) in handles.into_iter().enumerate() {
        match handle.await {
            Ok(result) => results.push(result),
            Err(e) => {
                error!(worker_id, "worker terminated abnormally: {e}");
                let mut placeholder = WorkerResult::new(worker_id);
                placeholder
                    .errors
                    .push(format!("worker terminated abnormally: {e}"));
                results.push(placeholder);
            }
        }
    }
    results.sort_by_key(|r| r.worker_id);

    let wall_time = run_start.elapsed();
    let summary = aggregate(results, started_at, Utc::now(), wall_time);

    info!(
        executed = summary.total_executed,
        succeeded = summary.total_success,
        failed = summary.total_failure,
        wall_time_secs = wall_time.as_secs_f64(),
        "replay run finished"
    );
    Ok(summary)
}
