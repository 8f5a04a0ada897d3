//! Run configuration for the replay engine.

use crate::error::ReplayError;
use mysql_async::{Opts, OptsBuilder};
use std::time::Duration;

/// Default timeout for opening a connection.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default timeout for a single statement execution.
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(30);

/// Default number of attempts per statement.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default fixed delay between failed attempts.
pub const DEFAULT_RETRY_BACKOFF: Duration = Duration::from_millis(100);

/// Default run length when neither a duration nor a per-worker count is given.
pub const DEFAULT_RUN_DURATION: Duration = Duration::from_secs(60);

/// How a run decides it is finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// Every worker stops once this much wall-clock time has elapsed since
    /// run start. In-flight statements are allowed to finish.
    Duration(Duration),
    /// Each worker stops after executing exactly this many statements.
    CountPerWorker(u64),
}

/// Immutable configuration for one replay run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
    /// Timeout for opening a connection.
    pub connect_timeout: Duration,
    /// Timeout for a single statement attempt.
    pub query_timeout: Duration,
    /// Attempts per statement before it is recorded as one failure.
    pub max_retries: u32,
    /// Fixed delay between failed, non-terminal attempts.
    pub retry_backoff: Duration,
    /// Number of concurrent workers, one connection each.
    pub worker_count: usize,
    pub termination: Termination,
    /// Process-wide seed; each worker derives its own RNG substream from it.
    pub seed: u64,
}

impl RunConfig {
    /// Create a config with the given endpoint and all tunables at their
    /// defaults: one worker, 60 second duration, 3306 as port.
    pub fn new(
        host: impl Into<String>,
        user: impl Into<String>,
        password: impl Into<String>,
        database: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            port: 3306,
            user: user.into(),
            password: password.into(),
            database: database.into(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            query_timeout: DEFAULT_QUERY_TIMEOUT,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_backoff: DEFAULT_RETRY_BACKOFF,
            worker_count: 1,
            termination: Termination::Duration(DEFAULT_RUN_DURATION),
            seed: 0,
        }
    }

    /// Set the number of concurrent workers.
    pub fn with_workers(mut self, worker_count: usize) -> Self {
        self.worker_count = worker_count;
        self
    }

    /// Set the termination mode.
    pub fn with_termination(mut self, termination: Termination) -> Self {
        self.termination = termination;
        self
    }

    /// Set the process-wide seed for statement selection.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Check the parts of the config that must be rejected before any worker
    /// is spawned.
    pub fn validate(&self) -> Result<(), ReplayError> {
        if self.worker_count == 0 {
            return Err(ReplayError::NoWorkers);
        }
        Ok(())
    }

    /// Build the mysql_async connection options for this endpoint.
    pub(crate) fn mysql_opts(&self) -> Opts {
        OptsBuilder::default()
            .ip_or_hostname(self.host.clone())
            .tcp_port(self.port)
            .user(Some(self.user.clone()))
            .pass(Some(self.password.clone()))
            .db_name(Some(self.database.clone()))
            .into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> RunConfig {
        RunConfig::new("localhost", "root", "root", "testdb")
    }

    #[test]
    fn test_defaults() {
        let config = base_config();
        assert_eq!(config.port, 3306);
        assert_eq!(config.connect_timeout, Duration::from_secs(10));
        assert_eq!(config.query_timeout, Duration::from_secs(30));
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.retry_backoff, Duration::from_millis(100));
        assert_eq!(
            config.termination,
            Termination::Duration(Duration::from_secs(60))
        );
    }

    #[test]
    fn test_validate_rejects_zero_workers() {
        let config = base_config().with_workers(0);
        assert!(matches!(config.validate(), Err(ReplayError::NoWorkers)));
    }

    #[test]
    fn test_validate_accepts_single_worker() {
        assert!(base_config().validate().is_ok());
    }

    #[test]
    fn test_builder_methods() {
        let config = base_config()
            .with_workers(8)
            .with_termination(Termination::CountPerWorker(500))
            .with_seed(42);
        assert_eq!(config.worker_count, 8);
        assert_eq!(config.termination, Termination::CountPerWorker(500));
        assert_eq!(config.seed, 42);
    }
}
