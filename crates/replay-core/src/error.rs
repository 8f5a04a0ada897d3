//! Error types for the replay engine.

use std::time::Duration;
use thiserror::Error;

/// Failure to open a database session.
///
/// Fatal to the worker that hit it, recorded in its result rather than
/// retried. Never propagated to sibling workers.
#[derive(Debug, Error)]
pub enum ConnectError {
    /// The server did not accept the connection within the connect timeout.
    #[error("connect timed out after {0:?}")]
    Timeout(Duration),

    /// The server rejected the connection (auth, unknown database, network).
    #[error("connection failed: {0}")]
    Server(String),
}

/// Failure of a single statement attempt.
///
/// Retried up to the configured retry limit, then recorded as one failure.
#[derive(Debug, Error)]
pub enum StatementError {
    /// The statement did not complete within the query timeout.
    #[error("statement timed out after {0:?}")]
    Timeout(Duration),

    /// The server returned an error for the statement.
    #[error("execution failed: {0}")]
    Execution(String),
}

/// Run-level errors, all checked before any worker is spawned.
#[derive(Debug, Error)]
pub enum ReplayError {
    /// The corpus contains no statements.
    #[error("corpus is empty; nothing to replay")]
    EmptyCorpus,

    /// A run was requested with zero workers.
    #[error("worker count must be at least 1")]
    NoWorkers,
}
