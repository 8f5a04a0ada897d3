//! Concurrent SQL replay engine.
//!
//! Drives a fixed corpus of previously captured SQL statements against a live
//! MySQL server with a pool of independent workers, applying a bounded
//! retry/backoff policy per statement and merging per-worker metrics into a
//! single [`RunSummary`] once every worker has finished.

pub mod aggregate;
pub mod config;
pub mod coordinator;
pub mod corpus;
pub mod error;
pub mod metrics;
pub mod session;
pub mod stop;
mod worker;

pub use aggregate::{aggregate, ERROR_SAMPLE_LIMIT};
pub use config::{RunConfig, Termination};
pub use coordinator::{run, run_mysql};
pub use corpus::Corpus;
pub use error::{ConnectError, ReplayError, StatementError};
pub use metrics::{ExecutionOutcome, RunSummary, WorkerResult};
pub use session::{MySqlFactory, Session, SessionFactory};
pub use stop::StopSignal;
