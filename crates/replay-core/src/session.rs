//! Database sessions and the factory that opens them.
//!
//! The worker talks to the database through the [`Session`] trait so the
//! engine can be exercised in tests without a live server. [`MySqlFactory`]
//! is the production implementation, one `mysql_async::Conn` per worker.

use crate::config::RunConfig;
use crate::error::{ConnectError, StatementError};
use async_trait::async_trait;
use mysql_async::prelude::Queryable;
use mysql_async::{Conn, Opts};
use std::time::Duration;
use tracing::{debug, warn};

/// Keywords that mark a statement as a read; everything else is treated as a
/// write and followed by an explicit commit.
const READ_KEYWORDS: [&str; 6] = ["SELECT", "SHOW", "DESCRIBE", "DESC", "EXPLAIN", "ANALYZE"];

/// Whether a statement lexically starts with a read keyword.
pub fn is_read_statement(statement: &str) -> bool {
    match statement.split_whitespace().next() {
        Some(first) => READ_KEYWORDS
            .iter()
            .any(|kw| first.eq_ignore_ascii_case(kw)),
        None => false,
    }
}

/// One worker's database session.
#[async_trait]
pub trait Session: Send {
    /// Execute a single statement to completion.
    ///
    /// Read statements must fully drain their result set so cursor and
    /// transport errors surface here instead of on a later statement; write
    /// statements must be durable (committed) on return.
    async fn execute(&mut self, statement: &str) -> Result<(), StatementError>;

    /// Close the session, releasing the underlying connection.
    async fn close(self: Box<Self>);
}

/// Opens one session per worker.
#[async_trait]
pub trait SessionFactory: Send + Sync {
    /// Open a session, applying the connect timeout. Never retried here;
    /// retry policy belongs to the worker's statement loop, and a failed
    /// connect is fatal to that worker only.
    async fn connect(&self, worker_id: usize) -> Result<Box<dyn Session>, ConnectError>;
}

/// Production factory backed by mysql_async.
pub struct MySqlFactory {
    opts: Opts,
    connect_timeout: Duration,
    query_timeout: Duration,
}

impl MySqlFactory {
    pub fn new(config: &RunConfig) -> Self {
        Self {
            opts: config.mysql_opts(),
            connect_timeout: config.connect_timeout,
            query_timeout: config.query_timeout,
        }
    }
}

#[async_trait]
impl SessionFactory for MySqlFactory {
    async fn connect(&self, worker_id: usize) -> Result<Box<dyn Session>, ConnectError> {
        let conn = tokio::time::timeout(self.connect_timeout, Conn::new(self.opts.clone()))
            .await
            .map_err(|_| ConnectError::Timeout(self.connect_timeout))?
            .map_err(|e| ConnectError::Server(e.to_string()))?;
        debug!(worker_id, "opened MySQL connection");
        Ok(Box::new(MySqlSession {
            conn,
            query_timeout: self.query_timeout,
        }))
    }
}

struct MySqlSession {
    conn: Conn,
    query_timeout: Duration,
}

#[async_trait]
impl Session for MySqlSession {
    async fn execute(&mut self, statement: &str) -> Result<(), StatementError> {
        let commit = !is_read_statement(statement);
        let run = async {
            // query_drop consumes the whole result set before returning.
            self.conn.query_drop(statement).await?;
            if commit {
                self.conn.query_drop("COMMIT").await?;
            }
            Ok::<(), mysql_async::Error>(())
        };
        match tokio::time::timeout(self.query_timeout, run).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(StatementError::Execution(e.to_string())),
            Err(_) => Err(StatementError::Timeout(self.query_timeout)),
        }
    }

    async fn close(self: Box<Self>) {
        if let Err(e) = self.conn.disconnect().await {
            warn!("error closing MySQL connection: {e}");
        }
    }
}
