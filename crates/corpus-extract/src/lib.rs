//! Corpus extraction from MySQL general logs.
//!
//! Turns a raw general-log file into a flat, ordered corpus of normalized
//! SQL statements suitable for replay: multi-line statements are joined,
//! session noise (`SET ...`, transaction control) is dropped, statements
//! against system schemas are skipped, and every kept statement is
//! classified as a read or a write.

pub mod classify;
pub mod file;
pub mod parse;

pub use classify::{classify, Classifier, StatementKind};
pub use file::{load_corpus, write_corpus};
pub use parse::{ExtractError, ExtractOptions, ExtractStats, ExtractedCorpus, ExtractedStatement, LogParser};

/// Statements shorter than this are treated as noise and dropped.
pub const MIN_STATEMENT_LEN: usize = 10;
