//! Streaming parse of a MySQL general log into an ordered corpus.

use crate::classify::{classify, Classifier, StatementKind};
use regex::Regex;
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Knobs for an extraction pass.
#[derive(Debug, Clone, Default)]
pub struct ExtractOptions {
    /// Stop once this many statements have been kept.
    pub max_statements: Option<usize>,
    /// Keep only statements of this kind.
    pub kind_filter: Option<StatementKind>,
}

/// Per-class counters for everything the parser saw.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractStats {
    pub read: u64,
    pub write: u64,
    pub unknown: u64,
    pub system: u64,
    pub ignored: u64,
}

impl ExtractStats {
    /// Total statements classified, kept or not.
    pub fn total(&self) -> u64 {
        self.read + self.write + self.unknown + self.system + self.ignored
    }
}

/// One statement kept by the extraction pass.
#[derive(Debug, Clone)]
pub struct ExtractedStatement {
    pub sql: String,
    pub kind: StatementKind,
}

/// The ordered result of an extraction pass.
#[derive(Debug, Clone, Default)]
pub struct ExtractedCorpus {
    pub statements: Vec<ExtractedStatement>,
    pub stats: ExtractStats,
}

/// Parser for the MySQL general log format.
///
/// Query lines look like `2024-01-01T00:00:00.000000Z   42 Query  SELECT ...`;
/// lines without the timestamp prefix continue the current statement, and
/// `Connect`/`Quit` entries terminate it.
pub struct LogParser {
    query_start: Regex,
    session_boundary: Regex,
    classifier: Classifier,
}

impl LogParser {
    pub fn new() -> Self {
        Self {
            query_start: Regex::new(
                r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}\.\d+Z\s+\d+\s+Query\s+(.+)",
            )
            .expect("query start pattern is a valid regex"),
            session_boundary: Regex::new(
                r"(?i)^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}\.\d+Z\s+\d+\s+(Connect|Quit)",
            )
            .expect("session boundary pattern is a valid regex"),
            classifier: Classifier::new(),
        }
    }

    /// Extract a corpus from a log file.
    pub fn extract_file(
        &self,
        path: &Path,
        options: &ExtractOptions,
    ) -> Result<ExtractedCorpus, ExtractError> {
        let content = fs::read_to_string(path)?;
        Ok(self.extract_str(&content, options))
    }

    /// Extract a corpus from log text already in memory.
    pub fn extract_str(&self, text: &str, options: &ExtractOptions) -> ExtractedCorpus {
        self.extract_lines(text.lines(), options)
    }

    /// Core state machine over log lines.
    pub fn extract_lines<'a>(
        &self,
        lines: impl Iterator<Item = &'a str>,
        options: &ExtractOptions,
    ) -> ExtractedCorpus {
        let mut corpus = ExtractedCorpus::default();
        let mut current: Option<String> = None;
        let mut line_count: u64 = 0;

        for line in lines {
            line_count += 1;
            if line_count % 100_000 == 0 {
                debug!(
                    lines = line_count,
                    kept = corpus.statements.len(),
                    "extraction progress"
                );
            }

            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            if self.session_boundary.is_match(line) {
                self.finish_statement(current.take(), options, &mut corpus);
            } else if let Some(captures) = self.query_start.captures(line) {
                self.finish_statement(current.take(), options, &mut corpus);
                let head = captures
                    .get(1)
                    .expect("query start pattern has one capture group")
                    .as_str();
                // Noise is cut off at the first line so its continuations
                // are not misattached to the previous statement.
                if !self.classifier.should_ignore(head) {
                    current = Some(head.to_string());
                }
            } else if let Some(statement) = current.as_mut() {
                statement.push('\n');
                statement.push_str(line);
            }

            if at_capacity(&corpus, options) {
                return corpus;
            }
        }

        self.finish_statement(current.take(), options, &mut corpus);
        corpus
    }

    /// Classify a completed statement and fold it into the corpus.
    fn finish_statement(
        &self,
        statement: Option<String>,
        options: &ExtractOptions,
        corpus: &mut ExtractedCorpus,
    ) {
        let statement = match statement {
            Some(s) => s.trim().to_string(),
            None => return,
        };
        if statement.is_empty() {
            return;
        }

        if self.classifier.is_system(&statement) {
            corpus.stats.system += 1;
            return;
        }
        if self.classifier.should_ignore(&statement) {
            corpus.stats.ignored += 1;
            return;
        }

        let kind = classify(&statement);
        match kind {
            StatementKind::Read => corpus.stats.read += 1,
            StatementKind::Write => corpus.stats.write += 1,
            StatementKind::Unknown => corpus.stats.unknown += 1,
        }

        let keep = match options.kind_filter {
            Some(filter) => kind == filter,
            None => true,
        };
        if keep && !at_capacity(corpus, options) {
            corpus.statements.push(ExtractedStatement { sql: statement, kind });
        }
    }
}

impl Default for LogParser {
    fn default() -> Self {
        Self::new()
    }
}

fn at_capacity(corpus: &ExtractedCorpus, options: &ExtractOptions) -> bool {
    matches!(options.max_statements, Some(max) if corpus.statements.len() >= max)
}
