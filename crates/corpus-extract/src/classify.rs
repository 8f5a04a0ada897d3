//! Statement classification: read vs write, system noise, ignorable lines.

use crate::MIN_STATEMENT_LEN;
use regex::Regex;

const READ_KEYWORDS: [&str; 6] = ["SELECT", "SHOW", "DESCRIBE", "DESC", "EXPLAIN", "ANALYZE"];

const WRITE_KEYWORDS: [&str; 10] = [
    "INSERT", "UPDATE", "DELETE", "CREATE", "DROP", "ALTER", "TRUNCATE", "REPLACE", "MERGE",
    "UPSERT",
];

/// Session/transaction noise that must never end up in a replay corpus.
const IGNORE_PREFIXES: [&str; 13] = [
    "SET SESSION SQL_MODE",
    "SET NAMES",
    "SET @@",
    "SET SQL_MODE",
    "SHOW",
    "SELECT @@",
    "SET CHARACTER_SET",
    "SET FOREIGN_KEY_CHECKS",
    "SET UNIQUE_CHECKS",
    "SET AUTOCOMMIT",
    "START TRANSACTION",
    "COMMIT",
    "ROLLBACK",
];

/// The kind of a corpus statement, derived from its first keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatementKind {
    Read,
    Write,
    Unknown,
}

impl StatementKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatementKind::Read => "read",
            StatementKind::Write => "write",
            StatementKind::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for StatementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a statement by its first lexical keyword.
pub fn classify(statement: &str) -> StatementKind {
    let first = match statement.split_whitespace().next() {
        Some(token) => token,
        None => return StatementKind::Unknown,
    };
    if READ_KEYWORDS.iter().any(|kw| first.eq_ignore_ascii_case(kw)) {
        StatementKind::Read
    } else if WRITE_KEYWORDS.iter().any(|kw| first.eq_ignore_ascii_case(kw)) {
        StatementKind::Write
    } else {
        StatementKind::Unknown
    }
}

/// Compiled patterns for system-schema detection.
///
/// Built once per parser; the patterns come from the schemas MySQL itself
/// and common replication/monitoring tooling write to.
pub struct Classifier {
    system_patterns: Vec<Regex>,
}

impl Classifier {
    pub fn new() -> Self {
        let patterns = [
            r"(?i)\binformation_schema\b",
            r"(?i)\bperformance_schema\b",
            r"(?i)\b(sys|mysql|heartbeat)\s*\.",
            r"(?i)\brds_heartbeat\w*",
            r"(?i)\bheartbeat\w*\b",
            r"(?i)\b(from|join)\s+(sys|mysql|heartbeat)\b",
        ];
        Self {
            system_patterns: patterns
                .iter()
                .map(|p| Regex::new(p).expect("system pattern is a valid regex"))
                .collect(),
        }
    }

    /// Whether the statement targets a MySQL-internal or monitoring schema.
    pub fn is_system(&self, statement: &str) -> bool {
        self.system_patterns.iter().any(|p| p.is_match(statement))
    }

    /// Whether the statement is session noise or too short to be worth
    /// replaying.
    pub fn should_ignore(&self, statement: &str) -> bool {
        let trimmed = statement.trim();
        if trimmed.len() < MIN_STATEMENT_LEN {
            return true;
        }
        let upper = trimmed.to_ascii_uppercase();
        IGNORE_PREFIXES.iter().any(|prefix| upper.contains(prefix))
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_reads() {
        assert_eq!(classify("SELECT * FROM users"), StatementKind::Read);
        assert_eq!(classify("explain select 1 from t"), StatementKind::Read);
        assert_eq!(classify("DESCRIBE users"), StatementKind::Read);
    }

    #[test]
    fn test_classify_writes() {
        assert_eq!(classify("INSERT INTO t VALUES (1)"), StatementKind::Write);
        assert_eq!(classify("update t set a = 1"), StatementKind::Write);
        assert_eq!(classify("TRUNCATE TABLE logs"), StatementKind::Write);
    }

    #[test]
    fn test_classify_unknown() {
        assert_eq!(classify("GRANT ALL ON *.* TO 'x'"), StatementKind::Unknown);
        assert_eq!(classify(""), StatementKind::Unknown);
    }

    #[test]
    fn test_system_schema_detection() {
        let classifier = Classifier::new();
        assert!(classifier.is_system("SELECT * FROM information_schema.tables"));
        assert!(classifier.is_system("SELECT * FROM mysql.user"));
        assert!(classifier.is_system("SELECT 1 FROM heartbeat.rds_heartbeat2"));
        assert!(!classifier.is_system("SELECT * FROM customers WHERE id = 1"));
    }

    #[test]
    fn test_ignore_session_noise() {
        let classifier = Classifier::new();
        assert!(classifier.should_ignore("SET NAMES utf8mb4 COLLATE utf8mb4_unicode_ci"));
        assert!(classifier.should_ignore("SET autocommit=0 /* client */"));
        assert!(classifier.should_ignore("START TRANSACTION"));
        assert!(classifier.should_ignore("COMMIT"));
        // Too short to replay.
        assert!(classifier.should_ignore("SELECT 1"));
        assert!(!classifier.should_ignore("SELECT id, name FROM customers"));
    }
}
