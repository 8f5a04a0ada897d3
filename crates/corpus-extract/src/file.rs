//! The on-disk corpus format (`queries.sql`).
//!
//! A corpus file is a sequence of `-- Query N (KIND)` headers, each followed
//! by one statement and a `;` terminator line, preceded by a comment block
//! with extraction statistics.

use crate::parse::{ExtractError, ExtractedCorpus};
use crate::MIN_STATEMENT_LEN;
use std::fs;
use std::io::Write;
use std::path::Path;
use tracing::info;

/// Write an extracted corpus to `path`.
pub fn write_corpus(
    path: &Path,
    corpus: &ExtractedCorpus,
    source: &str,
    filter: Option<&str>,
) -> Result<(), ExtractError> {
    let mut out = fs::File::create(path)?;

    writeln!(out, "-- Queries extracted from MySQL general log")?;
    writeln!(out, "-- Source file: {source}")?;
    writeln!(out, "-- Filter: {}", filter.unwrap_or("none"))?;
    writeln!(out, "-- Total: {} statements", corpus.statements.len())?;
    writeln!(out, "--")?;
    writeln!(out, "-- Statistics:")?;
    writeln!(out, "--   read: {}", corpus.stats.read)?;
    writeln!(out, "--   write: {}", corpus.stats.write)?;
    writeln!(out, "--   system: {}", corpus.stats.system)?;
    writeln!(out, "--   unknown: {}", corpus.stats.unknown)?;
    writeln!(out, "--   ignored: {}", corpus.stats.ignored)?;
    writeln!(out)?;

    for (index, statement) in corpus.statements.iter().enumerate() {
        writeln!(
            out,
            "-- Query {} ({})",
            index + 1,
            statement.kind.as_str().to_uppercase()
        )?;
        writeln!(out, "{}", statement.sql)?;
        writeln!(out, ";")?;
        writeln!(out)?;
    }

    info!(
        statements = corpus.statements.len(),
        path = %path.display(),
        "corpus written"
    );
    Ok(())
}

/// Load the statements of a corpus file, in order.
///
/// Statement terminators are stripped and entries no longer than
/// [`MIN_STATEMENT_LEN`] are skipped.
pub fn load_corpus(path: &Path) -> Result<Vec<String>, ExtractError> {
    let content = fs::read_to_string(path)?;
    let mut statements = Vec::new();

    // The header block before the first "-- Query" marker carries no
    // statements and is skipped wholesale.
    for block in content.split("-- Query").skip(1) {
        let mut lines = block.trim().lines();
        // First line is the remainder of the marker: `N (KIND)`.
        lines.next();
        let mut sql = lines.collect::<Vec<_>>().join("\n").trim().to_string();

        if let Some(stripped) = sql.strip_suffix(";;") {
            sql = stripped.trim_end().to_string();
        } else if let Some(stripped) = sql.strip_suffix(';') {
            sql = stripped.trim_end().to_string();
        }

        if sql.len() > MIN_STATEMENT_LEN {
            statements.push(sql);
        }
    }

    info!(
        statements = statements.len(),
        path = %path.display(),
        "corpus loaded"
    );
    Ok(statements)
}
