//! The statement corpus shared by all workers.

use crate::error::ReplayError;
use rand::Rng;
use std::sync::Arc;

/// An immutable, ordered sequence of SQL statements.
///
/// Cheap to clone; all workers share the same backing storage. The corpus is
/// never mutated after construction, so it needs no locking.
#[derive(Debug, Clone)]
pub struct Corpus {
    statements: Arc<[String]>,
}

impl Corpus {
    /// Build a corpus from already-normalized statements.
    ///
    /// Empty statements are dropped; an effectively empty corpus is rejected
    /// up front rather than discovered mid-run.
    pub fn new(statements: Vec<String>) -> Result<Self, ReplayError> {
        let statements: Vec<String> = statements
            .into_iter()
            .filter(|s| !s.trim().is_empty())
            .collect();
        if statements.is_empty() {
            return Err(ReplayError::EmptyCorpus);
        }
        Ok(Self {
            statements: statements.into(),
        })
    }

    /// Number of statements in the corpus. Always at least 1.
    pub fn len(&self) -> usize {
        self.statements.len()
    }

    /// A valid corpus is never empty; kept for API completeness.
    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    /// Pick a statement uniformly at random.
    pub fn choose<R: Rng>(&self, rng: &mut R) -> &str {
        &self.statements[rng.gen_range(0..self.statements.len())]
    }

    /// Iterate over the statements in order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.statements.iter().map(|s| s.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_empty_corpus_rejected() {
        assert!(matches!(Corpus::new(vec![]), Err(ReplayError::EmptyCorpus)));
        assert!(matches!(
            Corpus::new(vec!["   ".to_string(), "".to_string()]),
            Err(ReplayError::EmptyCorpus)
        ));
    }

    #[test]
    fn test_blank_statements_dropped() {
        let corpus = Corpus::new(vec![
            "SELECT 1".to_string(),
            "".to_string(),
            "SELECT 2".to_string(),
        ])
        .unwrap();
        assert_eq!(corpus.len(), 2);
        assert_eq!(corpus.iter().collect::<Vec<_>>(), vec!["SELECT 1", "SELECT 2"]);
    }

    #[test]
    fn test_choose_is_uniform_over_members() {
        let corpus = Corpus::new(vec!["SELECT 1".to_string(), "SELECT 2".to_string()]).unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..100 {
            seen.insert(corpus.choose(&mut rng).to_string());
        }
        assert_eq!(seen.len(), 2);
    }

    #[test]
    fn test_clones_share_storage() {
        let corpus = Corpus::new(vec!["SELECT 1".to_string()]).unwrap();
        let clone = corpus.clone();
        assert!(Arc::ptr_eq(&corpus.statements, &clone.statements));
    }
}
