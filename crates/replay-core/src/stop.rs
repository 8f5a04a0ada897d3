//! Cooperative stop condition shared by all workers.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

/// Shared stop condition for a run.
///
/// Workers read it between statements only; an in-flight statement is never
/// interrupted, which bounds the worst-case overrun by one statement's
/// execution time. Safe to read concurrently from any number of workers.
#[derive(Debug)]
pub struct StopSignal {
    deadline: Option<Instant>,
    halted: AtomicBool,
}

impl StopSignal {
    /// A signal that trips once wall-clock time reaches `deadline`.
    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            deadline: Some(deadline),
            halted: AtomicBool::new(false),
        }
    }

    /// A signal that never trips on its own; used for count-terminated runs.
    pub fn unbounded() -> Self {
        Self {
            deadline: None,
            halted: AtomicBool::new(false),
        }
    }

    /// Trip the signal explicitly. Written at most once per run.
    pub fn halt(&self) {
        self.halted.store(true, Ordering::Relaxed);
    }

    /// Whether workers should stop before starting their next statement.
    pub fn should_stop(&self) -> bool {
        if self.halted.load(Ordering::Relaxed) {
            return true;
        }
        matches!(self.deadline, Some(deadline) if Instant::now() >= deadline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_unbounded_never_trips() {
        let signal = StopSignal::unbounded();
        assert!(!signal.should_stop());
    }

    #[test]
    fn test_halt_trips() {
        let signal = StopSignal::unbounded();
        signal.halt();
        assert!(signal.should_stop());
    }

    #[test]
    fn test_elapsed_deadline_trips() {
        let signal = StopSignal::with_deadline(Instant::now() - Duration::from_millis(1));
        assert!(signal.should_stop());
    }

    #[test]
    fn test_future_deadline_does_not_trip() {
        let signal = StopSignal::with_deadline(Instant::now() + Duration::from_secs(3600));
        assert!(!signal.should_stop());
    }
}
