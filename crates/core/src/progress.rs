//! Pass bookkeeping and derived navigation bounds.

use serde::Serialize;

/// One pass flag per sentence, set once and never unset.
///
/// Re-recording a sentence and failing does not take the pass away; success
/// is idempotent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassLedger {
    flags: Vec<bool>,
}

impl PassLedger {
    /// Creates a ledger with every sentence unpassed.
    #[must_use]
    pub fn new(len: usize) -> Self {
        Self {
            flags: vec![false; len],
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.flags.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    /// Marks a sentence as passed. Returns true only when the flag was newly
    /// set, which is what makes the completion callback edge-triggered.
    /// Out-of-range indices are ignored and return false.
    pub fn mark_passed(&mut self, index: usize) -> bool {
        match self.flags.get_mut(index) {
            Some(flag) if !*flag => {
                *flag = true;
                true
            }
            _ => false,
        }
    }

    #[must_use]
    pub fn is_passed(&self, index: usize) -> bool {
        self.flags.get(index).copied().unwrap_or(false)
    }

    #[must_use]
    pub fn passed_count(&self) -> usize {
        self.flags.iter().filter(|passed| **passed).count()
    }

    /// True iff every sentence has been matched at least once.
    #[must_use]
    pub fn is_course_complete(&self) -> bool {
        self.flags.iter().all(|passed| *passed)
    }
}

/// Navigation bounds and completion state, recomputed from the current index
/// and the ledger on every query. Carries no state of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProgressSnapshot {
    pub index: usize,
    pub total: usize,
    pub passed_count: usize,
    pub current_passed: bool,
    pub can_go_back: bool,
    pub can_go_forward: bool,
    pub is_course_complete: bool,
}

impl ProgressSnapshot {
    #[must_use]
    pub fn derive(index: usize, ledger: &PassLedger) -> Self {
        let total = ledger.len();
        Self {
            index,
            total,
            passed_count: ledger.passed_count(),
            current_passed: ledger.is_passed(index),
            can_go_back: index > 0,
            can_go_forward: index + 1 < total,
            is_course_complete: ledger.is_course_complete(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mark_passed_is_edge_triggered() {
        let mut ledger = PassLedger::new(3);
        assert!(ledger.mark_passed(1));
        assert!(!ledger.mark_passed(1));
        assert!(ledger.is_passed(1));
        assert_eq!(ledger.passed_count(), 1);
    }

    #[test]
    fn out_of_range_marks_are_ignored() {
        let mut ledger = PassLedger::new(2);
        assert!(!ledger.mark_passed(5));
        assert_eq!(ledger.passed_count(), 0);
    }

    #[test]
    fn completion_requires_every_sentence() {
        let mut ledger = PassLedger::new(2);
        ledger.mark_passed(0);
        assert!(!ledger.is_course_complete());
        ledger.mark_passed(1);
        assert!(ledger.is_course_complete());
    }

    #[test]
    fn bounds_at_first_sentence() {
        let ledger = PassLedger::new(3);
        let progress = ProgressSnapshot::derive(0, &ledger);
        assert!(!progress.can_go_back);
        assert!(progress.can_go_forward);
    }

    #[test]
    fn bounds_at_last_sentence() {
        let ledger = PassLedger::new(3);
        let progress = ProgressSnapshot::derive(2, &ledger);
        assert!(progress.can_go_back);
        assert!(!progress.can_go_forward);
    }

    #[test]
    fn single_sentence_course_has_no_navigation() {
        let ledger = PassLedger::new(1);
        let progress = ProgressSnapshot::derive(0, &ledger);
        assert!(!progress.can_go_back);
        assert!(!progress.can_go_forward);
    }

    #[test]
    fn snapshot_reflects_ledger() {
        let mut ledger = PassLedger::new(2);
        ledger.mark_passed(0);
        let progress = ProgressSnapshot::derive(0, &ledger);
        assert!(progress.current_passed);
        assert_eq!(progress.passed_count, 1);
        assert!(!progress.is_course_complete);
    }
}
