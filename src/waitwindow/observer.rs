//! Wait-window budgets and yield checkpoints
//!
//! A wait window bounds the cost of a single host call into the scan.
//! Tracking is purely cooperative: the pipeline consults the observer
//! between units of work; there are no timers or background threads.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::pipeline::{Key, Range};

/// Resume checkpoint carried by an overrun.
///
/// Wrapping layers may refine the position as the signal propagates; the
/// original position stays first in the history and the most recent entry
/// is the effective resume point. A refinement with an unchanged key is
/// not recorded twice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YieldPoint {
    key: Key,
    layer: String,
    earlier: Vec<(Key, String)>,
}

impl YieldPoint {
    /// Creates a checkpoint at `key`, recorded by `layer`.
    pub fn new(key: Key, layer: impl Into<String>) -> Self {
        Self {
            key,
            layer: layer.into(),
            earlier: Vec::new(),
        }
    }

    /// Records a refined position. Ignored when the key is unchanged.
    pub fn push(&mut self, key: Key, layer: impl Into<String>) {
        if key == self.key {
            return;
        }
        let previous_key = std::mem::replace(&mut self.key, key);
        let previous_layer = std::mem::replace(&mut self.layer, layer.into());
        self.earlier.push((previous_key, previous_layer));
    }

    /// The effective resume key (most recent entry).
    pub fn yield_key(&self) -> &Key {
        &self.key
    }

    /// The layer that recorded the effective resume key.
    pub fn layer(&self) -> &str {
        &self.layer
    }

    /// Full history, original position first.
    pub fn history(&self) -> impl Iterator<Item = (&Key, &str)> {
        self.earlier
            .iter()
            .map(|(key, layer)| (key, layer.as_str()))
            .chain(std::iter::once((&self.key, self.layer.as_str())))
    }

    /// The range the host should re-seek to continue past the checkpoint.
    ///
    /// The start is inclusive: the yield key names the first candidate that
    /// was not consumed.
    pub fn resume_range(&self, end: Key) -> Range {
        Range::new(self.yield_key().clone(), end, true)
    }
}

/// Tracks the time/work budget granted to one host call.
#[derive(Debug)]
pub struct WaitWindowObserver {
    window: Option<Duration>,
    deadline: Option<Instant>,
    work_budget: Option<u64>,
    work_done: u64,
}

impl WaitWindowObserver {
    /// An observer that never overruns.
    pub fn unlimited() -> Self {
        Self {
            window: None,
            deadline: None,
            work_budget: None,
            work_done: 0,
        }
    }

    /// Budget bounded by wall-clock time from now.
    pub fn with_deadline(window: Duration) -> Self {
        Self {
            window: Some(window),
            deadline: Some(Instant::now() + window),
            work_budget: None,
            work_done: 0,
        }
    }

    /// Budget bounded by a number of work units (documents staged).
    /// Deterministic; used where wall-clock budgets would flake.
    pub fn with_work_budget(units: u64) -> Self {
        Self {
            window: None,
            deadline: None,
            work_budget: Some(units),
            work_done: 0,
        }
    }

    /// Re-arms the window for a new host invocation after a resume.
    pub fn reset(&mut self) {
        self.work_done = 0;
        if let Some(window) = self.window {
            self.deadline = Some(Instant::now() + window);
        }
    }

    /// Records one completed unit of work.
    pub fn note_work(&mut self) {
        self.work_done = self.work_done.saturating_add(1);
    }

    /// Units of work completed since the last reset.
    pub fn work_done(&self) -> u64 {
        self.work_done
    }

    /// Whether the budget for this invocation is spent.
    pub fn exceeded(&self) -> bool {
        if let Some(budget) = self.work_budget {
            if self.work_done >= budget {
                return true;
            }
        }
        if let Some(deadline) = self.deadline {
            if Instant::now() >= deadline {
                return true;
            }
        }
        false
    }
}

impl Default for WaitWindowObserver {
    fn default() -> Self {
        Self::unlimited()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(row: &str, family: &str) -> Key {
        Key::new(row, family, "")
    }

    #[test]
    fn test_yield_key_is_most_recent() {
        let mut point = YieldPoint::new(key("r1", "a"), "inner");
        point.push(key("r1", "b"), "outer");

        assert_eq!(point.yield_key(), &key("r1", "b"));
        assert_eq!(point.layer(), "outer");

        let history: Vec<_> = point.history().map(|(k, _)| k.clone()).collect();
        assert_eq!(history, vec![key("r1", "a"), key("r1", "b")]);
    }

    #[test]
    fn test_push_ignores_unchanged_key() {
        let mut point = YieldPoint::new(key("r1", "a"), "inner");
        point.push(key("r1", "a"), "outer");
        assert_eq!(point.history().count(), 1);
        assert_eq!(point.layer(), "inner");
    }

    #[test]
    fn test_resume_range_starts_inclusive_at_yield_key() {
        let point = YieldPoint::new(key("r1", "m"), "pipeline");
        let range = point.resume_range(key("r9", ""));
        assert_eq!(range.start, key("r1", "m"));
        assert!(range.start_inclusive);
    }

    #[test]
    fn test_work_budget_exceeds_only_after_spent() {
        let mut observer = WaitWindowObserver::with_work_budget(2);
        assert!(!observer.exceeded());
        observer.note_work();
        assert!(!observer.exceeded());
        observer.note_work();
        assert!(observer.exceeded());

        observer.reset();
        assert!(!observer.exceeded());
    }

    #[test]
    fn test_unlimited_never_exceeds() {
        let mut observer = WaitWindowObserver::unlimited();
        for _ in 0..1000 {
            observer.note_work();
        }
        assert!(!observer.exceeded());
    }
}
