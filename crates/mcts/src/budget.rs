//! Forward-model call budget for one search invocation.

use std::time::{Duration, Instant};

/// Remaining forward-model calls, plus an optional wall-clock deadline.
///
/// Every simulated state advance consumes one unit. The search stops as soon
/// as [`Budget::is_exhausted`] reports true; an iteration that already
/// started is never rolled back.
#[derive(Clone, Debug)]
pub struct Budget {
    remaining: usize,
    consumed: usize,
    deadline: Option<Instant>,
}

impl Budget {
    /// Create a budget of `max_fm_calls` forward-model calls.
    pub fn new(max_fm_calls: usize) -> Self {
        Self {
            remaining: max_fm_calls,
            consumed: 0,
            deadline: None,
        }
    }

    /// Additionally stop once `limit` has elapsed from now.
    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.deadline = Instant::now().checked_add(limit);
        self
    }

    /// Record one forward-model call.
    pub fn consume(&mut self) {
        self.remaining = self.remaining.saturating_sub(1);
        self.consumed += 1;
    }

    pub fn remaining(&self) -> usize {
        self.remaining
    }

    /// Number of forward-model calls recorded so far.
    pub fn consumed(&self) -> usize {
        self.consumed
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining == 0 || self.deadline.is_some_and(|d| Instant::now() >= d)
    }
}
