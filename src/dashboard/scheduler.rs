//! Deterministic timer queue on a virtual clock.
//!
//! Timers fire in `(deadline, insertion sequence)` order, so two timers with
//! the same deadline fire in the order they were scheduled. The clock only
//! moves when the runtime advances it: tests step it explicitly and the CLI
//! session advances it by measured wall time.
//!
//! Every timer carries the view's [`CancellationToken`]. Cancelling drops the
//! whole queue and hands out a fresh token for the next mount.

#![allow(missing_docs)]

use std::cmp::Ordering as CmpOrdering;
use std::collections::BinaryHeap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use super::model::DashboardMsg;

// ──────────────────── cancellation ────────────────────

/// Shared flag tied to one view lifetime.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

// ──────────────────── timers ────────────────────

#[derive(Debug)]
struct Timer {
    deadline: Duration,
    seq: u64,
    token: CancellationToken,
    msg: DashboardMsg,
}

impl PartialEq for Timer {
    fn eq(&self, other: &Self) -> bool {
        self.deadline == other.deadline && self.seq == other.seq
    }
}

impl Eq for Timer {}

impl PartialOrd for Timer {
    fn partial_cmp(&self, other: &Self) -> Option<CmpOrdering> {
        Some(self.cmp(other))
    }
}

impl Ord for Timer {
    // Reversed: `BinaryHeap` is a max-heap and the earliest timer must pop first.
    fn cmp(&self, other: &Self) -> CmpOrdering {
        other
            .deadline
            .cmp(&self.deadline)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Timer queue plus the virtual clock it runs on.
#[derive(Debug, Default)]
pub struct Scheduler {
    now: Duration,
    next_seq: u64,
    heap: BinaryHeap<Timer>,
    token: CancellationToken,
}

impl Scheduler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Virtual time elapsed since the scheduler was created.
    #[must_use]
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Token carried by timers scheduled from now on.
    #[must_use]
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Queue `msg` for delivery `after` the current virtual time.
    pub fn schedule(&mut self, after: Duration, msg: DashboardMsg) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Timer {
            deadline: self.now.saturating_add(after),
            seq,
            token: self.token.clone(),
            msg,
        });
        seq
    }

    /// Absolute deadline of the earliest live timer.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        self.heap.peek().map(|t| t.deadline)
    }

    /// Virtual time left until the earliest live timer fires.
    #[must_use]
    pub fn time_until_next(&self) -> Option<Duration> {
        self.next_deadline()
            .map(|deadline| deadline.saturating_sub(self.now))
    }

    /// Pop the earliest timer due at or before `until`, moving the clock to
    /// its deadline. Timers whose token was cancelled are skipped.
    pub fn pop_due(&mut self, until: Duration) -> Option<DashboardMsg> {
        while self.heap.peek().is_some_and(|t| t.deadline <= until) {
            let timer = self.heap.pop()?;
            if timer.token.is_cancelled() {
                continue;
            }
            self.now = self.now.max(timer.deadline);
            return Some(timer.msg);
        }
        None
    }

    /// Move the clock forward to `until` without firing anything.
    pub fn settle(&mut self, until: Duration) {
        self.now = self.now.max(until);
    }

    /// Cancel the current token, drop every pending timer, and start a fresh
    /// token. Returns how many timers were dropped.
    pub fn cancel_all(&mut self) -> usize {
        self.token.cancel();
        let dropped = self.heap.len();
        self.heap.clear();
        self.token = CancellationToken::new();
        dropped
    }

    /// Timers still queued.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.heap.len()
    }
}
