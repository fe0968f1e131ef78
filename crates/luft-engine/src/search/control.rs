//! Search control: wall-clock deadline plus the caller's stop predicate.
//!
//! The search is single-threaded and cooperative; cancellation is
//! best-effort. The predicate and clock are polled every 64 node entries, at
//! every iteration boundary, and before re-searches. Once either fires the
//! control latches stopped and the search unwinds, still returning a move.

use std::cell::Cell;
use std::time::{Duration, Instant};

use crate::options::StopFn;
use crate::search::metrics::StopReason;

/// Owns the deadline and stop state for one search call.
pub struct SearchControl {
    start: Instant,
    deadline: Option<Instant>,
    stop_requested: Option<StopFn>,
    stopped: Cell<bool>,
    reason: Cell<StopReason>,
    soft_stop: Cell<bool>,
    hard_stop: Cell<bool>,
}

impl SearchControl {
    /// Capture the monotonic start time and arm the optional deadline.
    pub fn new(max_time_ms: Option<u64>, stop_requested: Option<StopFn>) -> SearchControl {
        let start = Instant::now();
        SearchControl {
            start,
            deadline: max_time_ms.map(|ms| start + Duration::from_millis(ms)),
            stop_requested,
            stopped: Cell::new(false),
            reason: Cell::new(StopReason::None),
            soft_stop: Cell::new(false),
            hard_stop: Cell::new(false),
        }
    }

    /// Interior-node poll. Cheap except on every 64th node, where the
    /// predicate and clock are consulted.
    pub fn should_stop(&self, nodes: u64) -> bool {
        if self.stopped.get() {
            return true;
        }
        if nodes & 63 != 0 {
            return false;
        }
        self.check(StopReason::MidSearchDeadline)
    }

    /// Iteration-boundary poll. Always consults the predicate and clock.
    pub fn should_stop_now(&self) -> bool {
        if self.stopped.get() {
            return true;
        }
        self.check(StopReason::PreIterGate)
    }

    /// Re-search gate: a full poll, attributed to the mid-search deadline.
    pub fn should_stop_before_research(&self) -> bool {
        if self.stopped.get() {
            return true;
        }
        self.check(StopReason::MidSearchDeadline)
    }

    fn check(&self, deadline_reason: StopReason) -> bool {
        if let Some(stop) = &self.stop_requested
            && stop()
        {
            self.stopped.set(true);
            self.reason.set(StopReason::ExternalCancel);
            return true;
        }

        if let Some(deadline) = self.deadline
            && Instant::now() >= deadline
        {
            self.stopped.set(true);
            self.reason.set(deadline_reason);
            match deadline_reason {
                StopReason::MidSearchDeadline => self.hard_stop.set(true),
                StopReason::PreIterGate => self.soft_stop.set(true),
                _ => {}
            }
            return true;
        }

        false
    }

    /// Whether a stop has latched (no fresh polling).
    pub fn stopped(&self) -> bool {
        self.stopped.get()
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    pub fn reason(&self) -> StopReason {
        self.reason.get()
    }

    pub fn soft_stop_used(&self) -> bool {
        self.soft_stop.get()
    }

    pub fn hard_stop_used(&self) -> bool {
        self.hard_stop.get()
    }
}
