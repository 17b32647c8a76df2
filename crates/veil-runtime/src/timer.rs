#![forbid(unsafe_code)]

//! Single-threaded timer queue on a virtual clock.
//!
//! [`Scheduler`] replaces fire-and-forget `setTimeout`-style deferrals with
//! owned, cancellable timers. Time only moves when the host advances it
//! ([`Scheduler::advance`], [`Scheduler::advance_to_instant`]), which makes
//! every staged transition deterministic under test.
//!
//! # Invariants
//!
//! 1. Timers fire in deadline order; equal deadlines fire in scheduling order.
//! 2. While a timer fires, `now()` equals its deadline, so timers scheduled
//!    from a callback are relative to the firing time.
//! 3. Callbacks run with no internal borrow held; they may schedule or cancel.
//! 4. Every timer is owned by a [`TimerGuard`]; dropping the guard before the
//!    deadline cancels the timer. A cancelled callback is dropped, never run.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use veil_runtime::timer::Scheduler;
//!
//! let scheduler = Scheduler::new();
//! let guard = scheduler.set_timeout(Duration::from_millis(10), || println!("fired"));
//! assert_eq!(scheduler.pending(), 1);
//! drop(guard);
//! assert_eq!(scheduler.pending(), 0);
//! ```

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::{Rc, Weak};
use std::time::Duration;

use web_time::Instant;

/// Upper bound on callbacks fired by one [`Scheduler::run_until_idle`] call.
pub const RUN_UNTIL_IDLE_LIMIT: usize = 10_000;

type TimerKey = (Duration, u64);

struct SchedulerInner {
    origin: Instant,
    now: Duration,
    next_seq: u64,
    timers: BTreeMap<TimerKey, Box<dyn FnOnce()>>,
}

/// Cloneable handle to a timer queue.
#[derive(Clone)]
pub struct Scheduler {
    inner: Rc<RefCell<SchedulerInner>>,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Scheduler")
            .field("now", &inner.now)
            .field("pending", &inner.timers.len())
            .finish()
    }
}

impl Scheduler {
    /// Create a scheduler whose virtual time starts at zero, anchored to the
    /// current wall-clock instant.
    #[must_use]
    pub fn new() -> Self {
        Self::with_origin(Instant::now())
    }

    #[must_use]
    pub fn with_origin(origin: Instant) -> Self {
        Self {
            inner: Rc::new(RefCell::new(SchedulerInner {
                origin,
                now: Duration::ZERO,
                next_seq: 0,
                timers: BTreeMap::new(),
            })),
        }
    }

    /// Virtual time elapsed since the origin.
    #[must_use]
    pub fn now(&self) -> Duration {
        self.inner.borrow().now
    }

    /// Number of timers waiting to fire.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.inner.borrow().timers.len()
    }

    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        self.inner
            .borrow()
            .timers
            .first_key_value()
            .map(|(&(deadline, _), _)| deadline)
    }

    /// Run `callback` once, `delay` after the current virtual time.
    #[must_use = "dropping the guard cancels the timer"]
    pub fn set_timeout(&self, delay: Duration, callback: impl FnOnce() + 'static) -> TimerGuard {
        let mut inner = self.inner.borrow_mut();
        let key = (inner.now.saturating_add(delay), inner.next_seq);
        inner.next_seq += 1;
        inner.timers.insert(key, Box::new(callback));
        TimerGuard {
            scheduler: Rc::downgrade(&self.inner),
            key,
        }
    }

    /// Advance virtual time by `delta`, firing every timer that comes due.
    ///
    /// Returns the number of callbacks run.
    pub fn advance(&self, delta: Duration) -> usize {
        let target = self.now().saturating_add(delta);
        self.advance_to(target)
    }

    /// Advance virtual time to `target` (no-op for targets in the past).
    pub fn advance_to(&self, target: Duration) -> usize {
        let mut fired = 0;
        loop {
            let due = {
                let mut inner = self.inner.borrow_mut();
                let next = inner
                    .timers
                    .first_key_value()
                    .map(|(&key, _)| key)
                    .filter(|&(deadline, _)| deadline <= target);
                match next {
                    Some(key) => {
                        inner.now = inner.now.max(key.0);
                        inner.timers.remove(&key)
                    }
                    None => {
                        inner.now = inner.now.max(target);
                        None
                    }
                }
            };
            match due {
                Some(callback) => {
                    callback();
                    fired += 1;
                }
                None => break,
            }
        }
        fired
    }

    /// Advance virtual time to the wall-clock `instant` (relative to the origin).
    pub fn advance_to_instant(&self, instant: Instant) -> usize {
        let origin = self.inner.borrow().origin;
        self.advance_to(instant.saturating_duration_since(origin))
    }

    /// Fire timers until none remain, jumping time to each deadline.
    ///
    /// Stops after [`RUN_UNTIL_IDLE_LIMIT`] callbacks so a self-rescheduling
    /// timer cannot loop forever.
    pub fn run_until_idle(&self) -> usize {
        let mut fired = 0;
        while fired < RUN_UNTIL_IDLE_LIMIT {
            let Some(deadline) = self.next_deadline() else {
                break;
            };
            fired += self.advance_to(deadline);
        }
        if fired >= RUN_UNTIL_IDLE_LIMIT {
            tracing::warn!(fired, "scheduler.run_until_idle hit its callback limit");
        }
        fired
    }

    fn cancel(inner: &Rc<RefCell<SchedulerInner>>, key: TimerKey) -> bool {
        let removed = inner.borrow_mut().timers.remove(&key);
        let cancelled = removed.is_some();
        drop(removed);
        cancelled
    }
}

/// Ownership of one scheduled timer.
#[must_use = "dropping the guard cancels the timer"]
pub struct TimerGuard {
    scheduler: Weak<RefCell<SchedulerInner>>,
    key: TimerKey,
}

impl TimerGuard {
    /// Virtual deadline of this timer.
    #[must_use]
    pub fn deadline(&self) -> Duration {
        self.key.0
    }

    /// Whether the timer has neither fired nor been cancelled.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.scheduler
            .upgrade()
            .is_some_and(|inner| inner.borrow().timers.contains_key(&self.key))
    }

    /// Cancel explicitly. Returns `true` if the timer was still pending.
    pub fn cancel(mut self) -> bool {
        let scheduler = std::mem::take(&mut self.scheduler);
        scheduler
            .upgrade()
            .is_some_and(|inner| Scheduler::cancel(&inner, self.key))
    }
}

impl fmt::Debug for TimerGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerGuard")
            .field("deadline", &self.key.0)
            .field("pending", &self.is_pending())
            .finish()
    }
}

impl Drop for TimerGuard {
    fn drop(&mut self) {
        if let Some(inner) = self.scheduler.upgrade() {
            Scheduler::cancel(&inner, self.key);
        }
    }
}
