//! Trailing-edge debounce driven by caller-supplied clocks.
//!
//! The debouncer never spawns timers of its own. Owners call [`Debouncer::poll`]
//! from their event loop (every frame or tick) with the current [`Instant`],
//! which keeps at most one pending payload and makes virtual-time tests
//! trivial.

use std::time::{Duration, Instant};

#[derive(Debug)]
struct Pending<T> {
    value: T,
    due_at: Instant,
}

/// Holds the latest triggered value until a quiet window elapses.
#[derive(Debug)]
pub struct Debouncer<T> {
    delay: Duration,
    pending: Option<Pending<T>>,
}

impl<T> Debouncer<T> {
    /// Create a debouncer with the given quiet window.
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// Quiet window length.
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Record `value` as the latest trigger and restart the quiet window.
    ///
    /// Any earlier pending value is replaced, never queued.
    pub fn trigger(&mut self, value: T, now: Instant) {
        self.pending = Some(Pending {
            value,
            due_at: now + self.delay,
        });
    }

    /// Take the pending value if its quiet window has elapsed by `now`.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        let due = self
            .pending
            .as_ref()
            .map(|pending| now >= pending.due_at)
            .unwrap_or(false);
        if due {
            self.pending.take().map(|pending| pending.value)
        } else {
            None
        }
    }

    /// Invoke `callback` with the pending value when it is due.
    ///
    /// # Returns
    /// `true` when the callback ran.
    pub fn fire_due(&mut self, now: Instant, callback: impl FnOnce(T)) -> bool {
        match self.poll(now) {
            Some(value) => {
                callback(value);
                true
            }
            None => false,
        }
    }

    /// Take the pending value immediately, regardless of the window.
    pub fn flush(&mut self) -> Option<T> {
        self.pending.take().map(|pending| pending.value)
    }

    /// Drop the pending value without firing it.
    ///
    /// # Returns
    /// `true` when something was pending.
    pub fn cancel(&mut self) -> bool {
        self.pending.take().is_some()
    }

    /// Whether a value is waiting for its window to elapse.
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// When the pending value becomes due, if any.
    pub fn due_at(&self) -> Option<Instant> {
        self.pending.as_ref().map(|pending| pending.due_at)
    }

    /// Time left until the pending value is due, saturating at zero.
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.due_at().map(|due| due.saturating_duration_since(now))
    }
}
