//! Monotonic request sequencing.
//!
//! Every async operation captures a sequence number at dispatch time. A result
//! is applied only when no operation with a higher number has already been
//! applied to the same target.

use std::sync::atomic::{AtomicU64, Ordering};

/// Hands out strictly increasing sequence numbers, starting at 1.
#[derive(Debug, Default)]
pub struct RequestFence {
    last: AtomicU64,
}

impl RequestFence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the next sequence number.
    pub fn next(&self) -> u64 {
        self.last.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Most recently allocated sequence number (0 before the first call).
    pub fn current(&self) -> u64 {
        self.last.load(Ordering::SeqCst)
    }
}

/// Tracks the newest sequence applied to one piece of state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AppliedMark(u64);

impl AppliedMark {
    /// Record `seq` as applied if it is newer than what is already there.
    ///
    /// # Returns
    /// `true` when the caller should apply its result.
    pub fn advance(&mut self, seq: u64) -> bool {
        if seq > self.0 {
            self.0 = seq;
            true
        } else {
            false
        }
    }

    pub fn get(&self) -> u64 {
        self.0
    }
}
