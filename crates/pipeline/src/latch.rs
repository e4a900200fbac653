//! A sticky, manual-reset, broadcast-wake synchronization primitive.
//!
//! This is the one-shot "condition reached" signal the rest of the crate
//! uses to coordinate drain-complete notifications. It is a manual-reset
//! event, not an auto-reset one: a `set()` issued before any `wait()` is
//! remembered, so a late waiter observes it and returns immediately. An
//! edge-triggered condvar without this property would deadlock whenever
//! the signaling thread wins the race to notify before the waiter starts
//! waiting.

use std::sync::{Condvar, Mutex};

/// A sticky, broadcast-wake, manual-reset latch.
pub struct Latch {
    signaled: Mutex<bool>,
    condvar: Condvar,
}

impl Latch {
    /// Creates a new latch in the cleared state.
    pub fn new() -> Self {
        Self {
            signaled: Mutex::new(false),
            condvar: Condvar::new(),
        }
    }

    /// Sets the latch and wakes every current and future waiter until the
    /// next `clear()`. Idempotent; safe to call from any thread.
    pub fn set(&self) {
        let mut signaled = self.signaled.lock().unwrap_or_else(|e| e.into_inner());
        *signaled = true;
        self.condvar.notify_all();
    }

    /// Clears the latch. Waiters that already returned are unaffected;
    /// future `wait()` calls block until the next `set()`.
    pub fn clear(&self) {
        let mut signaled = self.signaled.lock().unwrap_or_else(|e| e.into_inner());
        *signaled = false;
    }

    /// Blocks until the latch is signaled, then returns. Returns
    /// immediately if the latch was already signaled when entered.
    /// Spurious wakeups are tolerated by rechecking the predicate under
    /// the lock.
    pub fn wait(&self) {
        let guard = self.signaled.lock().unwrap_or_else(|e| e.into_inner());
        let _guard = self
            .condvar
            .wait_while(guard, |signaled| !*signaled)
            .unwrap_or_else(|e| e.into_inner());
    }

    /// Returns true if the latch is currently signaled, without blocking.
    pub fn is_set(&self) -> bool {
        *self.signaled.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for Latch {
    fn default() -> Self {
        Self::new()
    }
}
