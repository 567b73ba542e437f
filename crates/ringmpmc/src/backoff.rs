use std::hint;
use std::sync::atomic::{compiler_fence, Ordering};
use std::thread;

/// Contention backoff for the blocking claim loops.
///
/// The first [`Backoff::SPIN_LIMIT`] snoozes spin for `1, 2, 4, …, 2^15`
/// iterations; every snooze after that yields the thread to the scheduler.
/// It never parks the thread on an OS wait primitive.
///
/// A fresh instance is created per claim call; nothing is shared between
/// threads.
#[derive(Debug)]
pub struct Backoff {
    step: u32,
}

impl Backoff {
    /// Number of spinning rounds before switching to `yield_now`.
    pub const SPIN_LIMIT: u32 = 16;

    /// Creates a new backoff instance.
    #[inline]
    pub fn new() -> Self {
        Self { step: 0 }
    }

    /// Waits once: spin while under the limit, yield afterwards.
    #[inline]
    pub fn snooze(&mut self) {
        if self.step < Self::SPIN_LIMIT {
            for _ in 0..(1u32 << self.step) {
                // keeps the empty loop from being folded away
                compiler_fence(Ordering::SeqCst);
                hint::spin_loop();
            }
            self.step += 1;
            if self.step == Self::SPIN_LIMIT {
                trace_trace!("backoff exhausted spinning, yielding from now on");
            }
        } else {
            thread::yield_now();
        }
    }

    /// Returns true once the spin budget is spent and snoozes yield.
    #[inline]
    pub fn is_yielding(&self) -> bool {
        self.step >= Self::SPIN_LIMIT
    }

    /// Number of spinning rounds taken so far.
    #[inline]
    pub fn step(&self) -> u32 {
        self.step
    }

    /// Reset for next wait cycle.
    #[inline]
    pub fn reset(&mut self) {
        self.step = 0;
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self::new()
    }
}
