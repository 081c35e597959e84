//! Time source for entry expiry.

use std::fmt::Debug;
use std::time::Instant;

/// Source of "now" for TTL checks. Swapped for a manual clock in tests.
pub trait Clock: Debug + Send + Sync {
    fn now(&self) -> Instant;
}

/// Wall clock backed by `Instant::now`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}
