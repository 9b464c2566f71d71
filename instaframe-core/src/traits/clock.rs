//! Monotonic clock trait

/// Time source for the control loops
///
/// Controllers read the time and block through this trait so tests can
/// run a full cooldown or poll interval without real sleeps.
pub trait Clock {
    /// Milliseconds since an arbitrary fixed origin
    fn now_ms(&self) -> u64;

    /// Block for `ms` milliseconds
    fn sleep_ms(&self, ms: u64);
}
