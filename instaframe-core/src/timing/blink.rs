//! Blink schedule for the cooldown indicator
//!
//! The indicator state is a pure function of time since the anchor:
//! `(elapsed_s * speed) mod 2 > 0.5`. With the default speed of 3 the
//! light cycles three times every two seconds.

/// Phase period in milliseconds (two "units" of one second each)
const PHASE_PERIOD_MS: u64 = 2_000;

/// Phase offset after which the light is lit
const LIT_AFTER_MS: u64 = 500;

/// An anchor timestamp plus a frequency
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlinkSchedule {
    anchor_ms: u64,
    speed: u32,
}

impl BlinkSchedule {
    /// Create a schedule anchored at zero
    pub const fn new(speed: u32) -> Self {
        Self {
            anchor_ms: 0,
            speed,
        }
    }

    /// Re-anchor the schedule at `now_ms`
    pub fn restart(&mut self, now_ms: u64) {
        self.anchor_ms = now_ms;
    }

    /// Indicator state at `now_ms`
    pub fn is_lit(&self, now_ms: u64) -> bool {
        let relative = now_ms.saturating_sub(self.anchor_ms);
        let phase = relative.wrapping_mul(self.speed as u64) % PHASE_PERIOD_MS;
        phase > LIT_AFTER_MS
    }
}
