//! Configuration type definitions
//!
//! Defaults match the deployed devices; every field can be overridden from
//! the device TOML file.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::retry::RetryPolicy;

/// Button sampling period
pub const DEFAULT_TICK_MS: u64 = 20;

/// Minimum spacing between accepted press edges
pub const DEFAULT_PRESS_DEBOUNCE_MS: u64 = 500;

/// Minimum spacing between shared photos
pub const DEFAULT_CAPTURE_COOLDOWN_MS: u64 = 69_000;

/// Cooldown blink frequency
pub const DEFAULT_BLINK_SPEED: u32 = 3;

/// Wait between upload attempts
pub const DEFAULT_UPLOAD_BACKOFF_MS: u64 = 600;

/// On/off toggles after Wi-Fi credentials were applied
pub const DEFAULT_ACK_BLINK_COUNT: u8 = 10;

/// Half-period of the acknowledgement blink
pub const DEFAULT_ACK_BLINK_MS: u64 = 100;

/// Settle time before the camera is opened
pub const DEFAULT_STARTUP_DELAY_MS: u64 = 1_000;

/// Mailbox poll period on the display
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 5_000;

/// Capture device timing
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CaptureTiming {
    /// Button sampling period (ms)
    pub tick_ms: u64,
    /// Press debounce window (ms)
    pub press_debounce_ms: u64,
    /// Capture cooldown window (ms)
    pub capture_cooldown_ms: u64,
    /// Blink frequency during cooldown
    pub blink_speed: u32,
    /// Wait between upload attempts (ms)
    pub upload_backoff_ms: u64,
    /// Retry uploads until they succeed
    pub keep_trying_forever: bool,
    /// Acknowledgement blink toggles
    pub ack_blink_count: u8,
    /// Acknowledgement blink half-period (ms)
    pub ack_blink_ms: u64,
    /// Delay after power-on before the camera is opened (ms)
    pub startup_delay_ms: u64,
}

impl Default for CaptureTiming {
    fn default() -> Self {
        Self {
            tick_ms: DEFAULT_TICK_MS,
            press_debounce_ms: DEFAULT_PRESS_DEBOUNCE_MS,
            capture_cooldown_ms: DEFAULT_CAPTURE_COOLDOWN_MS,
            blink_speed: DEFAULT_BLINK_SPEED,
            upload_backoff_ms: DEFAULT_UPLOAD_BACKOFF_MS,
            keep_trying_forever: true,
            ack_blink_count: DEFAULT_ACK_BLINK_COUNT,
            ack_blink_ms: DEFAULT_ACK_BLINK_MS,
            startup_delay_ms: DEFAULT_STARTUP_DELAY_MS,
        }
    }
}

impl CaptureTiming {
    /// Upload retry policy selected by `keep_trying_forever`
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::from_flag(self.keep_trying_forever)
    }
}

/// Display device timing
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DisplayTiming {
    /// Button sampling period while waiting (ms)
    pub tick_ms: u64,
    /// Time between mailbox polls (ms)
    pub poll_interval_ms: u64,
}

impl Default for DisplayTiming {
    fn default() -> Self {
        Self {
            tick_ms: DEFAULT_TICK_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}
