//! Timing primitives
//!
//! Both are pure functions of an externally supplied `now_ms`.

pub mod blink;
pub mod cooldown;

pub use blink::BlinkSchedule;
pub use cooldown::CooldownWindow;
