//! Capture-side state machine
//!
//! Owns the button edge detector, the press debounce window, the capture
//! cooldown window and the blink schedule. Each tick the controller feeds
//! in the raw contact state and acts on the returned [`Poll`]:
//!
//! ```text
//!   edge inside press debounce      -> Bounce     (dropped)
//!   edge during capture cooldown    -> Secondary  (scan only, timers untouched)
//!   edge after capture cooldown     -> Primary    (cooldown starts now)
//! ```
//!
//! A primary press whose pipeline fails rewinds the capture cooldown, so the
//! next edge is primary again.

use log::{debug, info};

use super::events::{Poll, Press};
use crate::button::EdgeDetector;
use crate::config::CaptureTiming;
use crate::timing::{BlinkSchedule, CooldownWindow};

/// Button debounce, capture cooldown and blink state
#[derive(Debug, Clone)]
pub struct CaptureMachine {
    edges: EdgeDetector,
    /// Minimum spacing between accepted press edges
    press_window: CooldownWindow,
    /// Minimum spacing between full capture-and-share cycles
    capture_window: CooldownWindow,
    /// A shared photo is holding the cooldown
    in_cooldown: bool,
    blink: BlinkSchedule,
}

impl CaptureMachine {
    /// Create a machine with no press history
    pub fn new(timing: &CaptureTiming) -> Self {
        Self {
            edges: EdgeDetector::new(),
            press_window: CooldownWindow::new(timing.press_debounce_ms),
            capture_window: CooldownWindow::new(timing.capture_cooldown_ms),
            in_cooldown: false,
            blink: BlinkSchedule::new(timing.blink_speed),
        }
    }

    /// Process one tick
    ///
    /// # Arguments
    /// - `now_ms`: monotonic time of this sample
    /// - `pressed`: contact closed (polarity already applied)
    pub fn poll(&mut self, now_ms: u64, pressed: bool) -> Poll {
        let edge = self.edges.update(pressed);
        let capture_ready = self.capture_window.is_expired(now_ms);
        let mut poll = Poll::default();

        if capture_ready && self.in_cooldown {
            self.in_cooldown = false;
            poll.cooldown_finished = true;
            info!("cooldown done, listening for button press");
        }

        if !edge {
            return poll;
        }

        if !self.press_window.is_expired(now_ms) {
            debug!("press edge within debounce window, ignored");
            poll.press = Some(Press::Bounce);
            return poll;
        }
        self.press_window.start(now_ms);

        if capture_ready {
            self.capture_window.start(now_ms);
            self.in_cooldown = true;
            poll.press = Some(Press::Primary);
        } else {
            debug!(
                "press during cooldown ({} ms left), scan only",
                self.capture_window.remaining(now_ms)
            );
            poll.press = Some(Press::Secondary);
        }

        poll
    }

    /// Report the outcome of the pipeline run for a primary press
    ///
    /// On failure the cooldown is cancelled by rewinding its anchor one
    /// full window, so the next press edge is treated as primary.
    pub fn capture_finished(&mut self, success: bool) {
        if success {
            return;
        }
        info!("skipping cooldown");
        self.in_cooldown = false;
        self.capture_window.rewind();
    }

    /// Re-anchor the blink schedule (start of a new share)
    pub fn restart_blink(&mut self, now_ms: u64) {
        self.blink.restart(now_ms);
    }

    /// Indicator level while cooling down, None otherwise
    pub fn indicator(&self, now_ms: u64) -> Option<bool> {
        if self.in_cooldown {
            Some(self.blink.is_lit(now_ms))
        } else {
            None
        }
    }

    /// Check if a capture cooldown is active
    pub fn in_cooldown(&self) -> bool {
        self.in_cooldown
    }

    /// Time left in the capture cooldown
    pub fn cooldown_remaining(&self, now_ms: u64) -> u64 {
        if self.in_cooldown {
            self.capture_window.remaining(now_ms)
        } else {
            0
        }
    }
}
