//! Cooldown window
//!
//! A duration anchored at a start timestamp. A window that has never been
//! started reads as expired, so the first event after boot is always
//! honoured regardless of how long the process has been up.

/// A duration anchored at a start timestamp
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CooldownWindow {
    /// Window length in milliseconds
    window_ms: u64,
    /// Anchor, or None if never started (or rewound past zero)
    start_ms: Option<u64>,
}

impl CooldownWindow {
    /// Create an unstarted window
    pub const fn new(window_ms: u64) -> Self {
        Self {
            window_ms,
            start_ms: None,
        }
    }

    /// Anchor the window at `now_ms`
    pub fn start(&mut self, now_ms: u64) {
        self.start_ms = Some(now_ms);
    }

    /// Time since the anchor, or None if never started
    pub fn elapsed(&self, now_ms: u64) -> Option<u64> {
        self.start_ms.map(|start| now_ms.saturating_sub(start))
    }

    /// `elapsed(now) > window`
    pub fn is_expired(&self, now_ms: u64) -> bool {
        match self.elapsed(now_ms) {
            Some(elapsed) => elapsed > self.window_ms,
            None => true,
        }
    }

    /// Time left until expiry (zero once expired)
    pub fn remaining(&self, now_ms: u64) -> u64 {
        match self.elapsed(now_ms) {
            Some(elapsed) => self.window_ms.saturating_sub(elapsed),
            None => 0,
        }
    }

    /// Move the anchor back by one full window
    ///
    /// From the next millisecond on the window reads as expired. An anchor
    /// that would go below zero is dropped instead.
    pub fn rewind(&mut self) {
        self.start_ms = self
            .start_ms
            .and_then(|start| start.checked_sub(self.window_ms));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unstarted_is_expired() {
        let window = CooldownWindow::new(500);
        assert!(window.is_expired(0));
        assert_eq!(window.remaining(0), 0);
    }

    #[test]
    fn test_expiry_is_strict() {
        let mut window = CooldownWindow::new(500);
        window.start(1_000);
        assert!(!window.is_expired(1_000));
        assert!(!window.is_expired(1_500)); // elapsed == window
        assert!(window.is_expired(1_501));
        assert_eq!(window.remaining(1_200), 300);
    }

    #[test]
    fn test_rewind_expires_window() {
        let mut window = CooldownWindow::new(69_000);
        window.start(100_000);
        assert!(!window.is_expired(100_001));

        window.rewind();
        assert!(window.is_expired(100_001));
    }

    #[test]
    fn test_rewind_near_boot_drops_anchor() {
        let mut window = CooldownWindow::new(69_000);
        window.start(3_000);
        window.rewind();
        assert_eq!(window.elapsed(3_000), None);
        assert!(window.is_expired(3_000));
    }
}
