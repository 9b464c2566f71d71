//! Edge-triggered button sampling
//!
//! The button is sampled every tick rather than interrupt-driven. A press
//! is reported exactly once per Open → Closed transition; holding the
//! button down does not repeat it.

/// Contact state of a button
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonState {
    /// Contact open (released)
    Open,
    /// Contact closed (pressed)
    Closed,
}

/// Press edge detector
///
/// Starts with no known state, so a button already held at power-on
/// produces one press on the first sample.
#[derive(Debug, Clone, Default)]
pub struct EdgeDetector {
    last: Option<ButtonState>,
}

impl EdgeDetector {
    /// Create a detector with unknown initial state
    pub const fn new() -> Self {
        Self { last: None }
    }

    /// Feed one sample; returns true on a press edge
    pub fn update(&mut self, pressed: bool) -> bool {
        match (pressed, self.last) {
            (true, Some(ButtonState::Closed)) => false,
            (true, _) => {
                self.last = Some(ButtonState::Closed);
                true
            }
            (false, _) => {
                self.last = Some(ButtonState::Open);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_edge_per_press() {
        let mut edges = EdgeDetector::new();
        assert!(!edges.update(false));
        assert!(edges.update(true));
        assert!(!edges.update(true));
        assert!(!edges.update(true));
        assert!(!edges.update(false));
        assert!(edges.update(true));
    }

    #[test]
    fn test_held_at_boot_counts_once() {
        let mut edges = EdgeDetector::new();
        assert!(edges.update(true));
        assert!(!edges.update(true));
        assert!(!edges.update(false));
    }
}
