//! Outcomes of one capture-side polling tick

/// Classification of an accepted press edge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Press {
    /// Edge inside the press debounce window; contact bounce, dropped
    Bounce,
    /// Edge during an active capture cooldown; scan for codes only
    Secondary,
    /// Edge with no cooldown active; full capture and share
    Primary,
}

/// Result of [`CaptureMachine::poll`](super::CaptureMachine::poll)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Poll {
    /// The capture cooldown ended on this tick
    pub cooldown_finished: bool,
    /// A press edge was seen on this tick
    pub press: Option<Press>,
}
