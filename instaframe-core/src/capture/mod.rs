//! Capture-side press and cooldown handling

pub mod events;
pub mod machine;

pub use events::{Poll, Press};
pub use machine::CaptureMachine;
