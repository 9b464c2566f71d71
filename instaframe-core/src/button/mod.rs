//! Button edge detection

pub mod edge;

pub use edge::{ButtonState, EdgeDetector};
