//! Image sensor trait

use std::path::PathBuf;

/// Still-image camera
pub trait ImageSensor {
    /// Error type for capture operations
    type Error: core::fmt::Display;

    /// Capture one still and return the path of the raw image file
    ///
    /// The caller owns the returned file and deletes it.
    fn capture_still(&mut self) -> Result<PathBuf, Self::Error>;
}
