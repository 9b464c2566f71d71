//! Image preparation trait

use std::path::{Path, PathBuf};

/// Cosmetic transform from a raw image to a panel-ready image
pub trait ImageFilter {
    /// Error type for filter operations
    type Error: core::fmt::Display;

    /// Write a prepared copy of `raw` and return its path
    ///
    /// `raw` is left in place; the caller deletes both files.
    fn prepare_for_display(&mut self, raw: &Path) -> Result<PathBuf, Self::Error>;
}
