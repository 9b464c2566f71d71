//! Display panel trait

use std::path::Path;

/// E-ink panel
///
/// Renders are slow and draw power, so a well-behaved caller always puts
/// the panel to sleep after touching it, even when the render failed.
pub trait Panel {
    /// Error type for panel operations
    type Error: core::fmt::Display;

    /// Show a prepared image
    fn render(&mut self, prepared: &Path) -> Result<(), Self::Error>;

    /// Blank the panel
    fn clear(&mut self) -> Result<(), Self::Error>;

    /// Enter the low-power sleep state
    fn sleep(&mut self) -> Result<(), Self::Error>;
}
