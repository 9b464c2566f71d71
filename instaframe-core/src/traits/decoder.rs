//! Code decoder trait

use std::path::Path;

/// Finds and decodes QR/bar codes in an image
pub trait CodeDecoder {
    /// Error type for decode operations
    type Error: core::fmt::Display;

    /// Decode every code visible in the image
    ///
    /// An image with no codes yields an empty list, not an error.
    fn decode_codes(&mut self, image: &Path) -> Result<Vec<String>, Self::Error>;
}
