//! Image preparation for the e-ink panel
//!
//! The 7-colour panel renders saturated photos poorly: colours band and
//! magenta in particular turns muddy. The capture side therefore fits the
//! photo to the panel resolution and applies a fixed grade before upload:
//!
//! 1. Fit to `width` x `height`, cropping around the centre
//! 2. Colour x`color_boost`, then colour x`color_fix`
//! 3. Brightness x`brightness`
//! 4. Green channel x`green`, blue channel x`blue`
//!
//! Enhancement factors follow the usual convention: 0 degenerates the
//! image (greyscale for colour, black for brightness), 1 leaves it
//! unchanged, larger values extrapolate.
//!
//! The display side only re-encodes the downloaded JPEG as a BMP.

use std::path::{Path, PathBuf};

use image::imageops::FilterType;
use image::{ImageFormat, Rgb, RgbImage};
use log::debug;
use serde::Deserialize;

use instaframe_core::traits::ImageFilter;

use crate::error::DriverError;

/// Capture-side grading parameters
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Panel width in pixels
    pub width: u32,
    /// Panel height in pixels
    pub height: u32,
    /// First colour enhancement
    pub color_boost: f32,
    /// Second colour enhancement
    pub color_fix: f32,
    /// Brightness enhancement
    pub brightness: f32,
    /// Green channel scale
    pub green: f32,
    /// Blue channel scale
    pub blue: f32,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            width: 600,
            height: 448,
            color_boost: 3.0,
            color_fix: 0.3,
            brightness: 1.8,
            green: 0.9,
            blue: 0.8,
        }
    }
}

fn to_channel(value: f32) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

/// ITU-R 601-2 luma
fn luma(pixel: &Rgb<u8>) -> f32 {
    let [r, g, b] = pixel.0;
    (f32::from(r) * 299.0 + f32::from(g) * 587.0 + f32::from(b) * 114.0) / 1000.0
}

/// Blend each pixel away from (or towards) its grey value
pub fn enhance_color(img: &mut RgbImage, factor: f32) {
    for pixel in img.pixels_mut() {
        let grey = luma(pixel);
        for channel in pixel.0.iter_mut() {
            *channel = to_channel(grey + factor * (f32::from(*channel) - grey));
        }
    }
}

/// Scale every channel
pub fn enhance_brightness(img: &mut RgbImage, factor: f32) {
    for pixel in img.pixels_mut() {
        for channel in pixel.0.iter_mut() {
            *channel = to_channel(f32::from(*channel) * factor);
        }
    }
}

/// Scale a single channel (0 = red, 1 = green, 2 = blue)
pub fn scale_channel(img: &mut RgbImage, channel: usize, factor: f32) {
    for pixel in img.pixels_mut() {
        let value = &mut pixel.0[channel];
        *value = to_channel(f32::from(*value) * factor);
    }
}

/// Capture-side filter: fit and grade for the e-ink panel, save as JPEG
pub struct EinkFilter {
    config: FilterConfig,
    output: PathBuf,
}

impl EinkFilter {
    /// Create a filter writing to `output`
    pub fn new(config: FilterConfig, output: impl Into<PathBuf>) -> Self {
        Self {
            config,
            output: output.into(),
        }
    }

    /// Apply the grade to an already fitted image
    pub fn grade(&self, img: &mut RgbImage) {
        enhance_color(img, self.config.color_boost);
        enhance_color(img, self.config.color_fix);
        enhance_brightness(img, self.config.brightness);
        scale_channel(img, 1, self.config.green);
        scale_channel(img, 2, self.config.blue);
    }
}

impl ImageFilter for EinkFilter {
    type Error = DriverError;

    fn prepare_for_display(&mut self, raw: &Path) -> Result<PathBuf, DriverError> {
        let fitted = image::open(raw)?.resize_to_fill(
            self.config.width,
            self.config.height,
            FilterType::Lanczos3,
        );
        let mut img = fitted.to_rgb8();
        self.grade(&mut img);
        img.save_with_format(&self.output, ImageFormat::Jpeg)?;
        debug!("prepared {} -> {}", raw.display(), self.output.display());
        Ok(self.output.clone())
    }
}

/// Display-side filter: re-encode as BMP for the panel driver
pub struct BmpFilter {
    output: PathBuf,
}

impl BmpFilter {
    /// Create a filter writing to `output`
    pub fn new(output: impl Into<PathBuf>) -> Self {
        Self {
            output: output.into(),
        }
    }
}

impl ImageFilter for BmpFilter {
    type Error = DriverError;

    fn prepare_for_display(&mut self, raw: &Path) -> Result<PathBuf, DriverError> {
        image::open(raw)?
            .to_rgb8()
            .save_with_format(&self.output, ImageFormat::Bmp)?;
        Ok(self.output.clone())
    }
}
