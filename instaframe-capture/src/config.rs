//! Capture device configuration
//!
//! The default configuration is compiled in from `capture.toml`. A file
//! given on the command line (or in `INSTAFRAME_CONFIG`) replaces it
//! entirely; missing keys fall back to the built-in defaults.

use std::env;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Deserialize;

use instaframe_core::config::CaptureTiming;
use instaframe_drivers::{CameraConfig, DecoderConfig, FilterConfig, NetworkConfig};
use instaframe_hal::Polarity;
use instaframe_mailbox::MailboxConfig;

/// Embedded default configuration
const EMBEDDED_CONFIG: &str = include_str!("../capture.toml");

/// Environment variable naming an override config file
pub const CONFIG_ENV: &str = "INSTAFRAME_CONFIG";

/// GPIO assignment
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PinsConfig {
    /// GPIO character device
    pub chip: String,
    /// Button line offset
    pub button: u32,
    /// Button wiring
    pub button_polarity: Polarity,
    /// Indicator light line offset
    pub indicator: u32,
}

impl Default for PinsConfig {
    fn default() -> Self {
        Self {
            chip: "/dev/gpiochip0".into(),
            button: 21,
            button_polarity: Polarity::ActiveLow,
            indicator: 18,
        }
    }
}

/// Local working storage
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory for raw and prepared captures
    pub dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("captures"),
        }
    }
}

/// Complete capture device configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    pub mailbox: MailboxConfig,
    pub timing: CaptureTiming,
    pub pins: PinsConfig,
    pub camera: CameraConfig,
    pub decoder: DecoderConfig,
    pub network: NetworkConfig,
    pub storage: StorageConfig,
    pub filter: FilterConfig,
}

impl CaptureConfig {
    /// Path the prepared image is written to before upload
    ///
    /// Named after the artifact so the upload overwrites the mailbox slot.
    pub fn prepared_path(&self) -> PathBuf {
        self.storage.dir.join(&self.mailbox.artifact)
    }
}

/// Parse a TOML document
pub fn parse(text: &str) -> Result<CaptureConfig> {
    toml::from_str(text).context("invalid capture config")
}

/// Override path from the command line or environment
pub fn override_path() -> Option<PathBuf> {
    env::args_os()
        .nth(1)
        .or_else(|| env::var_os(CONFIG_ENV))
        .map(PathBuf::from)
}

/// Load the override file if given, else the embedded defaults
pub fn load(path: Option<PathBuf>) -> Result<CaptureConfig> {
    match path {
        Some(path) => {
            let text = fs::read_to_string(&path)
                .with_context(|| format!("reading {}", path.display()))?;
            parse(&text).with_context(|| format!("loading {}", path.display()))
        }
        None => parse(EMBEDDED_CONFIG),
    }
}
