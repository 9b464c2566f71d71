//! Display device configuration
//!
//! Same loading rules as the capture device: embedded `display.toml`
//! unless a path is given on the command line or in `INSTAFRAME_CONFIG`.

use std::env;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Deserialize;

use instaframe_core::config::DisplayTiming;
use instaframe_drivers::PanelConfig;
use instaframe_hal::Polarity;
use instaframe_mailbox::MailboxConfig;

/// Embedded default configuration
const EMBEDDED_CONFIG: &str = include_str!("../display.toml");

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
}

impl Default for PinsConfig {
    fn default() -> Self {
        Self {
            chip: "/dev/gpiochip0".into(),
            button: 16,
            button_polarity: Polarity::ActiveHigh,
        }
    }
}

/// Local storage layout
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory for the downloaded and prepared images
    pub dir: PathBuf,
    /// Persisted freshness record
    pub state_file: PathBuf,
    /// File name of the panel-ready image inside `dir`
    pub prepared_name: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("capture"),
            state_file: PathBuf::from("config.dat"),
            prepared_name: "img.bmp".into(),
        }
    }
}

/// Complete display device configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub mailbox: MailboxConfig,
    pub timing: DisplayTiming,
    pub pins: PinsConfig,
    pub panel: PanelConfig,
    pub storage: StorageConfig,
}

impl DisplayConfig {
    /// Where the artifact is downloaded to
    pub fn download_path(&self) -> PathBuf {
        self.storage.dir.join(&self.mailbox.artifact)
    }

    /// Where the panel-ready image is written
    pub fn prepared_path(&self) -> PathBuf {
        self.storage.dir.join(&self.storage.prepared_name)
    }
}

/// Parse a TOML document
pub fn parse(text: &str) -> Result<DisplayConfig> {
    toml::from_str(text).context("invalid display config")
}

/// Override path from the command line or environment
pub fn override_path() -> Option<PathBuf> {
    env::args_os()
        .nth(1)
        .or_else(|| env::var_os(CONFIG_ENV))
        .map(PathBuf::from)
}

/// Load the override file if given, else the embedded defaults
pub fn load(path: Option<PathBuf>) -> Result<DisplayConfig> {
    match path {
        Some(path) => {
            let text = fs::read_to_string(&path)
                .with_context(|| format!("reading {}", path.display()))?;
            parse(&text).with_context(|| format!("loading {}", path.display()))
        }
        None => parse(EMBEDDED_CONFIG),
    }
}
