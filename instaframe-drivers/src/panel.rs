//! E-ink panel driven through a helper command
//!
//! The helper wraps the panel vendor's driver and accepts one subcommand
//! per invocation:
//!
//! - `display <bmp>` - init, clear, draw the image
//! - `clear` - init, clear
//! - `sleep` - enter deep sleep
//!
//! Callers are expected to follow every `display`/`clear` with `sleep`.

use std::path::Path;

use log::debug;
use serde::Deserialize;

use instaframe_core::traits::Panel;

use crate::command;
use crate::error::DriverError;

/// Panel helper configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PanelConfig {
    /// Helper program
    pub program: String,
    /// Arguments placed before the subcommand
    pub args: Vec<String>,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            program: "epd5in65f".into(),
            args: Vec::new(),
        }
    }
}

/// Panel backed by the helper command
pub struct CommandPanel {
    config: PanelConfig,
}

impl CommandPanel {
    /// Create a panel driver
    pub fn new(config: PanelConfig) -> Self {
        Self { config }
    }

    fn invoke(&self, subcommand: &[&str]) -> Result<(), DriverError> {
        let args = self
            .config
            .args
            .iter()
            .map(String::as_str)
            .chain(subcommand.iter().copied());
        command::run(&self.config.program, args)?;
        debug!("panel {}", subcommand.join(" "));
        Ok(())
    }
}

impl Panel for CommandPanel {
    type Error = DriverError;

    fn render(&mut self, prepared: &Path) -> Result<(), DriverError> {
        let path = prepared.display().to_string();
        self.invoke(&["display", &path])
    }

    fn clear(&mut self) -> Result<(), DriverError> {
        self.invoke(&["clear"])
    }

    fn sleep(&mut self) -> Result<(), DriverError> {
        self.invoke(&["sleep"])
    }
}
