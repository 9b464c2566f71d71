//! Still camera driven through `rpicam-still`
//!
//! Focus is locked at a fixed lens position (dioptres) rather than left on
//! autofocus: it saves power, and autofocus struggles behind the glass disk
//! in front of the lens. 0.4 dioptres is about 2.5m.

use std::path::PathBuf;

use log::debug;
use serde::Deserialize;

use instaframe_core::traits::ImageSensor;

use crate::command;
use crate::error::DriverError;

/// Camera configuration
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Capture program
    pub program: String,
    /// Extra arguments placed before the generated ones
    pub args: Vec<String>,
    /// Manual focus position in dioptres (None = autofocus)
    pub lens_position: Option<f32>,
    /// File name of the raw capture inside the working directory
    pub file_name: String,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            program: "rpicam-still".into(),
            args: Vec::new(),
            lens_position: Some(0.4),
            file_name: "capture.jpg".into(),
        }
    }
}

/// Camera that runs a still-capture command per shot
pub struct StillCommandCamera {
    config: CameraConfig,
    output: PathBuf,
}

impl StillCommandCamera {
    /// Create a camera writing captures into `dir`
    pub fn new(config: CameraConfig, dir: impl Into<PathBuf>) -> Self {
        let output = dir.into().join(&config.file_name);
        Self { config, output }
    }

    fn arguments(&self) -> Vec<String> {
        let mut args = self.config.args.clone();
        args.extend(["--nopreview".into(), "--immediate".into()]);
        if let Some(position) = self.config.lens_position {
            args.extend([
                "--autofocus-mode".into(),
                "manual".into(),
                "--lens-position".into(),
                position.to_string(),
            ]);
        }
        args.extend(["-o".into(), self.output.display().to_string()]);
        args
    }
}

impl ImageSensor for StillCommandCamera {
    type Error = DriverError;

    fn capture_still(&mut self) -> Result<PathBuf, DriverError> {
        command::run(&self.config.program, self.arguments())?;
        if !self.output.is_file() {
            return Err(DriverError::MissingOutput {
                program: self.config.program.clone(),
                path: self.output.clone(),
            });
        }
        debug!("captured {}", self.output.display());
        Ok(self.output.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Shell script that creates the file named by its last argument
    fn touch_last_arg() -> CameraConfig {
        CameraConfig {
            program: "sh".into(),
            args: vec![
                "-c".into(),
                r#"for a in "$@"; do last=$a; done; : > "$last""#.into(),
                "camera".into(),
            ],
            ..Default::default()
        }
    }

    #[test]
    fn test_arguments_lock_focus() {
        let camera = StillCommandCamera::new(CameraConfig::default(), "/tmp/captures");
        let args = camera.arguments();
        let pos = args.iter().position(|a| a == "--lens-position").unwrap();
        assert_eq!(args[pos + 1], "0.4");
        assert_eq!(args.last().unwrap(), "/tmp/captures/capture.jpg");
    }

    #[test]
    fn test_autofocus_when_unset() {
        let config = CameraConfig {
            lens_position: None,
            ..Default::default()
        };
        let camera = StillCommandCamera::new(config, "/tmp");
        assert!(!camera.arguments().iter().any(|a| a == "--lens-position"));
    }

    #[test]
    fn test_capture_returns_written_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut camera = StillCommandCamera::new(touch_last_arg(), dir.path());
        let path = camera.capture_still().unwrap();
        assert_eq!(path, dir.path().join("capture.jpg"));
        assert!(path.is_file());
    }

    #[test]
    fn test_capture_without_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let config = CameraConfig {
            program: "true".into(),
            ..Default::default()
        };
        let mut camera = StillCommandCamera::new(config, dir.path());
        assert!(matches!(
            camera.capture_still(),
            Err(DriverError::MissingOutput { .. })
        ));
    }
}
