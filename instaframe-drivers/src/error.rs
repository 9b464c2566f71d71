//! Driver error type

use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

/// Errors from the Linux drivers
#[derive(Debug, Error)]
pub enum DriverError {
    /// External program could not be started
    #[error("failed to start {program}: {source}")]
    Spawn {
        /// Program name
        program: String,
        /// Underlying error
        #[source]
        source: io::Error,
    },
    /// External program exited unsuccessfully
    #[error("{program} failed ({status}): {stderr}")]
    Exit {
        /// Program name
        program: String,
        /// Exit status
        status: ExitStatus,
        /// Captured standard error, trimmed
        stderr: String,
    },
    /// External program succeeded but left no output file
    #[error("{program} produced no file at {}", path.display())]
    MissingOutput {
        /// Program name
        program: String,
        /// Expected output path
        path: PathBuf,
    },
    /// GPIO line could not be opened
    #[error("gpio line {line} on {chip}: {reason}")]
    Gpio {
        /// Chip device path
        chip: String,
        /// Line offset
        line: u32,
        /// Failure description
        reason: String,
    },
    /// Image decode/encode failure
    #[error("image processing failed: {0}")]
    Image(#[from] image::ImageError),
    /// Filesystem failure
    #[error("i/o failed: {0}")]
    Io(#[from] io::Error),
}
