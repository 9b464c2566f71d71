//! External program helpers

use std::ffi::OsStr;
use std::process::{Command, Output};

use log::trace;

use crate::error::DriverError;

/// Run `program` to completion, capturing its output
///
/// Does not inspect the exit status.
pub(crate) fn output<I, S>(program: &str, args: I) -> Result<Output, DriverError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut command = Command::new(program);
    command.args(args);
    trace!("running {:?}", command);
    command.output().map_err(|source| DriverError::Spawn {
        program: program.to_string(),
        source,
    })
}

/// Run `program` to completion, failing on a non-zero exit
pub(crate) fn run<I, S>(program: &str, args: I) -> Result<Output, DriverError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let out = output(program, args)?;
    ensure_success(program, out)
}

/// Turn a non-zero exit into [`DriverError::Exit`]
pub(crate) fn ensure_success(program: &str, out: Output) -> Result<Output, DriverError> {
    if out.status.success() {
        return Ok(out);
    }
    Err(DriverError::Exit {
        program: program.to_string(),
        status: out.status,
        stderr: String::from_utf8_lossy(&out.stderr).trim().to_string(),
    })
}
