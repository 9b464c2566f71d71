//! GPIO lines through the Linux character device
//!
//! Bias (pull-up/pull-down) is set in the device tree or by the boot
//! config; this module only requests the line direction. Button polarity
//! is applied in software by [`instaframe_hal::Button`].

use linux_embedded_hal::gpio_cdev::{Chip, LineRequestFlags};
use linux_embedded_hal::CdevPin;

use instaframe_hal::adapter::EhPin;

use crate::error::DriverError;

/// Input line usable as an [`instaframe_hal::InputPin`]
pub type CdevInput = EhPin<CdevPin>;

/// Output line usable as an [`instaframe_hal::OutputPin`]
pub type CdevOutput = EhPin<CdevPin>;

fn gpio_error(chip: &str, line: u32) -> impl Fn(String) -> DriverError + '_ {
    move |reason| DriverError::Gpio {
        chip: chip.to_string(),
        line,
        reason,
    }
}

fn request(
    chip_path: &str,
    line: u32,
    flags: LineRequestFlags,
    default: u8,
    label: &str,
) -> Result<CdevPin, DriverError> {
    let err = gpio_error(chip_path, line);

    let mut chip = Chip::new(chip_path).map_err(|e| err(e.to_string()))?;
    let handle = chip
        .get_line(line)
        .map_err(|e| err(e.to_string()))?
        .request(flags, default, label)
        .map_err(|e| err(e.to_string()))?;
    CdevPin::new(handle).map_err(|e| err(e.to_string()))
}

/// Request `line` on `chip_path` as an input
pub fn open_input(chip_path: &str, line: u32, label: &str) -> Result<CdevInput, DriverError> {
    let pin = request(chip_path, line, LineRequestFlags::INPUT, 0, label)?;
    Ok(EhPin::new(pin))
}

/// Request `line` on `chip_path` as an output, driven to `initial`
pub fn open_output(
    chip_path: &str,
    line: u32,
    initial: bool,
    label: &str,
) -> Result<CdevOutput, DriverError> {
    let pin = request(
        chip_path,
        line,
        LineRequestFlags::OUTPUT,
        u8::from(initial),
        label,
    )?;
    Ok(EhPin::new(pin))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_chip_reports_line() {
        let err = open_input("/dev/instaframe-no-such-chip", 21, "test").err().unwrap();
        match err {
            DriverError::Gpio { chip, line, .. } => {
                assert_eq!(chip, "/dev/instaframe-no-such-chip");
                assert_eq!(line, 21);
            }
            other => panic!("unexpected error {other}"),
        }
    }
}
