//! GPIO pin abstractions
//!
//! Provides traits for digital input and output pins. Unlike MCU register
//! access, pins on a Linux host go through a kernel interface and can fail,
//! so every operation returns a `Result`.

/// Errors from pin access
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinError {
    /// Reading the line level failed
    Read,
    /// Driving the line level failed
    Write,
}

impl core::fmt::Display for PinError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            PinError::Read => f.write_str("gpio read failed"),
            PinError::Write => f.write_str("gpio write failed"),
        }
    }
}

/// Digital output pin
pub trait OutputPin {
    /// Set the pin high (logic 1)
    fn set_high(&mut self) -> Result<(), PinError>;

    /// Set the pin low (logic 0)
    fn set_low(&mut self) -> Result<(), PinError>;

    /// Set the pin to a specific state
    fn set_state(&mut self, high: bool) -> Result<(), PinError> {
        if high {
            self.set_high()
        } else {
            self.set_low()
        }
    }
}

/// Digital input pin
///
/// Reads take `&mut self` because sampling a line is an I/O operation on
/// most backends.
pub trait InputPin {
    /// Check if the pin reads high (logic 1)
    fn is_high(&mut self) -> Result<bool, PinError>;

    /// Check if the pin reads low (logic 0)
    fn is_low(&mut self) -> Result<bool, PinError> {
        self.is_high().map(|high| !high)
    }
}
