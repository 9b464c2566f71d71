//! Adapters from embedded-hal 1.0 digital pins
//!
//! Lets any `embedded_hal::digital` pin (for example a Linux character
//! device line) stand in for the traits of this crate.

use embedded_hal::digital;

use crate::gpio::{InputPin, OutputPin, PinError};

/// Wraps an embedded-hal pin
pub struct EhPin<P>(pub P);

impl<P> EhPin<P> {
    /// Wrap a pin
    pub fn new(pin: P) -> Self {
        Self(pin)
    }

    /// Unwrap the inner pin
    pub fn into_inner(self) -> P {
        self.0
    }
}

impl<P: digital::InputPin> InputPin for EhPin<P> {
    fn is_high(&mut self) -> Result<bool, PinError> {
        self.0.is_high().map_err(|_| PinError::Read)
    }
}

impl<P: digital::OutputPin> OutputPin for EhPin<P> {
    fn set_high(&mut self) -> Result<(), PinError> {
        self.0.set_high().map_err(|_| PinError::Write)
    }

    fn set_low(&mut self) -> Result<(), PinError> {
        self.0.set_low().map_err(|_| PinError::Write)
    }
}
