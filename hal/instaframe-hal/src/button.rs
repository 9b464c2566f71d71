//! Polarity-aware push button
//!
//! The capture device wires its button against a pull-up (pressed reads
//! low) while the display device wires it against a pull-down (pressed
//! reads high). [`Button`] hides that difference from the controllers.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::gpio::{InputPin, PinError};

/// Electrical polarity of a button input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Polarity {
    /// Pull-up resistor; a closed contact pulls the line low
    ActiveLow,
    /// Pull-down resistor; a closed contact pulls the line high
    ActiveHigh,
}

impl Polarity {
    /// Translate a raw line level into "contact closed"
    pub fn is_pressed(self, line_high: bool) -> bool {
        match self {
            Polarity::ActiveLow => !line_high,
            Polarity::ActiveHigh => line_high,
        }
    }
}

/// A button input with a known polarity
pub struct Button<P> {
    pin: P,
    polarity: Polarity,
}

impl<P: InputPin> Button<P> {
    /// Wrap a pin with the given polarity
    pub fn new(pin: P, polarity: Polarity) -> Self {
        Self { pin, polarity }
    }

    /// Button wired against a pull-up (capture device)
    pub fn pull_up(pin: P) -> Self {
        Self::new(pin, Polarity::ActiveLow)
    }

    /// Button wired against a pull-down (display device)
    pub fn pull_down(pin: P) -> Self {
        Self::new(pin, Polarity::ActiveHigh)
    }

    /// Sample the contact
    pub fn is_pressed(&mut self) -> Result<bool, PinError> {
        let high = self.pin.is_high()?;
        Ok(self.polarity.is_pressed(high))
    }

    /// Get the configured polarity
    pub fn polarity(&self) -> Polarity {
        self.polarity
    }
}
