//! Instaframe Hardware Abstraction Layer
//!
//! This crate defines the digital I/O traits shared by the capture and
//! display devices. Each device owns exactly one button input, and the
//! capture device additionally owns one indicator light output.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  instaframe-capture / instaframe-display    │
//! └─────────────────────────────────────────────┘
//!                      │
//!                      ▼
//! ┌─────────────────────────────────────────────┐
//! │  instaframe-hal (this crate - traits)       │
//! └─────────────────────────────────────────────┘
//!                      │
//!          ┌───────────┴───────────┐
//!          ▼                       ▼
//! ┌─────────────────┐     ┌─────────────────┐
//! │ embedded-hal    │     │ test mocks      │
//! │ pins (cdev)     │     │                 │
//! └─────────────────┘     └─────────────────┘
//! ```
//!
//! # Traits
//!
//! - [`gpio::OutputPin`], [`gpio::InputPin`] - Digital I/O
//! - [`button::Button`] - Polarity-aware button wrapper

#![no_std]
#![deny(unsafe_code)]

pub mod button;
pub mod gpio;

#[cfg(feature = "embedded-hal")]
pub mod adapter;

pub use button::{Button, Polarity};
pub use gpio::{InputPin, OutputPin, PinError};
