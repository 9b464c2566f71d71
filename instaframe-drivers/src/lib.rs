//! Linux driver implementations
//!
//! This crate provides concrete implementations of the collaborator traits
//! defined in `instaframe-core` for a Raspberry Pi based camera and frame:
//!
//! - GPIO lines through the Linux character device (`/dev/gpiochip*`)
//! - Still camera via the `rpicam-still` command
//! - QR decoding via `zbarimg`
//! - Wi-Fi provisioning via `wpa_supplicant.conf` + `wpa_cli`
//! - Image preparation for the 7-colour e-ink panel
//! - E-ink panel via a helper command
//! - Monotonic system clock and transient file cleanup
//!
//! The camera, decoder and panel drivers shell out to external programs;
//! each program and its arguments are configurable so tests (and other
//! boards) can substitute their own.

#![deny(unsafe_code)]

pub mod camera;
pub mod clock;
mod command;
pub mod decoder;
pub mod error;
pub mod filter;
pub mod gpio;
pub mod network;
pub mod panel;
pub mod storage;

pub use camera::{CameraConfig, StillCommandCamera};
pub use clock::SystemClock;
pub use decoder::{DecoderConfig, ZbarDecoder};
pub use error::DriverError;
pub use filter::{BmpFilter, EinkFilter, FilterConfig};
pub use gpio::{open_input, open_output, CdevInput, CdevOutput};
pub use network::{NetworkConfig, WpaSupplicantProvisioner};
pub use panel::{CommandPanel, PanelConfig};
