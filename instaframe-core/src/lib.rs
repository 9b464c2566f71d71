//! Board-agnostic core logic for the Instaframe devices
//!
//! This crate contains all application logic that does not depend on
//! specific hardware or network implementations:
//!
//! - Timing primitives (cooldown windows, blink schedule)
//! - Button edge detection
//! - Capture-side press/cooldown state machine
//! - Display-side freshness record
//! - Upload retry policy
//! - Wi-Fi provisioning payload parsing
//! - Configuration type definitions
//! - Collaborator traits (camera, filter, decoder, provisioning, panel)
//!
//! Time is passed in as milliseconds on a monotonic clock (`now_ms`); the
//! crate never reads a clock itself, which keeps every state machine
//! deterministic under test.

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]

pub mod button;
pub mod capture;
pub mod config;
pub mod provisioning;
pub mod retry;
pub mod sync;
pub mod timing;

#[cfg(feature = "std")]
pub mod traits;
