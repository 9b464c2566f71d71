//! Configuration types
//!
//! Board-agnostic timing configuration shared by the device binaries,
//! which load it from TOML.

pub mod types;

pub use types::*;
