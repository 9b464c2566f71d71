//! External collaborator traits
//!
//! The controllers drive these and read time through [`Clock`].
//! `instaframe-drivers` implements them for the deployed hardware; tests
//! implement them with mocks.

pub mod camera;
pub mod clock;
pub mod decoder;
pub mod filter;
pub mod network;
pub mod panel;

pub use camera::ImageSensor;
pub use clock::Clock;
pub use decoder::CodeDecoder;
pub use filter::ImageFilter;
pub use network::NetworkProvisioner;
pub use panel::Panel;
