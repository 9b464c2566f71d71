//! Network provisioning codes

pub mod wifi;

pub use wifi::{parse_wifi_payload, PayloadError, WifiAuth, WifiCredentials};
