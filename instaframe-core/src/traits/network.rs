//! Network credential provisioning trait

use crate::provisioning::WifiCredentials;

/// Applies Wi-Fi credentials to the host network stack
pub trait NetworkProvisioner {
    /// Error type for provisioning operations
    type Error: core::fmt::Display;

    /// Make the host join the given network
    fn apply_credentials(&mut self, credentials: &WifiCredentials) -> Result<(), Self::Error>;
}
