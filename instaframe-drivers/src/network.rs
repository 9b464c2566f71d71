//! Wi-Fi provisioning through wpa_supplicant
//!
//! The supplicant file is replaced wholesale with a single network block
//! rather than appended to; the new network is the only one the camera
//! needs to know about. `wpa_cli reconfigure` makes the running
//! supplicant reload it.

use std::fs;
use std::path::PathBuf;

use log::info;
use serde::Deserialize;

use instaframe_core::provisioning::{WifiAuth, WifiCredentials};
use instaframe_core::traits::NetworkProvisioner;

use crate::command;
use crate::error::DriverError;

/// Provisioning configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Supplicant config file to overwrite
    pub wpa_supplicant_path: PathBuf,
    /// Wireless interface
    pub interface: String,
    /// Regulatory country code
    pub country: String,
    /// Program asked to reload the config
    pub reload_program: String,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            wpa_supplicant_path: PathBuf::from("/etc/wpa_supplicant/wpa_supplicant.conf"),
            interface: "wlan0".into(),
            country: "NL".into(),
            reload_program: "wpa_cli".into(),
        }
    }
}

/// Writes credentials into wpa_supplicant.conf and reloads it
pub struct WpaSupplicantProvisioner {
    config: NetworkConfig,
}

impl WpaSupplicantProvisioner {
    /// Create a provisioner
    pub fn new(config: NetworkConfig) -> Self {
        Self { config }
    }

    /// Render the complete supplicant file for `credentials`
    pub fn render(&self, credentials: &WifiCredentials) -> String {
        let mut lines = vec![
            "ctrl_interface=DIR=/var/run/wpa_supplicant GROUP=netdev".to_string(),
            "update_config=1".to_string(),
            format!("country={}", self.config.country),
            String::new(),
            "network={".to_string(),
            format!("\tssid={}", ssid_value(&credentials.ssid)),
        ];
        match (credentials.auth, credentials.password.as_deref()) {
            (WifiAuth::Wpa, Some(password)) => lines.push(format!("\tpsk=\"{password}\"")),
            (WifiAuth::Wep, Some(password)) => lines.extend([
                "\tkey_mgmt=NONE".to_string(),
                format!("\twep_key0=\"{password}\""),
                "\twep_tx_keyidx=0".to_string(),
            ]),
            _ => lines.push("\tkey_mgmt=NONE".to_string()),
        }
        lines.push("}".to_string());

        let mut out = lines.join("\n");
        out.push('\n');
        out
    }
}

/// Quoted SSID, or hex when quoting would be ambiguous
fn ssid_value(ssid: &str) -> String {
    if ssid.chars().all(|c| (c.is_ascii_graphic() && c != '"') || c == ' ') {
        format!("\"{ssid}\"")
    } else {
        ssid.bytes().map(|b| format!("{b:02x}")).collect()
    }
}

impl NetworkProvisioner for WpaSupplicantProvisioner {
    type Error = DriverError;

    fn apply_credentials(&mut self, credentials: &WifiCredentials) -> Result<(), DriverError> {
        fs::write(&self.config.wpa_supplicant_path, self.render(credentials))?;
        command::run(
            &self.config.reload_program,
            ["-i", self.config.interface.as_str(), "reconfigure"],
        )?;
        info!("joined wifi network {}", credentials.ssid);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use instaframe_core::provisioning::parse_wifi_payload;

    #[test]
    fn test_wpa_network_block() {
        let provisioner = WpaSupplicantProvisioner::new(NetworkConfig::default());
        let creds = parse_wifi_payload("WIFI:S:Home Net;T:WPA;P:hunter22;;").unwrap();
        let file = provisioner.render(&creds);

        assert!(file.starts_with("ctrl_interface=DIR=/var/run/wpa_supplicant GROUP=netdev\n"));
        assert!(file.contains("country=NL\n"));
        assert!(file.contains("\tssid=\"Home Net\"\n"));
        assert!(file.contains("\tpsk=\"hunter22\"\n"));
        assert!(!file.contains("key_mgmt"));
    }

    #[test]
    fn test_open_network_block() {
        let provisioner = WpaSupplicantProvisioner::new(NetworkConfig::default());
        let creds = parse_wifi_payload("WIFI:S:Guest;T:nopass;;").unwrap();
        let file = provisioner.render(&creds);
        assert!(file.contains("\tkey_mgmt=NONE\n"));
        assert!(!file.contains("psk"));
    }

    #[test]
    fn test_awkward_ssid_is_hex() {
        assert_eq!(ssid_value("a\"b"), "612262");
        assert_eq!(ssid_value("plain"), "\"plain\"");
    }

    #[test]
    fn test_apply_writes_and_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wpa_supplicant.conf");
        let mut provisioner = WpaSupplicantProvisioner::new(NetworkConfig {
            wpa_supplicant_path: path.clone(),
            reload_program: "true".into(),
            ..Default::default()
        });
        let creds = parse_wifi_payload("WIFI:S:Home;P:pw123456;;").unwrap();

        provisioner.apply_credentials(&creds).unwrap();
        assert!(fs::read_to_string(&path).unwrap().contains("ssid=\"Home\""));
    }

    #[test]
    fn test_reload_failure_surfaces() {
        let dir = tempfile::tempdir().unwrap();
        let mut provisioner = WpaSupplicantProvisioner::new(NetworkConfig {
            wpa_supplicant_path: dir.path().join("wpa_supplicant.conf"),
            reload_program: "false".into(),
            ..Default::default()
        });
        let creds = parse_wifi_payload("WIFI:S:Home;P:pw123456;;").unwrap();
        assert!(provisioner.apply_credentials(&creds).is_err());
    }
}
