//! Wi-Fi QR payload parsing
//!
//! Payload format (as produced by phone "share network" screens):
//!
//! ```text
//! WIFI:S:<ssid>;T:<WPA|WEP|nopass>;P:<password>;H:<true|false>;;
//! ```
//!
//! Fields may appear in any order. `\`, `;`, `,`, `:` and `"` inside a
//! value are escaped with a backslash.

use heapless::String;

/// Maximum SSID length in bytes (802.11)
pub const MAX_SSID_LEN: usize = 32;

/// Maximum WPA passphrase length in bytes
pub const MAX_PASSWORD_LEN: usize = 63;

const PREFIX: &str = "WIFI:";

/// Errors from payload parsing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadError {
    /// Not a `WIFI:` payload
    NotWifi,
    /// No SSID field, or an empty one
    MissingSsid,
    /// A field exceeds its size limit
    FieldTooLong,
}

/// Network authentication type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WifiAuth {
    /// WPA/WPA2 personal
    Wpa,
    /// Legacy WEP
    Wep,
    /// Open network
    Open,
}

/// Credentials decoded from a provisioning code
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WifiCredentials {
    /// Network name
    pub ssid: String<MAX_SSID_LEN>,
    /// Passphrase (None for open networks)
    pub password: Option<String<MAX_PASSWORD_LEN>>,
    /// Authentication type
    pub auth: WifiAuth,
}

impl WifiCredentials {
    /// Check if the network needs no passphrase
    pub fn is_open(&self) -> bool {
        self.auth == WifiAuth::Open || self.password.is_none()
    }
}

/// Parse a decoded code into Wi-Fi credentials
pub fn parse_wifi_payload(payload: &str) -> Result<WifiCredentials, PayloadError> {
    let body = payload
        .trim()
        .strip_prefix(PREFIX)
        .ok_or(PayloadError::NotWifi)?;

    let mut ssid: Option<String<MAX_SSID_LEN>> = None;
    let mut password: Option<String<MAX_PASSWORD_LEN>> = None;
    let mut auth: Option<WifiAuth> = None;

    let mut start = 0;
    let mut escaped = false;
    for (i, byte) in body.bytes().enumerate() {
        if escaped {
            escaped = false;
            continue;
        }
        match byte {
            b'\\' => escaped = true,
            b';' => {
                apply_field(&body[start..i], &mut ssid, &mut password, &mut auth)?;
                start = i + 1;
            }
            _ => {}
        }
    }
    if start < body.len() {
        apply_field(&body[start..], &mut ssid, &mut password, &mut auth)?;
    }

    let ssid = ssid
        .filter(|s| !s.is_empty())
        .ok_or(PayloadError::MissingSsid)?;
    let password = password.filter(|p| !p.is_empty());
    let auth = match (auth, &password) {
        (Some(WifiAuth::Open), _) => WifiAuth::Open,
        (Some(kind), Some(_)) => kind,
        (None, Some(_)) => WifiAuth::Wpa,
        (_, None) => WifiAuth::Open,
    };
    let password = if auth == WifiAuth::Open { None } else { password };

    Ok(WifiCredentials {
        ssid,
        password,
        auth,
    })
}

fn apply_field(
    field: &str,
    ssid: &mut Option<String<MAX_SSID_LEN>>,
    password: &mut Option<String<MAX_PASSWORD_LEN>>,
    auth: &mut Option<WifiAuth>,
) -> Result<(), PayloadError> {
    let Some((key, value)) = field.split_once(':') else {
        return Ok(());
    };

    match key {
        "S" => *ssid = Some(unescape(value)?),
        "P" => *password = Some(unescape(value)?),
        "T" => {
            *auth = Some(match value {
                v if v.eq_ignore_ascii_case("nopass") || v.is_empty() => WifiAuth::Open,
                v if v.eq_ignore_ascii_case("WEP") => WifiAuth::Wep,
                _ => WifiAuth::Wpa,
            })
        }
        // Hidden flag and unknown keys are irrelevant for joining
        _ => {}
    }
    Ok(())
}

fn unescape<const N: usize>(value: &str) -> Result<String<N>, PayloadError> {
    let mut out = String::new();
    let mut escaped = false;
    for c in value.chars() {
        if c == '\\' && !escaped {
            escaped = true;
            continue;
        }
        escaped = false;
        out.push(c).map_err(|_| PayloadError::FieldTooLong)?;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phone_share_payload() {
        let creds = parse_wifi_payload("WIFI:S:HomeNet;T:WPA;P:hunter22;;").unwrap();
        assert_eq!(creds.ssid.as_str(), "HomeNet");
        assert_eq!(creds.password.as_deref(), Some("hunter22"));
        assert_eq!(creds.auth, WifiAuth::Wpa);
        assert!(!creds.is_open());
    }

    #[test]
    fn test_field_order_does_not_matter() {
        let creds = parse_wifi_payload("WIFI:T:WPA;P:secret;S:Cafe;H:false;;").unwrap();
        assert_eq!(creds.ssid.as_str(), "Cafe");
        assert_eq!(creds.password.as_deref(), Some("secret"));
    }

    #[test]
    fn test_escaped_separators() {
        let creds = parse_wifi_payload(r"WIFI:S:my\;net;P:pa\:ss\\word;;").unwrap();
        assert_eq!(creds.ssid.as_str(), "my;net");
        assert_eq!(creds.password.as_deref(), Some(r"pa:ss\word"));
    }

    #[test]
    fn test_open_network() {
        let creds = parse_wifi_payload("WIFI:S:Guest;T:nopass;P:;;").unwrap();
        assert_eq!(creds.auth, WifiAuth::Open);
        assert_eq!(creds.password, None);
        assert!(creds.is_open());
    }

    #[test]
    fn test_not_wifi() {
        assert_eq!(
            parse_wifi_payload("https://example.com"),
            Err(PayloadError::NotWifi)
        );
    }

    #[test]
    fn test_missing_ssid() {
        assert_eq!(
            parse_wifi_payload("WIFI:T:WPA;P:secret;;"),
            Err(PayloadError::MissingSsid)
        );
    }

    #[test]
    fn test_ssid_too_long() {
        let payload = "WIFI:S:0123456789012345678901234567890123;P:x;;";
        assert_eq!(parse_wifi_payload(payload), Err(PayloadError::FieldTooLong));
    }
}
