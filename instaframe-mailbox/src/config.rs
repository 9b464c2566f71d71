//! Mailbox connection settings

use std::fmt;
use std::time::Duration;

use serde::Deserialize;

use crate::ftp::FtpTransport;

/// Default control port
pub const DEFAULT_PORT: u16 = 21;

/// Default well-known artifact name
pub const DEFAULT_ARTIFACT: &str = "img.jpg";

/// Default socket timeout
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Connection settings for the remote mailbox
///
/// Shared verbatim between the capture and display configurations so both
/// devices agree on host, account and artifact name.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MailboxConfig {
    /// Server host name or address
    pub host: String,
    /// Control port
    pub port: u16,
    /// Account name
    pub username: String,
    /// Account password
    pub password: String,
    /// Name of the shared artifact file
    pub artifact: String,
    /// Connect/read/write timeout in milliseconds
    pub timeout_ms: u64,
}

impl Default for MailboxConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: DEFAULT_PORT,
            username: String::new(),
            password: String::new(),
            artifact: DEFAULT_ARTIFACT.into(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

impl MailboxConfig {
    /// Socket timeout as a duration
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Build the FTP transport for these settings
    pub fn transport(&self) -> FtpTransport {
        FtpTransport::new(
            self.host.clone(),
            self.port,
            self.username.clone(),
            self.password.clone(),
        )
        .with_timeout(self.timeout())
    }
}

// Keeps the password out of logs.
impl fmt::Debug for MailboxConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MailboxConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("artifact", &self.artifact)
            .field("timeout_ms", &self.timeout_ms)
            .finish()
    }
}
