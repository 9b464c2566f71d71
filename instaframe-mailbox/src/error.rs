//! Mailbox error types

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Reply code for "not logged in"
const NOT_LOGGED_IN: u16 = 530;

/// Errors from mailbox operations
#[derive(Debug, Error)]
pub enum MailboxError {
    /// Host unreachable or connection refused
    #[error("cannot reach mailbox host {host}: {source}")]
    Connect {
        /// Host that was dialled
        host: String,
        /// Underlying socket error
        #[source]
        source: io::Error,
    },
    /// Server answered with an unexpected reply
    #[error("mailbox replied {code}: {text}")]
    Reply {
        /// Three-digit reply code
        code: u16,
        /// Reply text
        text: String,
    },
    /// The named file does not exist
    #[error("no artifact named {0}")]
    NotFound(String),
    /// Modification time could not be parsed
    #[error("unreadable modification time {0:?}")]
    Timestamp(String),
    /// Socket or stream failure mid-session
    #[error("mailbox i/o failed: {0}")]
    Io(#[from] io::Error),
    /// Local file could not be read or written
    #[error("local file {}: {source}", path.display())]
    LocalFile {
        /// Local path
        path: PathBuf,
        /// Underlying filesystem error
        #[source]
        source: io::Error,
    },
}

/// Coarse classification of a [`MailboxError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    /// Could not connect
    Connect,
    /// Credentials rejected
    Auth,
    /// Unexpected reply or unparsable data
    Protocol,
    /// Stream failure
    Io,
    /// Local filesystem failure
    LocalFile,
    /// File missing
    NotFound,
}

impl MailboxError {
    /// Classify this error
    pub fn kind(&self) -> TransportErrorKind {
        match self {
            MailboxError::Connect { .. } => TransportErrorKind::Connect,
            MailboxError::Reply {
                code: NOT_LOGGED_IN,
                ..
            } => TransportErrorKind::Auth,
            MailboxError::Reply { .. } | MailboxError::Timestamp(_) => {
                TransportErrorKind::Protocol
            }
            MailboxError::NotFound(_) => TransportErrorKind::NotFound,
            MailboxError::Io(_) => TransportErrorKind::Io,
            MailboxError::LocalFile { .. } => TransportErrorKind::LocalFile,
        }
    }

    /// Check if this error means the file is absent
    pub fn is_not_found(&self) -> bool {
        matches!(self, MailboxError::NotFound(_))
    }
}
