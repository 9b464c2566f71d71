//! Transport contract
//!
//! Any file-oriented service that can authenticate, report a modification
//! time, and store/retrieve/delete whole files can carry the mailbox. A
//! session is opened per synchronization attempt and closed afterwards.

use crate::error::MailboxError;

/// Opens authenticated sessions against the remote mailbox
pub trait MailboxTransport {
    /// Session type produced by [`login`](Self::login)
    type Session: MailboxSession;

    /// Connect and authenticate
    fn login(&self) -> Result<Self::Session, MailboxError>;
}

/// One authenticated session
pub trait MailboxSession {
    /// Remote modification time in seconds since the epoch
    ///
    /// Returns [`MailboxError::NotFound`] when the file is absent.
    fn stat_modified_time(&mut self, name: &str) -> Result<f64, MailboxError>;

    /// Store `bytes` under `name`, replacing any existing file
    fn put(&mut self, name: &str, bytes: &[u8]) -> Result<(), MailboxError>;

    /// Read the whole file
    fn get(&mut self, name: &str) -> Result<Vec<u8>, MailboxError>;

    /// Remove the file
    fn delete(&mut self, name: &str) -> Result<(), MailboxError>;

    /// End the session
    fn close(self) -> Result<(), MailboxError>
    where
        Self: Sized;
}
