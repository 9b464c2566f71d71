//! In-process mailbox
//!
//! Behaves like the remote mailbox: whole-file overwrite, modification
//! times taken from a settable clock, `NotFound` for absent files. Clones
//! share state, so a capture-side client and a display-side client built
//! from the same [`MemoryMailbox`] see each other's writes.

use std::collections::HashMap;
use std::io;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::error::MailboxError;
use crate::transport::{MailboxSession, MailboxTransport};

#[derive(Debug, Clone)]
struct StoredFile {
    bytes: Vec<u8>,
    modified: f64,
}

#[derive(Debug, Default)]
struct Inner {
    files: HashMap<String, StoredFile>,
    clock: f64,
    offline: bool,
    failing_logins: u32,
    failing_puts: u32,
    failing_deletes: u32,
    login_attempts: u32,
    put_attempts: u32,
}

/// Shared in-memory mailbox
#[derive(Debug, Clone, Default)]
pub struct MemoryMailbox {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryMailbox {
    /// Create an empty mailbox with the clock at zero
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Set the time stamped on subsequent puts
    pub fn set_clock(&self, seconds: f64) {
        self.lock().clock = seconds;
    }

    /// Place a file directly, bypassing sessions
    pub fn store(&self, name: &str, bytes: Vec<u8>, modified: f64) {
        self.lock()
            .files
            .insert(name.to_string(), StoredFile { bytes, modified });
    }

    /// Check if a file exists
    pub fn contains(&self, name: &str) -> bool {
        self.lock().files.contains_key(name)
    }

    /// Modification time of a file
    pub fn modified(&self, name: &str) -> Option<f64> {
        self.lock().files.get(name).map(|f| f.modified)
    }

    /// Contents of a file
    pub fn bytes(&self, name: &str) -> Option<Vec<u8>> {
        self.lock().files.get(name).map(|f| f.bytes.clone())
    }

    /// Refuse every login while set
    pub fn set_offline(&self, offline: bool) {
        self.lock().offline = offline;
    }

    /// Fail the next `n` logins
    pub fn fail_next_logins(&self, n: u32) {
        self.lock().failing_logins = n;
    }

    /// Fail the next `n` puts
    pub fn fail_next_puts(&self, n: u32) {
        self.lock().failing_puts = n;
    }

    /// Fail the next `n` deletes
    pub fn fail_next_deletes(&self, n: u32) {
        self.lock().failing_deletes = n;
    }

    /// Logins attempted so far, including failed ones
    pub fn login_attempts(&self) -> u32 {
        self.lock().login_attempts
    }

    /// Puts attempted so far, including failed ones
    pub fn put_attempts(&self) -> u32 {
        self.lock().put_attempts
    }
}

fn unreachable_host() -> MailboxError {
    MailboxError::Connect {
        host: "memory".into(),
        source: io::Error::new(io::ErrorKind::ConnectionRefused, "mailbox offline"),
    }
}

/// Take one from a failure budget, reporting whether it was non-zero
fn consume_failure(budget: &mut u32) -> bool {
    if *budget > 0 {
        *budget -= 1;
        true
    } else {
        false
    }
}

impl MailboxTransport for MemoryMailbox {
    type Session = MemorySession;

    fn login(&self) -> Result<MemorySession, MailboxError> {
        let mut inner = self.lock();
        inner.login_attempts += 1;
        if inner.offline || consume_failure(&mut inner.failing_logins) {
            return Err(unreachable_host());
        }
        Ok(MemorySession {
            mailbox: self.clone(),
        })
    }
}

/// Session against a [`MemoryMailbox`]
#[derive(Debug)]
pub struct MemorySession {
    mailbox: MemoryMailbox,
}

impl MailboxSession for MemorySession {
    fn stat_modified_time(&mut self, name: &str) -> Result<f64, MailboxError> {
        self.mailbox
            .modified(name)
            .ok_or_else(|| MailboxError::NotFound(name.to_string()))
    }

    fn put(&mut self, name: &str, bytes: &[u8]) -> Result<(), MailboxError> {
        let mut inner = self.mailbox.lock();
        inner.put_attempts += 1;
        if consume_failure(&mut inner.failing_puts) {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "put interrupted").into());
        }
        let modified = inner.clock;
        inner.files.insert(
            name.to_string(),
            StoredFile {
                bytes: bytes.to_vec(),
                modified,
            },
        );
        Ok(())
    }

    fn get(&mut self, name: &str) -> Result<Vec<u8>, MailboxError> {
        self.mailbox
            .bytes(name)
            .ok_or_else(|| MailboxError::NotFound(name.to_string()))
    }

    fn delete(&mut self, name: &str) -> Result<(), MailboxError> {
        let mut inner = self.mailbox.lock();
        if consume_failure(&mut inner.failing_deletes) {
            return Err(MailboxError::Reply {
                code: 450,
                text: "file busy".into(),
            });
        }
        inner
            .files
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| MailboxError::NotFound(name.to_string()))
    }

    fn close(self) -> Result<(), MailboxError> {
        Ok(())
    }
}
