//! Mailbox client
//!
//! Wraps a [`MailboxTransport`] with the two halves of the protocol:
//!
//! - capture side: [`MailboxClient::upload_with_retry`] stores the artifact,
//!   overwriting whatever was there, retrying per [`RetryPolicy`]
//! - display side: [`SyncSession::probe`] reports the artifact's freshness
//!   and [`SyncSession::consume`] downloads it and deletes the remote copy

use std::fs;
use std::path::Path;

use log::{debug, error, info, warn};

use instaframe_core::retry::RetryPolicy;
use instaframe_core::traits::Clock;

use crate::error::{MailboxError, TransportErrorKind};
use crate::transport::{MailboxSession, MailboxTransport};

/// Outcome of a freshness probe
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Probe {
    /// Artifact present with this modification time
    Found(f64),
    /// Slot empty
    NotFound,
    /// Probe failed; treated like an empty slot by callers
    TransportError(TransportErrorKind),
}

impl Probe {
    /// Modification time if an artifact was found
    pub fn timestamp(&self) -> Option<f64> {
        match self {
            Probe::Found(ts) => Some(*ts),
            _ => None,
        }
    }
}

/// Result of a successful download
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Consumed {
    /// Bytes written locally
    pub bytes: usize,
    /// The remote copy was removed
    ///
    /// False means the delete failed after the download; the artifact may
    /// be seen again on the next poll.
    pub remote_deleted: bool,
}

/// Client for the single-slot mailbox
pub struct MailboxClient<T> {
    transport: T,
    artifact: String,
    policy: RetryPolicy,
    backoff_ms: u64,
}

impl<T: MailboxTransport> MailboxClient<T> {
    /// Create a client for the given well-known artifact name
    pub fn new(transport: T, artifact: impl Into<String>) -> Self {
        Self {
            transport,
            artifact: artifact.into(),
            policy: RetryPolicy::Forever,
            backoff_ms: instaframe_core::config::DEFAULT_UPLOAD_BACKOFF_MS,
        }
    }

    /// Set the upload retry policy and backoff
    pub fn with_retry(mut self, policy: RetryPolicy, backoff_ms: u64) -> Self {
        self.policy = policy;
        self.backoff_ms = backoff_ms;
        self
    }

    /// Get the artifact name
    pub fn artifact(&self) -> &str {
        &self.artifact
    }

    /// Get the upload retry policy
    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Open a session for one synchronization attempt
    pub fn open(&self) -> Result<SyncSession<'_, T::Session>, MailboxError> {
        let session = self.transport.login()?;
        Ok(SyncSession {
            session,
            artifact: &self.artifact,
        })
    }

    /// Upload the file at `path` as the artifact, retrying per policy
    ///
    /// Returns true once a put succeeds. Under [`RetryPolicy::Forever`]
    /// this only returns false if the local file cannot be read; it blocks
    /// for as long as the mailbox stays unreachable. Every failed attempt
    /// that is retried is followed by one backoff on `clock`.
    pub fn upload_with_retry<C: Clock>(&self, path: &Path, clock: &C) -> bool {
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(source) => {
                let err = MailboxError::LocalFile {
                    path: path.to_path_buf(),
                    source,
                };
                error!("cannot upload: {err}");
                return false;
            }
        };

        let mut failures: u32 = 0;
        loop {
            match self.put_once(&bytes) {
                Ok(()) => {
                    if failures > 0 {
                        info!("upload succeeded after {} failed attempts", failures);
                    }
                    return true;
                }
                Err(err) => {
                    failures = failures.saturating_add(1);
                    if !self.policy.should_retry(failures) {
                        error!("error while uploading (again), cancelling: {err}");
                        return false;
                    }
                    match self.policy {
                        RetryPolicy::Forever => {
                            warn!("error while uploading, trying forever: {err}")
                        }
                        RetryPolicy::Once => warn!("error while uploading, trying again: {err}"),
                    }
                    clock.sleep_ms(self.backoff_ms);
                }
            }
        }
    }

    /// One complete upload attempt: login, put, close
    fn put_once(&self, bytes: &[u8]) -> Result<(), MailboxError> {
        let mut session = self.transport.login()?;
        session.put(&self.artifact, bytes)?;
        debug!("stored {} bytes as {}", bytes.len(), self.artifact);
        if let Err(err) = session.close() {
            debug!("close after upload failed: {err}");
        }
        Ok(())
    }
}

/// One open session bound to the artifact name
pub struct SyncSession<'a, S> {
    session: S,
    artifact: &'a str,
}

impl<S: MailboxSession> SyncSession<'_, S> {
    /// Report whether the artifact exists and how new it is
    pub fn probe(&mut self) -> Probe {
        match self.session.stat_modified_time(self.artifact) {
            Ok(ts) => Probe::Found(ts),
            Err(err) if err.is_not_found() => Probe::NotFound,
            Err(err) => {
                debug!("modification time check failed: {err}");
                Probe::TransportError(err.kind())
            }
        }
    }

    /// Download the artifact to `dest`, then delete the remote copy
    pub fn consume(&mut self, dest: &Path) -> Result<Consumed, MailboxError> {
        let bytes = self.session.get(self.artifact)?;
        fs::write(dest, &bytes).map_err(|source| MailboxError::LocalFile {
            path: dest.to_path_buf(),
            source,
        })?;
        debug!("downloaded {} bytes to {}", bytes.len(), dest.display());

        let remote_deleted = match self.session.delete(self.artifact) {
            Ok(()) => true,
            Err(err) => {
                warn!("error while deleting {} from mailbox: {err}", self.artifact);
                false
            }
        };

        Ok(Consumed {
            bytes: bytes.len(),
            remote_deleted,
        })
    }

    /// Delete the remote copy without downloading it
    pub fn discard(&mut self) -> Result<(), MailboxError> {
        self.session.delete(self.artifact)
    }

    /// End the session
    pub fn close(self) -> Result<(), MailboxError> {
        self.session.close()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    use crate::memory::MemoryMailbox;

    const NAME: &str = "img.jpg";
    const BACKOFF_MS: u64 = 600;

    /// Clock that only moves when slept on
    #[derive(Default)]
    struct StepClock(Cell<u64>);

    impl Clock for StepClock {
        fn now_ms(&self) -> u64 {
            self.0.get()
        }

        fn sleep_ms(&self, ms: u64) {
            self.0.set(self.0.get() + ms);
        }
    }

    fn client(mailbox: &MemoryMailbox, policy: RetryPolicy) -> MailboxClient<MemoryMailbox> {
        MailboxClient::new(mailbox.clone(), NAME).with_retry(policy, BACKOFF_MS)
    }

    fn upload(mailbox: &MemoryMailbox, policy: RetryPolicy, path: &Path) -> (bool, u64) {
        let clock = StepClock::default();
        let uploaded = client(mailbox, policy).upload_with_retry(path, &clock);
        (uploaded, clock.now_ms())
    }

    fn photo(dir: &tempfile::TempDir) -> std::path::PathBuf {
        let path = dir.path().join("prepared.jpg");
        fs::write(&path, b"jpeg bytes").unwrap();
        path
    }

    #[test]
    fn test_forever_succeeds_after_n_failures() {
        let dir = tempfile::tempdir().unwrap();
        let mailbox = MemoryMailbox::new();
        mailbox.fail_next_puts(7);

        let (uploaded, waited) = upload(&mailbox, RetryPolicy::Forever, &photo(&dir));
        assert!(uploaded);
        assert_eq!(mailbox.put_attempts(), 8);
        assert_eq!(waited, 7 * BACKOFF_MS);
        assert_eq!(mailbox.bytes(NAME).as_deref(), Some(&b"jpeg bytes"[..]));
    }

    #[test]
    fn test_first_attempt_does_not_wait() {
        let dir = tempfile::tempdir().unwrap();
        let mailbox = MemoryMailbox::new();

        assert_eq!(upload(&mailbox, RetryPolicy::Forever, &photo(&dir)), (true, 0));
        assert_eq!(mailbox.put_attempts(), 1);
    }

    #[test]
    fn test_forever_survives_offline_logins() {
        let dir = tempfile::tempdir().unwrap();
        let mailbox = MemoryMailbox::new();
        mailbox.fail_next_logins(3);

        let (uploaded, waited) = upload(&mailbox, RetryPolicy::Forever, &photo(&dir));
        assert!(uploaded);
        assert_eq!(mailbox.login_attempts(), 4);
        assert_eq!(waited, 3 * BACKOFF_MS);
    }

    #[test]
    fn test_once_gives_up_after_two_attempts() {
        let dir = tempfile::tempdir().unwrap();
        let mailbox = MemoryMailbox::new();
        mailbox.fail_next_puts(u32::MAX);

        // Only the retried failure is followed by a backoff
        let (uploaded, waited) = upload(&mailbox, RetryPolicy::Once, &photo(&dir));
        assert!(!uploaded);
        assert_eq!(waited, BACKOFF_MS);
        assert_eq!(mailbox.put_attempts(), 2);
        assert!(!mailbox.contains(NAME));
    }

    #[test]
    fn test_once_recovers_on_second_attempt() {
        let dir = tempfile::tempdir().unwrap();
        let mailbox = MemoryMailbox::new();
        mailbox.fail_next_puts(1);

        assert_eq!(
            upload(&mailbox, RetryPolicy::Once, &photo(&dir)),
            (true, BACKOFF_MS)
        );
        assert_eq!(mailbox.put_attempts(), 2);
    }

    #[test]
    fn test_missing_local_file_fails_without_attempts() {
        let dir = tempfile::tempdir().unwrap();
        let mailbox = MemoryMailbox::new();

        let missing = dir.path().join("gone.jpg");
        assert_eq!(upload(&mailbox, RetryPolicy::Forever, &missing), (false, 0));
        assert_eq!(mailbox.login_attempts(), 0);
    }

    #[test]
    fn test_upload_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let mailbox = MemoryMailbox::new();
        mailbox.store(NAME, b"old".to_vec(), 10.0);
        mailbox.set_clock(20.0);

        assert!(upload(&mailbox, RetryPolicy::Once, &photo(&dir)).0);
        assert_eq!(mailbox.modified(NAME), Some(20.0));
        assert_eq!(mailbox.bytes(NAME).as_deref(), Some(&b"jpeg bytes"[..]));
    }

    #[test]
    fn test_probe_found_and_empty() {
        let mailbox = MemoryMailbox::new();
        let client = client(&mailbox, RetryPolicy::Forever);

        let mut session = client.open().unwrap();
        assert_eq!(session.probe(), Probe::NotFound);
        session.close().unwrap();

        mailbox.store(NAME, b"x".to_vec(), 100.0);
        let mut session = client.open().unwrap();
        assert_eq!(session.probe(), Probe::Found(100.0));
        assert_eq!(session.probe().timestamp(), Some(100.0));
    }

    #[test]
    fn test_consume_deletes_remote() {
        let dir = tempfile::tempdir().unwrap();
        let mailbox = MemoryMailbox::new();
        mailbox.store(NAME, b"frame".to_vec(), 100.0);
        let client = client(&mailbox, RetryPolicy::Forever);

        let dest = dir.path().join("img.jpg");
        let mut session = client.open().unwrap();
        let consumed = session.consume(&dest).unwrap();
        assert_eq!(consumed.bytes, 5);
        assert!(consumed.remote_deleted);
        assert_eq!(session.probe(), Probe::NotFound);
        assert_eq!(fs::read(&dest).unwrap(), b"frame");
    }

    #[test]
    fn test_discard_removes_without_download() {
        let mailbox = MemoryMailbox::new();
        mailbox.store(NAME, b"frame".to_vec(), 100.0);
        mailbox.fail_next_deletes(1);
        let client = client(&mailbox, RetryPolicy::Forever);

        let mut session = client.open().unwrap();
        assert!(session.discard().is_err());
        assert!(mailbox.contains(NAME));
        session.discard().unwrap();
        assert_eq!(session.probe(), Probe::NotFound);
    }

    #[test]
    fn test_consume_missing_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let mailbox = MemoryMailbox::new();
        let client = client(&mailbox, RetryPolicy::Forever);

        let mut session = client.open().unwrap();
        let err = session.consume(&dir.path().join("img.jpg")).unwrap_err();
        assert_eq!(err.kind(), TransportErrorKind::NotFound);
    }
}
