//! Remote mailbox protocol
//!
//! The camera and the frame never talk to each other directly. They share
//! one well-known file in a remote directory (an FTP account in the
//! deployed setup):
//!
//! ```text
//!  capture ──put (overwrite)──▶ [ img.jpg ] ──stat / get / delete──▶ display
//! ```
//!
//! The file's presence and modification time are the only synchronization
//! primitive. Uploads always overwrite; a successful download always
//! deletes, so each artifact is delivered at most once.
//!
//! - [`transport`] - the minimal file-transfer contract
//! - [`client::MailboxClient`] - freshness probe, consume-once download,
//!   upload with retry
//! - [`ftp::FtpTransport`] - passive-mode FTP implementation
//! - [`memory::MemoryMailbox`] - in-process mailbox for tests and bench rigs

#![deny(unsafe_code)]

pub mod client;
pub mod config;
pub mod error;
pub mod ftp;
pub mod mdtm;
pub mod memory;
pub mod transport;

pub use client::{Consumed, MailboxClient, Probe, SyncSession};
pub use config::MailboxConfig;
pub use error::{MailboxError, TransportErrorKind};
pub use ftp::FtpTransport;
pub use memory::MemoryMailbox;
pub use transport::{MailboxSession, MailboxTransport};
