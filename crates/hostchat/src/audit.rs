//! The host's chat log.
//!
//! One line per accepted player message:
//!
//! ```text
//! [03/09/24 14:05:07] <Bob/00000000000000b0/10.0.0.2> hello
//! ```
//!
//! Logging is best effort. The relay swallows sink errors after a debug
//! line so a full disk never blocks chat.

use std::fmt;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::net::Ipv4Addr;
use std::path::Path;

use chrono::{DateTime, Utc};
use hostchat_protocol::PlayerUid;

/// One chat log record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEntry<'a> {
    pub timestamp: DateTime<Utc>,
    pub sender: &'a str,
    pub uid: PlayerUid,
    pub address: Ipv4Addr,
    pub body: &'a str,
}

impl fmt::Display for AuditEntry<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] <{}/{}/{}> {}",
            self.timestamp.format("%m/%d/%y %H:%M:%S"),
            self.sender,
            self.uid,
            self.address,
            self.body
        )
    }
}

/// Destination for chat log lines.
pub trait AuditSink: Send {
    /// Appends one entry to the log at `path`.
    fn append(&mut self, path: &Path, entry: &AuditEntry<'_>) -> io::Result<()>;
}

/// Appends to a file on disk, creating it if needed.
///
/// The file is opened per entry so the path can change at runtime.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileAuditSink;

impl AuditSink for FileAuditSink {
    fn append(&mut self, path: &Path, entry: &AuditEntry<'_>) -> io::Result<()> {
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        writeln!(file, "{entry}")
    }
}
