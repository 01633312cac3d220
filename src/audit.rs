//! Append-only log of sent emails

use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

use crate::error::Result;
use crate::models::AuditLogEntry;
use crate::paths;

/// Sent-mail history, one line per successful send
///
/// The log is never read back, rotated or truncated.
#[derive(Debug, Clone)]
pub struct AuditLog {
    // None: per-user default, resolved on each append
    path: Option<PathBuf>,
}

impl AuditLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    /// Log at `<home>/.gmail-hotkey-sender/logs/sent_emails.log`
    ///
    /// The home directory is looked up on the first append, so a missing
    /// home only matters when something is actually logged.
    pub fn at_default_location() -> Self {
        Self { path: None }
    }

    /// Explicit path, `None` for the lazily resolved default
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn resolve_path(&self) -> Result<PathBuf> {
        match &self.path {
            Some(path) => Ok(path.clone()),
            None => paths::default_sent_log_path(),
        }
    }

    /// Append an entry timestamped now
    pub async fn append(&self, recipient: &str, subject: &str) -> Result<AuditLogEntry> {
        let entry = AuditLogEntry::new(recipient, subject);
        self.append_entry(&entry).await?;
        Ok(entry)
    }

    pub async fn append_entry(&self, entry: &AuditLogEntry) -> Result<()> {
        let path = self.resolve_path()?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let line = format!("{}\n", entry);
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;

        tracing::debug!("Recorded sent email to {} in {:?}", entry.recipient, path);
        Ok(())
    }
}
