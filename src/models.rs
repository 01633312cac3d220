use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether a request is transmitted or stored as a draft
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DispatchMode {
    #[default]
    Send,
    Draft,
}

/// A normalized outgoing email
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailRequest {
    pub to: Vec<String>,
    pub subject: String,
    pub body: String,
    pub cc: Option<Vec<String>>,
    pub bcc: Option<Vec<String>>,
    pub html_body: Option<String>,
    pub mode: DispatchMode,
}

impl EmailRequest {
    pub fn new(to: Vec<String>, subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            to,
            subject: subject.into(),
            body: body.into(),
            cc: None,
            bcc: None,
            html_body: None,
            mode: DispatchMode::Send,
        }
    }

    /// Recipients joined the way they appear in a `To:` header
    pub fn recipient_line(&self) -> String {
        self.to.join(", ")
    }

    pub fn is_draft(&self) -> bool {
        self.mode == DispatchMode::Draft
    }
}

/// One line of the sent-mail audit log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditLogEntry {
    pub timestamp: DateTime<Utc>,
    pub recipient: String,
    pub subject: String,
}

impl AuditLogEntry {
    pub fn new(recipient: impl Into<String>, subject: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            recipient: recipient.into(),
            subject: subject.into(),
        }
    }
}

/// Line breaks would split one entry over several lines
fn single_line(value: &str) -> String {
    value.replace(['\r', '\n'], " ")
}

impl fmt::Display for AuditLogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} | To: {} | Subject: {}",
            self.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true),
            single_line(&self.recipient),
            single_line(&self.subject)
        )
    }
}
