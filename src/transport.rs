//! Mail transport seam
//!
//! Everything on the wire (MIME construction, provider API calls) lives behind
//! [`MailTransport`]. The crate ships [`ConsoleTransport`], which prints what
//! would be sent until a provider-backed transport is plugged in.

use async_trait::async_trait;

use crate::error::Result;
use crate::models::EmailRequest;

/// Body characters shown in a preview before truncation
const PREVIEW_BODY_CHARS: usize = 100;

/// Capability that performs the provider call for a request
#[async_trait]
pub trait MailTransport: Send + Sync {
    /// Transmit the message
    async fn deliver(&self, request: &EmailRequest) -> Result<()>;

    /// Store the message as a draft without transmitting it
    async fn save_draft(&self, request: &EmailRequest) -> Result<()>;
}

/// Truncate a string to max_len characters, adding "..." if truncated
fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        format!("{}...", s.chars().take(max_len).collect::<String>())
    }
}

/// Human-readable summary of a request
pub fn preview(request: &EmailRequest) -> String {
    let mut lines = vec![format!("To: {}", request.recipient_line())];
    if let Some(cc) = request.cc.as_ref().filter(|cc| !cc.is_empty()) {
        lines.push(format!("Cc: {}", cc.join(", ")));
    }
    if let Some(bcc) = request.bcc.as_ref().filter(|bcc| !bcc.is_empty()) {
        lines.push(format!("Bcc: {}", bcc.join(", ")));
    }
    lines.push(format!("Subject: {}", request.subject));
    lines.push(format!(
        "Body: {}",
        truncate_string(&request.body, PREVIEW_BODY_CHARS)
    ));
    if request.html_body.is_some() {
        lines.push("HTML body: attached".to_string());
    }
    lines.join("\n")
}

/// Prints requests to stdout instead of talking to a provider
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleTransport;

#[async_trait]
impl MailTransport for ConsoleTransport {
    async fn deliver(&self, request: &EmailRequest) -> Result<()> {
        tracing::warn!("No provider transport configured, printing the message instead");
        println!("Would send email:\n{}", preview(request));
        Ok(())
    }

    async fn save_draft(&self, request: &EmailRequest) -> Result<()> {
        tracing::warn!("No provider transport configured, printing the draft instead");
        println!("Would create draft:\n{}", preview(request));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_string() {
        assert_eq!(truncate_string("short", 10), "short");
        assert_eq!(truncate_string("abcdef", 3), "abc...");
        // Counts characters, not bytes
        assert_eq!(truncate_string("ééééé", 2), "éé...");
    }

    #[test]
    fn test_preview_minimal() {
        let request = EmailRequest::new(vec!["a@x.com".to_string()], "Hi", "Hello");
        assert_eq!(preview(&request), "To: a@x.com\nSubject: Hi\nBody: Hello");
    }

    #[test]
    fn test_preview_full() {
        let mut request = EmailRequest::new(vec!["a@x.com".to_string()], "Hi", "x".repeat(150));
        request.cc = Some(vec!["c@x.com".to_string(), "d@x.com".to_string()]);
        request.bcc = Some(vec![]);
        request.html_body = Some("<p>Hello</p>".to_string());

        let text = preview(&request);
        assert!(text.contains("Cc: c@x.com, d@x.com"));
        assert!(!text.contains("Bcc"));
        assert!(text.contains(&format!("Body: {}...", "x".repeat(100))));
        assert!(text.ends_with("HTML body: attached"));
    }

    #[tokio::test]
    async fn test_console_transport_succeeds() {
        let request = EmailRequest::new(vec!["a@x.com".to_string()], "Hi", "Hello");
        assert!(ConsoleTransport.deliver(&request).await.is_ok());
        assert!(ConsoleTransport.save_draft(&request).await.is_ok());
    }
}
