//! Common test utilities and fixtures

#![allow(dead_code)]

use gmail_hotkey_sender::auth::AuthProvider;
use gmail_hotkey_sender::error::Result;
use gmail_hotkey_sender::extension::{Host, ScriptAction, Tab};
use gmail_hotkey_sender::models::{DispatchMode, EmailRequest};
use gmail_hotkey_sender::transport::MailTransport;
use gmail_hotkey_sender::{AuditLog, Config, EmailDispatcher};
use mockall::mock;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Create a send request with one recipient
pub fn create_test_request(to: &str, subject: &str, body: &str) -> EmailRequest {
    EmailRequest::new(vec![to.to_string()], subject, body)
}

/// Create a draft request with one recipient
pub fn create_draft_request(to: &str, subject: &str, body: &str) -> EmailRequest {
    let mut request = create_test_request(to, subject, body);
    request.mode = DispatchMode::Draft;
    request
}

/// Audit log location inside a temp dir
pub fn audit_log_path(dir: &TempDir) -> PathBuf {
    dir.path().join("logs").join("sent_emails.log")
}

/// Read the audit log, empty when it was never created
pub async fn read_audit_lines(path: &Path) -> Vec<String> {
    match tokio::fs::read_to_string(path).await {
        Ok(content) => content.lines().map(str::to_string).collect(),
        Err(_) => Vec::new(),
    }
}

/// Dispatcher over mocks, auditing into `dir`
pub fn create_dispatcher(
    auth: MockAuth,
    transport: MockTransport,
    config: &Config,
    dir: &TempDir,
) -> EmailDispatcher {
    EmailDispatcher::new(
        Box::new(auth),
        Box::new(transport),
        config,
        AuditLog::new(audit_log_path(dir)),
    )
}

/// Auth mock that always reports ready
pub fn ready_auth() -> MockAuth {
    let mut auth = MockAuth::new();
    auth.expect_ensure_authenticated().returning(|| true);
    auth
}

pub fn gmail_tab(id: u32) -> Tab {
    Tab {
        id,
        url: Some("https://mail.google.com/mail/u/0/#inbox".to_string()),
    }
}

pub fn other_tab(id: u32) -> Tab {
    Tab {
        id,
        url: Some("https://example.com/".to_string()),
    }
}

mock! {
    pub Auth {}

    #[async_trait::async_trait]
    impl AuthProvider for Auth {
        async fn ensure_authenticated(&self) -> bool;
    }
}

mock! {
    pub Transport {}

    #[async_trait::async_trait]
    impl MailTransport for Transport {
        async fn deliver(&self, request: &EmailRequest) -> Result<()>;
        async fn save_draft(&self, request: &EmailRequest) -> Result<()>;
    }
}

mock! {
    pub Host {}

    #[async_trait::async_trait]
    impl Host for Host {
        async fn active_tab(&self) -> Result<Option<Tab>>;
        async fn execute_script(&self, tab_id: u32, action: ScriptAction) -> Result<()>;
        async fn open_tab(&self, url: &str) -> Result<()>;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_test_request() {
        let request = create_test_request("a@x.com", "Hi", "Hello");
        assert_eq!(request.to, vec!["a@x.com"]);
        assert_eq!(request.mode, DispatchMode::Send);
    }

    #[test]
    fn test_create_draft_request() {
        assert!(create_draft_request("a@x.com", "Hi", "Hello").is_draft());
    }

    #[test]
    fn test_tabs() {
        assert!(gmail_tab(1).is_gmail());
        assert!(!other_tab(2).is_gmail());
    }
}
