//! Extension command and message handling against a mocked browser host

mod common;

use gmail_hotkey_sender::extension::state::STATE_KEY;
use gmail_hotkey_sender::extension::{
    ExtensionService, ExtensionState, InstallReason, MemoryStorage, ScriptAction, StateHolder,
    StateStorage,
};
use gmail_hotkey_sender::{AuditLog, Config};
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;

use common::{audit_log_path, gmail_tab, other_tab, read_audit_lines, MockHost};

struct Harness {
    service: ExtensionService,
    storage: Arc<MemoryStorage>,
    dir: TempDir,
}

async fn harness(host: MockHost, recipient: &str) -> Harness {
    let dir = TempDir::new().unwrap();
    let storage = Arc::new(MemoryStorage::new());
    let state = Arc::new(StateHolder::load(storage.clone()).await.unwrap());
    state.install().await.unwrap();
    state
        .update(gmail_hotkey_sender::extension::StatePatch {
            default_recipient: Some(recipient.to_string()),
            ..Default::default()
        })
        .await
        .unwrap();

    let service = ExtensionService::for_host(
        Arc::new(host),
        state,
        &Config::default(),
        AuditLog::new(audit_log_path(&dir)),
    );
    Harness {
        service,
        storage,
        dir,
    }
}

async fn stored_state(storage: &MemoryStorage) -> ExtensionState {
    serde_json::from_value(storage.get(STATE_KEY).await.unwrap().unwrap()).unwrap()
}

fn to_json(response: gmail_hotkey_sender::extension::Response) -> Value {
    serde_json::to_value(response).unwrap()
}

#[tokio::test]
async fn test_install_writes_defaults_and_update_keeps_state() {
    let storage = Arc::new(MemoryStorage::new());
    let state = Arc::new(StateHolder::load(storage.clone()).await.unwrap());
    let service = ExtensionService::for_host(
        Arc::new(MockHost::new()),
        state,
        &Config::default(),
        AuditLog::new("unused.log"),
    );

    service.on_installed(InstallReason::Install).await.unwrap();
    let stored = stored_state(&storage).await;
    assert_eq!(stored, ExtensionState::installed());
    assert_eq!(stored.default_subject, "Quick Message");

    service
        .state()
        .update(gmail_hotkey_sender::extension::StatePatch {
            default_recipient: Some("a@x.com".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    service.on_installed(InstallReason::Update).await.unwrap();
    assert_eq!(stored_state(&storage).await.default_recipient, "a@x.com");
}

#[tokio::test]
async fn test_get_and_update_state_messages() {
    let h = harness(MockHost::new(), "a@x.com").await;

    let state = to_json(h.service.handle_message(&json!({"action": "getState"})).await);
    assert_eq!(state["defaultRecipient"], json!("a@x.com"));
    assert_eq!(state["defaultSubject"], json!("Quick Message"));
    assert_eq!(state["isAuthenticated"], json!(false));

    let response = h
        .service
        .handle_message(&json!({
            "action": "updateState",
            "data": {"defaultSubject": "Standup notes"}
        }))
        .await;
    assert_eq!(to_json(response), json!({"success": true}));

    // Persisted before the response was produced
    let stored = stored_state(&h.storage).await;
    assert_eq!(stored.default_subject, "Standup notes");
    assert_eq!(stored.default_recipient, "a@x.com");
}

#[tokio::test]
async fn test_unknown_action() {
    let h = harness(MockHost::new(), "a@x.com").await;

    let response = h.service.handle_message(&json!({"action": "archive"})).await;
    assert_eq!(to_json(response), json!({"error": "Unknown action"}));
}

#[tokio::test]
async fn test_update_state_with_bad_data_is_a_failure() {
    let h = harness(MockHost::new(), "a@x.com").await;

    let response = to_json(
        h.service
            .handle_message(&json!({
                "action": "updateState",
                "data": {"isAuthenticated": "yes"}
            }))
            .await,
    );

    assert_eq!(response["success"], json!(false));
    assert!(response["error"].as_str().unwrap().contains("updateState"));
    assert_ne!(response, json!({"error": "Unknown action"}));

    // Nothing was written
    let stored = stored_state(&h.storage).await;
    assert!(!stored.is_authenticated);
    assert_eq!(stored.default_recipient, "a@x.com");
}

#[tokio::test]
async fn test_send_email_on_gmail_tab() {
    let mut host = MockHost::new();
    host.expect_active_tab().returning(|| Ok(Some(gmail_tab(7))));
    host.expect_execute_script()
        .withf(|tab_id, action| *tab_id == 7 && *action == ScriptAction::Send)
        .times(1)
        .returning(|_, _| Ok(()));
    host.expect_open_tab().never();

    let h = harness(host, "a@x.com").await;
    let response = h.service.handle_message(&json!({"action": "sendEmail"})).await;
    assert_eq!(to_json(response), json!({"success": true}));

    let stored = stored_state(&h.storage).await;
    assert!(stored.is_authenticated);
    let sent = stored.last_sent_email.unwrap();
    assert_eq!(sent.recipient, "a@x.com");
    assert_eq!(sent.subject, "Quick Message");

    let lines = read_audit_lines(&audit_log_path(&h.dir)).await;
    assert_eq!(lines.len(), 1);
    assert!(lines[0].ends_with("| To: a@x.com | Subject: Quick Message"));
}

#[tokio::test]
async fn test_compose_email_fills_gmail_tab() {
    let mut host = MockHost::new();
    host.expect_active_tab().returning(|| Ok(Some(gmail_tab(3))));
    host.expect_execute_script()
        .withf(|tab_id, action| {
            *tab_id == 3
                && *action
                    == ScriptAction::Compose {
                        recipient: "a@x.com".to_string(),
                        subject: "Quick Message".to_string(),
                        body: "Hello,\n\nBest regards,\n[Your Name]".to_string(),
                    }
        })
        .times(1)
        .returning(|_, _| Ok(()));

    let h = harness(host, "a@x.com").await;
    h.service.on_command("compose-email").await.unwrap();

    // Drafts are neither audited nor recorded as sent
    assert!(read_audit_lines(&audit_log_path(&h.dir)).await.is_empty());
    assert!(stored_state(&h.storage).await.last_sent_email.is_none());
}

#[tokio::test]
async fn test_compose_email_opens_gmail_from_other_site() {
    let mut host = MockHost::new();
    host.expect_active_tab().returning(|| Ok(Some(other_tab(1))));
    host.expect_execute_script().never();
    host.expect_open_tab()
        .withf(|url| {
            url.starts_with("https://mail.google.com/mail/u/0/#compose?to=a%40x.com")
                && url.contains("subject=Quick%20Message")
        })
        .times(1)
        .returning(|_| Ok(()));

    let h = harness(host, "a@x.com").await;
    let response = h.service.handle_message(&json!({"action": "composeEmail"})).await;
    assert_eq!(to_json(response), json!({"success": true}));
}

#[tokio::test]
async fn test_send_email_off_gmail_fails() {
    let mut host = MockHost::new();
    host.expect_active_tab().returning(|| Ok(Some(other_tab(1))));
    host.expect_execute_script().never();

    let h = harness(host, "a@x.com").await;
    let response = to_json(h.service.handle_message(&json!({"action": "sendEmail"})).await);

    assert_eq!(response["success"], json!(false));
    assert!(response["error"].as_str().unwrap().contains("Not on Gmail page"));
    assert!(stored_state(&h.storage).await.last_sent_email.is_none());
    assert!(read_audit_lines(&audit_log_path(&h.dir)).await.is_empty());
}

#[tokio::test]
async fn test_no_active_tab_is_not_authenticated() {
    let mut host = MockHost::new();
    host.expect_active_tab().returning(|| Ok(None));
    host.expect_execute_script().never();
    host.expect_open_tab().never();

    let h = harness(host, "a@x.com").await;
    let response = to_json(h.service.handle_message(&json!({"action": "sendEmail"})).await);

    assert_eq!(response["success"], json!(false));
    assert!(response["error"].as_str().unwrap().contains("Authentication failed"));
    assert!(!stored_state(&h.storage).await.is_authenticated);
}

#[tokio::test]
async fn test_missing_default_recipient_is_rejected() {
    let mut host = MockHost::new();
    host.expect_active_tab().never();
    host.expect_execute_script().never();
    host.expect_open_tab().never();

    let h = harness(host, "").await;
    let response = to_json(h.service.handle_message(&json!({"action": "sendEmail"})).await);

    assert_eq!(response["success"], json!(false));
    assert!(response["error"].as_str().unwrap().contains("recipient"));
}

#[tokio::test]
async fn test_unknown_command_is_ignored() {
    let mut host = MockHost::new();
    host.expect_active_tab().never();

    let h = harness(host, "a@x.com").await;
    assert!(h.service.on_command("archive-email").await.is_ok());
}
