//! Browser host seam and the web-UI transport built on it

use async_trait::async_trait;
use std::sync::Arc;

use super::state::StateHolder;
use crate::auth::AuthProvider;
use crate::error::{Result, SenderError};
use crate::models::EmailRequest;
use crate::transport::MailTransport;

pub const GMAIL_HOST: &str = "mail.google.com";

const COMPOSE_URL_BASE: &str = "https://mail.google.com/mail/u/0/#compose";

/// A browser tab as reported by the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tab {
    pub id: u32,
    pub url: Option<String>,
}

impl Tab {
    pub fn is_gmail(&self) -> bool {
        self.url
            .as_deref()
            .map(|url| url.contains(GMAIL_HOST))
            .unwrap_or(false)
    }
}

/// Page automation the host injects into a Gmail tab
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptAction {
    Compose {
        recipient: String,
        subject: String,
        body: String,
    },
    Send,
}

/// Capabilities of the browser hosting the extension
#[async_trait]
pub trait Host: Send + Sync {
    /// The focused tab of the current window, if any
    async fn active_tab(&self) -> Result<Option<Tab>>;

    async fn execute_script(&self, tab_id: u32, action: ScriptAction) -> Result<()>;

    async fn open_tab(&self, url: &str) -> Result<()>;
}

/// Gmail web compose URL with the fields prefilled
pub fn compose_url(recipient: &str, subject: &str, body: &str) -> String {
    format!(
        "{}?to={}&subject={}&body={}",
        COMPOSE_URL_BASE,
        urlencoding::encode(recipient),
        urlencoding::encode(subject),
        urlencoding::encode(body)
    )
}

async fn require_active_tab(host: &dyn Host) -> Result<Tab> {
    host.active_tab()
        .await?
        .ok_or_else(|| SenderError::TransportError("No active tab found".to_string()))
}

/// Drives the Gmail web UI through the host instead of the Gmail API
pub struct WebUiTransport {
    host: Arc<dyn Host>,
}

impl WebUiTransport {
    pub fn new(host: Arc<dyn Host>) -> Self {
        Self { host }
    }
}

#[async_trait]
impl MailTransport for WebUiTransport {
    /// Press send in the compose window of the active Gmail tab
    async fn deliver(&self, _request: &EmailRequest) -> Result<()> {
        let tab = require_active_tab(self.host.as_ref()).await?;
        if !tab.is_gmail() {
            return Err(SenderError::TransportError("Not on Gmail page".to_string()));
        }
        self.host.execute_script(tab.id, ScriptAction::Send).await
    }

    /// Fill a compose window, opening Gmail first when another site is active
    async fn save_draft(&self, request: &EmailRequest) -> Result<()> {
        let tab = require_active_tab(self.host.as_ref()).await?;
        let recipient = request.recipient_line();

        if tab.is_gmail() {
            tracing::debug!("Composing in Gmail tab {}", tab.id);
            self.host
                .execute_script(
                    tab.id,
                    ScriptAction::Compose {
                        recipient,
                        subject: request.subject.clone(),
                        body: request.body.clone(),
                    },
                )
                .await
        } else {
            let url = compose_url(&recipient, &request.subject, &request.body);
            tracing::debug!("Opening compose window at {}", url);
            self.host.open_tab(&url).await
        }
    }
}

/// The browser's own Gmail session is the credential; ready when the host
/// has an active tab to drive. The outcome is mirrored into the state blob.
pub struct BrowserSessionAuth {
    host: Arc<dyn Host>,
    state: Arc<StateHolder>,
}

impl BrowserSessionAuth {
    pub fn new(host: Arc<dyn Host>, state: Arc<StateHolder>) -> Self {
        Self { host, state }
    }
}

#[async_trait]
impl AuthProvider for BrowserSessionAuth {
    async fn ensure_authenticated(&self) -> bool {
        let ready = match self.host.active_tab().await {
            Ok(Some(_)) => true,
            Ok(None) => {
                tracing::error!("No active tab found");
                false
            }
            Err(e) => {
                tracing::error!("Failed to query active tab: {}", e);
                false
            }
        };

        if self.state.snapshot().await.is_authenticated != ready {
            if let Err(e) = self.state.set_authenticated(ready).await {
                tracing::warn!("Failed to persist authentication flag: {}", e);
            }
        }
        ready
    }
}
