//! Core of the browser extension front-end
//!
//! Maps keyboard commands and popup messages onto the same
//! [`EmailDispatcher`] the CLI uses. The browser itself is reached through
//! the [`Host`] and [`StateStorage`] capabilities.
//!
//! Commands are serialized through one dispatcher lock and every state
//! write is awaited before a handler reports its outcome.

pub mod host;
pub mod protocol;
pub mod state;

use serde_json::{json, Value};
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::audit::AuditLog;
use crate::config::Config;
use crate::dispatcher::EmailDispatcher;
use crate::error::{Result, SenderError};
use crate::models::{DispatchMode, EmailRequest};
use crate::request::RequestParser;

pub use host::{BrowserSessionAuth, Host, ScriptAction, Tab, WebUiTransport};
pub use protocol::{Request, Response};
pub use state::{
    ExtensionState, JsonFileStorage, MemoryStorage, SentEmail, StateHolder, StatePatch,
    StateStorage,
};

/// Keyboard commands bound by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    ComposeEmail,
    SendEmail,
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::ComposeEmail => "compose-email",
            Command::SendEmail => "send-email",
        }
    }

    fn mode(&self) -> DispatchMode {
        match self {
            Command::ComposeEmail => DispatchMode::Draft,
            Command::SendEmail => DispatchMode::Send,
        }
    }
}

impl FromStr for Command {
    type Err = SenderError;

    fn from_str(name: &str) -> Result<Self> {
        match name {
            "compose-email" => Ok(Command::ComposeEmail),
            "send-email" => Ok(Command::SendEmail),
            other => Err(SenderError::Validation(format!("Unknown command: {}", other))),
        }
    }
}

/// Why the host fired its installed event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallReason {
    Install,
    Update,
}

pub struct ExtensionService {
    state: Arc<StateHolder>,
    dispatcher: Mutex<EmailDispatcher>,
}

impl ExtensionService {
    pub fn new(state: Arc<StateHolder>, dispatcher: EmailDispatcher) -> Self {
        Self {
            state,
            dispatcher: Mutex::new(dispatcher),
        }
    }

    /// Wire the dispatcher to the browser session and the web UI
    pub fn for_host(
        host: Arc<dyn Host>,
        state: Arc<StateHolder>,
        config: &Config,
        audit_log: AuditLog,
    ) -> Self {
        let dispatcher = EmailDispatcher::new(
            Box::new(BrowserSessionAuth::new(host.clone(), state.clone())),
            Box::new(WebUiTransport::new(host)),
            config,
            audit_log,
        );
        Self::new(state, dispatcher)
    }

    pub fn state(&self) -> &Arc<StateHolder> {
        &self.state
    }

    pub async fn on_installed(&self, reason: InstallReason) -> Result<()> {
        info!("Gmail Hotkey Sender extension installed");
        if reason == InstallReason::Install {
            info!("First time installation - setting up defaults");
            self.state.install().await?;
        }
        Ok(())
    }

    /// Handle a keyboard command by name; unknown names are logged and ignored
    pub async fn on_command(&self, name: &str) -> Result<()> {
        info!("Command received: {}", name);
        match name.parse::<Command>() {
            Ok(command) => self.run(command).await,
            Err(_) => {
                warn!("Unknown command: {}", name);
                Ok(())
            }
        }
    }

    /// Build a request from the stored defaults and dispatch it
    pub async fn run(&self, command: Command) -> Result<()> {
        let snapshot = self.state.snapshot().await;
        let request = request_from_state(&snapshot, command.mode())?;

        self.dispatcher.lock().await.dispatch(&request).await?;

        if command == Command::SendEmail {
            if let Err(e) = self
                .state
                .record_sent(&request.recipient_line(), &request.subject)
                .await
            {
                warn!("Failed to record last sent email: {}", e);
            }
        }
        Ok(())
    }

    /// Answer one protocol message
    pub async fn handle_message(&self, message: &Value) -> Response {
        tracing::debug!("Message received: {}", message);

        let request = match Request::parse(message) {
            Ok(Some(request)) => request,
            Ok(None) => return Response::unknown_action(),
            Err(e) => {
                warn!("Rejected message: {}", e);
                return Response::failure(e.to_string());
            }
        };

        let outcome = match request {
            Request::GetState => return Response::State(self.state.snapshot().await),
            Request::UpdateState { data } => self.state.update(data).await.map(|_| ()),
            Request::ComposeEmail => self.run(Command::ComposeEmail).await,
            Request::SendEmail => self.run(Command::SendEmail).await,
        };

        match outcome {
            Ok(()) => Response::success(),
            Err(e) => Response::failure(e.to_string()),
        }
    }
}

/// The stored defaults go through the same parser as any other message
fn request_from_state(state: &ExtensionState, mode: DispatchMode) -> Result<EmailRequest> {
    let message = json!({
        "to": state.default_recipient,
        "subject": state.default_subject,
        "body": state.default_body,
        "draft": mode == DispatchMode::Draft,
    });
    let args = RequestParser::parse_message(&message)?;
    Ok(args.into_request(&Config::default()))
}
