//! Gmail Hotkey Sender
//!
//! Sends or drafts a Gmail message from a single command, either from the
//! command line or from a keyboard shortcut in the browser extension.
//!
//! # Overview
//!
//! Both front-ends build the same [`EmailRequest`] and hand it to one
//! [`EmailDispatcher`]:
//! - **Requests**: CLI flags or message payloads parsed and validated
//! - **Configuration**: per-user JSON file with default subject and body
//! - **Authentication**: readiness gate checked before every first dispatch
//! - **Transport**: pluggable provider call for send and draft
//! - **Audit log**: one line per sent email
//! - **Extension**: command and message handlers over persisted state
//!
//! # Example Usage
//!
//! ```no_run
//! use gmail_hotkey_sender::{
//!     AuditLog, ConfigStore, ConsoleTransport, CredentialsFileAuth, EmailDispatcher,
//!     EmailRequest,
//! };
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let store = ConfigStore::resolve(None)?;
//!     let config = store.load().await;
//!
//!     let auth = CredentialsFileAuth::new(
//!         store.resolve_relative(&config.credentials_file),
//!         store.resolve_relative(&config.token_file),
//!     );
//!     let mut dispatcher = EmailDispatcher::new(
//!         Box::new(auth),
//!         Box::new(ConsoleTransport),
//!         &config,
//!         AuditLog::at_default_location(),
//!     );
//!
//!     let request = EmailRequest::new(vec!["a@example.com".to_string()], "Hi", "Hello");
//!     dispatcher.dispatch(&request).await?;
//!     Ok(())
//! }
//! ```
//!
//! # Module Organization
//!
//! - [`audit`] - Append-only log of sent emails
//! - [`auth`] - Credential loading and the authentication gate
//! - [`cli`] - Command-line flags and progress output
//! - [`config`] - Configuration file management
//! - [`dispatcher`] - Send/draft dispatch state machine
//! - [`error`] - Error types and result aliases
//! - [`extension`] - Browser extension command and message handling
//! - [`models`] - Core data structures
//! - [`paths`] - Per-user file locations
//! - [`request`] - Request parsing and validation
//! - [`transport`] - Mail transport seam

pub mod audit;
pub mod auth;
pub mod cli;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod extension;
pub mod models;
pub mod paths;
pub mod request;
pub mod transport;

// Re-export commonly used types for convenience
pub use error::{Result, SenderError};

// Core data models
pub use models::{AuditLogEntry, DispatchMode, EmailRequest};

// Config types
pub use config::{Config, ConfigStore};

// Dispatch pipeline
pub use audit::AuditLog;
pub use auth::{AuthProvider, CredentialsFileAuth};
pub use dispatcher::{DispatchState, EmailDispatcher};
pub use request::{Invocation, RequestArgs, RequestParser};
pub use transport::{ConsoleTransport, MailTransport};

// CLI types (for binary usage)
pub use cli::{Cli, ProgressReporter};

// Extension types
pub use extension::{Command, ExtensionService, ExtensionState, Host, InstallReason};
