//! Authentication gate in front of the mail transport
//!
//! The dispatcher only ever asks one question: is a ready session available?
//! Token acquisition and refresh belong to the provider behind [`AuthProvider`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::{Result, SenderError};

/// Gmail API scopes needed for sending and drafting
///
/// - gmail.send: send on the user's behalf
/// - gmail.compose: create drafts
pub const SEND_SCOPES: &[&str] = &[
    "https://www.googleapis.com/auth/gmail.send",
    "https://www.googleapis.com/auth/gmail.compose",
];

/// Capability that reports whether an authenticated session is ready
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Acquire or refresh the session if needed; `true` when ready
    async fn ensure_authenticated(&self) -> bool;
}

/// Credential structure matching Google's OAuth2 client secret JSON format
#[derive(Debug, Serialize, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub installed: Option<ClientApp>,
    #[serde(default)]
    pub web: Option<ClientApp>,
}

impl Credentials {
    /// The installed (desktop) block wins over the web block
    pub fn client(&self) -> Option<&ClientApp> {
        self.installed.as_ref().or(self.web.as_ref())
    }
}

/// OAuth2 client registration
#[derive(Debug, Serialize, Deserialize)]
pub struct ClientApp {
    pub client_id: String,
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub auth_uri: Option<String>,
    #[serde(default)]
    pub token_uri: Option<String>,
    pub client_secret: String,
    #[serde(default)]
    pub redirect_uris: Vec<String>,
}

/// Load OAuth2 credentials from a JSON file
pub async fn load_credentials(path: &Path) -> Result<Credentials> {
    let content = tokio::fs::read_to_string(path).await?;
    let creds: Credentials = serde_json::from_str(&content)?;
    let client = creds.client().ok_or_else(|| {
        SenderError::AuthError(format!(
            "{:?} has neither an \"installed\" nor a \"web\" client",
            path
        ))
    })?;
    if client.client_id.is_empty() || client.client_secret.is_empty() {
        return Err(SenderError::AuthError(format!(
            "{:?} is missing client_id or client_secret",
            path
        )));
    }
    Ok(creds)
}

/// Load OAuth2 client credentials from environment variables
///
/// # Environment Variables
/// - `GMAIL_CLIENT_ID`: OAuth2 client ID
/// - `GMAIL_CLIENT_SECRET`: OAuth2 client secret
/// - `GMAIL_REDIRECT_URI`: Redirect URI (optional, defaults to http://localhost:8080)
pub fn load_credentials_from_env() -> Result<ClientApp> {
    let client_id = env::var("GMAIL_CLIENT_ID")
        .map_err(|_| SenderError::AuthError("GMAIL_CLIENT_ID not set".to_string()))?;
    let client_secret = env::var("GMAIL_CLIENT_SECRET")
        .map_err(|_| SenderError::AuthError("GMAIL_CLIENT_SECRET not set".to_string()))?;
    let redirect_uri = env::var("GMAIL_REDIRECT_URI")
        .unwrap_or_else(|_| "http://localhost:8080".to_string());

    Ok(ClientApp {
        client_id,
        project_id: None,
        auth_uri: Some("https://accounts.google.com/o/oauth2/auth".to_string()),
        token_uri: Some("https://oauth2.googleapis.com/token".to_string()),
        client_secret,
        redirect_uris: vec![redirect_uri],
    })
}

/// Restrict the token file to its owner (0600)
#[cfg(unix)]
pub async fn secure_token_file(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mut perms = tokio::fs::metadata(path).await?.permissions();
    perms.set_mode(0o600);
    tokio::fs::set_permissions(path, perms).await?;
    Ok(())
}

/// Windows relies on ACLs; nothing to tighten here
#[cfg(windows)]
pub async fn secure_token_file(_path: &Path) -> Result<()> {
    Ok(())
}

/// Ready when OAuth client credentials are available
///
/// Checks the environment first, then the credentials file. The outcome is
/// cached after the first success.
pub struct CredentialsFileAuth {
    credentials_path: PathBuf,
    token_path: PathBuf,
    ready: AtomicBool,
}

impl CredentialsFileAuth {
    pub fn new(credentials_path: impl Into<PathBuf>, token_path: impl Into<PathBuf>) -> Self {
        Self {
            credentials_path: credentials_path.into(),
            token_path: token_path.into(),
            ready: AtomicBool::new(false),
        }
    }

    async fn check(&self) -> Result<()> {
        match load_credentials_from_env() {
            Ok(_) => {
                tracing::debug!("Using OAuth2 client credentials from environment");
            }
            Err(_) => {
                load_credentials(&self.credentials_path).await.map_err(|e| {
                    SenderError::AuthError(format!(
                        "Failed to read credentials {:?}: {}",
                        self.credentials_path, e
                    ))
                })?;
                tracing::debug!("Using OAuth2 client credentials from {:?}", self.credentials_path);
            }
        }

        if tokio::fs::try_exists(&self.token_path).await.unwrap_or(false) {
            secure_token_file(&self.token_path).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl AuthProvider for CredentialsFileAuth {
    async fn ensure_authenticated(&self) -> bool {
        if self.ready.load(Ordering::Acquire) {
            return true;
        }

        match self.check().await {
            Ok(()) => {
                self.ready.store(true, Ordering::Release);
                true
            }
            Err(e) => {
                tracing::error!("{}", e);
                tracing::info!(
                    "Download an OAuth client file from Google Cloud Console to {:?} \
                     or set GMAIL_CLIENT_ID and GMAIL_CLIENT_SECRET",
                    self.credentials_path
                );
                false
            }
        }
    }
}
