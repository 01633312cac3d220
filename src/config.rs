use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::{Result, SenderError};
use crate::paths;

/// User configuration persisted as JSON
///
/// Every field carries its own default so a partial file is merged over
/// the defaults on load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_credentials_file")]
    pub credentials_file: String,
    #[serde(default = "default_token_file")]
    pub token_file: String,
    #[serde(default)]
    pub default_subject: String,
    #[serde(default)]
    pub default_body: String,
    /// Emails per day
    #[serde(default = "default_rate_limit")]
    pub rate_limit: u32,
    #[serde(default = "default_log_sent_emails")]
    pub log_sent_emails: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            credentials_file: default_credentials_file(),
            token_file: default_token_file(),
            default_subject: String::new(),
            default_body: String::new(),
            rate_limit: default_rate_limit(),
            log_sent_emails: default_log_sent_emails(),
        }
    }
}

fn default_credentials_file() -> String {
    "credentials.json".to_string()
}

fn default_token_file() -> String {
    "token.json".to_string()
}

fn default_rate_limit() -> u32 {
    100
}

fn default_log_sent_emails() -> bool {
    true
}

impl Config {
    /// Parse and validate a JSON document
    pub fn from_json(content: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(content)
            .map_err(|e| SenderError::ConfigRead(format!("Failed to parse config file: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Pretty JSON with a trailing newline; stable across repeated saves
    pub fn to_json(&self) -> Result<String> {
        let mut content = serde_json::to_string_pretty(self)
            .map_err(|e| SenderError::ConfigWrite(format!("Failed to serialize config: {}", e)))?;
        content.push('\n');
        Ok(content)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.rate_limit == 0 {
            return Err(SenderError::ConfigRead(
                "rate_limit must be at least 1".to_string(),
            ));
        }
        if self.credentials_file.trim().is_empty() {
            return Err(SenderError::ConfigRead(
                "credentials_file cannot be empty".to_string(),
            ));
        }
        if self.token_file.trim().is_empty() {
            return Err(SenderError::ConfigRead(
                "token_file cannot be empty".to_string(),
            ));
        }

        tracing::debug!("Configuration validation passed");
        Ok(())
    }
}

/// Loads and persists the single per-user configuration file
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Use the override when given, otherwise the per-user default path
    pub fn resolve(path: Option<PathBuf>) -> Result<Self> {
        let path = match path {
            Some(path) => path,
            None => paths::default_config_path()?,
        };
        Ok(Self::new(path))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the configuration, never failing
    ///
    /// - missing file: defaults are written and returned
    /// - unreadable, unparseable or invalid file: warning, defaults returned,
    ///   the existing file is left as is
    pub async fn load(&self) -> Config {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => match Config::from_json(&content) {
                Ok(config) => {
                    tracing::info!("Loaded configuration from {:?}", self.path);
                    config
                }
                Err(e) => {
                    tracing::warn!(
                        "Invalid config file {:?}, using defaults: {}",
                        self.path,
                        e
                    );
                    Config::default()
                }
            },
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::info!("No config file at {:?}, creating defaults", self.path);
                let config = Config::default();
                self.save(&config).await;
                config
            }
            Err(e) => {
                tracing::warn!(
                    "Failed to read config file {:?}, using defaults: {}",
                    self.path,
                    e
                );
                Config::default()
            }
        }
    }

    /// Best-effort save; failures are logged and swallowed
    pub async fn save(&self, config: &Config) {
        if let Err(e) = self.try_save(config).await {
            tracing::error!("Failed to save config: {}", e);
        }
    }

    /// Save, reporting failures to the caller
    pub async fn try_save(&self, config: &Config) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await.map_err(|e| {
                    SenderError::ConfigWrite(format!("Failed to create config directory: {}", e))
                })?;
            }
        }

        let content = config.to_json()?;
        tokio::fs::write(&self.path, content)
            .await
            .map_err(|e| SenderError::ConfigWrite(format!("Failed to write config file: {}", e)))?;

        tracing::debug!("Saved configuration to {:?}", self.path);
        Ok(())
    }

    /// Resolve a path from the config (credentials, token) against the
    /// config file's directory when it is relative
    pub fn resolve_relative(&self, file: &str) -> PathBuf {
        let candidate = Path::new(file);
        if candidate.is_absolute() {
            return candidate.to_path_buf();
        }
        match self.path.parent() {
            Some(parent) => parent.join(candidate),
            None => candidate.to_path_buf(),
        }
    }
}
