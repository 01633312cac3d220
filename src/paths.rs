//! Well-known per-user file locations

use std::path::PathBuf;

use crate::error::{Result, SenderError};

/// Directory under the user's home holding config and logs
pub const APP_DIR_NAME: &str = ".gmail-hotkey-sender";

pub const CONFIG_FILE_NAME: &str = "config.json";

pub const LOG_DIR_NAME: &str = "logs";

pub const SENT_LOG_FILE_NAME: &str = "sent_emails.log";

/// `<home>/.gmail-hotkey-sender`
pub fn app_dir() -> Result<PathBuf> {
    dirs::home_dir()
        .map(|home| home.join(APP_DIR_NAME))
        .ok_or_else(|| SenderError::ConfigRead("Failed to determine home directory".to_string()))
}

/// Default config path; the containing directory is created if absent
pub fn default_config_path() -> Result<PathBuf> {
    let dir = app_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| {
        SenderError::ConfigWrite(format!("Failed to create config directory {:?}: {}", dir, e))
    })?;
    Ok(dir.join(CONFIG_FILE_NAME))
}

/// `<home>/.gmail-hotkey-sender/logs/sent_emails.log` (not created here)
pub fn default_sent_log_path() -> Result<PathBuf> {
    Ok(app_dir()?.join(LOG_DIR_NAME).join(SENT_LOG_FILE_NAME))
}
