use thiserror::Error;

/// Type alias for Result with SenderError
pub type Result<T> = std::result::Result<T, SenderError>;

/// Error types for the hotkey sender
#[derive(Error, Debug)]
pub enum SenderError {
    /// Configuration file could not be read or parsed
    #[error("Configuration read error: {0}")]
    ConfigRead(String),

    /// Configuration file could not be written
    #[error("Configuration write error: {0}")]
    ConfigWrite(String),

    /// The request is missing required data or carries malformed values
    #[error("Invalid request: {0}")]
    Validation(String),

    /// Authentication gate reported not ready
    #[error("Authentication failed: {0}")]
    AuthError(String),

    /// The mail transport failed to deliver or save the message
    #[error("Transport error: {0}")]
    TransportError(String),

    /// Key-value storage backing the extension state failed
    #[error("Storage error: {0}")]
    Storage(String),

    /// IO error (file operations, etc.)
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// Generic catch-all error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl SenderError {
    /// Errors caused by what the user typed; these get a usage reminder
    pub fn is_user_error(&self) -> bool {
        matches!(self, SenderError::Validation(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_errors() {
        let missing = SenderError::Validation("no recipient".to_string());
        assert!(missing.is_user_error());

        let auth = SenderError::AuthError("authentication failed".to_string());
        assert!(!auth.is_user_error());

        let transport = SenderError::TransportError("connection reset".to_string());
        assert!(!transport.is_user_error());

        // Reported through the regular error path, without usage text
        let config = SenderError::ConfigRead("home directory not found".to_string());
        assert!(!config.is_user_error());
    }

    #[test]
    fn test_error_display() {
        let error = SenderError::AuthError("authentication failed".to_string());
        assert_eq!(error.to_string(), "Authentication failed: authentication failed");

        let error = SenderError::TransportError("quota exceeded".to_string());
        assert!(error.to_string().contains("quota exceeded"));

        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let error: SenderError = io.into();
        assert!(error.to_string().starts_with("IO error"));
    }
}
