//! Request/response messages exchanged with the popup and content scripts

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::state::{ExtensionState, StatePatch};
use crate::error::{Result, SenderError};

const ACTIONS: &[&str] = &["getState", "updateState", "composeEmail", "sendEmail"];

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Request {
    GetState,
    UpdateState {
        #[serde(default)]
        data: StatePatch,
    },
    ComposeEmail,
    SendEmail,
}

impl Request {
    /// `Ok(None)` when the action is missing or unknown; a known action
    /// whose payload does not fit is a validation error
    pub fn parse(message: &Value) -> Result<Option<Self>> {
        let action = match message.get("action").and_then(Value::as_str) {
            Some(action) if ACTIONS.contains(&action) => action,
            _ => return Ok(None),
        };

        serde_json::from_value(message.clone())
            .map(Some)
            .map_err(|e| SenderError::Validation(format!("invalid {} payload: {}", action, e)))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Response {
    State(ExtensionState),
    Outcome {
        success: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
    Error {
        error: String,
    },
}

impl Response {
    pub fn success() -> Self {
        Response::Outcome {
            success: true,
            error: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Response::Outcome {
            success: false,
            error: Some(message.into()),
        }
    }

    pub fn unknown_action() -> Self {
        Response::Error {
            error: "Unknown action".to_string(),
        }
    }
}
