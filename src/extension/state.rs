//! Persisted extension state and the storage capability behind it

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::error::{Result, SenderError};

/// Storage key holding the state blob
pub const STATE_KEY: &str = "extensionState";

/// Subject and body offered after a fresh install
pub const INSTALL_SUBJECT: &str = "Quick Message";
pub const INSTALL_BODY: &str = "Hello,\n\nBest regards,\n[Your Name]";

/// The state blob exchanged with the popup and kept in storage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ExtensionState {
    #[serde(default)]
    pub is_authenticated: bool,
    #[serde(default)]
    pub default_recipient: String,
    #[serde(default)]
    pub default_subject: String,
    #[serde(default)]
    pub default_body: String,
    #[serde(default)]
    pub last_sent_email: Option<SentEmail>,
}

impl ExtensionState {
    /// Values written on first installation
    pub fn installed() -> Self {
        Self {
            default_subject: INSTALL_SUBJECT.to_string(),
            default_body: INSTALL_BODY.to_string(),
            ..Self::default()
        }
    }

    /// Overlay a stored blob onto the defaults key by key
    ///
    /// Keys whose values do not fit are dropped with a warning; the other
    /// stored keys survive. A non-object blob yields the defaults.
    pub fn merged_over_defaults(stored: Value) -> Self {
        let entries = match stored {
            Value::Object(entries) => entries,
            other => {
                tracing::warn!("Stored extension state is not an object, using defaults: {}", other);
                return Self::default();
            }
        };

        let mut merged = match serde_json::to_value(Self::default()) {
            Ok(Value::Object(defaults)) => defaults,
            _ => return Self::default(),
        };

        for (key, value) in entries {
            let previous = merged.insert(key.clone(), value);
            if let Err(e) = serde_json::from_value::<Self>(Value::Object(merged.clone())) {
                tracing::warn!("Dropping invalid stored state field {:?}: {}", key, e);
                match previous {
                    Some(previous) => {
                        merged.insert(key, previous);
                    }
                    None => {
                        merged.remove(&key);
                    }
                }
            }
        }

        serde_json::from_value(Value::Object(merged)).unwrap_or_default()
    }

    pub fn apply(&mut self, patch: StatePatch) {
        if let Some(flag) = patch.is_authenticated {
            self.is_authenticated = flag;
        }
        if let Some(recipient) = patch.default_recipient {
            self.default_recipient = recipient;
        }
        if let Some(subject) = patch.default_subject {
            self.default_subject = subject;
        }
        if let Some(body) = patch.default_body {
            self.default_body = body;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SentEmail {
    pub recipient: String,
    pub subject: String,
    pub sent_at: DateTime<Utc>,
}

/// Partial update from an `updateState` message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct StatePatch {
    #[serde(default)]
    pub is_authenticated: Option<bool>,
    #[serde(default)]
    pub default_recipient: Option<String>,
    #[serde(default)]
    pub default_subject: Option<String>,
    #[serde(default)]
    pub default_body: Option<String>,
}

/// Key-value storage capability supplied by the host
#[async_trait]
pub trait StateStorage: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Value>>;

    async fn set(&self, key: &str, value: Value) -> Result<()>;
}

/// Process-local storage
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, Value>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StateStorage for MemoryStorage {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> Result<()> {
        self.entries.lock().await.insert(key.to_string(), value);
        Ok(())
    }
}

/// Storage backed by a single JSON object on disk
#[derive(Debug)]
pub struct JsonFileStorage {
    path: PathBuf,
    // Serializes read-modify-write of the file
    write_lock: Mutex<()>,
}

impl JsonFileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    async fn read_all(&self) -> Result<Map<String, Value>> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => match serde_json::from_str::<Value>(&content)? {
                Value::Object(entries) => Ok(entries),
                _ => Err(SenderError::Storage(format!(
                    "{:?} does not hold a JSON object",
                    self.path
                ))),
            },
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Map::new()),
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl StateStorage for JsonFileStorage {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.read_all().await?.remove(key))
    }

    async fn set(&self, key: &str, value: Value) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut entries = self.read_all().await?;
        entries.insert(key.to_string(), value);

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let json = serde_json::to_string_pretty(&Value::Object(entries))?;
        tokio::fs::write(&self.path, json).await?;
        Ok(())
    }
}

/// Single writer for the extension state
///
/// Every mutation runs under one lock and is persisted before the lock is
/// released, so concurrent handlers never interleave read-modify-write.
/// The in-memory copy only changes once storage accepted the new blob.
pub struct StateHolder {
    storage: Arc<dyn StateStorage>,
    state: Mutex<ExtensionState>,
}

impl StateHolder {
    /// Read the stored blob, merged over defaults
    pub async fn load(storage: Arc<dyn StateStorage>) -> Result<Self> {
        let state = match storage.get(STATE_KEY).await? {
            Some(value) => ExtensionState::merged_over_defaults(value),
            None => ExtensionState::default(),
        };

        Ok(Self {
            storage,
            state: Mutex::new(state),
        })
    }

    pub async fn snapshot(&self) -> ExtensionState {
        self.state.lock().await.clone()
    }

    /// Apply `f` to a copy, persist it, then commit it in memory
    pub async fn modify<F>(&self, f: F) -> Result<ExtensionState>
    where
        F: FnOnce(&mut ExtensionState),
    {
        let mut guard = self.state.lock().await;
        let mut next = guard.clone();
        f(&mut next);

        let value = serde_json::to_value(&next)?;
        self.storage.set(STATE_KEY, value).await?;

        *guard = next.clone();
        Ok(next)
    }

    pub async fn update(&self, patch: StatePatch) -> Result<ExtensionState> {
        self.modify(|state| state.apply(patch)).await
    }

    /// Reset to the first-install defaults
    pub async fn install(&self) -> Result<ExtensionState> {
        self.modify(|state| *state = ExtensionState::installed()).await
    }

    pub async fn set_authenticated(&self, authenticated: bool) -> Result<ExtensionState> {
        self.modify(|state| state.is_authenticated = authenticated)
            .await
    }

    pub async fn record_sent(&self, recipient: &str, subject: &str) -> Result<ExtensionState> {
        let sent = SentEmail {
            recipient: recipient.to_string(),
            subject: subject.to_string(),
            sent_at: Utc::now(),
        };
        self.modify(|state| state.last_sent_email = Some(sent)).await
    }
}
