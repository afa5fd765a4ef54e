//! Session storage collaborator.
//!
//! The engine only depends on the [`SessionStore`] trait; retention policy
//! (trimming old sessions) belongs to the store, not the engine.

use crate::models::Session;
use chrono::{Duration as ChronoDuration, Utc};
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::debug;

/// Days of history the JSON store keeps on disk.
pub const RETENTION_DAYS: i64 = 30;

/// Storage errors, surfaced to lifecycle callers.
#[derive(Debug)]
pub enum StoreError {
    Io(String),
    Serialization(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Io(e) => write!(f, "IO error: {e}"),
            StoreError::Serialization(e) => write!(f, "Serialization error: {e}"),
        }
    }
}

impl std::error::Error for StoreError {}

/// Persistence boundary for closed sessions.
pub trait SessionStore: Send + Sync {
    /// Persist a closed session.
    fn persist_session(&self, session: &Session) -> Result<(), StoreError>;

    /// Load sessions whose start time falls within the last `days_back`
    /// days.
    fn load_sessions(&self, days_back: u32) -> Result<Vec<Session>, StoreError>;
}

/// In-memory store, used by tests and as a null collaborator.
#[derive(Debug, Default)]
pub struct MemoryStore {
    sessions: Mutex<Vec<Session>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything persisted so far.
    pub fn sessions(&self) -> Vec<Session> {
        self.sessions.lock().expect("store lock poisoned").clone()
    }
}

impl SessionStore for MemoryStore {
    fn persist_session(&self, session: &Session) -> Result<(), StoreError> {
        self.sessions
            .lock()
            .expect("store lock poisoned")
            .push(session.clone());
        Ok(())
    }

    fn load_sessions(&self, days_back: u32) -> Result<Vec<Session>, StoreError> {
        let cutoff = Utc::now() - ChronoDuration::days(days_back as i64);
        Ok(self
            .sessions
            .lock()
            .expect("store lock poisoned")
            .iter()
            .filter(|s| s.start_time >= cutoff)
            .cloned()
            .collect())
    }
}

/// JSON-file-backed store under the platform data directory. Trims history
/// to [`RETENTION_DAYS`] on every write.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Default location: `<data dir>/focus-agent/work_sessions.json`.
    pub fn default_path() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("focus-agent")
            .join("work_sessions.json")
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    fn read_all(&self) -> Result<Vec<Session>, StoreError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content =
            std::fs::read_to_string(&self.path).map_err(|e| StoreError::Io(e.to_string()))?;
        serde_json::from_str(&content).map_err(|e| StoreError::Serialization(e.to_string()))
    }

    fn write_all(&self, sessions: &[Session]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| StoreError::Io(e.to_string()))?;
        }
        let json = serde_json::to_string_pretty(sessions)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        std::fs::write(&self.path, json).map_err(|e| StoreError::Io(e.to_string()))
    }
}

impl SessionStore for JsonFileStore {
    fn persist_session(&self, session: &Session) -> Result<(), StoreError> {
        let mut sessions = self.read_all()?;
        sessions.push(session.clone());

        let cutoff = Utc::now() - ChronoDuration::days(RETENTION_DAYS);
        let before = sessions.len();
        sessions.retain(|s| s.start_time >= cutoff);
        if sessions.len() < before {
            debug!(trimmed = before - sessions.len(), "trimmed expired sessions");
        }

        self.write_all(&sessions)
    }

    fn load_sessions(&self, days_back: u32) -> Result<Vec<Session>, StoreError> {
        let cutoff = Utc::now() - ChronoDuration::days(days_back as i64);
        Ok(self
            .read_all()?
            .into_iter()
            .filter(|s| s.start_time >= cutoff)
            .collect())
    }
}
