//! Durable record of when the current high-temperature episode began.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Mutex;

use super::StoreError;

/// Key-value style store for the alert-window start time.
///
/// `None` means no high-temperature episode is in progress. The classifier
/// is the only writer.
pub trait AlertWindowStore {
    fn get(&self) -> Result<Option<DateTime<Utc>>, StoreError>;
    fn set(&self, started_at: DateTime<Utc>) -> Result<(), StoreError>;
    fn clear(&self) -> Result<(), StoreError>;
}

/// On-disk format.
#[derive(Debug, Serialize, Deserialize)]
struct PersistedWindow {
    started_at: Option<DateTime<Utc>>,
    last_updated: DateTime<Utc>,
}

/// File-backed store under the data directory.
///
/// The window survives process restarts, so a sustained alert keeps its
/// start time through a daemon bounce and the three-minute escalation
/// guarantee holds across it.
pub struct FileAlertWindowStore {
    path: PathBuf,
    cached: Mutex<Option<DateTime<Utc>>>,
}

impl FileAlertWindowStore {
    /// Open the store, loading any persisted window.
    ///
    /// An unreadable or unparseable state file is treated as an empty
    /// window rather than a fatal error.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let cached = match std::fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str::<PersistedWindow>(&content) {
                Ok(persisted) => persisted.started_at,
                Err(e) => {
                    tracing::warn!(path = %path.display(), "could not parse alert window state, starting empty: {e}");
                    None
                }
            },
            Err(_) => None,
        };
        Self {
            path,
            cached: Mutex::new(cached),
        }
    }

    fn write(&self, started_at: Option<DateTime<Utc>>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| StoreError::Io(e.to_string()))?;
        }
        let persisted = PersistedWindow {
            started_at,
            last_updated: Utc::now(),
        };
        let json = serde_json::to_string_pretty(&persisted)
            .map_err(|e| StoreError::Serialize(e.to_string()))?;
        std::fs::write(&self.path, json).map_err(|e| StoreError::Io(e.to_string()))?;
        Ok(())
    }
}

impl AlertWindowStore for FileAlertWindowStore {
    fn get(&self) -> Result<Option<DateTime<Utc>>, StoreError> {
        Ok(*self.cached.lock().unwrap())
    }

    fn set(&self, started_at: DateTime<Utc>) -> Result<(), StoreError> {
        self.write(Some(started_at))?;
        *self.cached.lock().unwrap() = Some(started_at);
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        self.write(None)?;
        *self.cached.lock().unwrap() = None;
        Ok(())
    }
}

/// In-memory store for tests and ephemeral runs. Clones share state.
#[derive(Clone, Default)]
pub struct MemoryAlertWindowStore {
    window: std::sync::Arc<Mutex<Option<DateTime<Utc>>>>,
}

impl MemoryAlertWindowStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AlertWindowStore for MemoryAlertWindowStore {
    fn get(&self) -> Result<Option<DateTime<Utc>>, StoreError> {
        Ok(*self.window.lock().unwrap())
    }

    fn set(&self, started_at: DateTime<Utc>) -> Result<(), StoreError> {
        *self.window.lock().unwrap() = Some(started_at);
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        *self.window.lock().unwrap() = None;
        Ok(())
    }
}
