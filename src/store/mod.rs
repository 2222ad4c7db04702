//! Durable state: the alert-window singleton and the sample log.

mod alert_window;
mod sample_log;

pub use alert_window::{AlertWindowStore, FileAlertWindowStore, MemoryAlertWindowStore};
pub use sample_log::{SampleLog, SampleRecord};

/// Storage errors. None of these halt the monitor; failed writes are logged
/// and retried implicitly on the next cycle.
#[derive(Debug)]
pub enum StoreError {
    Io(String),
    Serialize(String),
    Database(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Io(e) => write!(f, "IO error: {e}"),
            StoreError::Serialize(e) => write!(f, "Serialize error: {e}"),
            StoreError::Database(e) => write!(f, "Database error: {e}"),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        StoreError::Database(e.to_string())
    }
}
