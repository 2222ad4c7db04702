//! Coldwatch - cold-storage temperature monitor with tiered warnings.
//!
//! Polls a temperature/humidity sensor over HTTP, classifies each reading
//! into a safety tier, persists periodic samples, and raises notices when
//! unsafe conditions persist.
//!
//! # Classification
//!
//! - Below 6 C the reading is **SAFE**.
//! - From 6 C up to (but excluding) 8 C it is a **WARNING**.
//! - At 8 C and above it is an **ALERT**; an alert sustained for three
//!   minutes escalates to an *extended* alert.
//!
//! The start of the current alert episode is persisted, so the escalation
//! clock survives a daemon restart.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                         Coldwatch                          │
//! ├────────────────────────────────────────────────────────────┤
//! │  ┌────────────┐   ┌────────────┐   ┌───────────────────┐  │
//! │  │   Sensor   │──▶│ Classifier │──▶│     EventSink     │  │
//! │  │   Client   │   │ (6/8 C +   │   │ (console, UI, …)  │  │
//! │  │ (HTTP GET) │   │  180s esc.)│   └───────────────────┘  │
//! │  └────────────┘   └────────────┘                          │
//! │                        │    │                             │
//! │                        ▼    ▼                             │
//! │               ┌────────────┐  ┌────────────┐              │
//! │               │AlertWindow │  │ SampleLog  │              │
//! │               │   Store    │  │  (SQLite)  │              │
//! │               └────────────┘  └────────────┘              │
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use coldwatch::{Classifier, MemoryAlertWindowStore};
//! use chrono::Utc;
//!
//! let classifier = Classifier::new(Box::new(MemoryAlertWindowStore::new()));
//! let classification = classifier.classify(9.2, Utc::now()).unwrap();
//! println!("{} (extended: {})", classification.tier, classification.extended);
//! ```

pub mod classify;
pub mod client;
pub mod config;
pub mod monitor;
pub mod sink;
pub mod store;

// Re-export key types at crate root for convenience
pub use classify::{Classification, Classifier, WarningTier};
pub use client::{FetchError, SensorClient, SensorReading};
pub use config::{Config, ConfigError};
pub use monitor::{LatestReading, Monitor, MonitorOptions};
pub use sink::{ConsoleSink, EventSink, ReadingEvent};
pub use store::{
    AlertWindowStore, FileAlertWindowStore, MemoryAlertWindowStore, SampleLog, SampleRecord,
    StoreError,
};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
