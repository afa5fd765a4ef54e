//! Focus Agent - background activity tracking and session analytics.
//!
//! This library observes which application/window the user has focused,
//! classifies each interval as productive or distracting, detects idle
//! periods, fuses both signals into work sessions, and derives behavioral
//! features for an external prediction service.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        Focus Agent                           │
//! ├──────────────────────────────────────────────────────────────┤
//! │  ┌────────────┐  2s   ┌───────────────┐      ┌────────────┐  │
//! │  │ WindowProbe│──────▶│ WindowTracker │─────▶│  Session   │  │
//! │  └────────────┘       └───────┬───────┘      │  Manager   │  │
//! │  ┌────────────┐  10s  ┌───────▼───────┐      └─────┬──────┘  │
//! │  │ IdleProbe  │──────▶│  IdleMonitor  │────────────┤         │
//! │  └────────────┘       └───────────────┘            ▼         │
//! │                                             ┌────────────┐   │
//! │  ┌──────────────┐      ┌────────────┐       │  Session   │   │
//! │  │ FeatureEngine│◀─────│ DailyReport│◀──────│   Store    │   │
//! │  └──────────────┘      └────────────┘       └────────────┘   │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! The tracker skips sampling while the idle monitor reports idle; idle
//! time reaches the session only through idle transitions. Feature
//! derivation and daily reports are pure, regenerable functions over
//! closed sessions.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use focus_agent::{EventBus, MemoryStore, SessionManager};
//!
//! let events = Arc::new(EventBus::new());
//! let store = Arc::new(MemoryStore::new());
//! let sessions = SessionManager::new(store, events.clone());
//!
//! let updates = events.subscribe();
//! sessions.start_session();
//! // Feed activities and idle transitions from the monitors...
//! ```

pub mod classifier;
pub mod config;
pub mod events;
pub mod features;
pub mod models;
pub mod monitor;
pub mod notify;
pub mod probe;
pub mod report;
pub mod session;
pub mod storage;

// Re-export key types at crate root for convenience
pub use classifier::{ActivityClassifier, ClassifierRules};
pub use config::Config;
pub use events::{EngineEvent, EventBus};
pub use features::{FeatureEngine, MlFeatureRecord};
pub use models::{Activity, IdleTransition, Session, SessionStatistics};
pub use monitor::{IdleEvent, IdleMonitor, TrackerEvent, WindowTracker};
pub use notify::{ActivityNotifier, LogNotifier, NoopNotifier};
pub use probe::{IdleProbe, NoopProbe, WindowProbe, WindowSample};
pub use report::{generate_daily_report, DailyReport};
pub use session::{SessionError, SessionManager};
pub use storage::{JsonFileStore, MemoryStore, SessionStore, StoreError};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
