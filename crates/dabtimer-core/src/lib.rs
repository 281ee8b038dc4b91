//! # dabtimer Core Library
//!
//! Core business logic for the dabtimer session timer. The CLI binary is a
//! thin layer over this crate; sound, voice, haptics and rendering plug in as
//! [`Collaborator`]s.
//!
//! ## Architecture
//!
//! - **Timer Engine**: A wall-clock-based state machine. Remaining time is
//!   recomputed from timestamps on every frame, so late frames never drift
//! - **Presets**: Ordered registry of named durations with one active entry
//! - **Stats**: Capped completion log plus tool/wax/timer counters
//! - **Storage**: One JSON state blob in a SQLite key-value table, and a
//!   TOML config file
//!
//! ## Key Components
//!
//! - [`Controller`]: Applies user intents, persists, notifies collaborators
//! - [`TimerEngine`]: Core timer state machine
//! - [`PresetRegistry`]: Preset CRUD with its guard rules
//! - [`StatsAggregator`]: Completion log and counters
//! - [`StateStore`]: Load/save of the state blob

pub mod clock;
pub mod collaborators;
pub mod controller;
pub mod error;
pub mod events;
pub mod feedback;
pub mod presets;
pub mod state;
pub mod stats;
pub mod storage;
pub mod timer;

pub use clock::{Clock, ManualClock, SystemClock};
pub use collaborators::{Channel, Collaborator, Collaborators, HookResult};
pub use controller::{Controller, Snapshot};
pub use error::{ConfigError, CoreError, GuardRejection, StorageError};
pub use events::Event;
pub use presets::{Preset, PresetDraft, PresetRegistry, Removal, Upsert};
pub use state::{AppState, Setting, Settings};
pub use stats::{top_pick, LogEntry, StatsAggregator, StatsSummary, TopPick};
pub use storage::{Config, KvStore, StateStore};
pub use timer::{Heat, Session, TimerEngine, TimerState};
