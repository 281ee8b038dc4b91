use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::presets::Preset;
use crate::stats::LogEntry;

/// Every state change in the core produces an Event.
/// Front ends render them; collaborators react to them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    SessionStarted {
        total_secs: u32,
        remaining_secs: f64,
        at: DateTime<Utc>,
    },
    SessionPaused {
        remaining_secs: f64,
        elapsed_secs: f64,
        at: DateTime<Utc>,
    },
    SessionReset {
        total_secs: u32,
        at: DateTime<Utc>,
    },
    /// Remaining time reached zero while running. Already logged and counted
    /// by the time this is emitted.
    SessionCompleted {
        entry: LogEntry,
    },
    PresetChanged {
        preset: Preset,
    },
    StatsCleared {
        at: DateTime<Utc>,
    },
}
