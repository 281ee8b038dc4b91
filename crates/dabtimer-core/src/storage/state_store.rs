//! Single-blob persistence for [`AppState`].
//!
//! Loading never fails: a missing or unreadable blob yields the default
//! state, and a partially valid one is merged field by field with defaults.

use chrono::{DateTime, TimeZone, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::kv::KvStore;
use crate::error::Result;
use crate::presets::{Preset, PresetRegistry};
use crate::state::{AppState, Settings};
use crate::stats::{Counter, LogEntry, StatsAggregator, LOG_CAP};
use crate::timer::{Session, TimerEngine, TimerState};

/// Default kv key holding the blob.
pub const STATE_KEY: &str = "dabtimer:state:v1";

/// The whitelisted on-disk projection of [`AppState`].
///
/// Transient fields such as the frame loop never appear here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedState {
    pub total: u32,
    pub remaining: f64,
    pub running: bool,
    /// Epoch milliseconds, 0 when no run is in progress.
    pub started_at: i64,
    pub elapsed_before_pause: f64,
    pub muted: bool,
    pub voice: bool,
    pub haptics: bool,
    pub manage_mode: bool,
    pub presets: Vec<Preset>,
    pub active_preset_id: String,
    pub dab_count: u64,
    pub dab_log: Vec<LogEntry>,
    pub tool_counts: Counter,
    pub wax_counts: Counter,
    pub timer_counts: Counter,
}

impl From<&AppState> for PersistedState {
    fn from(state: &AppState) -> Self {
        let session = state.timer.session();
        let stats = &state.stats;
        Self {
            total: session.total_seconds,
            remaining: session.remaining_seconds,
            running: session.running,
            started_at: session.started_at.map(|t| t.timestamp_millis()).unwrap_or(0),
            elapsed_before_pause: session.elapsed_before_pause,
            muted: state.settings.muted,
            voice: state.settings.voice_enabled,
            haptics: state.settings.haptics_enabled,
            manage_mode: state.settings.manage_mode,
            presets: state.presets.presets().to_vec(),
            active_preset_id: state.presets.active_id().to_string(),
            dab_count: stats.dab_count(),
            dab_log: stats.log().iter().take(LOG_CAP).cloned().collect(),
            tool_counts: stats.tool_counts().clone(),
            wax_counts: stats.wax_counts().clone(),
            timer_counts: stats.timer_counts().clone(),
        }
    }
}

/// Reads and writes the state blob in a [`KvStore`].
pub struct StateStore {
    kv: KvStore,
    key: String,
}

impl StateStore {
    pub fn new(kv: KvStore) -> Self {
        Self::with_key(kv, STATE_KEY)
    }

    pub fn with_key(kv: KvStore, key: impl Into<String>) -> Self {
        Self {
            kv,
            key: key.into(),
        }
    }

    pub fn kv(&self) -> &KvStore {
        &self.kv
    }

    /// Load the stored state, or defaults when there is nothing usable.
    pub fn load(&self) -> AppState {
        let raw = match self.kv.get(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return AppState::default(),
            Err(e) => {
                tracing::warn!(error = %e, "state unreadable, using defaults");
                return AppState::default();
            }
        };
        match serde_json::from_str::<Value>(&raw) {
            Ok(value) => decode(&value),
            Err(e) => {
                tracing::warn!(error = %e, "state blob corrupt, using defaults");
                AppState::default()
            }
        }
    }

    /// Write the whitelisted projection of `state`.
    pub fn save(&self, state: &AppState) -> Result<()> {
        let json = serde_json::to_string(&PersistedState::from(state))?;
        self.kv.set(&self.key, &json)?;
        Ok(())
    }
}

/// Rebuild state from a parsed blob, falling back per field.
pub fn decode(value: &Value) -> AppState {
    let defaults = AppState::default();
    let Some(obj) = value.as_object() else {
        tracing::warn!("state blob is not an object, using defaults");
        return defaults;
    };

    let presets = PresetRegistry::new(
        list::<Preset>(obj, "presets"),
        field::<String>(obj, "activePresetId").unwrap_or_default(),
    );

    let default_settings = defaults.settings;
    let settings = Settings {
        muted: field(obj, "muted").unwrap_or(default_settings.muted),
        voice_enabled: field(obj, "voice").unwrap_or(default_settings.voice_enabled),
        haptics_enabled: field(obj, "haptics").unwrap_or(default_settings.haptics_enabled),
        manage_mode: field(obj, "manageMode").unwrap_or(default_settings.manage_mode),
    };

    let stats = StatsAggregator::from_parts(
        field(obj, "dabCount").unwrap_or(0),
        list::<LogEntry>(obj, "dabLog"),
        counter(obj, "toolCounts"),
        counter(obj, "waxCounts"),
        counter(obj, "timerCounts"),
    );

    let active_secs = presets.active().duration_secs;
    let total = field::<u32>(obj, "total").unwrap_or(active_secs);
    let session = Session {
        total_seconds: total,
        remaining_seconds: field(obj, "remaining").unwrap_or(total as f64),
        running: field(obj, "running").unwrap_or(false),
        started_at: field::<i64>(obj, "startedAt").and_then(from_millis),
        elapsed_before_pause: field(obj, "elapsedBeforePause").unwrap_or(0.0),
    };
    let mut timer = TimerEngine::from_session(session);
    if timer.state() == TimerState::Idle && timer.total_secs() != active_secs {
        // Keep an idle session in step with the active preset.
        timer.load_duration(active_secs, Utc::now());
    }

    AppState {
        timer,
        presets,
        stats,
        settings,
    }
}

fn field<T: DeserializeOwned>(obj: &Map<String, Value>, key: &str) -> Option<T> {
    obj.get(key)
        .and_then(|v| serde_json::from_value(v.clone()).ok())
}

/// Array field, keeping only the elements that parse.
fn list<T: DeserializeOwned>(obj: &Map<String, Value>, key: &str) -> Vec<T> {
    match obj.get(key).and_then(Value::as_array) {
        Some(items) => items
            .iter()
            .filter_map(|v| serde_json::from_value(v.clone()).ok())
            .collect(),
        None => Vec::new(),
    }
}

/// Count map, keeping only entries with a non-negative integer count.
fn counter(obj: &Map<String, Value>, key: &str) -> Counter {
    match obj.get(key).and_then(Value::as_object) {
        Some(map) => map
            .iter()
            .filter_map(|(k, v)| v.as_u64().map(|n| (k.clone(), n)))
            .collect(),
        None => Counter::new(),
    }
}

fn from_millis(ms: i64) -> Option<DateTime<Utc>> {
    if ms <= 0 {
        return None;
    }
    Utc.timestamp_millis_opt(ms).single()
}
