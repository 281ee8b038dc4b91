//! Extension points for sound, voice, haptics and rendering.

use std::panic::{self, AssertUnwindSafe};

use crate::events::Event;
use crate::presets::Preset;
use crate::state::Settings;
use crate::stats::LogEntry;

pub type HookResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

/// Which user setting gates a collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    /// Silenced by `muted`.
    Sound,
    /// Gated by `voice_enabled`.
    Voice,
    /// Gated by `haptics_enabled`.
    Haptics,
    /// Always notified.
    Display,
}

/// Every side-effect sink implements this trait.
///
/// Hooks get shared references only, so a collaborator cannot reach back into
/// core state. Failures are logged and dropped by the dispatcher.
pub trait Collaborator: Send + Sync {
    /// Identifier used in logs.
    fn name(&self) -> &str;

    fn channel(&self) -> Channel;

    fn on_session_start(&self) -> HookResult {
        Ok(()) // default no-op
    }

    fn on_session_pause(&self) -> HookResult {
        Ok(()) // default no-op
    }

    fn on_session_reset(&self) -> HookResult {
        Ok(()) // default no-op
    }

    fn on_session_complete(&self, _entry: &LogEntry) -> HookResult {
        Ok(()) // default no-op
    }

    fn on_preset_changed(&self, _preset: &Preset) -> HookResult {
        Ok(()) // default no-op
    }

    fn on_stats_cleared(&self) -> HookResult {
        Ok(()) // default no-op
    }
}

/// Ordered set of collaborators, notified best-effort.
#[derive(Default)]
pub struct Collaborators {
    sinks: Vec<Box<dyn Collaborator>>,
}

impl Collaborators {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, sink: impl Collaborator + 'static) {
        self.sinks.push(Box::new(sink));
    }

    pub fn with(mut self, sink: impl Collaborator + 'static) -> Self {
        self.register(sink);
        self
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }

    /// Notify every enabled collaborator. Never fails: errors and panics from a
    /// hook are logged and the next collaborator still runs.
    pub fn dispatch(&self, event: &Event, settings: &Settings) {
        for sink in &self.sinks {
            if !settings.allows(sink.channel()) {
                continue;
            }
            let hook = AssertUnwindSafe(|| match event {
                Event::SessionStarted { .. } => sink.on_session_start(),
                Event::SessionPaused { .. } => sink.on_session_pause(),
                Event::SessionReset { .. } => sink.on_session_reset(),
                Event::SessionCompleted { entry } => sink.on_session_complete(entry),
                Event::PresetChanged { preset } => sink.on_preset_changed(preset),
                Event::StatsCleared { .. } => sink.on_stats_cleared(),
            });
            match panic::catch_unwind(hook) {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    tracing::info!(collaborator = sink.name(), error = %e, "collaborator failed");
                }
                Err(_) => {
                    tracing::info!(collaborator = sink.name(), "collaborator panicked");
                }
            }
        }
    }
}

impl std::fmt::Debug for Collaborators {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.sinks.iter().map(|s| s.name()))
            .finish()
    }
}
