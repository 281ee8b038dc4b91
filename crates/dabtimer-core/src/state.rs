//! The process-wide state object.
//!
//! Owned by the [`Controller`](crate::Controller) and handed to each component
//! explicitly. Each field belongs to exactly one component.

use serde::{Deserialize, Serialize};

use crate::collaborators::Channel;
use crate::presets::PresetRegistry;
use crate::stats::StatsAggregator;
use crate::timer::TimerEngine;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub muted: bool,
    pub voice_enabled: bool,
    pub haptics_enabled: bool,
    pub manage_mode: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            muted: false,
            voice_enabled: true,
            haptics_enabled: true,
            manage_mode: false,
        }
    }
}

/// One of the user-toggled flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Setting {
    Mute,
    Voice,
    Haptics,
    ManageMode,
}

impl Settings {
    /// Flip a flag and return its new value.
    pub fn toggle(&mut self, setting: Setting) -> bool {
        let flag = match setting {
            Setting::Mute => &mut self.muted,
            Setting::Voice => &mut self.voice_enabled,
            Setting::Haptics => &mut self.haptics_enabled,
            Setting::ManageMode => &mut self.manage_mode,
        };
        *flag = !*flag;
        *flag
    }

    /// Whether collaborators on `channel` should hear about events.
    pub fn allows(&self, channel: Channel) -> bool {
        match channel {
            Channel::Sound => !self.muted,
            Channel::Voice => self.voice_enabled,
            Channel::Haptics => self.haptics_enabled,
            Channel::Display => true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub timer: TimerEngine,
    pub presets: PresetRegistry,
    pub stats: StatsAggregator,
    pub settings: Settings,
}

impl Default for AppState {
    fn default() -> Self {
        let presets = PresetRegistry::default();
        Self {
            timer: TimerEngine::new(presets.active().duration_secs),
            presets,
            stats: StatsAggregator::default(),
            settings: Settings::default(),
        }
    }
}
