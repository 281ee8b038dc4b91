//! Named session presets.
//!
//! The registry is an ordered list (display order, newest first for
//! user-created presets) with one active entry. It never becomes empty.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::GuardRejection;
use crate::timer::{clamp_duration, duration_from_parts};

/// Upper bound on stored presets; the oldest are evicted beyond it.
pub const MAX_PRESETS: usize = 40;

pub const DEFAULT_TOOL: &str = "Glass Dab Rig";
pub const DEFAULT_SUBSTANCE: &str = "Live Resin";
pub const DEFAULT_NAME: &str = "Custom";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preset {
    pub id: String,
    pub name: String,
    /// Always within `[1, 3599]`.
    #[serde(rename = "sec")]
    pub duration_secs: u32,
    pub tool: String,
    #[serde(rename = "wax")]
    pub substance: String,
}

impl Preset {
    fn seed(id: &str, name: &str, secs: u32, tool: &str, substance: &str) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            duration_secs: secs,
            tool: tool.into(),
            substance: substance.into(),
        }
    }
}

/// The presets a fresh install starts with.
pub fn default_presets() -> Vec<Preset> {
    vec![
        Preset::seed("p1", "Standard", 60, "Glass Dab Rig", "Badder"),
        Preset::seed("p2", "Flavor Mode", 75, "Glass Dab Rig", "Rosin"),
        Preset::seed("p3", "Quick Rip", 30, "Lookah Seahorse Plus", "Distillate"),
        Preset::seed("p4", "Cloud Gremlin", 95, "Glass Dab Rig", "Sugar Diamonds"),
    ]
}

/// Raw form input for creating or editing a preset.
///
/// Minutes and seconds are taken as typed and clamped on save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresetDraft {
    /// `None` creates a new preset.
    pub id: Option<String>,
    pub name: String,
    pub minutes: i64,
    pub seconds: i64,
    pub tool: String,
    pub substance: String,
}

impl Default for PresetDraft {
    fn default() -> Self {
        Self {
            id: None,
            name: String::new(),
            minutes: 1,
            seconds: 0,
            tool: DEFAULT_TOOL.into(),
            substance: DEFAULT_SUBSTANCE.into(),
        }
    }
}

impl PresetDraft {
    /// Pre-filled form for editing an existing preset.
    pub fn edit(preset: &Preset) -> Self {
        Self {
            id: Some(preset.id.clone()),
            name: preset.name.clone(),
            minutes: (preset.duration_secs / 60) as i64,
            seconds: (preset.duration_secs % 60) as i64,
            tool: preset.tool.clone(),
            substance: preset.substance.clone(),
        }
    }

    fn clean_name(&self) -> String {
        let trimmed = self.name.trim();
        if trimmed.is_empty() {
            DEFAULT_NAME.to_string()
        } else {
            trimmed.to_string()
        }
    }

    fn duration_secs(&self) -> u32 {
        duration_from_parts(self.minutes, self.seconds)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Upsert {
    /// A new preset was prepended and made active.
    Created(Preset),
    /// An existing preset was edited in place.
    Updated(Preset),
}

impl Upsert {
    pub fn preset(&self) -> &Preset {
        match self {
            Upsert::Created(p) | Upsert::Updated(p) => p,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Removal {
    pub removed: Preset,
    /// Set when the removed preset was active and the first one took over.
    pub new_active: Option<Preset>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresetRegistry {
    presets: Vec<Preset>,
    active_id: String,
}

impl Default for PresetRegistry {
    fn default() -> Self {
        Self::new(default_presets(), "p1")
    }
}

impl PresetRegistry {
    /// Build a registry, repairing anything that would break its invariants.
    /// An empty list falls back to the seeds and a repeated id keeps only its
    /// first occurrence. Durations are clamped, and a dangling active id
    /// points at the first preset.
    pub fn new(presets: Vec<Preset>, active_id: impl Into<String>) -> Self {
        let mut seen = HashSet::new();
        let presets: Vec<Preset> = presets
            .into_iter()
            .filter(|p| seen.insert(p.id.clone()))
            .collect();
        let mut presets: Vec<Preset> = if presets.is_empty() {
            default_presets()
        } else {
            presets
        };
        presets.truncate(MAX_PRESETS);
        for p in &mut presets {
            p.duration_secs = clamp_duration(p.duration_secs as i64);
        }

        let mut active_id = active_id.into();
        if !presets.iter().any(|p| p.id == active_id) {
            active_id = presets[0].id.clone();
        }
        Self { presets, active_id }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn presets(&self) -> &[Preset] {
        &self.presets
    }

    pub fn len(&self) -> usize {
        self.presets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Preset> {
        self.presets.iter().find(|p| p.id == id)
    }

    pub fn active_id(&self) -> &str {
        &self.active_id
    }

    pub fn active(&self) -> &Preset {
        self.get(&self.active_id).unwrap_or(&self.presets[0])
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Make `id` the active preset.
    pub fn set_active(&mut self, id: &str) -> Result<&Preset, GuardRejection> {
        let idx = self.index_of(id)?;
        self.active_id = self.presets[idx].id.clone();
        Ok(&self.presets[idx])
    }

    /// Create (no id) or edit (with id) a preset from form input.
    pub fn upsert(&mut self, draft: &PresetDraft) -> Result<Upsert, GuardRejection> {
        let name = draft.clean_name();
        let duration_secs = draft.duration_secs();

        match &draft.id {
            Some(id) => {
                let idx = self.index_of(id)?;
                let preset = &mut self.presets[idx];
                preset.name = name;
                preset.duration_secs = duration_secs;
                preset.tool = draft.tool.clone();
                preset.substance = draft.substance.clone();
                Ok(Upsert::Updated(preset.clone()))
            }
            None => {
                let preset = Preset {
                    id: new_preset_id(),
                    name,
                    duration_secs,
                    tool: draft.tool.clone(),
                    substance: draft.substance.clone(),
                };
                self.presets.insert(0, preset.clone());
                self.presets.truncate(MAX_PRESETS);
                self.active_id = preset.id.clone();
                Ok(Upsert::Created(preset))
            }
        }
    }

    /// Delete a preset. The last remaining preset cannot be deleted.
    pub fn remove(&mut self, id: &str) -> Result<Removal, GuardRejection> {
        if self.presets.len() <= 1 {
            return Err(GuardRejection::LastPreset);
        }
        let idx = self.index_of(id)?;
        let removed = self.presets.remove(idx);

        let new_active = if removed.id == self.active_id {
            self.active_id = self.presets[0].id.clone();
            Some(self.presets[0].clone())
        } else {
            None
        };
        Ok(Removal {
            removed,
            new_active,
        })
    }

    fn index_of(&self, id: &str) -> Result<usize, GuardRejection> {
        self.presets
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| GuardRejection::UnknownPreset(id.to_string()))
    }
}

fn new_preset_id() -> String {
    format!("p_{}", uuid::Uuid::new_v4().simple())
}
