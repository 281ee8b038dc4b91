use clap::{Args, Subcommand};
use dabtimer_core::{Config, Controller, CoreError, GuardRejection, PresetDraft, Upsert};
use serde_json::json;

use super::{notice, open_controller, print_json, CmdResult};

#[derive(Subcommand)]
pub enum PresetAction {
    /// List presets, active one marked
    List,
    /// Make a preset active and load its duration
    Apply {
        /// Preset ID
        id: String,
    },
    /// Create a preset and make it active
    Add {
        #[command(flatten)]
        fields: PresetFields,
    },
    /// Edit an existing preset
    Edit {
        /// Preset ID
        id: String,
        #[command(flatten)]
        fields: PresetFields,
    },
    /// Delete a preset
    Remove {
        /// Preset ID
        id: String,
    },
}

#[derive(Args)]
pub struct PresetFields {
    /// Display name
    #[arg(long)]
    name: Option<String>,
    /// Minutes part of the duration (0-59)
    #[arg(long, allow_negative_numbers = true)]
    min: Option<i64>,
    /// Seconds part of the duration (0-59)
    #[arg(long, allow_negative_numbers = true)]
    sec: Option<i64>,
    /// Tool used
    #[arg(long)]
    tool: Option<String>,
    /// Wax / concentrate type
    #[arg(long)]
    wax: Option<String>,
}

impl PresetFields {
    /// Overlay the given flags onto `draft`.
    fn apply_to(self, mut draft: PresetDraft) -> PresetDraft {
        if let Some(name) = self.name {
            draft.name = name;
        }
        if let Some(min) = self.min {
            draft.minutes = min;
        }
        if let Some(sec) = self.sec {
            draft.seconds = sec;
        }
        if let Some(tool) = self.tool {
            draft.tool = tool;
        }
        if let Some(wax) = self.wax {
            draft.substance = wax;
        }
        draft
    }
}

pub fn run(action: PresetAction) -> CmdResult {
    let config = Config::load_or_default();
    let mut ctl = open_controller(&config)?;

    match action {
        PresetAction::List => {
            let presets = ctl.state().presets.presets();
            let active = ctl.state().presets.active_id();
            print_json(&json!({ "activePresetId": active, "presets": presets }))?;
        }
        PresetAction::Apply { id } => {
            let preset = ctl.apply_preset(&id)?;
            print_json(&preset)?;
        }
        PresetAction::Add { fields } => {
            let draft = fields.apply_to(PresetDraft::default());
            save(&mut ctl, &draft)?;
        }
        PresetAction::Edit { id, fields } => {
            let existing = ctl
                .state()
                .presets
                .get(&id)
                .ok_or_else(|| CoreError::from(GuardRejection::UnknownPreset(id.clone())))?;
            let draft = fields.apply_to(PresetDraft::edit(existing));
            save(&mut ctl, &draft)?;
        }
        PresetAction::Remove { id } => {
            let removal = ctl.remove_preset(&id)?;
            notice("Preset deleted");
            print_json(&removal.removed)?;
        }
    }
    Ok(())
}

fn save(ctl: &mut Controller, draft: &PresetDraft) -> CmdResult {
    match ctl.save_preset(draft)? {
        Upsert::Created(preset) => {
            notice("Preset saved");
            print_json(&preset)
        }
        Upsert::Updated(preset) => {
            notice("Preset updated");
            print_json(&preset)
        }
    }
}
