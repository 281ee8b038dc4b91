use clap::Subcommand;
use dabtimer_core::{Config, Setting};

use super::{notice, open_controller, print_json, CmdResult};

#[derive(Subcommand)]
pub enum SettingsAction {
    /// Print current settings as JSON
    Show,
    /// Toggle sound
    Mute,
    /// Toggle the spoken line on completion
    Voice,
    /// Toggle vibration feedback
    Haptics,
    /// Toggle preset manage mode
    Manage,
}

pub fn run(action: SettingsAction) -> CmdResult {
    let config = Config::load_or_default();
    let mut ctl = open_controller(&config)?;

    let toast = match action {
        SettingsAction::Show => None,
        SettingsAction::Mute => Some(if ctl.toggle(Setting::Mute) { "Muted" } else { "Sound on" }),
        SettingsAction::Voice => Some(if ctl.toggle(Setting::Voice) { "Voice on" } else { "Voice off" }),
        SettingsAction::Haptics => Some(if ctl.toggle(Setting::Haptics) {
            "Haptics on"
        } else {
            "Haptics off"
        }),
        SettingsAction::Manage => Some(if ctl.toggle(Setting::ManageMode) {
            "Manage mode on"
        } else {
            "Manage mode off"
        }),
    };
    if let Some(toast) = toast {
        notice(toast);
    }
    print_json(&ctl.state().settings)
}
