use clap::Subcommand;
use dabtimer_core::Config;
use serde_json::json;

use super::{notice, open_controller, print_json, CmdResult};

#[derive(Subcommand)]
pub enum StatsAction {
    /// Totals and most-used tool, wax and timer
    Show,
    /// Sessions completed today (local time)
    Today,
    /// Completion history, newest first
    Log {
        /// Maximum entries to print
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Wipe history and counters
    Clear {
        /// Confirm the wipe
        #[arg(long)]
        yes: bool,
    },
}

pub fn run(action: StatsAction) -> CmdResult {
    let config = Config::load_or_default();
    let mut ctl = open_controller(&config)?;

    match action {
        StatsAction::Show => {
            ctl.poll();
            print_json(&ctl.stats_summary())?;
        }
        StatsAction::Today => {
            ctl.poll();
            let today = ctl.stats_summary().today;
            print_json(&json!({ "today": today }))?;
        }
        StatsAction::Log { limit } => {
            let limit = limit.unwrap_or(config.storage.log_display_limit);
            print_json(&ctl.recent_log(limit))?;
        }
        StatsAction::Clear { yes } => {
            if !yes {
                return Err("refusing to clear history without --yes".into());
            }
            ctl.clear_history();
            notice("History cleared");
        }
    }
    Ok(())
}
