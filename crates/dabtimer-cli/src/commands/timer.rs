use std::io::Write;

use clap::Subcommand;
use dabtimer_core::{Config, Event, Snapshot};

use super::{notice, open_controller, print_json, CmdResult};

#[derive(Subcommand)]
pub enum TimerAction {
    /// Start the active preset, or continue a paused session
    Start,
    /// Pause a running session
    Pause,
    /// Resume a paused session
    Resume,
    /// Pause when running, resume when paused
    Toggle,
    /// Cancel the session without logging it
    Reset,
    /// Print current timer state as JSON
    Status,
    /// Follow a running session until it finishes
    Watch,
}

pub fn run(action: TimerAction) -> CmdResult {
    let config = Config::load_or_default();
    let mut ctl = open_controller(&config)?;

    match action {
        TimerAction::Start => {
            ctl.poll();
            if ctl.start().is_none() {
                notice("Already running.");
            }
        }
        TimerAction::Pause => {
            if ctl.pause().is_none() {
                notice("Nothing to pause.");
            }
        }
        TimerAction::Resume => {
            ctl.poll();
            if ctl.resume().is_none() {
                notice("Nothing to resume.");
            }
        }
        TimerAction::Toggle => {
            ctl.poll();
            ctl.toggle_pause();
        }
        TimerAction::Reset => {
            ctl.reset();
            notice("Cancelled");
        }
        TimerAction::Status => {
            ctl.poll();
        }
        TimerAction::Watch => {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_time()
                .build()?;
            let completed = runtime.block_on(ctl.drive(
                config.frame_interval(),
                Some(config.watch_limit()),
                render_frame,
            ));
            eprintln!();
            if let Some(Event::SessionCompleted { entry }) = &completed {
                tracing::debug!(preset = %entry.preset_name, "watch ended on completion");
            }
        }
    }

    print_json(&ctl.snapshot())
}

fn render_frame(snapshot: &Snapshot) {
    let mut stderr = std::io::stderr().lock();
    let _ = write!(
        stderr,
        "\r{}  {:<7} {}",
        snapshot.timer.display, snapshot.timer.status, snapshot.preset.name
    );
    let _ = stderr.flush();
}
