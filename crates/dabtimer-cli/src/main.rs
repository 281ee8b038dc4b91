use clap::{Parser, Subcommand};
use dabtimer_core::CoreError;
use tracing_subscriber::EnvFilter;

mod commands;
mod feedback;

#[derive(Parser)]
#[command(name = "dabtimer", version, about = "Repeatable session timer")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Timer control
    Timer {
        #[command(subcommand)]
        action: commands::timer::TimerAction,
    },
    /// Preset management
    Preset {
        #[command(subcommand)]
        action: commands::preset::PresetAction,
    },
    /// Session statistics and history
    Stats {
        #[command(subcommand)]
        action: commands::stats::StatsAction,
    },
    /// Sound, voice, haptics and manage-mode toggles
    Settings {
        #[command(subcommand)]
        action: commands::settings::SettingsAction,
    },
    /// Show a random wax fact and tool fact
    Facts,
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("DABTIMER_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_tracing();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Timer { action } => commands::timer::run(action),
        Commands::Preset { action } => commands::preset::run(action),
        Commands::Stats { action } => commands::stats::run(action),
        Commands::Settings { action } => commands::settings::run(action),
        Commands::Facts => commands::facts::run(),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        // Guard rejections are notices, not failures of the tool itself.
        match e.downcast_ref::<CoreError>() {
            Some(CoreError::Guard(rejection)) => eprintln!("{rejection}"),
            _ => eprintln!("error: {e}"),
        }
        std::process::exit(1);
    }
}
