mod config;
mod kv;
mod state_store;

pub use config::{Config, StorageConfig, TimerConfig};
pub use kv::KvStore;
pub use state_store::{decode, PersistedState, StateStore, STATE_KEY};

use std::path::PathBuf;

use crate::error::StorageError;

/// Returns `~/.config/dabtimer[-dev]/` based on DABTIMER_ENV.
///
/// Set DABTIMER_ENV=dev to use development data directory.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> Result<PathBuf, StorageError> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("DABTIMER_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("dabtimer-dev")
    } else {
        base_dir.join("dabtimer")
    };

    std::fs::create_dir_all(&dir).map_err(|e| StorageError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
