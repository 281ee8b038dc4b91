pub mod config;
pub mod facts;
pub mod preset;
pub mod settings;
pub mod stats;
pub mod timer;

use dabtimer_core::{Config, Controller, KvStore, StateStore};
use serde::Serialize;

pub type CmdResult = Result<(), Box<dyn std::error::Error>>;

/// Open the persisted state with the terminal collaborators attached.
pub fn open_controller(config: &Config) -> Result<Controller, Box<dyn std::error::Error>> {
    let kv = KvStore::open()?;
    let store = StateStore::with_key(kv, config.storage.key.clone());
    Ok(Controller::open(store, crate::feedback::terminal()))
}

pub fn print_json<T: Serialize>(value: &T) -> CmdResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// One-line toast on stderr.
pub fn notice(message: &str) {
    eprintln!("{message}");
}
