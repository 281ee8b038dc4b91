use dabtimer_core::feedback::shuffle_facts;
use serde_json::json;

use super::{notice, print_json, CmdResult};

pub fn run() -> CmdResult {
    let (wax, tool) = shuffle_facts(&mut rand::thread_rng());
    notice("New intel loaded");
    print_json(&json!({ "wax": wax, "tool": tool }))
}
