//! Terminal stand-ins for the sound, voice, haptics and toast collaborators.

use std::io::Write;

use dabtimer_core::feedback::{chime, pick_voice_line, HapticPattern};
use dabtimer_core::timer::format_short;
use dabtimer_core::{Channel, Collaborator, Collaborators, HookResult, LogEntry, Preset};

/// All terminal collaborators, in dispatch order.
pub fn terminal() -> Collaborators {
    Collaborators::new()
        .with(TerminalBell)
        .with(VoiceLine)
        .with(HapticLog)
        .with(Notices)
}

/// Rings the terminal bell in place of the completion chime.
///
/// A terminal cannot play the note schedule, so the chime is only described
/// at debug level for anyone tracing audio output.
pub struct TerminalBell;

impl Collaborator for TerminalBell {
    fn name(&self) -> &str {
        "bell"
    }

    fn channel(&self) -> Channel {
        Channel::Sound
    }

    fn on_session_complete(&self, _entry: &LogEntry) -> HookResult {
        if tracing::enabled!(tracing::Level::DEBUG) {
            let notes = chime();
            let secs = notes
                .last()
                .map(|n| n.start_secs + n.length_secs)
                .unwrap_or_default();
            tracing::debug!(notes = notes.len(), secs, "chime stand-in");
        }
        let mut stderr = std::io::stderr().lock();
        stderr.write_all(b"\x07")?;
        stderr.flush()?;
        Ok(())
    }
}

/// Prints one of the voice lines when a session completes.
pub struct VoiceLine;

impl Collaborator for VoiceLine {
    fn name(&self) -> &str {
        "voice"
    }

    fn channel(&self) -> Channel {
        Channel::Voice
    }

    fn on_session_complete(&self, _entry: &LogEntry) -> HookResult {
        eprintln!("\"{}\"", pick_voice_line(&mut rand::thread_rng()));
        Ok(())
    }
}

/// No vibration motor here, so the patterns only go to the log.
pub struct HapticLog;

impl HapticLog {
    fn buzz(pattern: HapticPattern) -> HookResult {
        tracing::debug!(?pattern, millis = ?pattern.millis(), "haptics");
        Ok(())
    }
}

impl Collaborator for HapticLog {
    fn name(&self) -> &str {
        "haptics"
    }

    fn channel(&self) -> Channel {
        Channel::Haptics
    }

    fn on_session_start(&self) -> HookResult {
        Self::buzz(HapticPattern::Start)
    }

    fn on_session_pause(&self) -> HookResult {
        Self::buzz(HapticPattern::Pause)
    }

    fn on_session_complete(&self, _entry: &LogEntry) -> HookResult {
        Self::buzz(HapticPattern::Complete)
    }
}

/// Toasts for events the user did not directly ask about.
pub struct Notices;

impl Collaborator for Notices {
    fn name(&self) -> &str {
        "notices"
    }

    fn channel(&self) -> Channel {
        Channel::Display
    }

    fn on_session_complete(&self, entry: &LogEntry) -> HookResult {
        eprintln!(
            "+1 dab logged ({}, {})",
            entry.preset_name,
            format_short(entry.duration_secs as f64)
        );
        Ok(())
    }

    fn on_preset_changed(&self, preset: &Preset) -> HookResult {
        tracing::debug!(id = %preset.id, secs = preset.duration_secs, "active preset changed");
        Ok(())
    }
}
