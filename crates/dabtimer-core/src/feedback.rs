//! Completion feedback vocabulary.
//!
//! The core does not play sounds or vibrate anything. It only names what a
//! sound, voice or haptics collaborator should produce for each event.

use rand::seq::SliceRandom;
use rand::Rng;

/// Spoken on completion; one is picked at random.
pub const VOICE_LINES: [&str; 5] = [
    "Okay. Now rip it.",
    "Terp time.",
    "Hydrate first.",
    "Proceed. Respectfully.",
    "Low temp, big flavor.",
];

pub const WAX_FACTS: [&str; 5] = [
    "Live resin keeps more terps. Cooler timers usually taste cleaner.",
    "Rosin is sensitive. Moderate heat windows hit the sweet spot.",
    "Badder melts smooth: gentle airflow helps it vaporize evenly.",
    "Shatter can scorch fast. Waiting longer saves flavor.",
    "Sugar diamonds can need a little extra melt time. Patience pays.",
];

pub const TOOL_FACTS: [&str; 5] = [
    "Glass rigs reward steady draws. Let the heat do the work.",
    "Carb caps increase efficiency and help keep temps stable.",
    "Don't thermal shock glass: hot banger + cold surface = sad glass.",
    "Clean hardware = better flavor. Reclaim builds resistance fast.",
    "Cold-starts: load first, low heat, slow draw. Terps stay happy.",
];

/// Vibration patterns, alternating on/off milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HapticPattern {
    Start,
    Pause,
    Complete,
}

impl HapticPattern {
    pub fn millis(self) -> &'static [u32] {
        match self {
            HapticPattern::Start => &[20],
            HapticPattern::Pause => &[10, 40, 10],
            HapticPattern::Complete => &[50, 60, 50, 120],
        }
    }
}

/// One note of the completion chime.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Note {
    pub freq_hz: f64,
    /// Offset from the start of the chime.
    pub start_secs: f64,
    pub length_secs: f64,
}

/// C5 E5 G5 B5.
pub const CHIME_NOTES: [f64; 4] = [523.25, 659.25, 784.0, 988.0];

/// The completion chime: two bursts at normal speed, then four at double
/// speed with a tighter gap.
pub fn chime() -> Vec<Note> {
    let mut notes = Vec::new();
    let mut t = 0.0;
    for (bursts, speed, gap) in [(2, 1.0, 0.18), (4, 2.0, 0.10)] {
        for _ in 0..bursts {
            let step = 0.12 / speed;
            let release = 0.16 / speed;
            for (i, &freq_hz) in CHIME_NOTES.iter().enumerate() {
                notes.push(Note {
                    freq_hz,
                    start_secs: t + i as f64 * step,
                    length_secs: release + 0.02,
                });
            }
            t += step * (CHIME_NOTES.len() - 1) as f64 + 0.20 / speed + gap;
        }
    }
    notes
}

pub fn pick_voice_line<R: Rng + ?Sized>(rng: &mut R) -> &'static str {
    VOICE_LINES.choose(rng).copied().unwrap_or(VOICE_LINES[0])
}

/// A random (wax, tool) fact pair.
pub fn shuffle_facts<R: Rng + ?Sized>(rng: &mut R) -> (&'static str, &'static str) {
    (
        WAX_FACTS.choose(rng).copied().unwrap_or(WAX_FACTS[0]),
        TOOL_FACTS.choose(rng).copied().unwrap_or(TOOL_FACTS[0]),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chime_has_six_bursts_of_four() {
        let notes = chime();
        assert_eq!(notes.len(), 24);
        assert_eq!(notes[0].start_secs, 0.0);
        assert!(notes.windows(2).all(|w| w[0].start_secs < w[1].start_secs));
        // Second half is faster.
        let slow = notes[1].start_secs - notes[0].start_secs;
        let fast = notes[9].start_secs - notes[8].start_secs;
        assert!((slow - 2.0 * fast).abs() < 1e-9);
    }

    #[test]
    fn voice_line_comes_from_the_list() {
        let mut rng = rand::thread_rng();
        for _ in 0..20 {
            assert!(VOICE_LINES.contains(&pick_voice_line(&mut rng)));
        }
    }

    #[test]
    fn haptic_patterns() {
        assert_eq!(HapticPattern::Start.millis(), &[20]);
        assert_eq!(HapticPattern::Complete.millis().len(), 4);
    }
}
