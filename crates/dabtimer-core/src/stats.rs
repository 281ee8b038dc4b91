//! Completion log and usage counters.
//!
//! Everything here changes only through [`StatsAggregator::record`] (one call
//! per completed session) and [`StatsAggregator::clear_all`].

use std::collections::VecDeque;
use std::fmt;

use chrono::{DateTime, Local, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::presets::Preset;
use crate::timer::format_clock;

/// Newest-first log capacity.
pub const LOG_CAP: usize = 500;

/// Shown wherever a "most used" value has no data yet.
pub const NONE_YET: &str = "none yet";

/// Insertion-ordered key → count map.
pub type Counter = IndexMap<String, u64>;

/// One completed session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    #[serde(rename = "ts", with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "presetName")]
    pub preset_name: String,
    pub tool: String,
    #[serde(rename = "wax")]
    pub substance: String,
    #[serde(rename = "sec")]
    pub duration_secs: u32,
}

impl LogEntry {
    /// Entry for a session of `duration_secs` run against `preset`.
    pub fn completed(preset: &Preset, duration_secs: u32, at: DateTime<Utc>) -> Self {
        Self {
            timestamp: at,
            preset_name: preset.name.clone(),
            tool: preset.tool.clone(),
            substance: preset.substance.clone(),
            duration_secs,
        }
    }
}

/// Result of a "most frequent" query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopPick<'a> {
    NoneYet,
    Key { key: &'a str, count: u64 },
}

impl fmt::Display for TopPick<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TopPick::NoneYet => f.write_str(NONE_YET),
            TopPick::Key { key, count } => write!(f, "{key} ({count})"),
        }
    }
}

/// Highest-count key. Ties go to the key inserted first.
pub fn top_pick(map: &Counter) -> TopPick<'_> {
    let mut best: Option<(&str, u64)> = None;
    for (key, &count) in map {
        match best {
            Some((_, top)) if count <= top => {}
            _ => best = Some((key.as_str(), count)),
        }
    }
    match best {
        Some((key, count)) => TopPick::Key { key, count },
        None => TopPick::NoneYet,
    }
}

/// Aggregates for the info view.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StatsSummary {
    pub total: u64,
    pub today: usize,
    pub top_tool: String,
    pub top_wax: String,
    pub top_timer: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct StatsAggregator {
    dab_count: u64,
    log: VecDeque<LogEntry>,
    tool_counts: Counter,
    wax_counts: Counter,
    timer_counts: Counter,
}

impl StatsAggregator {
    /// Rebuild from stored parts. The log is cut to [`LOG_CAP`].
    pub fn from_parts(
        dab_count: u64,
        log: Vec<LogEntry>,
        tool_counts: Counter,
        wax_counts: Counter,
        timer_counts: Counter,
    ) -> Self {
        let mut log = VecDeque::from(log);
        log.truncate(LOG_CAP);
        Self {
            dab_count,
            log,
            tool_counts,
            wax_counts,
            timer_counts,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn dab_count(&self) -> u64 {
        self.dab_count
    }

    /// Newest first.
    pub fn log(&self) -> &VecDeque<LogEntry> {
        &self.log
    }

    /// Up to `limit` newest entries.
    pub fn recent(&self, limit: usize) -> impl Iterator<Item = &LogEntry> {
        self.log.iter().take(limit)
    }

    pub fn tool_counts(&self) -> &Counter {
        &self.tool_counts
    }

    pub fn wax_counts(&self) -> &Counter {
        &self.wax_counts
    }

    pub fn timer_counts(&self) -> &Counter {
        &self.timer_counts
    }

    /// Entries logged on the local calendar date of `now`.
    pub fn today_count(&self, now: DateTime<Utc>) -> usize {
        let today = now.with_timezone(&Local).date_naive();
        self.log
            .iter()
            .filter(|e| e.timestamp.with_timezone(&Local).date_naive() == today)
            .count()
    }

    pub fn summary(&self, now: DateTime<Utc>) -> StatsSummary {
        StatsSummary {
            total: self.dab_count,
            today: self.today_count(now),
            top_tool: top_pick(&self.tool_counts).to_string(),
            top_wax: top_pick(&self.wax_counts).to_string(),
            top_timer: top_pick(&self.timer_counts).to_string(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Log a completed session: one entry plus one bump of every counter.
    pub fn record(&mut self, entry: LogEntry) {
        bump(&mut self.tool_counts, &entry.tool);
        bump(&mut self.wax_counts, &entry.substance);
        bump(&mut self.timer_counts, &format_clock(entry.duration_secs as f64));
        self.dab_count += 1;
        self.log.push_front(entry);
        self.log.truncate(LOG_CAP);
    }

    /// Drop the whole history. Presets and settings are not touched.
    pub fn clear_all(&mut self) {
        self.log.clear();
        self.dab_count = 0;
        self.tool_counts.clear();
        self.wax_counts.clear();
        self.timer_counts.clear();
    }
}

fn bump(map: &mut Counter, key: &str) {
    *map.entry(key.to_string()).or_insert(0) += 1;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presets::default_presets;
    use chrono::{Duration, TimeZone};

    fn entry(secs: u32, at: DateTime<Utc>) -> LogEntry {
        LogEntry::completed(&default_presets()[0], secs, at)
    }

    #[test]
    fn top_pick_empty_is_sentinel() {
        assert_eq!(top_pick(&Counter::new()), TopPick::NoneYet);
        assert_eq!(top_pick(&Counter::new()).to_string(), "none yet");
    }

    #[test]
    fn top_pick_highest_count() {
        let map: Counter = [("A".to_string(), 2), ("B".to_string(), 5)].into_iter().collect();
        assert_eq!(top_pick(&map), TopPick::Key { key: "B", count: 5 });
        assert_eq!(top_pick(&map).to_string(), "B (5)");
    }

    #[test]
    fn top_pick_tie_goes_to_first_inserted() {
        let map: Counter = [
            ("Rosin".to_string(), 3),
            ("Badder".to_string(), 3),
            ("Shatter".to_string(), 1),
        ]
        .into_iter()
        .collect();
        assert_eq!(top_pick(&map), TopPick::Key { key: "Rosin", count: 3 });
    }

    #[test]
    fn record_bumps_everything_once() {
        let mut stats = StatsAggregator::default();
        stats.record(entry(60, Utc::now()));
        assert_eq!(stats.dab_count(), 1);
        assert_eq!(stats.log().len(), 1);
        assert_eq!(stats.tool_counts()["Glass Dab Rig"], 1);
        assert_eq!(stats.wax_counts()["Badder"], 1);
        assert_eq!(stats.timer_counts()["01:00"], 1);
    }

    #[test]
    fn log_is_newest_first_and_capped() {
        let base = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let mut stats = StatsAggregator::default();
        for i in 0..(LOG_CAP as i64 + 1) {
            stats.record(entry(60, base + Duration::seconds(i)));
        }
        assert_eq!(stats.log().len(), LOG_CAP);
        assert_eq!(stats.dab_count(), LOG_CAP as u64 + 1);
        assert_eq!(stats.log()[0].timestamp, base + Duration::seconds(LOG_CAP as i64));
        assert_eq!(
            stats.log().back().map(|e| e.timestamp),
            Some(base + Duration::seconds(1))
        );
    }

    #[test]
    fn clear_all_resets_history() {
        let mut stats = StatsAggregator::default();
        stats.record(entry(30, Utc::now()));
        stats.clear_all();
        assert_eq!(stats, StatsAggregator::default());
        assert_eq!(stats.summary(Utc::now()).top_tool, NONE_YET);
    }

    #[test]
    fn today_count_uses_local_date() {
        let now = Utc::now();
        let mut stats = StatsAggregator::default();
        stats.record(entry(30, now - Duration::days(3)));
        stats.record(entry(30, now));
        stats.record(entry(30, now));
        assert_eq!(stats.today_count(now), 2);
        assert_eq!(stats.summary(now).today, 2);
    }

    #[test]
    fn from_parts_truncates_log() {
        let now = Utc::now();
        let log = (0..600).map(|_| entry(10, now)).collect();
        let stats =
            StatsAggregator::from_parts(600, log, Counter::new(), Counter::new(), Counter::new());
        assert_eq!(stats.log().len(), LOG_CAP);
        assert_eq!(stats.dab_count(), 600);
    }

    #[test]
    fn log_entry_uses_wire_names() {
        let at = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();
        let json = serde_json::to_value(entry(75, at)).unwrap();
        assert_eq!(json["ts"], 1_700_000_000_123_i64);
        assert_eq!(json["presetName"], "Standard");
        assert_eq!(json["wax"], "Badder");
        assert_eq!(json["sec"], 75);
    }
}
