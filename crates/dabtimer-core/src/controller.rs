//! User-intent facade.
//!
//! Every intent follows the same order: mutate the owning component, save the
//! state blob, then notify collaborators. A completion's log append and
//! counter bumps happen in one call before anything else sees the state.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::time::{Instant, MissedTickBehavior};

use crate::clock::{Clock, SystemClock};
use crate::collaborators::Collaborators;
use crate::error::{GuardRejection, Result};
use crate::events::Event;
use crate::presets::{Preset, PresetDraft, Removal, Upsert};
use crate::state::{AppState, Setting, Settings};
use crate::stats::{LogEntry, StatsSummary};
use crate::storage::{KvStore, StateStore};
use crate::timer::{Frame, TimerSnapshot, TimerState};

/// Everything a front end needs to draw the main view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub timer: TimerSnapshot,
    pub preset: Preset,
    pub dab_count: u64,
    pub today_count: usize,
    pub settings: Settings,
    pub can_pause: bool,
    pub can_reset: bool,
    pub at: DateTime<Utc>,
}

pub struct Controller {
    state: AppState,
    store: StateStore,
    collaborators: Collaborators,
    clock: Arc<dyn Clock>,
}

impl Controller {
    /// Load state from `store` and wire up the given collaborators.
    pub fn new(store: StateStore, collaborators: Collaborators, clock: Arc<dyn Clock>) -> Self {
        let state = store.load();
        Self {
            state,
            store,
            collaborators,
            clock,
        }
    }

    /// Controller over a throwaway in-memory store.
    pub fn in_memory(clock: Arc<dyn Clock>) -> Result<Self> {
        let store = StateStore::new(KvStore::open_memory()?);
        Ok(Self::new(store, Collaborators::new(), clock))
    }

    /// Controller over `store` driven by the system clock.
    pub fn open(store: StateStore, collaborators: Collaborators) -> Self {
        Self::new(store, collaborators, Arc::new(SystemClock))
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn remaining(&self) -> f64 {
        self.state.timer.compute_remaining(self.now())
    }

    pub fn snapshot(&self) -> Snapshot {
        let now = self.now();
        let timer = self.state.timer.snapshot(now);
        let can_pause = matches!(timer.state, TimerState::Running | TimerState::Paused);
        let can_reset = timer.state != TimerState::Idle;
        Snapshot {
            timer,
            preset: self.state.presets.active().clone(),
            dab_count: self.state.stats.dab_count(),
            today_count: self.state.stats.today_count(now),
            settings: self.state.settings,
            can_pause,
            can_reset,
            at: now,
        }
    }

    pub fn stats_summary(&self) -> StatsSummary {
        self.state.stats.summary(self.now())
    }

    pub fn recent_log(&self, limit: usize) -> Vec<LogEntry> {
        self.state.stats.recent(limit).cloned().collect()
    }

    // ── Timer intents ────────────────────────────────────────────────

    pub fn start(&mut self) -> Option<Event> {
        let now = self.now();
        let event = self.state.timer.start(now)?;
        self.persist();
        self.emit(&event);
        Some(event)
    }

    pub fn pause(&mut self) -> Option<Event> {
        // A frame that is already due wins over the pause.
        self.poll();
        let now = self.now();
        let event = self.state.timer.pause(now)?;
        self.persist();
        self.emit(&event);
        Some(event)
    }

    /// Continue a paused session. Idle and finished timers are left alone.
    pub fn resume(&mut self) -> Option<Event> {
        if self.state.timer.state() != TimerState::Paused {
            return None;
        }
        self.start()
    }

    /// The pause button: pause while running, resume while paused.
    pub fn toggle_pause(&mut self) -> Option<Event> {
        if self.state.timer.is_running() {
            self.pause()
        } else {
            self.resume()
        }
    }

    /// Cancel the session. A session whose time already ran out is logged
    /// first; the cancelled remainder never is.
    pub fn reset(&mut self) -> Event {
        self.poll();
        let now = self.now();
        let event = self.state.timer.reset(now);
        self.persist();
        self.emit(&event);
        event
    }

    /// Fire the pending frame, if any. Returns the completion event when the
    /// session ends on this frame.
    pub fn poll(&mut self) -> Option<Event> {
        let ticket = self.state.timer.frames().pending()?;
        let now = self.now();
        match self.state.timer.tick(ticket, now) {
            Frame::Completed { total_secs, at } => Some(self.complete(total_secs, at)),
            Frame::Pending { .. } | Frame::Stale => None,
        }
    }

    /// Run the frame loop until the session is no longer running.
    ///
    /// `on_frame` renders after every frame. Returns the completion event if
    /// the session finished, `None` if it was stopped another way or `limit`
    /// elapsed first.
    pub async fn drive<F>(
        &mut self,
        interval: Duration,
        limit: Option<Duration>,
        mut on_frame: F,
    ) -> Option<Event>
    where
        F: FnMut(&Snapshot),
    {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let deadline = limit.map(|l| Instant::now() + l);

        while self.state.timer.frames().is_armed() {
            ticker.tick().await;
            let completed = self.poll();
            on_frame(&self.snapshot());
            if completed.is_some() {
                return completed;
            }
            if deadline.is_some_and(|d| Instant::now() >= d) {
                tracing::debug!("frame loop hit its watch limit");
                break;
            }
        }
        None
    }

    // ── Preset intents ───────────────────────────────────────────────

    pub fn apply_preset(&mut self, id: &str) -> Result<Preset> {
        self.guard_idle()?;
        let now = self.now();
        let preset = self.state.presets.set_active(id)?.clone();
        self.state.timer.load_duration(preset.duration_secs, now);
        self.persist();
        self.emit(&Event::PresetChanged {
            preset: preset.clone(),
        });
        Ok(preset)
    }

    pub fn save_preset(&mut self, draft: &PresetDraft) -> Result<Upsert> {
        self.guard_idle()?;
        let outcome = self.state.presets.upsert(draft)?;
        let touches_active = outcome.preset().id == self.state.presets.active_id();
        if touches_active {
            let now = self.now();
            self.state.timer.load_duration(outcome.preset().duration_secs, now);
        }
        self.persist();
        if touches_active {
            self.emit(&Event::PresetChanged {
                preset: outcome.preset().clone(),
            });
        }
        Ok(outcome)
    }

    pub fn remove_preset(&mut self, id: &str) -> Result<Removal> {
        self.guard_idle()?;
        let removal = self.state.presets.remove(id)?;
        if let Some(active) = &removal.new_active {
            let now = self.now();
            self.state.timer.load_duration(active.duration_secs, now);
        }
        self.persist();
        if let Some(active) = &removal.new_active {
            self.emit(&Event::PresetChanged {
                preset: active.clone(),
            });
        }
        Ok(removal)
    }

    // ── History & settings ───────────────────────────────────────────

    pub fn clear_history(&mut self) -> Event {
        // An overdue session lands before the wipe, not after it.
        self.poll();
        self.state.stats.clear_all();
        self.persist();
        let event = Event::StatsCleared { at: self.now() };
        self.emit(&event);
        event
    }

    /// Flip a setting and return its new value.
    pub fn toggle(&mut self, setting: Setting) -> bool {
        let value = self.state.settings.toggle(setting);
        self.persist();
        value
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn complete(&mut self, total_secs: u32, at: DateTime<Utc>) -> Event {
        let entry = LogEntry::completed(self.state.presets.active(), total_secs, at);
        self.state.stats.record(entry.clone());
        tracing::info!(
            preset = %entry.preset_name,
            secs = entry.duration_secs,
            count = self.state.stats.dab_count(),
            "session completed"
        );
        self.persist();
        let event = Event::SessionCompleted { entry };
        self.emit(&event);
        event
    }

    /// Presets may only change while no session is running.
    fn guard_idle(&mut self) -> Result<(), GuardRejection> {
        self.poll();
        if self.state.timer.is_running() {
            return Err(GuardRejection::PresetLockedWhileRunning);
        }
        Ok(())
    }

    fn persist(&self) {
        if let Err(e) = self.store.save(&self.state) {
            tracing::warn!(error = %e, "failed to save state");
        }
    }

    fn emit(&self, event: &Event) {
        self.collaborators.dispatch(event, &self.state.settings);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use chrono::TimeZone;

    fn setup() -> (Controller, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2026, 4, 20, 16, 20, 0).unwrap(),
        ));
        let controller = Controller::in_memory(clock.clone()).unwrap();
        (controller, clock)
    }

    fn secs(n: i64) -> chrono::Duration {
        chrono::Duration::seconds(n)
    }

    #[test]
    fn thirty_second_preset_completes_once() {
        let (mut ctl, clock) = setup();
        ctl.apply_preset("p3").unwrap();
        ctl.start();
        clock.advance(secs(30));
        let event = ctl.poll();
        assert!(matches!(event, Some(Event::SessionCompleted { .. })));
        assert_eq!(ctl.state().timer.state(), TimerState::Finished);
        assert_eq!(ctl.state().stats.dab_count(), 1);
        assert_eq!(ctl.state().stats.log()[0].duration_secs, 30);

        // No further frames once finished.
        clock.advance(secs(30));
        assert!(ctl.poll().is_none());
        assert_eq!(ctl.state().stats.dab_count(), 1);
    }

    #[test]
    fn pause_then_reset_logs_nothing() {
        let (mut ctl, clock) = setup();
        ctl.start();
        clock.advance(secs(10));
        assert!(ctl.pause().is_some());
        ctl.reset();
        assert_eq!(ctl.state().stats.dab_count(), 0);
        assert!(ctl.state().stats.log().is_empty());
        assert!(ctl.state().stats.tool_counts().is_empty());
        assert_eq!(ctl.remaining(), 60.0);
    }

    #[test]
    fn apply_while_running_is_rejected() {
        let (mut ctl, clock) = setup();
        ctl.start();
        clock.advance(secs(5));
        let before = ctl.state().timer.session().clone();
        let err = ctl.apply_preset("p2").unwrap_err();
        assert!(matches!(
            err,
            crate::CoreError::Guard(GuardRejection::PresetLockedWhileRunning)
        ));
        assert_eq!(ctl.state().presets.active_id(), "p1");
        assert_eq!(ctl.state().timer.session().started_at, before.started_at);
        assert_eq!(ctl.state().timer.session().total_seconds, before.total_seconds);
    }

    #[test]
    fn overdue_pause_completes_instead() {
        let (mut ctl, clock) = setup();
        ctl.start();
        clock.advance(secs(90));
        assert!(ctl.pause().is_none());
        assert_eq!(ctl.state().timer.state(), TimerState::Finished);
        assert_eq!(ctl.state().stats.dab_count(), 1);
    }

    #[test]
    fn overdue_reset_logs_the_finished_session() {
        let (mut ctl, clock) = setup();
        ctl.start();
        clock.advance(secs(90));
        assert!(matches!(ctl.reset(), Event::SessionReset { .. }));
        assert_eq!(ctl.state().stats.dab_count(), 1);
        assert_eq!(ctl.state().stats.log()[0].duration_secs, 60);
        assert_eq!(ctl.state().timer.state(), TimerState::Idle);
        assert_eq!(ctl.remaining(), 60.0);
    }

    #[test]
    fn clear_history_absorbs_an_overdue_session() {
        let (mut ctl, clock) = setup();
        ctl.start();
        clock.advance(secs(75));
        ctl.clear_history();
        assert_eq!(ctl.state().stats.dab_count(), 0);
        assert!(ctl.state().stats.log().is_empty());
        assert!(ctl.poll().is_none());
        assert_eq!(ctl.state().stats.dab_count(), 0);
    }

    #[test]
    fn resume_only_from_paused() {
        let (mut ctl, clock) = setup();
        assert!(ctl.resume().is_none());
        assert!(ctl.toggle_pause().is_none());
        ctl.start();
        clock.advance(secs(4));
        assert!(matches!(ctl.toggle_pause(), Some(Event::SessionPaused { .. })));
        assert!(matches!(ctl.toggle_pause(), Some(Event::SessionStarted { .. })));
        clock.advance(secs(6));
        assert_eq!(ctl.remaining(), 50.0);
    }

    #[test]
    fn saving_new_preset_loads_its_duration() {
        let (mut ctl, _clock) = setup();
        let outcome = ctl
            .save_preset(&PresetDraft {
                name: "Slow".into(),
                minutes: 3,
                seconds: 0,
                ..PresetDraft::default()
            })
            .unwrap();
        assert_eq!(ctl.state().presets.active_id(), outcome.preset().id);
        assert_eq!(ctl.state().timer.total_secs(), 180);
        assert_eq!(ctl.snapshot().preset.name, "Slow");
    }

    #[test]
    fn removing_active_preset_switches_session() {
        let (mut ctl, _clock) = setup();
        ctl.apply_preset("p4").unwrap();
        ctl.remove_preset("p4").unwrap();
        assert_eq!(ctl.state().presets.active_id(), "p1");
        assert_eq!(ctl.state().timer.total_secs(), 60);
    }

    #[test]
    fn clear_history_keeps_presets_and_settings() {
        let (mut ctl, clock) = setup();
        ctl.toggle(Setting::Mute);
        ctl.start();
        clock.advance(secs(61));
        ctl.poll();
        assert_eq!(ctl.state().stats.dab_count(), 1);
        ctl.clear_history();
        assert_eq!(ctl.state().stats.dab_count(), 0);
        assert!(ctl.state().settings.muted);
        assert_eq!(ctl.state().presets.len(), 4);
    }

    #[test]
    fn snapshot_button_states() {
        let (mut ctl, clock) = setup();
        let idle = ctl.snapshot();
        assert!(!idle.can_pause && !idle.can_reset);
        ctl.start();
        clock.advance(secs(1));
        let running = ctl.snapshot();
        assert!(running.can_pause && running.can_reset);
        assert_eq!(running.timer.display, "00:59");
    }

    #[tokio::test]
    async fn drive_runs_until_completion() {
        let (mut ctl, clock) = setup();
        ctl.apply_preset("p3").unwrap();
        ctl.start();
        let mut frames = 0;
        let ticker = clock.clone();
        let event = ctl
            .drive(Duration::from_millis(1), None, |_| {
                frames += 1;
                ticker.advance(secs(5));
            })
            .await;
        assert!(matches!(event, Some(Event::SessionCompleted { .. })));
        assert_eq!(ctl.state().stats.dab_count(), 1);
        assert!(frames >= 6);
    }

    #[tokio::test]
    async fn drive_returns_immediately_when_idle() {
        let (mut ctl, _clock) = setup();
        let event = ctl.drive(Duration::from_millis(1), None, |_| {}).await;
        assert!(event.is_none());
    }
}
