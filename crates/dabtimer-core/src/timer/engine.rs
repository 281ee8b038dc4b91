//! Timer engine implementation.
//!
//! The timer engine is a wall-clock-based state machine. It does not use
//! internal threads - the caller supplies `now` and fires frames.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running -> (Paused -> Running)* -> Finished -> Running ...
//!   ^________________ reset() from anywhere _________________|
//! ```
//!
//! Remaining time is always recomputed from `started_at` and the elapsed time
//! banked by earlier runs, so skipped or late frames never cause drift.
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = TimerEngine::new(60);
//! engine.start(Utc::now());
//! // In a loop:
//! let ticket = engine.frames().pending().unwrap();
//! engine.tick(ticket, Utc::now()); // Frame::Completed when the session ends
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::format::{clamp_duration, format_clock};
use super::frame::{FrameLoop, FrameTicket};
use crate::events::Event;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerState {
    Idle,
    Running,
    Paused,
    Finished,
}

impl TimerState {
    /// Short status word shown next to the clock.
    pub fn label(self) -> &'static str {
        match self {
            TimerState::Idle => "ready",
            TimerState::Running => "running",
            TimerState::Paused => "paused",
            TimerState::Finished => "done",
        }
    }
}

/// Coarse progress bucket; heats up as the countdown nears zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Heat {
    Cool,
    Warm,
    Hot,
}

/// The single countdown session.
///
/// When `running` is false `remaining_seconds` is authoritative. While running
/// it is only a cache of the last frame; use [`TimerEngine::compute_remaining`].
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub total_seconds: u32,
    pub remaining_seconds: f64,
    pub running: bool,
    pub started_at: Option<DateTime<Utc>>,
    /// Seconds banked by every earlier run of this session.
    pub elapsed_before_pause: f64,
}

impl Session {
    pub fn new(total_seconds: u32) -> Self {
        let total_seconds = clamp_duration(total_seconds as i64);
        Self {
            total_seconds,
            remaining_seconds: total_seconds as f64,
            running: false,
            started_at: None,
            elapsed_before_pause: 0.0,
        }
    }

    /// Repair a session read back from storage.
    pub fn normalized(mut self) -> Self {
        self.total_seconds = clamp_duration(self.total_seconds as i64);
        let total = self.total_seconds as f64;
        if !self.remaining_seconds.is_finite() {
            self.remaining_seconds = total;
        }
        self.remaining_seconds = self.remaining_seconds.clamp(0.0, total);
        if !self.elapsed_before_pause.is_finite() || self.elapsed_before_pause < 0.0 {
            self.elapsed_before_pause = 0.0;
        }
        if self.running && self.started_at.is_none() {
            self.running = false;
        }
        if !self.running {
            self.started_at = None;
        }
        self
    }
}

/// Outcome of firing one frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    /// The ticket was revoked by a transition; nothing happened.
    Stale,
    /// Still counting down; the next frame is scheduled.
    Pending { remaining_secs: f64, next: FrameTicket },
    /// Remaining time hit zero on this frame.
    Completed { total_secs: u32, at: DateTime<Utc> },
}

/// Serializable view of the engine at one instant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerSnapshot {
    pub state: TimerState,
    pub status: String,
    pub total_secs: u32,
    pub remaining_secs: f64,
    pub display: String,
    pub progress: f64,
    pub heat: Heat,
}

/// Core timer engine.
///
/// Operates on wall-clock timestamps -- no internal thread.
/// The caller is responsible for firing frames while the loop is armed.
#[derive(Debug, Clone)]
pub struct TimerEngine {
    session: Session,
    frames: FrameLoop,
}

impl TimerEngine {
    /// Create an idle engine for a session of `total_secs`.
    pub fn new(total_secs: u32) -> Self {
        Self::from_session(Session::new(total_secs))
    }

    /// Restore a persisted session. A running session resumes its frame loop.
    pub fn from_session(session: Session) -> Self {
        let session = session.normalized();
        let mut frames = FrameLoop::new();
        if session.running {
            frames.arm();
        }
        Self { session, frames }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn frames(&self) -> &FrameLoop {
        &self.frames
    }

    pub fn is_running(&self) -> bool {
        self.session.running
    }

    pub fn total_secs(&self) -> u32 {
        self.session.total_seconds
    }

    pub fn state(&self) -> TimerState {
        let s = &self.session;
        if s.running {
            TimerState::Running
        } else if s.remaining_seconds <= 0.0 {
            TimerState::Finished
        } else if s.remaining_seconds >= s.total_seconds as f64 && s.elapsed_before_pause == 0.0 {
            TimerState::Idle
        } else {
            TimerState::Paused
        }
    }

    /// Seconds left at `now`. The only place that decides whether the stored
    /// or the derived value is authoritative.
    pub fn compute_remaining(&self, now: DateTime<Utc>) -> f64 {
        let s = &self.session;
        match (s.running, s.started_at) {
            (true, Some(started)) => {
                let elapsed = s.elapsed_before_pause + secs_between(started, now);
                (s.total_seconds as f64 - elapsed).max(0.0)
            }
            _ => s.remaining_seconds,
        }
    }

    /// 0.0 .. 1.0 elapsed fraction of the session.
    pub fn progress(&self, now: DateTime<Utc>) -> f64 {
        let total = self.session.total_seconds as f64;
        if total <= 0.0 {
            return 1.0;
        }
        (1.0 - self.compute_remaining(now) / total).clamp(0.0, 1.0)
    }

    pub fn heat(&self, now: DateTime<Utc>) -> Heat {
        if self.state() == TimerState::Idle {
            return Heat::Cool;
        }
        let progress = self.progress(now);
        if progress < 0.35 {
            Heat::Cool
        } else if progress < 0.75 {
            Heat::Warm
        } else {
            Heat::Hot
        }
    }

    pub fn snapshot(&self, now: DateTime<Utc>) -> TimerSnapshot {
        let remaining = self.compute_remaining(now);
        let state = self.state();
        TimerSnapshot {
            state,
            status: state.label().to_string(),
            total_secs: self.session.total_seconds,
            remaining_secs: remaining,
            display: format_clock(remaining),
            progress: self.progress(now),
            heat: self.heat(now),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn start(&mut self, now: DateTime<Utc>) -> Option<Event> {
        if self.session.running {
            return None;
        }
        if self.state() == TimerState::Finished {
            // A finished timer restarts fresh rather than resuming at zero.
            self.session.remaining_seconds = self.session.total_seconds as f64;
            self.session.elapsed_before_pause = 0.0;
        }
        self.session.running = true;
        self.session.started_at = Some(now);
        self.frames.arm();
        tracing::debug!(
            total = self.session.total_seconds,
            remaining = self.session.remaining_seconds,
            "session started"
        );
        Some(Event::SessionStarted {
            total_secs: self.session.total_seconds,
            remaining_secs: self.session.remaining_seconds,
            at: now,
        })
    }

    pub fn pause(&mut self, now: DateTime<Utc>) -> Option<Event> {
        if !self.session.running {
            return None;
        }
        let remaining = self.compute_remaining(now);
        if let Some(started) = self.session.started_at {
            self.session.elapsed_before_pause += secs_between(started, now);
        }
        self.session.remaining_seconds = remaining;
        self.session.running = false;
        self.session.started_at = None;
        self.frames.cancel();
        tracing::debug!(remaining, elapsed = self.session.elapsed_before_pause, "session paused");
        Some(Event::SessionPaused {
            remaining_secs: remaining,
            elapsed_secs: self.session.elapsed_before_pause,
            at: now,
        })
    }

    /// Back to a full, un-started session. Never counts as a completion.
    pub fn reset(&mut self, now: DateTime<Utc>) -> Event {
        self.session.running = false;
        self.session.started_at = None;
        self.session.remaining_seconds = self.session.total_seconds as f64;
        self.session.elapsed_before_pause = 0.0;
        self.frames.cancel();
        tracing::debug!(total = self.session.total_seconds, "session reset");
        Event::SessionReset {
            total_secs: self.session.total_seconds,
            at: now,
        }
    }

    /// Swap in a new session length and reset against it.
    pub fn load_duration(&mut self, secs: u32, now: DateTime<Utc>) -> Event {
        self.session.total_seconds = clamp_duration(secs as i64);
        self.reset(now)
    }

    /// Fire one frame of the polling loop.
    pub fn tick(&mut self, ticket: FrameTicket, now: DateTime<Utc>) -> Frame {
        if !self.frames.accept(ticket) || !self.session.running {
            return Frame::Stale;
        }
        let remaining = self.compute_remaining(now);
        if remaining <= 0.0 {
            self.finish(now);
            return Frame::Completed {
                total_secs: self.session.total_seconds,
                at: now,
            };
        }
        self.session.remaining_seconds = remaining;
        Frame::Pending {
            remaining_secs: remaining,
            next: self.frames.arm(),
        }
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn finish(&mut self, now: DateTime<Utc>) {
        if let Some(started) = self.session.started_at {
            self.session.elapsed_before_pause += secs_between(started, now);
        }
        self.session.remaining_seconds = 0.0;
        self.session.running = false;
        self.session.started_at = None;
        self.frames.cancel();
        tracing::debug!(total = self.session.total_seconds, "session finished");
    }
}

fn secs_between(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    ((to - from).num_milliseconds() as f64 / 1000.0).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    fn fire(engine: &mut TimerEngine, now: DateTime<Utc>) -> Frame {
        match engine.frames().pending() {
            Some(ticket) => engine.tick(ticket, now),
            None => Frame::Stale,
        }
    }

    #[test]
    fn start_pause_resume() {
        let mut engine = TimerEngine::new(60);
        assert_eq!(engine.state(), TimerState::Idle);

        assert!(engine.start(t0()).is_some());
        assert_eq!(engine.state(), TimerState::Running);
        assert!(engine.start(t0()).is_none());

        assert!(engine.pause(t0() + Duration::seconds(5)).is_some());
        assert_eq!(engine.state(), TimerState::Paused);
        assert!(engine.pause(t0() + Duration::seconds(6)).is_none());

        assert!(engine.start(t0() + Duration::seconds(10)).is_some());
        assert_eq!(engine.state(), TimerState::Running);
    }

    #[test]
    fn remaining_is_derived_from_wall_clock() {
        let mut engine = TimerEngine::new(60);
        engine.start(t0());
        assert_eq!(engine.compute_remaining(t0() + Duration::seconds(12)), 48.0);
        assert_eq!(engine.compute_remaining(t0() + Duration::seconds(600)), 0.0);
    }

    #[test]
    fn pause_banks_elapsed_across_runs() {
        let mut engine = TimerEngine::new(60);
        engine.start(t0());
        engine.pause(t0() + Duration::seconds(10));
        assert_eq!(engine.session().elapsed_before_pause, 10.0);
        assert_eq!(engine.compute_remaining(t0() + Duration::seconds(500)), 50.0);

        engine.start(t0() + Duration::seconds(100));
        engine.pause(t0() + Duration::seconds(105));
        assert_eq!(engine.session().elapsed_before_pause, 15.0);
        assert_eq!(engine.session().remaining_seconds, 45.0);
    }

    #[test]
    fn reset_restores_full_session() {
        let mut engine = TimerEngine::new(45);
        engine.start(t0());
        engine.pause(t0() + Duration::seconds(20));
        engine.reset(t0() + Duration::seconds(21));
        assert_eq!(engine.state(), TimerState::Idle);
        assert_eq!(engine.session().remaining_seconds, 45.0);
        assert_eq!(engine.session().elapsed_before_pause, 0.0);
        assert!(!engine.frames().is_armed());
    }

    #[test]
    fn tick_completes_at_zero_and_stops_rescheduling() {
        let mut engine = TimerEngine::new(30);
        engine.start(t0());
        assert!(matches!(
            fire(&mut engine, t0() + Duration::seconds(10)),
            Frame::Pending { .. }
        ));
        let frame = fire(&mut engine, t0() + Duration::seconds(31));
        assert_eq!(
            frame,
            Frame::Completed {
                total_secs: 30,
                at: t0() + Duration::seconds(31)
            }
        );
        assert_eq!(engine.state(), TimerState::Finished);
        assert_eq!(engine.session().remaining_seconds, 0.0);
        assert!(engine.frames().pending().is_none());
        assert!(engine.pause(t0() + Duration::seconds(32)).is_none());
    }

    #[test]
    fn stale_ticket_after_pause_does_nothing() {
        let mut engine = TimerEngine::new(30);
        engine.start(t0());
        let ticket = engine.frames().pending().unwrap();
        engine.pause(t0() + Duration::seconds(3));
        assert_eq!(engine.tick(ticket, t0() + Duration::seconds(40)), Frame::Stale);
        assert_eq!(engine.state(), TimerState::Paused);
    }

    #[test]
    fn start_after_finish_restarts_fresh() {
        let mut engine = TimerEngine::new(30);
        engine.start(t0());
        fire(&mut engine, t0() + Duration::seconds(30));
        assert_eq!(engine.state(), TimerState::Finished);

        let restart = t0() + Duration::seconds(60);
        engine.start(restart);
        assert_eq!(engine.session().elapsed_before_pause, 0.0);
        assert_eq!(engine.compute_remaining(restart + Duration::seconds(1)), 29.0);
    }

    #[test]
    fn load_duration_clamps_and_resets() {
        let mut engine = TimerEngine::new(60);
        engine.start(t0());
        engine.pause(t0() + Duration::seconds(3));
        engine.load_duration(9_999, t0());
        assert_eq!(engine.total_secs(), 3599);
        assert_eq!(engine.state(), TimerState::Idle);
    }

    #[test]
    fn heat_rises_toward_zero() {
        let mut engine = TimerEngine::new(100);
        assert_eq!(engine.heat(t0()), Heat::Cool);
        engine.start(t0());
        assert_eq!(engine.heat(t0() + Duration::seconds(20)), Heat::Cool);
        assert_eq!(engine.heat(t0() + Duration::seconds(50)), Heat::Warm);
        assert_eq!(engine.heat(t0() + Duration::seconds(80)), Heat::Hot);
    }

    #[test]
    fn restored_running_session_rearms_frames() {
        let session = Session {
            total_seconds: 60,
            remaining_seconds: 60.0,
            running: true,
            started_at: Some(t0()),
            elapsed_before_pause: 0.0,
        };
        let engine = TimerEngine::from_session(session);
        assert!(engine.frames().is_armed());
        assert_eq!(engine.compute_remaining(t0() + Duration::seconds(15)), 45.0);
    }

    #[test]
    fn normalize_repairs_bad_values() {
        let session = Session {
            total_seconds: 0,
            remaining_seconds: f64::NAN,
            running: true,
            started_at: None,
            elapsed_before_pause: -3.0,
        }
        .normalized();
        assert_eq!(session.total_seconds, 1);
        assert_eq!(session.remaining_seconds, 1.0);
        assert!(!session.running);
        assert_eq!(session.elapsed_before_pause, 0.0);
    }

    #[test]
    fn snapshot_reports_display_and_status() {
        let engine = TimerEngine::new(95);
        let snap = engine.snapshot(t0());
        assert_eq!(snap.state, TimerState::Idle);
        assert_eq!(snap.status, "ready");
        assert_eq!(snap.display, "01:35");
        assert_eq!(snap.progress, 0.0);
    }
}
