mod engine;
pub mod format;
mod frame;

pub use engine::{Frame, Heat, Session, TimerEngine, TimerSnapshot, TimerState};
pub use format::{clamp_duration, duration_from_parts, format_clock, format_short};
pub use frame::{FrameLoop, FrameStatus, FrameTicket};
