//! Cooperative frame loop bookkeeping.
//!
//! The loop itself is driven from outside (see `Controller::drive`). This type
//! only tracks whether a frame is scheduled and lets a transition invalidate
//! frames that were scheduled before it.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FrameStatus {
    /// Never armed.
    #[default]
    Idle,
    /// A frame is scheduled and will be honoured.
    Armed,
    /// The last scheduled frame was revoked.
    Cancelled,
}

/// Handle for one scheduled frame. Stale once the loop is cancelled or re-armed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameTicket {
    generation: u64,
}

#[derive(Debug, Clone, Default)]
pub struct FrameLoop {
    status: FrameStatus,
    generation: u64,
}

impl FrameLoop {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> FrameStatus {
        self.status
    }

    pub fn is_armed(&self) -> bool {
        self.status == FrameStatus::Armed
    }

    /// Schedule the next frame.
    pub fn arm(&mut self) -> FrameTicket {
        self.generation = self.generation.wrapping_add(1);
        self.status = FrameStatus::Armed;
        FrameTicket {
            generation: self.generation,
        }
    }

    /// Ticket for the currently scheduled frame, if any.
    pub fn pending(&self) -> Option<FrameTicket> {
        self.is_armed().then_some(FrameTicket {
            generation: self.generation,
        })
    }

    /// Revoke the scheduled frame. Cancelling twice is a no-op.
    pub fn cancel(&mut self) {
        if self.status == FrameStatus::Armed {
            self.generation = self.generation.wrapping_add(1);
            self.status = FrameStatus::Cancelled;
        }
    }

    /// Whether a firing frame should run.
    pub fn accept(&self, ticket: FrameTicket) -> bool {
        self.is_armed() && ticket.generation == self.generation
    }
}
