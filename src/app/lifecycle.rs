//! Control loop lifecycle: `Idle → Running → Stopped`.
//!
//! ```text
//!   Idle ──(engine ok)──▶ Running ──(cancel | limit | fatal)──▶ Stopped
//!    ▲  │
//!    └──┘ engine failed
//! ```
//!
//! `Stopped` is terminal.  A failed engine construction leaves the loop in
//! `Idle`; it never passes through `Running`.

use log::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum LoopState {
    Idle = 0,
    Running = 1,
    Stopped = 2,
}

impl LoopState {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Running => "Running",
            Self::Stopped => "Stopped",
        }
    }

    /// Whether `self → next` is a legal edge.
    pub const fn can_transition(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Idle, Self::Running) | (Self::Running, Self::Stopped)
        )
    }
}

/// Guarded state holder.  Illegal edges are refused and reported.
#[derive(Debug)]
pub struct Lifecycle {
    current: LoopState,
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}

impl Lifecycle {
    pub fn new() -> Self {
        Self {
            current: LoopState::Idle,
        }
    }

    pub fn current(&self) -> LoopState {
        self.current
    }

    /// Move to `next` if the edge is legal.  On refusal the state is
    /// unchanged and the current state is returned as the error.
    pub fn transition(&mut self, next: LoopState) -> Result<(), LoopState> {
        if !self.current.can_transition(next) {
            return Err(self.current);
        }
        info!("Loop transition: {} -> {}", self.current.name(), next.name());
        self.current = next;
        Ok(())
    }
}
