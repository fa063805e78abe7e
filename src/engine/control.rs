//! Animation run state
//!
//! One state per visualization instance:
//!
//! ```text
//! STOPPED -> RUNNING <-> PAUSED -> STEPPING -> PAUSED
//!    ^________________________________________/   (stop, from anywhere)
//! ```
//!
//! While `Stopped`, geometry changes apply instantly with a single redraw.
//! `Stepping` is a transient sub-mode entered from `Paused`: it runs one
//! move or wait to completion, then re-pauses.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunState {
    #[default]
    Stopped,
    Running,
    Paused,
    Stepping,
}

impl RunState {
    /// Whether moves should animate incrementally rather than jump.
    pub fn animating(self) -> bool {
        !matches!(self, RunState::Stopped)
    }
}
