//! Error type for animated operations
//!
//! Cancellation is the one expected failure: a stop command observed at a
//! suspend point aborts the in-flight move, and operation bodies propagate
//! it with `?` so their call environments unwind. Terminal I/O failures
//! from redraws travel in the same type.

use std::fmt;
use std::io;

#[derive(Debug)]
pub enum AnimError {
    /// The user stopped the animation mid-operation. Not a fault; the
    /// operation's call environments are unwound and the layout restored.
    Stopped,

    /// A redraw failed at the terminal boundary.
    Io(io::Error),
}

impl fmt::Display for AnimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnimError::Stopped => write!(f, "animation stopped"),
            AnimError::Io(err) => write!(f, "redraw failed: {}", err),
        }
    }
}

impl std::error::Error for AnimError {}

impl From<io::Error> for AnimError {
    fn from(err: io::Error) -> Self {
        AnimError::Io(err)
    }
}
