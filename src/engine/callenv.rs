//! Call environments
//!
//! Each logical operation invocation opens an environment that owns the
//! transient shapes it creates (index arrows, working copies, output
//! boxes). Environments form a stack mirroring nested operations; closing
//! one deletes every shape it still owns, so an operation that returns
//! early or is cancelled never leaks canvas items.
//!
//! A shape belongs to at most one environment at a time. Ownership moves
//! explicitly: `adopt` on creation, `disown` when the shape is handed to
//! the structure's permanent display.

use rustc_hash::FxHashSet;

use super::surface::ShapeId;

/// Handle to one open environment. Only valid until the environment is
/// cleaned up; using a stale token is a contract violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnvToken(pub(super) usize);

#[derive(Debug, Default)]
pub(super) struct CallEnv {
    pub(super) owned: FxHashSet<ShapeId>,
}

impl CallEnv {
    pub(super) fn new() -> Self {
        CallEnv { owned: FxHashSet::default() }
    }
}
