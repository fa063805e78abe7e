//! # Introduction
//!
//! dsviz animates classic data structures — array, stack, max-heap, singly
//! linked list, and a chaining hash table — on a virtual 2-D canvas rendered
//! in the terminal with [ratatui](https://docs.rs/ratatui).
//!
//! ## Architecture
//!
//! ```text
//! operation → call environment → stepper frames → canvas → terminal
//! ```
//!
//! 1. [`engine`] — the shared animation substrate: coordinate geometry, the
//!    shape store and host traits, the cooperative stepper with its
//!    play/pause/step/stop state machine, and the call environment stack
//!    that guarantees transient shapes are released on every exit path.
//! 2. [`structures`] — the five visualizations, each a thin client of the
//!    engine implementing the [`structures::Module`] capability trait.
//! 3. [`ui`] — ratatui-based TUI shell and terminal host; not part of the
//!    stable library API.
//!
//! Operations are ordinary procedural code: they open a call environment,
//! issue moves and waits against a [`engine::Host`], and propagate
//! cancellation with `?`. The host yields to the event loop between frames,
//! so transport commands (pause, single-step, stop) are observed promptly
//! while everything runs on one thread.

pub mod engine;
pub mod structures;
pub mod ui;
