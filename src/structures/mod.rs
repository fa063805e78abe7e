//! Data structure visualization modules
//!
//! Each module owns an [`Animator`](crate::engine::Animator) by composition
//! plus its logical state, and implements [`Module`]: a title, a list of
//! operations for the UI to offer, and an `invoke` entry point that
//! validates arguments, runs the animated operation, and returns a status
//! message. Operations are disabled while one is mid-flight by construction;
//! the whole visualization runs on one thread.

pub mod array;
pub mod hash_chain;
pub mod heap;
pub mod linked_list;
pub mod stack;

use ratatui::style::Color;

use crate::engine::{AnimError, Host};

pub use array::ArrayViz;
pub use hash_chain::HashChainViz;
pub use heap::HeapViz;
pub use linked_list::ListViz;
pub use stack::StackViz;

/// One user-facing operation trigger.
#[derive(Debug, Clone, Copy)]
pub struct OpSpec {
    pub label: &'static str,
    /// Number of arguments the operation takes (0 or 1 input slot; the
    /// hash table's New packs two values into one slot).
    pub arity: usize,
    /// Hint shown in the argument input slot.
    pub hint: &'static str,
}

/// Capability interface every visualization implements. The UI shell is
/// generic over this; structures hold the engine, they do not inherit it.
pub trait Module<H: Host> {
    fn title(&self) -> &'static str;

    fn ops(&self) -> &'static [OpSpec];

    /// Run operation `op` with the raw argument text. Returns the status
    /// message to display. Cancellation is absorbed here; only redraw
    /// failures propagate.
    fn invoke(&mut self, host: &mut H, op: usize, arg: &str) -> Result<String, AnimError>;
}

/// Canvas item colors shared by all structures. Chrome colors (borders,
/// status bar) live in the UI theme.
pub const VALUE_COLOR: Color = Color::Rgb(20, 20, 20);
pub const VARIABLE_COLOR: Color = Color::Rgb(222, 184, 135);
pub const FOUND_COLOR: Color = Color::Rgb(205, 92, 92);
pub const CELL_BORDER_COLOR: Color = Color::Rgb(160, 160, 170);
pub const OPERATIONS_BG: Color = Color::Rgb(70, 70, 85);

/// Longest argument accepted by the string-keyed structures.
pub const MAX_ARG_WIDTH: usize = 8;

/// Map a cancelled operation to its status message.
pub(crate) fn absorb_stop(result: Result<String, AnimError>) -> Result<String, AnimError> {
    match result {
        Err(AnimError::Stopped) => Ok(String::from("Animation stopped")),
        other => other,
    }
}

/// Validate an integer argument in 0..=99.
pub(crate) fn parse_small_int(arg: &str) -> Result<u32, String> {
    match arg.trim().parse::<u32>() {
        Ok(val) if val < 100 => Ok(val),
        _ => Err(String::from("Input value must be an integer from 0 to 99.")),
    }
}

/// Validate a text argument: non-empty and at most [`MAX_ARG_WIDTH`] chars.
pub(crate) fn check_text_arg(arg: &str) -> Result<&str, String> {
    let arg = arg.trim();
    if arg.is_empty() {
        Err(String::from("An argument is required"))
    } else if arg.chars().count() > MAX_ARG_WIDTH {
        Err(format!("Error! {} value is too long", arg))
    } else {
        Ok(arg)
    }
}

/// Small deterministic generator for random fills and the initial array
/// contents. Seeded per use so behavior is reproducible in tests.
#[derive(Debug)]
pub struct XorShift(u64);

impl XorShift {
    pub fn new(seed: u64) -> Self {
        XorShift(seed.max(1))
    }

    pub fn next(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }

    /// Uniform-ish value in `0..n`.
    pub fn below(&mut self, n: u32) -> u32 {
        (self.next() % u64::from(n.max(1))) as u32
    }
}
