//! The shared animation substrate
//!
//! Every structure module is a thin client of this engine:
//! - [`coords`] — vector arithmetic over coordinate lists.
//! - [`surface`] — the drawing surface and host event loop interfaces, plus
//!   the [`surface::ShapeStore`] canvas model.
//! - [`animator`] — the stepper, the run-state machine, and the call
//!   environment stack.
//! - [`drawable`] — logical value / shape pairs and the color palette.
//! - [`errors`] — cancellation and redraw errors.

pub mod animator;
pub mod callenv;
pub mod control;
pub mod coords;
pub mod drawable;
pub mod errors;
pub mod surface;

pub use animator::Animator;
pub use callenv::EnvToken;
pub use control::RunState;
pub use drawable::{Drawable, PaletteState, PALETTE};
pub use errors::AnimError;
pub use surface::{EventPump, Host, Shape, ShapeId, ShapeKind, ShapeStore, ShapeStyle, Surface, Transport};

/// Virtual canvas width, in the original coordinate system.
pub const CANVAS_W: f64 = 800.0;
/// Virtual canvas height; y grows downward like the original canvas.
pub const CANVAS_H: f64 = 400.0;
