//! Terminal user interface built on [ratatui](https://github.com/ratatui-org/ratatui).
//!
//! The UI is organized into three layers:
//!
//! - **[`app`]** — application shell: keyboard event loop, operation
//!   selection, argument input mode
//! - **[`term`]** — [`term::TermHost`], the drawing surface and event pump
//!   the animation engine runs against
//! - **[`theme`]** — centralized color palette for the chrome (the canvas
//!   item colors live with the structures)
//!
//! The entry point for consumers is [`App`]: construct it with a
//! [`TermHost`] and a structure module and call [`App::run`] to start the
//! event loop.
//!
//! [`App::run`]: app::App::run

pub mod app;
pub mod term;
pub mod theme;

pub use app::App;
pub use term::TermHost;
