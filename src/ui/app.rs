//! Main TUI application state and logic

use std::io;
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent};

use crate::engine::{AnimError, Surface};
use crate::structures::Module;

use super::term::TermHost;

/// Idle redraw cadence; also bounds how long a key press can go unnoticed.
const IDLE_POLL: Duration = Duration::from_millis(50);

const MAX_INPUT: usize = 16;

/// Whether the shell is waiting for an operation key or collecting an
/// argument for one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Idle,
    EnteringArg { op: usize },
}

/// The application shell: one structure module, the terminal host, and the
/// input mode. Operations run to completion inside `invoke`, so a second
/// operation can never start while an animation is mid-flight.
pub struct App<M> {
    host: TermHost,
    module: M,
    mode: Mode,
}

impl<M: Module<TermHost>> App<M> {
    pub fn new(mut host: TermHost, module: M) -> Self {
        host.title = module.title().to_string();
        host.ops = module
            .ops()
            .iter()
            .enumerate()
            .map(|(i, op)| ((b'1' + i as u8) as char, op.label.to_string()))
            .collect();
        App { host, module, mode: Mode::Idle }
    }

    /// Run the TUI application until the user quits.
    pub fn run(&mut self) -> io::Result<()> {
        self.host.status = String::from("Ready!");
        loop {
            self.host.flush()?;

            if self.host.quit_requested() {
                break;
            }

            if let Some(key) = self.host.poll_key(IDLE_POLL)? {
                self.handle_key_event(key)?;
            }
        }
        Ok(())
    }

    fn handle_key_event(&mut self, key: KeyEvent) -> io::Result<()> {
        match self.mode {
            Mode::Idle => match key.code {
                KeyCode::Char('q') | KeyCode::Char('Q') => self.host.request_quit(),
                KeyCode::Char(c @ '1'..='9') => {
                    let op = (c as u8 - b'1') as usize;
                    if let Some(spec) = self.module.ops().get(op) {
                        if spec.arity == 0 {
                            self.invoke(op)?;
                        } else {
                            self.mode = Mode::EnteringArg { op };
                            self.host.prompt = spec.label.to_string();
                            self.host.hint = spec.hint.to_string();
                        }
                    }
                }
                KeyCode::Esc => self.host.input.clear(),
                _ => {}
            },
            Mode::EnteringArg { op } => match key.code {
                KeyCode::Enter => {
                    self.mode = Mode::Idle;
                    self.host.prompt.clear();
                    self.host.hint.clear();
                    self.invoke(op)?;
                }
                KeyCode::Esc => {
                    self.mode = Mode::Idle;
                    self.host.prompt.clear();
                    self.host.hint.clear();
                    self.host.input.clear();
                }
                KeyCode::Backspace => {
                    self.host.input.pop();
                }
                KeyCode::Char(c) => {
                    if self.host.input.len() < MAX_INPUT {
                        self.host.input.push(c);
                    }
                }
                _ => {}
            },
        }
        Ok(())
    }

    /// Run one operation with whatever is in the input slot. Cancellation
    /// is absorbed inside the module; only terminal I/O failures bubble up.
    fn invoke(&mut self, op: usize) -> io::Result<()> {
        let arg = std::mem::take(&mut self.host.input);
        match self.module.invoke(&mut self.host, op, &arg) {
            Ok(message) => self.host.status = message,
            Err(AnimError::Stopped) => self.host.status = String::from("Animation stopped"),
            Err(AnimError::Io(err)) => return Err(err),
        }
        Ok(())
    }
}
