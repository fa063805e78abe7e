//! Terminal host for the animation engine
//!
//! [`TermHost`] owns the ratatui terminal, the shape store, the status line,
//! and the argument input slot. `flush` renders one frame: the virtual
//! canvas, the title and operation help line, the input slot, and the
//! status bar. The event pump drains crossterm events without blocking,
//! mapping Space / `s` / `x` or Esc to transport commands and resolving
//! left clicks through the shape activation bindings so a clicked value
//! lands in the input slot.

use std::io::{self, Stdout};
use std::thread;
use std::time::Duration;

use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::canvas::{Canvas, Context, Line as CanvasLine, Rectangle};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::{Frame, Terminal};

use crate::engine::coords::{rotate, unit};
use crate::engine::{
    EventPump, ShapeKind, ShapeStore, Surface, Transport, CANVAS_H, CANVAS_W,
};

use super::theme::DEFAULT_THEME;

const ARROWHEAD: f64 = 7.0;
const OVAL_SEGMENTS: usize = 20;

/// The terminal canvas plots in braille sub-pixels; rows of horizontal
/// lines at this spacing read as a solid fill.
const FILL_STEP: f64 = 2.0;

pub struct TermHost {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    store: ShapeStore,
    /// Visualization name shown in the help line.
    pub title: String,
    /// Digit key and label for each operation.
    pub ops: Vec<(char, String)>,
    /// Status message shown in the bottom bar.
    pub status: String,
    /// Label of the operation awaiting an argument, empty when idle.
    pub prompt: String,
    /// Hint shown in the slot while it is empty.
    pub hint: String,
    /// The argument input/readback slot.
    pub input: String,
    /// Canvas interior from the last frame, for click resolution.
    canvas_area: Rect,
    quit: bool,
}

impl TermHost {
    pub fn new(terminal: Terminal<CrosstermBackend<Stdout>>) -> Self {
        TermHost {
            terminal,
            store: ShapeStore::new(),
            title: String::new(),
            ops: Vec::new(),
            status: String::new(),
            prompt: String::new(),
            hint: String::new(),
            input: String::new(),
            canvas_area: Rect::default(),
            quit: false,
        }
    }

    pub fn quit_requested(&self) -> bool {
        self.quit
    }

    pub fn request_quit(&mut self) {
        self.quit = true;
    }

    /// Wait up to `timeout` for one key press, resolving any mouse clicks
    /// into the input slot along the way. Used by the idle loop; during
    /// animation the engine polls through [`EventPump`] instead.
    pub fn poll_key(&mut self, timeout: Duration) -> io::Result<Option<KeyEvent>> {
        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => return Ok(Some(key)),
                Event::Mouse(mouse) => self.handle_mouse(mouse),
                _ => {}
            }
        }
        Ok(None)
    }

    /// Terminal cell to virtual canvas coordinates, when inside the canvas.
    fn canvas_point(&self, column: u16, row: u16) -> Option<[f64; 2]> {
        let area = self.canvas_area;
        if area.width == 0 || area.height == 0 {
            return None;
        }
        if !(area.x..area.x + area.width).contains(&column)
            || !(area.y..area.y + area.height).contains(&row)
        {
            return None;
        }
        let vx = (f64::from(column - area.x) + 0.5) / f64::from(area.width) * CANVAS_W;
        let vy = (f64::from(row - area.y) + 0.5) / f64::from(area.height) * CANVAS_H;
        Some([vx, vy])
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        if mouse.kind != MouseEventKind::Down(MouseButton::Left) {
            return;
        }
        if let Some(pt) = self.canvas_point(mouse.column, mouse.row) {
            if let Some(value) = self.store.activation_at(pt) {
                self.input = value.to_string();
            }
        }
    }
}

impl Surface for TermHost {
    fn store(&self) -> &ShapeStore {
        &self.store
    }

    fn store_mut(&mut self) -> &mut ShapeStore {
        &mut self.store
    }

    fn flush(&mut self) -> io::Result<()> {
        let TermHost { terminal, store, title, ops, status, prompt, hint, input, canvas_area, .. } =
            self;
        terminal.draw(|frame| {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Length(1),
                    Constraint::Min(0),
                    Constraint::Length(1),
                    Constraint::Length(1),
                ])
                .split(frame.area());

            render_help_line(frame, chunks[0], title, ops);
            render_canvas(frame, chunks[1], store, canvas_area);
            render_input_line(frame, chunks[2], prompt, hint, input);
            render_status_bar(frame, chunks[3], status);
        })?;
        Ok(())
    }
}

impl EventPump for TermHost {
    fn poll_transport(&mut self) -> Vec<Transport> {
        let mut commands = Vec::new();
        while let Ok(true) = event::poll(Duration::ZERO) {
            match event::read() {
                Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => match key.code {
                    KeyCode::Char(' ') => commands.push(Transport::PlayPause),
                    KeyCode::Char('s') => commands.push(Transport::Step),
                    KeyCode::Char('x') | KeyCode::Esc => commands.push(Transport::Stop),
                    KeyCode::Char('q') => {
                        self.quit = true;
                        commands.push(Transport::Stop);
                    }
                    _ => {}
                },
                Ok(Event::Mouse(mouse)) => self.handle_mouse(mouse),
                _ => {}
            }
        }
        commands
    }

    fn sleep(&mut self, duration: Duration) {
        thread::sleep(duration);
    }
}

fn render_help_line(frame: &mut Frame, area: Rect, title: &str, ops: &[(char, String)]) {
    let mut spans = vec![Span::styled(
        format!(" {} ", title),
        Style::default().fg(DEFAULT_THEME.title).add_modifier(Modifier::BOLD),
    )];
    for (key, label) in ops {
        spans.push(Span::styled(format!(" {}:", key), Style::default().fg(DEFAULT_THEME.key)));
        spans.push(Span::styled(label.clone(), Style::default().fg(DEFAULT_THEME.fg)));
    }
    spans.push(Span::styled(
        "   Space:pause s:step x:stop q:quit",
        Style::default().fg(DEFAULT_THEME.hint),
    ));
    let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(DEFAULT_THEME.bg));
    frame.render_widget(paragraph, area);
}

fn render_canvas(frame: &mut Frame, area: Rect, store: &ShapeStore, canvas_area: &mut Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(DEFAULT_THEME.border))
        .style(Style::default().bg(DEFAULT_THEME.bg));
    *canvas_area = block.inner(area);
    let canvas = Canvas::default()
        .block(block)
        .x_bounds([0.0, CANVAS_W])
        .y_bounds([0.0, CANVAS_H])
        .paint(|ctx| paint_shapes(ctx, store));
    frame.render_widget(canvas, area);
}

fn render_input_line(frame: &mut Frame, area: Rect, prompt: &str, hint: &str, input: &str) {
    let mut spans = Vec::new();
    if !prompt.is_empty() {
        spans.push(Span::styled(
            format!(" {}: ", prompt),
            Style::default().fg(DEFAULT_THEME.prompt).add_modifier(Modifier::BOLD),
        ));
        if input.is_empty() {
            spans.push(Span::styled(hint.to_string(), Style::default().fg(DEFAULT_THEME.hint)));
            spans.push(Span::raw(" "));
        }
        spans.push(Span::styled(
            format!("{}_", input),
            Style::default().fg(DEFAULT_THEME.fg),
        ));
    } else if !input.is_empty() {
        spans.push(Span::styled(
            format!(" > {}", input),
            Style::default().fg(DEFAULT_THEME.hint),
        ));
    }
    let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(DEFAULT_THEME.bg));
    frame.render_widget(paragraph, area);
}

fn render_status_bar(frame: &mut Frame, area: Rect, status: &str) {
    let spans = vec![Span::styled(
        format!(" {} ", status),
        Style::default().bg(DEFAULT_THEME.status_bg).fg(DEFAULT_THEME.fg),
    )];
    let paragraph =
        Paragraph::new(Line::from(spans)).style(Style::default().bg(DEFAULT_THEME.status_bg));
    frame.render_widget(paragraph, area);
}

/// The virtual coordinate system grows downward; the canvas grows upward.
fn flip(y: f64) -> f64 {
    CANVAS_H - y
}

fn paint_shapes(ctx: &mut Context, store: &ShapeStore) {
    for (id, shape) in store.iter() {
        let c = shape.coords.as_slice();
        match shape.kind {
            ShapeKind::Rect if c.len() >= 4 => {
                if let Some(fill) = shape.style.fill {
                    let mut y = c[1];
                    while y <= c[3] {
                        ctx.draw(&CanvasLine {
                            x1: c[0],
                            y1: flip(y),
                            x2: c[2],
                            y2: flip(y),
                            color: fill,
                        });
                        y += FILL_STEP;
                    }
                }
                if let Some(outline) = shape.style.outline {
                    ctx.draw(&Rectangle {
                        x: c[0],
                        y: flip(c[3]),
                        width: c[2] - c[0],
                        height: c[3] - c[1],
                        color: outline,
                    });
                }
            }
            ShapeKind::Oval if c.len() >= 4 => {
                let color = shape.style.fill.or(shape.style.outline).unwrap_or(Color::White);
                paint_oval(ctx, c, color);
            }
            ShapeKind::Line if c.len() >= 4 => {
                let color = shape.style.fill.unwrap_or(Color::White);
                for i in (0..c.len() - 3).step_by(2) {
                    ctx.draw(&CanvasLine {
                        x1: c[i],
                        y1: flip(c[i + 1]),
                        x2: c[i + 2],
                        y2: flip(c[i + 3]),
                        color,
                    });
                }
                if shape.style.arrow {
                    paint_arrowhead(ctx, c, color);
                }
            }
            ShapeKind::Text => {
                if let Some(text) = shape.style.text.as_ref().filter(|t| !t.is_empty()) {
                    let color = shape.style.fill.unwrap_or(Color::White);
                    // Anchor at the estimated left edge so the text centers
                    // on the shape coordinate like the store's bbox assumes
                    let left = store.bbox(id)[0];
                    ctx.print(
                        left,
                        flip(c[1]),
                        Line::styled(text.clone(), Style::default().fg(color)),
                    );
                }
            }
            _ => {}
        }
    }
}

fn paint_oval(ctx: &mut Context, c: &[f64], color: Color) {
    let cx = (c[0] + c[2]) / 2.0;
    let cy = (c[1] + c[3]) / 2.0;
    let rx = (c[2] - c[0]).abs() / 2.0;
    let ry = (c[3] - c[1]).abs() / 2.0;
    let mut prev = [cx + rx, cy];
    for i in 1..=OVAL_SEGMENTS {
        let angle = std::f64::consts::TAU * i as f64 / OVAL_SEGMENTS as f64;
        let next = [cx + rx * angle.cos(), cy + ry * angle.sin()];
        ctx.draw(&CanvasLine {
            x1: prev[0],
            y1: flip(prev[1]),
            x2: next[0],
            y2: flip(next[1]),
            color,
        });
        prev = next;
    }
}

/// Two short wings at the last point of a polyline.
fn paint_arrowhead(ctx: &mut Context, c: &[f64], color: Color) {
    let n = c.len();
    let tip = [c[n - 2], c[n - 1]];
    let back = [c[n - 4] - tip[0], c[n - 3] - tip[1]];
    if back[0] == 0.0 && back[1] == 0.0 {
        return;
    }
    let dir = unit(back, 1.0);
    for angle in [30.0, -30.0] {
        let wing = rotate(&[dir[0] * ARROWHEAD, dir[1] * ARROWHEAD], angle);
        ctx.draw(&CanvasLine {
            x1: tip[0],
            y1: flip(tip[1]),
            x2: tip[0] + wing[0],
            y2: flip(tip[1] + wing[1]),
            color,
        });
    }
}
