#![allow(dead_code)] // Complete canvas model, not every accessor is used by every host
//! Drawing surface and host event loop interfaces
//!
//! The animation engine talks to the outside world through two small traits:
//! - [`Surface`]: create/move/delete shapes on a 2-D canvas and force a
//!   redraw. Backed by a [`ShapeStore`], which keeps the shape records and
//!   z-order; the terminal host renders the store, the test host just counts
//!   redraws.
//! - [`EventPump`]: drain pending transport commands without blocking and
//!   yield the thread cooperatively.
//!
//! Shape ids are opaque. Reading or deleting an id that is not live is a
//! contract violation and fails a debug assertion.

use std::io;
use std::time::Duration;

use ratatui::style::Color;
use rustc_hash::FxHashMap;

use super::coords::bbox_contains;

/// Opaque identifier for one shape on the canvas.
pub type ShapeId = u32;

/// Transport commands the host event loop can deliver during animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    /// Toggle between running and paused.
    PlayPause,
    /// From paused, run one unit of animation and re-pause.
    Step,
    /// Cancel the in-flight move and stop the whole animation.
    Stop,
}

/// What kind of primitive a shape is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
    /// Axis-aligned rectangle, coords `[x0, y0, x1, y1]`.
    Rect,
    /// Ellipse inscribed in `[x0, y0, x1, y1]`.
    Oval,
    /// Polyline, coords `[x0, y0, x1, y1, ...]`; may carry an arrowhead.
    Line,
    /// Text anchored at `[x, y]`.
    Text,
}

/// Visual attributes of a shape.
#[derive(Debug, Clone)]
pub struct ShapeStyle {
    pub fill: Option<Color>,
    pub outline: Option<Color>,
    /// Draw an arrowhead at the last point (lines only).
    pub arrow: bool,
    /// Text content (text shapes only).
    pub text: Option<String>,
}

impl ShapeStyle {
    pub fn filled(color: Color) -> Self {
        ShapeStyle { fill: Some(color), outline: None, arrow: false, text: None }
    }

    pub fn outlined(color: Color) -> Self {
        ShapeStyle { fill: None, outline: Some(color), arrow: false, text: None }
    }

    pub fn line(color: Color, arrow: bool) -> Self {
        ShapeStyle { fill: Some(color), outline: None, arrow, text: None }
    }

    pub fn text(content: impl Into<String>, color: Color) -> Self {
        ShapeStyle { fill: Some(color), outline: None, arrow: false, text: Some(content.into()) }
    }
}

/// One shape record.
#[derive(Debug, Clone)]
pub struct Shape {
    pub kind: ShapeKind,
    pub coords: Vec<f64>,
    pub style: ShapeStyle,
}

/// The canvas model: shape records, z-order, and activation bindings.
#[derive(Debug, Default)]
pub struct ShapeStore {
    shapes: FxHashMap<ShapeId, Shape>,
    order: Vec<ShapeId>, // back to front
    next_id: ShapeId,
    activations: FxHashMap<ShapeId, String>,
}

// Approximate text metrics for bounding boxes; the terminal renderer does
// not expose real font metrics and nothing downstream needs better.
const TEXT_CHAR_W: f64 = 8.0;
const TEXT_HALF_H: f64 = 6.0;

impl ShapeStore {
    pub fn new() -> Self {
        ShapeStore::default()
    }

    /// Create a shape on top of the z-order and return its id.
    pub fn create(&mut self, kind: ShapeKind, coords: Vec<f64>, style: ShapeStyle) -> ShapeId {
        self.next_id += 1;
        let id = self.next_id;
        self.shapes.insert(id, Shape { kind, coords, style });
        self.order.push(id);
        id
    }

    /// Duplicate a shape (same coords and style), placed on top.
    pub fn copy(&mut self, id: ShapeId) -> ShapeId {
        debug_assert!(self.shapes.contains_key(&id), "copy of dead shape {id}");
        match self.shapes.get(&id).cloned() {
            Some(shape) => {
                let copied = self.create(shape.kind, shape.coords, shape.style);
                if let Some(value) = self.activations.get(&id).cloned() {
                    self.activations.insert(copied, value);
                }
                copied
            }
            None => 0,
        }
    }

    pub fn delete(&mut self, id: ShapeId) {
        debug_assert!(self.shapes.contains_key(&id), "delete of dead shape {id}");
        self.shapes.remove(&id);
        self.activations.remove(&id);
        if let Some(pos) = self.order.iter().position(|&o| o == id) {
            self.order.remove(pos);
        }
    }

    /// Remove every shape. Used when a structure redisplays from scratch.
    pub fn clear(&mut self) {
        self.shapes.clear();
        self.order.clear();
        self.activations.clear();
    }

    pub fn contains(&self, id: ShapeId) -> bool {
        self.shapes.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    pub fn coords(&self, id: ShapeId) -> &[f64] {
        debug_assert!(self.shapes.contains_key(&id), "coords of dead shape {id}");
        self.shapes.get(&id).map(|s| s.coords.as_slice()).unwrap_or(&[])
    }

    pub fn set_coords(&mut self, id: ShapeId, coords: &[f64]) {
        debug_assert!(self.shapes.contains_key(&id), "set_coords of dead shape {id}");
        if let Some(shape) = self.shapes.get_mut(&id) {
            shape.coords = coords.to_vec();
        }
    }

    /// Bounding box of a shape. Text boxes are estimated from content length.
    pub fn bbox(&self, id: ShapeId) -> [f64; 4] {
        debug_assert!(self.shapes.contains_key(&id), "bbox of dead shape {id}");
        let Some(shape) = self.shapes.get(&id) else {
            return [0.0; 4];
        };
        if shape.kind == ShapeKind::Text {
            let half_w = shape.style.text.as_deref().map_or(0, str::len) as f64 * TEXT_CHAR_W / 2.0;
            let (x, y) = (shape.coords[0], shape.coords[1]);
            return [x - half_w, y - TEXT_HALF_H, x + half_w, y + TEXT_HALF_H];
        }
        let xs = shape.coords.iter().step_by(2);
        let ys = shape.coords.iter().skip(1).step_by(2);
        let x0 = xs.clone().fold(f64::INFINITY, |a, &b| a.min(b));
        let x1 = xs.fold(f64::NEG_INFINITY, |a, &b| a.max(b));
        let y0 = ys.clone().fold(f64::INFINITY, |a, &b| a.min(b));
        let y1 = ys.fold(f64::NEG_INFINITY, |a, &b| a.max(b));
        [x0, y0, x1, y1]
    }

    pub fn fill(&self, id: ShapeId) -> Option<Color> {
        self.shapes.get(&id).and_then(|s| s.style.fill)
    }

    pub fn set_fill(&mut self, id: ShapeId, color: Color) {
        debug_assert!(self.shapes.contains_key(&id), "set_fill of dead shape {id}");
        if let Some(shape) = self.shapes.get_mut(&id) {
            shape.style.fill = Some(color);
        }
    }

    pub fn set_text(&mut self, id: ShapeId, content: impl Into<String>) {
        debug_assert!(self.shapes.contains_key(&id), "set_text of dead shape {id}");
        if let Some(shape) = self.shapes.get_mut(&id) {
            shape.style.text = Some(content.into());
        }
    }

    /// Move a shape to the bottom of the z-order (cell grids under values).
    pub fn lower(&mut self, id: ShapeId) {
        if let Some(pos) = self.order.iter().position(|&o| o == id) {
            self.order.remove(pos);
            self.order.insert(0, id);
        }
    }

    /// Move a shape to the top of the z-order.
    pub fn raise(&mut self, id: ShapeId) {
        if let Some(pos) = self.order.iter().position(|&o| o == id) {
            self.order.remove(pos);
            self.order.push(id);
        }
    }

    /// Bind a value to recall into the argument slot when the shape is
    /// clicked. Explicit subscription; cleared when the shape is deleted.
    pub fn bind_activate(&mut self, id: ShapeId, value: impl Into<String>) {
        self.activations.insert(id, value.into());
    }

    /// Topmost bound shape containing the point, if any.
    pub fn activation_at(&self, pt: [f64; 2]) -> Option<&str> {
        for &id in self.order.iter().rev() {
            if self.activations.contains_key(&id) && bbox_contains(&self.bbox(id), pt) {
                return self.activations.get(&id).map(String::as_str);
            }
        }
        None
    }

    /// Shapes in z-order, back to front.
    pub fn iter(&self) -> impl Iterator<Item = (ShapeId, &Shape)> {
        self.order.iter().filter_map(|id| self.shapes.get(id).map(|s| (*id, s)))
    }
}

/// A 2-D drawing surface the engine can mutate and redraw.
///
/// Implementors supply the store and `flush`; everything else is provided.
pub trait Surface {
    fn store(&self) -> &ShapeStore;
    fn store_mut(&mut self) -> &mut ShapeStore;

    /// Force pending draws to appear. Exactly one call per animation frame.
    fn flush(&mut self) -> io::Result<()>;

    fn create_shape(&mut self, kind: ShapeKind, coords: Vec<f64>, style: ShapeStyle) -> ShapeId {
        self.store_mut().create(kind, coords, style)
    }

    fn copy_shape(&mut self, id: ShapeId) -> ShapeId {
        self.store_mut().copy(id)
    }

    fn delete_shape(&mut self, id: ShapeId) {
        self.store_mut().delete(id);
    }

    fn coords(&self, id: ShapeId) -> &[f64] {
        self.store().coords(id)
    }

    fn set_coords(&mut self, id: ShapeId, coords: &[f64]) {
        self.store_mut().set_coords(id, coords);
    }

    fn bbox(&self, id: ShapeId) -> [f64; 4] {
        self.store().bbox(id)
    }
}

/// The host event loop: non-blocking input drain plus a cooperative yield.
pub trait EventPump {
    /// Drain any pending transport commands without blocking.
    fn poll_transport(&mut self) -> Vec<Transport>;

    /// Yield the thread for `duration`.
    fn sleep(&mut self, duration: Duration);
}

/// Everything the engine needs from its host.
pub trait Host: Surface + EventPump {}

impl<T: Surface + EventPump> Host for T {}
