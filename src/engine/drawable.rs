//! Drawables and the color palette
//!
//! A [`Drawable`] pairs one logical value with the pair of canvas shapes
//! that display it (a filled cell rectangle and its value text). Structures
//! own their drawables; the shapes are replaced when the value moves homes
//! and deleted when the value leaves the structure.

use ratatui::style::Color;

use super::surface::ShapeId;

/// Fill colors handed out to new values, cycled in order.
pub const PALETTE: [Color; 12] = [
    Color::Rgb(124, 252, 0),   // lawn green
    Color::Rgb(255, 99, 71),   // tomato
    Color::Rgb(64, 224, 208),  // turquoise
    Color::Rgb(255, 215, 0),   // gold
    Color::Rgb(238, 130, 238), // violet
    Color::Rgb(100, 149, 237), // cornflower blue
    Color::Rgb(250, 128, 114), // salmon
    Color::Rgb(152, 251, 152), // pale green
    Color::Rgb(255, 165, 0),   // orange
    Color::Rgb(176, 196, 222), // light steel blue
    Color::Rgb(255, 182, 193), // light pink
    Color::Rgb(240, 230, 140), // khaki
];

/// Explicit cursor over [`PALETTE`]. One instance per visualization,
/// threaded through construction rather than kept as global state.
#[derive(Debug, Default)]
pub struct PaletteState {
    next: usize,
}

impl PaletteState {
    pub fn next_color(&mut self) -> Color {
        let color = PALETTE[self.next];
        self.next = (self.next + 1) % PALETTE.len();
        color
    }
}

/// One logical value and its on-canvas representation.
#[derive(Debug, Clone)]
pub struct Drawable<T> {
    pub val: T,
    pub color: Color,
    /// The filled cell rectangle.
    pub shape: ShapeId,
    /// The value text centered in the cell.
    pub label: ShapeId,
}

impl<T> Drawable<T> {
    pub fn new(val: T, color: Color, shape: ShapeId, label: ShapeId) -> Self {
        Drawable { val, color, shape, label }
    }

    /// Both canvas items, in drawing order.
    pub fn items(&self) -> [ShapeId; 2] {
        [self.shape, self.label]
    }
}
