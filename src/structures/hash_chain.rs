#![allow(dead_code)] // Complete API module, the test-only accessors are unused in the binary
//! Chaining hash table visualization
//!
//! An array of small cells across the top, each chaining its records in
//! link nodes packed into rows below the table. Insert hashes the key,
//! walks the chain (updating in place on a duplicate), and grows the table
//! to the next prime at least `2n + 1` when the load factor is exceeded,
//! capped at [`MAX_CELLS`]; at the cap the table keeps serving with a
//! higher load factor.
//!
//! Link placement is a deterministic greedy packing over the logical
//! contents, so the canonical layout after cleanup does not depend on the
//! animation history.

use std::time::Duration;

use ratatui::style::Color;

use crate::engine::{
    AnimError, Animator, EnvToken, Host, ShapeId, ShapeKind, ShapeStyle, CANVAS_W,
};

use super::{absorb_stop, check_text_arg, Module, OpSpec, XorShift};
use super::{CELL_BORDER_COLOR, OPERATIONS_BG, VALUE_COLOR, VARIABLE_COLOR};

pub const MAX_CELLS: usize = 61;
pub const MIN_LOAD_FACTOR: f64 = 0.5;
pub const MAX_LOAD_FACTOR: f64 = 2.0;

const CELL_W: f64 = 14.0;
const CELL_H: f64 = 14.0;
const ARRAY_X0: f64 = 56.0;
const ARRAY_Y0: f64 = 110.0;
const HASHER_H: f64 = 70.0;
const LINK_H: f64 = 12.0;
const ROW_GAP: f64 = 30.0;
const PACK_PAD: f64 = 12.0;
const DOT_R: f64 = 4.0;

const DOT_COLOR: Color = Color::Rgb(220, 60, 60);
const INDEX_COLOR: Color = Color::Rgb(150, 150, 150);
const HASH_ARROW_COLOR: Color = Color::Rgb(100, 120, 220);

const MOVE_DELAY: Duration = Duration::from_millis(10);
const COMPARE_PAUSE: Duration = Duration::from_millis(50);

const OPS: [OpSpec; 6] = [
    OpSpec { label: "Insert", arity: 1, hint: "key, up to 8 chars" },
    OpSpec { label: "Search", arity: 1, hint: "key, up to 8 chars" },
    OpSpec { label: "Delete", arity: 1, hint: "key, up to 8 chars" },
    OpSpec { label: "New", arity: 1, hint: "cells 1-61 [load 0.5-2.0]" },
    OpSpec { label: "Random Fill", arity: 1, hint: "count" },
    OpSpec { label: "Traverse", arity: 0, hint: "" },
];

/// One chained record: colored rectangle, key text, outline box, next dot,
/// and an arrow to the next link (zero length on the last link).
struct Link {
    key: String,
    color: Color,
    rect: ShapeId,
    text: ShapeId,
    boxed: ShapeId,
    dot: ShapeId,
    arrow: ShapeId,
}

impl Link {
    fn items(&self) -> [ShapeId; 5] {
        [self.rect, self.text, self.boxed, self.dot, self.arrow]
    }
}

/// A non-empty cell: its dot, the arrow to the first link, and the chain.
struct Cell {
    dot: ShapeId,
    arrow: ShapeId,
    links: Vec<Link>,
}

/// Explicit resume state for walking every record in table order. The
/// traverse operation (and growth reinsertion) step this cursor instead of
/// suspending inside an iterator.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChainCursor {
    cell: usize,
    link: usize,
}

impl ChainCursor {
    fn advance(&mut self, table: &[Option<Cell>]) -> Option<(usize, usize)> {
        while self.cell < table.len() {
            let chain_len = table[self.cell].as_ref().map_or(0, |c| c.links.len());
            if self.link < chain_len {
                let at = (self.cell, self.link);
                self.link += 1;
                return Some(at);
            }
            self.cell += 1;
            self.link = 0;
        }
        None
    }
}

pub struct HashChainViz {
    anim: Animator,
    table: Vec<Option<Cell>>,
    n_items: usize,
    max_load_factor: f64,
    array_cells: Vec<ShapeId>,
    array_labels: Vec<ShapeId>,
    size_label: ShapeId,
    n_items_text: ShapeId,
    load_factor_text: ShapeId,
    hasher_box: ShapeId,
    hasher_label: ShapeId,
    /// Set when the last insert hit the cell cap while growing.
    capped: bool,
    rng: XorShift,
}

/// Polynomial string hash with multiplier 31.
pub fn hash_key(key: &str) -> u64 {
    key.bytes().fold(0u64, |h, b| h.wrapping_mul(31).wrapping_add(u64::from(b)))
}

pub fn is_prime(n: usize) -> bool {
    if n < 2 {
        return false;
    }
    let mut d = 2;
    while d * d <= n {
        if n % d == 0 {
            return false;
        }
        d += 1;
    }
    true
}

/// Smallest prime at least `2 * old + 1`, capped at [`MAX_CELLS`].
fn grown_size(old: usize) -> usize {
    let mut size = (2 * old + 1).min(MAX_CELLS);
    while !is_prime(size) && size < MAX_CELLS {
        size += 2;
    }
    size.min(MAX_CELLS)
}

fn key_width(key: &str) -> f64 {
    (key.chars().count() + 2) as f64 * 7.0
}

impl HashChainViz {
    pub fn new<H: Host>(host: &mut H) -> Self {
        let mut viz = HashChainViz {
            anim: Animator::new(),
            table: Vec::new(),
            n_items: 0,
            max_load_factor: 1.0,
            array_cells: Vec::new(),
            array_labels: Vec::new(),
            size_label: 0,
            n_items_text: 0,
            load_factor_text: 0,
            hasher_box: 0,
            hasher_label: 0,
            capped: false,
            rng: XorShift::new(161803),
        };
        viz.table.resize_with(2, || None);
        viz.display(host);
        viz
    }

    pub fn n_cells(&self) -> usize {
        self.table.len()
    }

    pub fn n_items(&self) -> usize {
        self.n_items
    }

    pub fn load_factor(&self) -> f64 {
        self.n_items as f64 / self.table.len() as f64
    }

    pub fn max_load_factor(&self) -> f64 {
        self.max_load_factor
    }

    /// All keys in table order, for tests.
    pub fn keys(&self) -> Vec<String> {
        let mut keys = Vec::new();
        for cell in self.table.iter().flatten() {
            keys.extend(cell.links.iter().map(|l| l.key.clone()));
        }
        keys
    }

    fn cell_coords(&self, index: usize) -> Vec<f64> {
        let x0 = ARRAY_X0 + index as f64 * CELL_W;
        vec![x0, ARRAY_Y0, x0 + CELL_W - 2.0, ARRAY_Y0 + CELL_H - 2.0]
    }

    fn cell_center(&self, index: usize) -> [f64; 2] {
        let coords = self.cell_coords(index);
        [(coords[0] + coords[2]) / 2.0, (coords[1] + coords[3]) / 2.0]
    }

    // ---- canonical chain packing ----------------------------------------

    fn place_link(
        &self,
        rows: &mut Vec<Vec<(f64, f64)>>,
        cell_index: usize,
        prev_level: &mut Option<usize>,
        key: &str,
    ) -> [f64; 2] {
        let total_w = LINK_H + key_width(key);
        let x = (self.cell_center(cell_index)[0] - LINK_H / 2.0)
            .clamp(PACK_PAD, CANVAS_W - total_w - PACK_PAD);
        let span = (x - PACK_PAD, x + total_w + PACK_PAD);
        let mut level = prev_level.map_or(0, |l| l + 1);
        loop {
            while rows.len() <= level {
                rows.push(Vec::new());
            }
            if rows[level].iter().all(|&(a, b)| span.1 <= a || b <= span.0) {
                rows[level].push(span);
                *prev_level = Some(level);
                let y = ARRAY_Y0 + CELL_H + ROW_GAP * (level as f64 + 1.0);
                return [x, y];
            }
            level += 1;
        }
    }

    /// Corner positions for every link, packed greedily in table order.
    /// With `extra`, also returns the slot a new link of that cell would
    /// take; since packing only depends on the logical contents, the same
    /// slot comes out of the canonical layout after the insert.
    fn compute_layout(
        &self,
        extra: Option<(usize, &str)>,
    ) -> (Vec<Vec<[f64; 2]>>, Option<[f64; 2]>) {
        let mut rows: Vec<Vec<(f64, f64)>> = Vec::new();
        let mut corners: Vec<Vec<[f64; 2]>> = Vec::with_capacity(self.table.len());
        let mut phantom = None;
        for i in 0..self.table.len() {
            let mut prev_level = None;
            let mut cell_corners = Vec::new();
            if let Some(cell) = &self.table[i] {
                for link in &cell.links {
                    cell_corners.push(self.place_link(&mut rows, i, &mut prev_level, &link.key));
                }
            }
            if let Some((c, key)) = extra {
                if c == i {
                    phantom = Some(self.place_link(&mut rows, i, &mut prev_level, key));
                }
            }
            corners.push(cell_corners);
        }
        (corners, phantom)
    }

    // ---- link geometry ---------------------------------------------------

    /// Coordinates of the five items of a link whose upper-left corner is
    /// `corner`: rect, key text, outline box, dot, next arrow.
    fn link_coords(corner: [f64; 2], key: &str, next: Option<([f64; 2], &str)>) -> [Vec<f64>; 5] {
        let [x, y] = corner;
        let kw = key_width(key);
        let rect = vec![x + LINK_H, y, x + LINK_H + kw, y + LINK_H];
        let text = vec![(rect[0] + rect[2]) / 2.0, (rect[1] + rect[3]) / 2.0];
        let boxed = vec![x - 1.0, y - 1.0, x + LINK_H + kw, y + LINK_H];
        let c = [x + LINK_H / 2.0, y + LINK_H / 2.0];
        let dot = vec![c[0] - DOT_R, c[1] - DOT_R, c[0] + DOT_R, c[1] + DOT_R];
        let arrow = match next {
            Some(([nx, ny], nkey)) => {
                let tip_x = c[0].clamp(nx - 1.0, nx + LINK_H + key_width(nkey));
                vec![c[0], c[1], tip_x, ny - 1.0]
            }
            None => vec![c[0], c[1], c[0], c[1]],
        };
        [rect, text, boxed, dot, arrow]
    }

    fn create_link_items<H: Host>(
        &mut self,
        host: &mut H,
        corner: [f64; 2],
        key: &str,
        color: Option<Color>,
    ) -> Link {
        let coords = Self::link_coords(corner, key, None);
        let color = color.unwrap_or_else(|| self.anim.palette.next_color());
        let boxed = host.create_shape(
            ShapeKind::Rect,
            coords[2].clone(),
            ShapeStyle::outlined(CELL_BORDER_COLOR),
        );
        let rect =
            host.create_shape(ShapeKind::Rect, coords[0].clone(), ShapeStyle::filled(color));
        let text = host.create_shape(
            ShapeKind::Text,
            coords[1].clone(),
            ShapeStyle::text(key, VALUE_COLOR),
        );
        let dot =
            host.create_shape(ShapeKind::Oval, coords[3].clone(), ShapeStyle::filled(DOT_COLOR));
        let arrow = host.create_shape(
            ShapeKind::Line,
            coords[4].clone(),
            ShapeStyle::line(VALUE_COLOR, true),
        );
        host.store_mut().bind_activate(rect, key);
        host.store_mut().bind_activate(text, key);
        Link { key: key.to_string(), color, rect, text, boxed, dot, arrow }
    }

    /// The dot and first-link arrow drawn inside a cell of the table.
    fn create_initial_link<H: Host>(
        &mut self,
        host: &mut H,
        cell_index: usize,
        first_box: Option<ShapeId>,
    ) -> (ShapeId, ShapeId) {
        let c = self.cell_center(cell_index);
        let dot = host.create_shape(
            ShapeKind::Oval,
            vec![c[0] - DOT_R, c[1] - DOT_R, c[0] + DOT_R, c[1] + DOT_R],
            ShapeStyle::filled(DOT_COLOR),
        );
        let tip = match first_box {
            Some(boxed) => {
                let b = host.coords(boxed).to_vec();
                vec![c[0], c[1], c[0].clamp(b[0], b[2]), b[1]]
            }
            None => vec![c[0], c[1], c[0], c[1]],
        };
        let arrow = host.create_shape(ShapeKind::Line, tip, ShapeStyle::line(VALUE_COLOR, true));
        (dot, arrow)
    }

    fn aim_arrow_at_box<H: Host>(&self, host: &mut H, arrow: ShapeId, target_box: Option<ShapeId>) {
        let base = host.coords(arrow).to_vec();
        let c = [base[0], base[1]];
        let coords = match target_box {
            Some(boxed) => {
                let b = host.coords(boxed).to_vec();
                vec![c[0], c[1], c[0].clamp(b[0], b[2]), b[1]]
            }
            None => vec![c[0], c[1], c[0], c[1]],
        };
        host.set_coords(arrow, &coords);
    }

    // ---- labels and chrome -----------------------------------------------

    fn update_n_items<H: Host>(&mut self, host: &mut H) {
        host.store_mut().set_text(self.n_items_text, format!("nItems = {}", self.n_items));
    }

    fn update_load_factor_label<H: Host>(&mut self, host: &mut H) {
        host.store_mut().set_text(
            self.load_factor_text,
            format!("maxLoadFactor = {}%", (self.max_load_factor * 100.0) as u32),
        );
    }

    fn update_size_label<H: Host>(&mut self, host: &mut H) {
        host.store_mut().set_text(self.size_label, format!("{} cells", self.table.len()));
        let c = self.cell_center(self.table.len());
        host.set_coords(self.size_label, &[c[0] + 24.0, c[1]]);
    }

    /// Rebuild the whole canvas from the logical table at canonical layout.
    fn display<H: Host>(&mut self, host: &mut H) {
        host.store_mut().clear();
        self.array_cells.clear();
        self.array_labels.clear();

        self.hasher_box = host.create_shape(
            ShapeKind::Rect,
            vec![ARRAY_X0, 2.0, ARRAY_X0 + 200.0, HASHER_H],
            ShapeStyle::outlined(CELL_BORDER_COLOR),
        );
        self.hasher_label = host.create_shape(
            ShapeKind::Text,
            vec![ARRAY_X0 + 100.0, (HASHER_H + 2.0) / 2.0],
            ShapeStyle::text("hasher", INDEX_COLOR),
        );

        for i in 0..self.table.len() {
            let cell = host.create_shape(
                ShapeKind::Rect,
                self.cell_coords(i),
                ShapeStyle::outlined(CELL_BORDER_COLOR),
            );
            host.store_mut().lower(cell);
            self.array_cells.push(cell);
            let c = self.cell_center(i);
            let label = host.create_shape(
                ShapeKind::Text,
                vec![c[0], ARRAY_Y0 - 8.0],
                ShapeStyle::text(i.to_string(), INDEX_COLOR),
            );
            self.array_labels.push(label);
        }

        self.size_label =
            host.create_shape(ShapeKind::Text, vec![0.0, 0.0], ShapeStyle::text("", VARIABLE_COLOR));
        self.update_size_label(host);
        self.n_items_text = host.create_shape(
            ShapeKind::Text,
            vec![CANVAS_W * 0.4 + 30.0, 16.0],
            ShapeStyle::text("", VARIABLE_COLOR),
        );
        self.update_n_items(host);
        self.load_factor_text = host.create_shape(
            ShapeKind::Text,
            vec![CANVAS_W - 80.0, 16.0],
            ShapeStyle::text("", VARIABLE_COLOR),
        );
        self.update_load_factor_label(host);

        // Rebuild the chains at their packed positions
        let (layout, _) = self.compute_layout(None);
        for i in 0..self.table.len() {
            let Some(mut cell) = self.table[i].take() else {
                continue;
            };
            let corners = &layout[i];
            for (j, link) in cell.links.iter_mut().enumerate() {
                let rebuilt =
                    self.create_link_items(host, corners[j], &link.key.clone(), Some(link.color));
                *link = rebuilt;
            }
            for j in 0..cell.links.len() {
                let next_box = cell.links.get(j + 1).map(|l| l.boxed);
                self.aim_arrow_at_box(host, cell.links[j].arrow, next_box);
            }
            let (dot, arrow) =
                self.create_initial_link(host, i, cell.links.first().map(|l| l.boxed));
            cell.dot = dot;
            cell.arrow = arrow;
            self.table[i] = Some(cell);
        }
    }

    /// Snap every link, dot, and arrow to the canonical packed layout.
    fn fix_positions<H: Host>(&mut self, host: &mut H) {
        let (layout, _) = self.compute_layout(None);
        for i in 0..self.table.len() {
            let corners = &layout[i];
            let (snap, dot, arrow, first_box) = {
                let Some(cell) = &self.table[i] else { continue };
                let snap: Vec<([ShapeId; 5], String, Option<String>)> = cell
                    .links
                    .iter()
                    .enumerate()
                    .map(|(j, l)| {
                        (l.items(), l.key.clone(), cell.links.get(j + 1).map(|n| n.key.clone()))
                    })
                    .collect();
                (snap, cell.dot, cell.arrow, cell.links.first().map(|l| l.boxed))
            };
            for (j, (ids, key, next_key)) in snap.iter().enumerate() {
                let next = next_key
                    .as_deref()
                    .and_then(|k| corners.get(j + 1).map(|&c| (c, k)));
                let coords = Self::link_coords(corners[j], key, next);
                for (id, xy) in ids.iter().zip(coords.iter()) {
                    host.set_coords(*id, xy);
                }
            }
            let c = self.cell_center(i);
            host.set_coords(dot, &[c[0] - DOT_R, c[1] - DOT_R, c[0] + DOT_R, c[1] + DOT_R]);
            self.aim_cell_arrow(host, c, arrow, first_box);
        }
        self.update_size_label(host);
    }

    fn aim_cell_arrow<H: Host>(
        &self,
        host: &mut H,
        center: [f64; 2],
        arrow: ShapeId,
        first_box: Option<ShapeId>,
    ) {
        let coords = match first_box {
            Some(boxed) => {
                let b = host.coords(boxed).to_vec();
                vec![center[0], center[1], center[0].clamp(b[0], b[2]), b[1]]
            }
            None => vec![center[0], center[1], center[0], center[1]],
        };
        host.set_coords(arrow, &coords);
    }

    fn finish_op<H: Host>(&mut self, host: &mut H, env: EnvToken) -> Result<(), AnimError> {
        self.anim.clean_up(host, env);
        if self.anim.depth() == 0 {
            self.fix_positions(host);
            host.flush()?;
        }
        Ok(())
    }

    // ---- hash animation --------------------------------------------------

    /// Show the hashed address and an arrow from the hasher to the indexed
    /// cell, returning the cell index.
    fn hash_and_index<H: Host>(
        &mut self,
        host: &mut H,
        env: EnvToken,
        key: &str,
        animate: bool,
    ) -> Result<usize, AnimError> {
        let address = hash_key(key);
        let i = (address % self.table.len() as u64) as usize;
        if animate {
            let out = [ARRAY_X0 + 210.0, (HASHER_H + 2.0) / 2.0];
            let addr_text = host.create_shape(
                ShapeKind::Text,
                vec![out[0], out[1]],
                ShapeStyle::text(format!("{}", address), VARIABLE_COLOR),
            );
            let c = self.cell_center(i);
            let spline = host.create_shape(
                ShapeKind::Line,
                vec![out[0], out[1] + 8.0, out[0], out[1] + 24.0, c[0], ARRAY_Y0 - 14.0],
                ShapeStyle::line(HASH_ARROW_COLOR, true),
            );
            self.anim.adopt(env, &[addr_text, spline]);
            self.anim.wait(host, Duration::from_millis(250))?;
        }
        Ok(i)
    }

    /// Small arrow above a cell naming the hashed index.
    fn create_array_index<H: Host>(&mut self, host: &mut H, index: usize, name: &str) -> Vec<ShapeId> {
        let c = self.cell_center(index);
        let arrow = host.create_shape(
            ShapeKind::Line,
            vec![c[0], ARRAY_Y0 - 26.0, c[0], ARRAY_Y0 - 16.0],
            ShapeStyle::line(VARIABLE_COLOR, true),
        );
        let label = host.create_shape(
            ShapeKind::Text,
            vec![c[0] + 4.0, ARRAY_Y0 - 28.0],
            ShapeStyle::text(name, VARIABLE_COLOR),
        );
        vec![arrow, label]
    }

    /// Small arrow pointing at a link's corner from the upper left.
    fn link_index_coords(corner: [f64; 2]) -> Vec<f64> {
        vec![corner[0] - 14.0, corner[1] - 10.0, corner[0], corner[1]]
    }

    fn create_link_index<H: Host>(&mut self, host: &mut H, corner: [f64; 2], name: &str) -> Vec<ShapeId> {
        let coords = Self::link_index_coords(corner);
        let label_at = vec![coords[0] - 4.0, coords[1] - 4.0];
        let arrow =
            host.create_shape(ShapeKind::Line, coords, ShapeStyle::line(VARIABLE_COLOR, true));
        let label =
            host.create_shape(ShapeKind::Text, label_at, ShapeStyle::text(name, VARIABLE_COLOR));
        vec![arrow, label]
    }

    fn link_corner<H: Host>(&self, host: &H, link: &Link) -> [f64; 2] {
        let b = host.coords(link.boxed);
        [b[0] + 1.0, b[1] + 1.0]
    }

    // ---- operations ------------------------------------------------------

    /// Insert `key`, animating when `animate` is set (random fill and
    /// growth reinsertion run instantly). Returns whether the key was new.
    pub fn insert<H: Host>(&mut self, host: &mut H, key: &str, animate: bool) -> Result<bool, AnimError> {
        if animate {
            self.anim.start();
        }
        self.capped = false;
        let env = self.anim.open_call();
        let result = self.insert_body(host, env, key, animate);
        self.finish_op(host, env)?;
        result
    }

    fn insert_body<H: Host>(
        &mut self,
        host: &mut H,
        env: EnvToken,
        key: &str,
        animate: bool,
    ) -> Result<bool, AnimError> {
        let i = self.hash_and_index(host, env, key, animate)?;
        if animate {
            let i_arrow = self.create_array_index(host, i, "i");
            self.anim.adopt(env, &i_arrow);
        }

        let is_new = self.insert_into_list(host, env, i, key, None, animate)?;
        if is_new {
            self.n_items += 1;
            self.update_n_items(host);
            if self.load_factor() > self.max_load_factor {
                self.grow_table(host)?;
            }
        }
        Ok(is_new)
    }

    /// Walk the chain at `cell_index` for `key`. A duplicate is updated in
    /// place (its rectangle takes the next palette color); otherwise a new
    /// link is packed below the table. `reuse_from` positions the incoming
    /// link's flight from an old location during growth.
    fn insert_into_list<H: Host>(
        &mut self,
        host: &mut H,
        env: EnvToken,
        cell_index: usize,
        key: &str,
        reuse_from: Option<[f64; 2]>,
        animate: bool,
    ) -> Result<bool, AnimError> {
        let chain_len = self.table[cell_index].as_ref().map_or(0, |c| c.links.len());
        let mut found = chain_len;
        for j in 0..chain_len {
            if self.table[cell_index].as_ref().is_some_and(|c| c.links[j].key == key) {
                found = j;
                break;
            }
        }

        if animate && chain_len > 0 {
            // Walk the link index down the chain to the match point
            let first_corner = self
                .table[cell_index]
                .as_ref()
                .map(|c| self.link_corner(host, &c.links[0]))
                .unwrap_or([0.0, 0.0]);
            let index = self.create_link_index(host, first_corner, "link");
            self.anim.adopt(env, &index);
            let walk_to = found.min(chain_len - 1);
            for j in 0..=walk_to {
                let corner = self
                    .table[cell_index]
                    .as_ref()
                    .map(|c| self.link_corner(host, &c.links[j]))
                    .unwrap_or([0.0, 0.0]);
                let coords = Self::link_index_coords(corner);
                self.anim.move_items_to(
                    host,
                    &index,
                    &[coords.clone(), coords[..2].to_vec()],
                    5,
                    MOVE_DELAY,
                )?;
                self.anim.wait(host, COMPARE_PAUSE)?;
            }
        }

        if found < chain_len {
            // In-place update of the existing record
            let color = self.anim.palette.next_color();
            if let Some(cell) = &mut self.table[cell_index] {
                cell.links[found].color = color;
                let rect = cell.links[found].rect;
                host.store_mut().set_fill(rect, color);
            }
            host.flush()?;
            return Ok(false);
        }

        let (_, target) = self.compute_layout(Some((cell_index, key)));
        let target = target.unwrap_or([PACK_PAD, ARRAY_Y0 + CELL_H + ROW_GAP]);

        let staging = reuse_from.unwrap_or([CANVAS_W - 160.0, 30.0]);
        let link = if animate || reuse_from.is_some() {
            let link = self.create_link_items(host, staging, key, None);
            self.anim.adopt(env, &link.items());
            let coords = Self::link_coords(target, key, None);
            self.anim.move_items_to(
                host,
                &link.items(),
                &coords.to_vec(),
                10,
                MOVE_DELAY,
            )?;
            link
        } else {
            self.create_link_items(host, target, key, None)
        };
        let link_items = link.items();
        let new_box = link.boxed;

        match &mut self.table[cell_index] {
            Some(cell) => {
                cell.links.push(link);
                let prev = cell.links.len() - 2;
                let arrow = cell.links[prev].arrow;
                self.aim_arrow_at_box(host, arrow, Some(new_box));
            }
            None => {
                let (dot, arrow) = self.create_initial_link(host, cell_index, Some(new_box));
                self.table[cell_index] = Some(Cell { dot, arrow, links: vec![link] });
            }
        }
        self.anim.disown(env, &link_items);
        Ok(true)
    }

    /// Grow to the next prime size, reinserting every record. At the cap
    /// the table stops growing and keeps serving.
    fn grow_table<H: Host>(&mut self, host: &mut H) -> Result<(), AnimError> {
        let env = self.anim.open_call();
        let result = self.grow_table_body(host, env);
        self.anim.clean_up(host, env);
        result
    }

    fn grow_table_body<H: Host>(&mut self, host: &mut H, env: EnvToken) -> Result<(), AnimError> {
        let old_size = self.table.len();
        let new_size = grown_size(old_size);
        if new_size == old_size {
            self.capped = true;
            return Ok(());
        }

        // The whole old display becomes transient: grid, labels, and every
        // link. The logical table switches to the grown size before the
        // first suspension, so an unwind anywhere below leaves a consistent
        // (if only partially reinserted) table behind.
        let delta = [CELL_W * 2.0 * (old_size as f64 + 2.0), CELL_H * 2.0];
        let mut aside: Vec<ShapeId> = Vec::new();
        aside.extend(&self.array_cells);
        aside.extend(&self.array_labels);
        aside.push(self.size_label);
        let old_table = std::mem::take(&mut self.table);
        for cell in old_table.iter().flatten() {
            aside.push(cell.dot);
            aside.push(cell.arrow);
            for link in &cell.links {
                aside.extend(link.items());
            }
        }
        self.table.resize_with(new_size, || None);
        self.n_items = 0;

        // The grown grid and chrome go down underneath the old display
        self.array_cells.clear();
        self.array_labels.clear();
        for i in 0..new_size {
            let cell = host.create_shape(
                ShapeKind::Rect,
                self.cell_coords(i),
                ShapeStyle::outlined(CELL_BORDER_COLOR),
            );
            host.store_mut().lower(cell);
            self.array_cells.push(cell);
            let c = self.cell_center(i);
            let label = host.create_shape(
                ShapeKind::Text,
                vec![c[0], ARRAY_Y0 - 8.0],
                ShapeStyle::text(i.to_string(), INDEX_COLOR),
            );
            self.array_labels.push(label);
        }
        self.size_label =
            host.create_shape(ShapeKind::Text, vec![0.0, 0.0], ShapeStyle::text("", VARIABLE_COLOR));
        self.update_size_label(host);
        self.update_n_items(host);

        let old_label = host.create_shape(
            ShapeKind::Text,
            vec![ARRAY_X0 + delta[0] - CELL_W, ARRAY_Y0 + delta[1] + CELL_H / 2.0],
            ShapeStyle::text("oldTable", INDEX_COLOR),
        );
        self.anim.adopt(env, &[old_label]);
        self.anim.adopt(env, &aside);

        // Push the old table off to the side
        self.anim.move_items_by(host, &aside, delta, 10, MOVE_DELAY)?;

        // Reinsert every record, walking the old table with a cursor
        let mut cursor = ChainCursor::default();
        while let Some((ci, li)) = cursor.advance(&old_table) {
            let (key, from, items) = {
                let Some(cell) = old_table[ci].as_ref() else { continue };
                let link = &cell.links[li];
                (link.key.clone(), self.link_corner(host, link), link.items())
            };
            // The displaced shapes are consumed as the record flies to its
            // new chain
            self.anim.dispose(host, env, &items);
            let i = (hash_key(&key) % new_size as u64) as usize;
            let is_new = self.insert_into_list(host, env, i, &key, Some(from), true)?;
            if is_new {
                self.n_items += 1;
                self.update_n_items(host);
            }
        }
        Ok(())
    }

    /// Look `key` up, copying it into an output box when found.
    pub fn search<H: Host>(&mut self, host: &mut H, key: &str) -> Result<bool, AnimError> {
        self.anim.start();
        let env = self.anim.open_call();
        let result = self.search_body(host, env, key);
        self.finish_op(host, env)?;
        result
    }

    fn search_body<H: Host>(
        &mut self,
        host: &mut H,
        env: EnvToken,
        key: &str,
    ) -> Result<bool, AnimError> {
        let out_box = vec![CANVAS_W * 0.4, 24.0, CANVAS_W * 0.4 + 110.0, 52.0];
        let output_box =
            host.create_shape(ShapeKind::Rect, out_box.clone(), ShapeStyle::filled(OPERATIONS_BG));
        self.anim.adopt(env, &[output_box]);

        let i = self.hash_and_index(host, env, key, true)?;
        let i_arrow = self.create_array_index(host, i, "i");
        self.anim.adopt(env, &i_arrow);

        let chain_len = self.table[i].as_ref().map_or(0, |c| c.links.len());
        if chain_len == 0 {
            return Ok(false);
        }

        let mut found = None;
        for j in 0..chain_len {
            let corner = self
                .table[i]
                .as_ref()
                .map(|c| self.link_corner(host, &c.links[j]))
                .unwrap_or([0.0, 0.0]);
            if j == 0 {
                let index = self.create_link_index(host, corner, "item");
                self.anim.adopt(env, &index);
            }
            self.anim.wait(host, COMPARE_PAUSE)?;
            if self.table[i].as_ref().is_some_and(|c| c.links[j].key == key) {
                found = Some(j);
                break;
            }
        }

        let Some(j) = found else {
            return Ok(false);
        };
        let text = self.table[i].as_ref().map(|c| c.links[j].text);
        if let Some(text) = text {
            let copy = host.copy_shape(text);
            self.anim.adopt(env, &[copy]);
            let mid = vec![(out_box[0] + out_box[2]) / 2.0, (out_box[1] + out_box[3]) / 2.0];
            self.anim.move_items_to(host, &[copy], &[mid], 10, MOVE_DELAY)?;
            self.anim.wait(host, Duration::from_millis(300))?;
        }
        Ok(true)
    }

    /// Delete `key`, splicing the chain arrows around the removed link.
    pub fn delete<H: Host>(&mut self, host: &mut H, key: &str) -> Result<bool, AnimError> {
        self.anim.start();
        let env = self.anim.open_call();
        let result = self.delete_body(host, env, key);
        self.finish_op(host, env)?;
        result
    }

    fn delete_body<H: Host>(
        &mut self,
        host: &mut H,
        env: EnvToken,
        key: &str,
    ) -> Result<bool, AnimError> {
        let i = self.hash_and_index(host, env, key, true)?;
        let i_arrow = self.create_array_index(host, i, "i");
        self.anim.adopt(env, &i_arrow);

        let chain_len = self.table[i].as_ref().map_or(0, |c| c.links.len());
        let mut found = chain_len;
        for j in 0..chain_len {
            let corner = self
                .table[i]
                .as_ref()
                .map(|c| self.link_corner(host, &c.links[j]))
                .unwrap_or([0.0, 0.0]);
            if j == 0 {
                let index = self.create_link_index(host, corner, "item");
                self.anim.adopt(env, &index);
            }
            self.anim.wait(host, COMPARE_PAUSE)?;
            if self.table[i].as_ref().is_some_and(|c| c.links[j].key == key) {
                found = j;
                break;
            }
        }
        if found >= chain_len {
            return Ok(false);
        }

        // Splice the predecessor (or the cell arrow) past the victim, then
        // remove the record
        let victim = match &mut self.table[i] {
            Some(cell) => cell.links.remove(found),
            None => return Ok(false),
        };
        self.n_items -= 1;
        self.update_n_items(host);

        let next_box = self
            .table[i]
            .as_ref()
            .and_then(|c| c.links.get(found).map(|l| l.boxed));
        if self.table[i].as_ref().is_some_and(|c| c.links.is_empty()) {
            // Last record of its chain: the cell's dot and arrow go with it
            if let Some(cell) = self.table[i].take() {
                host.delete_shape(cell.dot);
                host.delete_shape(cell.arrow);
            }
        } else if found == 0 {
            let (center, arrow) = {
                let cell = self.table[i].as_ref();
                (self.cell_center(i), cell.map(|c| c.arrow))
            };
            if let Some(arrow) = arrow {
                self.aim_cell_arrow(host, center, arrow, next_box);
            }
        } else if let Some(cell) = &self.table[i] {
            let arrow = cell.links[found - 1].arrow;
            self.aim_arrow_at_box(host, arrow, next_box);
        }

        let items = victim.items();
        self.anim.adopt(env, &items);
        self.anim.move_items_off(host, &items, 15, MOVE_DELAY)?;
        Ok(true)
    }

    /// Visit every record in table order, copying keys into an output row.
    pub fn traverse<H: Host>(&mut self, host: &mut H) -> Result<usize, AnimError> {
        self.anim.start();
        let env = self.anim.open_call();
        let result = self.traverse_body(host, env);
        self.finish_op(host, env)?;
        result
    }

    fn traverse_body<H: Host>(&mut self, host: &mut H, env: EnvToken) -> Result<usize, AnimError> {
        let out_y = 40.0;
        let mut out_x = CANVAS_W * 0.4;
        let mut visited = 0;
        let mut i_arrow: Option<Vec<ShapeId>> = None;
        let mut cursor = ChainCursor::default();
        while let Some((ci, li)) = cursor.advance(&self.table) {
            let c = self.cell_center(ci);
            match &i_arrow {
                None => {
                    let arrow = self.create_array_index(host, ci, "i");
                    self.anim.adopt(env, &arrow);
                    i_arrow = Some(arrow);
                }
                Some(arrow) => {
                    let targets = vec![
                        vec![c[0], ARRAY_Y0 - 26.0, c[0], ARRAY_Y0 - 16.0],
                        vec![c[0] + 4.0, ARRAY_Y0 - 28.0],
                    ];
                    self.anim.move_items_to(host, arrow, &targets, 5, MOVE_DELAY)?;
                }
            }
            let text = self.table[ci].as_ref().map(|cell| cell.links[li].text);
            if let Some(text) = text {
                let copy = host.copy_shape(text);
                self.anim.adopt(env, &[copy]);
                self.anim.move_items_to(
                    host,
                    &[copy],
                    &[vec![out_x, out_y]],
                    8,
                    MOVE_DELAY,
                )?;
                out_x += 34.0;
            }
            self.anim.wait(host, COMPARE_PAUSE)?;
            visited += 1;
        }
        Ok(visited)
    }

    /// Reset to a fresh table.
    pub fn new_table<H: Host>(&mut self, host: &mut H, n_cells: usize, max_load_factor: f64) {
        self.table = Vec::new();
        self.table.resize_with(n_cells.max(1), || None);
        self.n_items = 0;
        self.max_load_factor = max_load_factor;
        self.display(host);
    }

    /// Insert `n` random keys without animation.
    pub fn random_fill<H: Host>(&mut self, host: &mut H, n: usize) -> Result<(), AnimError> {
        for _ in 0..n {
            let key = self.rng.below(100).to_string();
            self.insert(host, &key, false)?;
        }
        Ok(())
    }
}

impl<H: Host> Module<H> for HashChainViz {
    fn title(&self) -> &'static str {
        "Hash Table - Chaining"
    }

    fn ops(&self) -> &'static [OpSpec] {
        &OPS
    }

    fn invoke(&mut self, host: &mut H, op: usize, arg: &str) -> Result<String, AnimError> {
        let result = match op {
            0 => match check_text_arg(arg) {
                Ok(key) => {
                    let key = key.to_string();
                    self.insert(host, &key, true).map(|is_new| {
                        let mut msg = if is_new {
                            format!("Key {} inserted", key)
                        } else {
                            format!("Key {} updated", key)
                        };
                        if self.capped {
                            msg = format!("Reached maximum number of cells {}", MAX_CELLS);
                        }
                        msg
                    })
                }
                Err(msg) => return Ok(msg),
            },
            1 => match check_text_arg(arg) {
                Ok(key) => {
                    let key = key.to_string();
                    self.search(host, &key).map(|found| {
                        if found {
                            format!("Found key {}!", key)
                        } else {
                            format!("Key {} not found", key)
                        }
                    })
                }
                Err(msg) => return Ok(msg),
            },
            2 => match check_text_arg(arg) {
                Ok(key) => {
                    let key = key.to_string();
                    self.delete(host, &key).map(|deleted| {
                        if deleted {
                            format!("Key {} deleted", key)
                        } else {
                            format!("Key {} not found", key)
                        }
                    })
                }
                Err(msg) => return Ok(msg),
            },
            3 => {
                let mut parts = arg.split_whitespace();
                let cells = match parts.next().map(str::parse::<usize>) {
                    Some(Ok(n)) if (1..=MAX_CELLS).contains(&n) => n,
                    _ => {
                        return Ok(format!(
                            "Number of cells must be an int between 1 and {}.",
                            MAX_CELLS
                        ))
                    }
                };
                let load = match parts.next().map(str::parse::<f64>) {
                    None => 1.0,
                    Some(Ok(f)) if (MIN_LOAD_FACTOR..=MAX_LOAD_FACTOR).contains(&f) => f,
                    _ => {
                        return Ok(format!(
                            "Max load factor must be between {} and {}.",
                            MIN_LOAD_FACTOR, MAX_LOAD_FACTOR
                        ))
                    }
                };
                self.new_table(host, cells, load);
                host.flush()?;
                Ok(format!("New hash table with {} cells", cells))
            }
            4 => match arg.trim().parse::<usize>() {
                Ok(n) if n >= 1 => {
                    self.random_fill(host, n).map(|()| format!("Inserted {} random keys", n))
                }
                _ => return Ok(String::from("Number of items must be a positive int.")),
            },
            _ => self.traverse(host).map(|n| format!("Traversed {} items", n)),
        };
        absorb_stop(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_prime() {
        assert!(is_prime(2));
        assert!(is_prime(5));
        assert!(is_prime(61));
        assert!(!is_prime(1));
        assert!(!is_prime(9));
        assert!(!is_prime(57));
    }

    #[test]
    fn test_grown_size_is_next_prime() {
        assert_eq!(grown_size(2), 5);
        assert_eq!(grown_size(5), 11);
        assert_eq!(grown_size(11), 23);
        assert_eq!(grown_size(23), 47);
    }

    #[test]
    fn test_grown_size_caps() {
        assert_eq!(grown_size(47), 61); // 95 capped to 61, which is prime
        assert_eq!(grown_size(61), 61);
    }

    #[test]
    fn test_hash_key_is_stable() {
        assert_eq!(hash_key("abc"), hash_key("abc"));
        assert_ne!(hash_key("abc"), hash_key("abd"));
    }
}
