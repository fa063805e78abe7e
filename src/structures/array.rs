#![allow(dead_code)] // Complete API module, the test-only accessors are unused in the binary
//! Array visualization
//!
//! A fixed grid of up to ten cells holding small integers. Insert appends
//! at the `nItems` position, Delete finds a value and shifts its successors
//! left one cell at a time, Traverse copies every value into an output box.

use std::time::Duration;

use ratatui::style::Color;

use crate::engine::coords::{add, multiply};
use crate::engine::{
    AnimError, Animator, Drawable, EnvToken, Host, ShapeId, ShapeKind, ShapeStyle, CANVAS_H,
    CANVAS_W,
};

use super::{absorb_stop, parse_small_int, Module, OpSpec, XorShift};
use super::{CELL_BORDER_COLOR, FOUND_COLOR, OPERATIONS_BG, VALUE_COLOR, VARIABLE_COLOR};

const CELL_SIZE: f64 = 50.0;
const CELL_BORDER: f64 = 2.0;
const ARRAY_X0: f64 = 100.0;
const ARRAY_Y0: f64 = 100.0;
const LEVEL_SPACING: f64 = 14.0;

const MOVE_DELAY: Duration = Duration::from_millis(10);
const COMPARE_PAUSE: Duration = Duration::from_millis(200);

const OPS: [OpSpec; 5] = [
    OpSpec { label: "Traverse", arity: 0, hint: "" },
    OpSpec { label: "Find", arity: 1, hint: "value 0-99" },
    OpSpec { label: "Insert", arity: 1, hint: "value 0-99" },
    OpSpec { label: "Delete", arity: 1, hint: "value 0-99" },
    OpSpec { label: "Delete Rightmost", arity: 0, hint: "" },
];

pub struct ArrayViz {
    anim: Animator,
    list: Vec<Drawable<u32>>,
    size: usize,
    cells: Vec<ShapeId>,
}

impl ArrayViz {
    pub fn new<H: Host>(host: &mut H) -> Self {
        let mut viz = ArrayViz { anim: Animator::new(), list: Vec::new(), size: 10, cells: Vec::new() };
        // Seed the display with some values, like a freshly loaded example
        let mut rng = XorShift::new(314159);
        let seed: Vec<u32> = (0..viz.size - 1).map(|_| rng.below(90)).collect();
        viz.display(host, &seed);
        viz
    }

    /// Logical contents, for tests and reference comparison.
    pub fn values(&self) -> Vec<u32> {
        self.list.iter().map(|d| d.val).collect()
    }

    pub fn capacity(&self) -> usize {
        self.size
    }

    fn cell_coords(&self, index: isize) -> Vec<f64> {
        let i = index as f64;
        vec![
            ARRAY_X0 + CELL_SIZE * i,
            ARRAY_Y0,
            ARRAY_X0 + CELL_SIZE * (i + 1.0) - CELL_BORDER,
            ARRAY_Y0 + CELL_SIZE - CELL_BORDER,
        ]
    }

    fn cell_center(&self, index: isize) -> Vec<f64> {
        let half = (CELL_SIZE - CELL_BORDER) / 2.0;
        add(&self.cell_coords(index), &[half, half])
    }

    fn array_cell_coords(&self, index: isize) -> Vec<f64> {
        let half = CELL_BORDER / 2.0;
        add(&self.cell_coords(index), &[-half, -half, CELL_BORDER - half, CELL_BORDER - half])
    }

    fn create_array_cell<H: Host>(&mut self, host: &mut H, index: isize) -> ShapeId {
        let id = host.create_shape(
            ShapeKind::Rect,
            self.array_cell_coords(index),
            ShapeStyle::outlined(CELL_BORDER_COLOR),
        );
        host.store_mut().lower(id);
        id
    }

    fn create_cell_value<H: Host>(
        &mut self,
        host: &mut H,
        coords: &[f64],
        center: &[f64],
        val: u32,
        color: Option<Color>,
    ) -> (ShapeId, ShapeId, Color) {
        let color = color.unwrap_or_else(|| self.anim.palette.next_color());
        let rect = host.create_shape(ShapeKind::Rect, coords.to_vec(), ShapeStyle::filled(color));
        let text = host.create_shape(
            ShapeKind::Text,
            center.to_vec(),
            ShapeStyle::text(val.to_string(), VALUE_COLOR),
        );
        host.store_mut().bind_activate(rect, val.to_string());
        host.store_mut().bind_activate(text, val.to_string());
        (rect, text, color)
    }

    /// Index arrow pointing at a cell, above it for positive levels and
    /// below for negative ones, with an optional name label.
    fn create_index<H: Host>(
        &mut self,
        host: &mut H,
        index: isize,
        name: Option<&str>,
        level: f64,
        color: Color,
    ) -> Vec<ShapeId> {
        let coords = self.cell_coords(index);
        let x = self.cell_center(index)[0];
        let (y0, y1) = if level > 0.0 {
            (
                coords[1] - CELL_SIZE * 3.0 / 5.0 - level * LEVEL_SPACING,
                coords[1] - CELL_SIZE * 3.0 / 10.0,
            )
        } else {
            (
                coords[3] + CELL_SIZE * 3.0 / 5.0 - level * LEVEL_SPACING,
                coords[3] + CELL_SIZE * 3.0 / 10.0,
            )
        };
        let arrow =
            host.create_shape(ShapeKind::Line, vec![x, y0, x, y1], ShapeStyle::line(color, true));
        let mut items = vec![arrow];
        if let Some(name) = name {
            items.push(host.create_shape(
                ShapeKind::Text,
                vec![x + 2.0, y0],
                ShapeStyle::text(name, color),
            ));
        }
        items
    }

    fn display<H: Host>(&mut self, host: &mut H, initial: &[u32]) {
        for i in 0..self.size {
            let cell = self.create_array_cell(host, i as isize);
            self.cells.push(cell);
        }
        for (i, &val) in initial.iter().enumerate() {
            let coords = self.cell_coords(i as isize);
            let center = self.cell_center(i as isize);
            let (rect, text, color) = self.create_cell_value(host, &coords, &center, val, None);
            self.list.push(Drawable::new(val, color, rect, text));
        }
    }

    /// Snap every cell pair and grid border to its exact slot.
    fn fix_positions<H: Host>(&mut self, host: &mut H) {
        for i in 0..self.cells.len() {
            let coords = self.array_cell_coords(i as isize);
            host.set_coords(self.cells[i], &coords);
        }
        for i in 0..self.list.len() {
            let coords = self.cell_coords(i as isize);
            let center = self.cell_center(i as isize);
            host.set_coords(self.list[i].shape, &coords);
            host.set_coords(self.list[i].label, &center);
        }
    }

    fn finish_op<H: Host>(&mut self, host: &mut H, env: EnvToken) -> Result<(), AnimError> {
        self.anim.clean_up(host, env);
        if self.anim.depth() == 0 {
            self.fix_positions(host);
            host.flush()?;
        }
        Ok(())
    }

    pub fn insert<H: Host>(&mut self, host: &mut H, val: u32) -> Result<(), AnimError> {
        self.anim.start();
        let env = self.anim.open_call();
        let result = self.insert_body(host, env, val);
        self.finish_op(host, env)?;
        result
    }

    fn insert_body<H: Host>(&mut self, host: &mut H, env: EnvToken, val: u32) -> Result<(), AnimError> {
        let n = self.list.len() as isize;
        let index = self.create_index(host, n - 1, Some("nItems"), -1.0, VARIABLE_COLOR);
        self.anim.adopt(env, &index);

        // New cell pair arrives from the operations panel area at the bottom
        let start = vec![
            CANVAS_W / 2.0 - CELL_SIZE,
            CANVAS_H,
            CANVAS_W / 2.0 - CELL_BORDER,
            CANVAS_H + CELL_SIZE - CELL_BORDER,
        ];
        let start_center = vec![CANVAS_W / 2.0 - CELL_SIZE / 2.0, CANVAS_H + CELL_SIZE / 2.0];
        let (rect, text, color) = self.create_cell_value(host, &start, &start_center, val, None);
        self.anim.adopt(env, &[rect, text]);
        self.anim.move_items_to(
            host,
            &[rect, text],
            &[self.cell_coords(n), self.cell_center(n)],
            CELL_SIZE as usize,
            MOVE_DELAY,
        )?;
        self.list.push(Drawable::new(val, color, rect, text));
        self.anim.disown(env, &[rect, text]);

        self.anim.move_items_by(host, &index, [CELL_SIZE, 0.0], 10, MOVE_DELAY)?;
        Ok(())
    }

    pub fn find<H: Host>(&mut self, host: &mut H, val: u32) -> Result<Option<usize>, AnimError> {
        self.anim.start();
        let env = self.anim.open_call();
        let result = self.find_body(host, env, val);
        self.finish_op(host, env)?;
        result
    }

    fn find_body<H: Host>(
        &mut self,
        host: &mut H,
        env: EnvToken,
        val: u32,
    ) -> Result<Option<usize>, AnimError> {
        let n = self.list.len() as isize;
        let n_index = self.create_index(host, n - 1, Some("nItems"), -1.0, VARIABLE_COLOR);
        self.anim.adopt(env, &n_index);
        let j_index = self.create_index(host, 0, Some("j"), 1.0, VARIABLE_COLOR);
        self.anim.adopt(env, &j_index);

        for i in 0..self.list.len() {
            self.anim.wait(host, COMPARE_PAUSE)?;
            if self.list[i].val == val {
                let pos = host.coords(self.list[i].shape).to_vec();
                let ring = host.create_shape(
                    ShapeKind::Oval,
                    add(&pos, &multiply(&[1.0, 1.0, -1.0, -1.0], CELL_BORDER)),
                    ShapeStyle::outlined(FOUND_COLOR),
                );
                self.anim.adopt(env, &[ring]);
                self.anim.wait(host, COMPARE_PAUSE)?;
                return Ok(Some(i));
            }
            self.anim.move_items_by(host, &j_index, [CELL_SIZE, 0.0], 10, MOVE_DELAY)?;
        }
        Ok(None)
    }

    pub fn remove<H: Host>(&mut self, host: &mut H, val: u32) -> Result<bool, AnimError> {
        self.anim.start();
        let env = self.anim.open_call();
        let result = self.remove_body(host, env, val);
        self.finish_op(host, env)?;
        result
    }

    fn remove_body<H: Host>(
        &mut self,
        host: &mut H,
        env: EnvToken,
        val: u32,
    ) -> Result<bool, AnimError> {
        let n = self.list.len() as isize;
        let n_index = self.create_index(host, n - 1, Some("nItems"), -1.0, VARIABLE_COLOR);
        self.anim.adopt(env, &n_index);

        let Some(index) = self.find(host, val)? else {
            return Ok(false);
        };
        self.anim.wait(host, Duration::from_millis(300))?;

        // Slide the victim's cell pair up and off screen
        let victim = self.list[index].items();
        self.anim.move_items_off(host, &victim, 20, Duration::from_millis(20))?;

        let k_index = self.create_index(host, index as isize, Some("k"), 1.0, VARIABLE_COLOR);
        self.anim.adopt(env, &k_index);

        // Shift successors left to fill the gap
        for i in index + 1..self.list.len() {
            self.assign_element(host, env, i, i - 1)?;
            self.anim.move_items_by(host, &k_index, [CELL_SIZE, 0.0], 10, MOVE_DELAY)?;
        }
        self.anim.move_items_by(host, &n_index, [-CELL_SIZE, 0.0], 10, MOVE_DELAY)?;

        if let Some(last) = self.list.pop() {
            host.delete_shape(last.shape);
            host.delete_shape(last.label);
        }
        Ok(true)
    }

    /// Copy the cell pair at `from` onto the slot at `to`, replacing the old
    /// display there and updating the logical entry.
    fn assign_element<H: Host>(
        &mut self,
        host: &mut H,
        env: EnvToken,
        from: usize,
        to: usize,
    ) -> Result<(), AnimError> {
        let new_rect = host.copy_shape(self.list[from].shape);
        let new_text = host.copy_shape(self.list[from].label);
        self.anim.adopt(env, &[new_rect, new_text]);
        self.anim.move_items_to(
            host,
            &[new_rect, new_text],
            &[self.cell_coords(to as isize), self.cell_center(to as isize)],
            (CELL_SIZE / 2.0) as usize,
            MOVE_DELAY,
        )?;
        host.delete_shape(self.list[to].shape);
        host.delete_shape(self.list[to].label);
        self.list[to].val = self.list[from].val;
        self.list[to].color = self.list[from].color;
        self.list[to].shape = new_rect;
        self.list[to].label = new_text;
        self.anim.disown(env, &[new_rect, new_text]);
        Ok(())
    }

    pub fn remove_from_end<H: Host>(&mut self, host: &mut H) -> Result<(), AnimError> {
        self.anim.start();
        let env = self.anim.open_call();
        let result = self.remove_from_end_body(host, env);
        self.finish_op(host, env)?;
        result
    }

    fn remove_from_end_body<H: Host>(&mut self, host: &mut H, env: EnvToken) -> Result<(), AnimError> {
        let n = self.list.len() as isize;
        let index = self.create_index(host, n - 1, Some("nItems"), -1.0, VARIABLE_COLOR);
        self.anim.adopt(env, &index);
        if let Some(last) = self.list.pop() {
            host.delete_shape(last.shape);
            host.delete_shape(last.label);
        }
        self.anim.move_items_by(host, &index, [-CELL_SIZE, 0.0], 10, MOVE_DELAY)?;
        Ok(())
    }

    pub fn traverse<H: Host>(&mut self, host: &mut H) -> Result<(), AnimError> {
        self.anim.start();
        let env = self.anim.open_call();
        let result = self.traverse_body(host, env);
        self.finish_op(host, env)?;
        result
    }

    fn traverse_body<H: Host>(&mut self, host: &mut H, env: EnvToken) -> Result<(), AnimError> {
        let n = self.list.len() as isize;
        let n_index = self.create_index(host, n - 1, Some("nItems"), -1.0, VARIABLE_COLOR);
        self.anim.adopt(env, &n_index);
        let j_index = self.create_index(host, 0, Some("j"), 1.0, VARIABLE_COLOR);
        self.anim.adopt(env, &j_index);

        let spacing = CELL_SIZE * 3.0 / 4.0;
        let padding = 10.0;
        let width = self.list.len() as f64 * spacing + padding;
        let box_coords = vec![
            (CANVAS_W - width) / 2.0,
            CANVAS_H - CELL_SIZE - padding,
            (CANVAS_W + width) / 2.0,
            CANVAS_H - padding,
        ];
        let output_box =
            host.create_shape(ShapeKind::Rect, box_coords.clone(), ShapeStyle::filled(OPERATIONS_BG));
        self.anim.adopt(env, &[output_box]);

        let mid_y = (box_coords[1] + box_coords[3]) / 2.0;
        for j in 0..self.list.len() {
            let copy = host.copy_shape(self.list[j].label);
            self.anim.adopt(env, &[copy]);
            let slot = vec![box_coords[0] + padding / 2.0 + (j as f64 + 0.5) * spacing, mid_y];
            self.anim.move_items_to(host, &[copy], &[slot], 10, Duration::from_millis(20))?;
            self.anim.wait(host, COMPARE_PAUSE)?;
            self.anim.move_items_by(host, &j_index, [CELL_SIZE, 0.0], 10, Duration::from_millis(30))?;
        }
        Ok(())
    }
}

impl<H: Host> Module<H> for ArrayViz {
    fn title(&self) -> &'static str {
        "Array"
    }

    fn ops(&self) -> &'static [OpSpec] {
        &OPS
    }

    fn invoke(&mut self, host: &mut H, op: usize, arg: &str) -> Result<String, AnimError> {
        let result = match op {
            0 => self.traverse(host).map(|()| String::from("Traversed array")),
            1 => match parse_small_int(arg) {
                Ok(val) => self.find(host, val).map(|found| match found {
                    Some(_) => format!("Found {}!", val),
                    None => format!("Value {} not found", val),
                }),
                Err(msg) => return Ok(msg),
            },
            2 => match parse_small_int(arg) {
                Ok(_) if self.list.len() >= self.size => {
                    return Ok(String::from("Error! Array is already full."))
                }
                Ok(val) => self.insert(host, val).map(|()| format!("Value {} inserted", val)),
                Err(msg) => return Ok(msg),
            },
            3 => match parse_small_int(arg) {
                Ok(val) => self.remove(host, val).map(|deleted| {
                    if deleted {
                        format!("Value {} deleted!", val)
                    } else {
                        format!("Value {} not found", val)
                    }
                }),
                Err(msg) => return Ok(msg),
            },
            _ => {
                if self.list.is_empty() {
                    return Ok(String::from("Array is empty!"));
                }
                self.remove_from_end(host).map(|()| String::from("Rightmost value deleted"))
            }
        };
        absorb_stop(result)
    }
}
