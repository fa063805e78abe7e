#![allow(dead_code)] // Complete API module, the test-only accessors are unused in the binary
//! Stack visualization
//!
//! Cells grow upward from a fixed base; a persistent `top` arrow tracks the
//! top of the stack. Values are short strings. Empty pop is a no-op that
//! only reports a status message.

use std::time::Duration;

use ratatui::style::Color;

use crate::engine::coords::add;
use crate::engine::{
    AnimError, Animator, Drawable, EnvToken, Host, ShapeId, ShapeKind, ShapeStyle,
};

use super::{absorb_stop, check_text_arg, Module, OpSpec};
use super::{CELL_BORDER_COLOR, OPERATIONS_BG, VALUE_COLOR, VARIABLE_COLOR};

pub const MAX_SIZE: usize = 8;
const CELL_WIDTH: f64 = 160.0;
const CELL_HEIGHT: f64 = 40.0;
const CELL_BORDER: f64 = 2.0;
const STACK_X0: f64 = 300.0;
const STACK_Y0: f64 = 350.0;

const MOVE_DELAY: Duration = Duration::from_millis(10);

const OPS: [OpSpec; 4] = [
    OpSpec { label: "Push", arity: 1, hint: "value, up to 8 chars" },
    OpSpec { label: "Pop", arity: 0, hint: "" },
    OpSpec { label: "Peek", arity: 0, hint: "" },
    OpSpec { label: "New", arity: 1, hint: "size 1-8" },
];

pub struct StackViz {
    anim: Animator,
    list: Vec<Drawable<String>>,
    size: usize,
    cells: Vec<ShapeId>,
    /// The persistent `top` arrow and its label.
    index: Vec<ShapeId>,
}

impl StackViz {
    pub fn new<H: Host>(host: &mut H) -> Self {
        let mut viz = StackViz {
            anim: Animator::new(),
            list: Vec::new(),
            size: MAX_SIZE,
            cells: Vec::new(),
            index: Vec::new(),
        };
        viz.display(host);
        viz
    }

    pub fn values(&self) -> Vec<String> {
        self.list.iter().map(|d| d.val.clone()).collect()
    }

    pub fn capacity(&self) -> usize {
        self.size
    }

    pub fn peek_value(&self) -> Option<&str> {
        self.list.last().map(|d| d.val.as_str())
    }

    fn cell_coords(&self, index: isize) -> Vec<f64> {
        let i = index as f64;
        vec![
            STACK_X0 + CELL_BORDER,
            STACK_Y0 - CELL_HEIGHT * (i + 1.0) + CELL_BORDER,
            STACK_X0 + CELL_WIDTH - CELL_BORDER,
            STACK_Y0 - CELL_HEIGHT * i - CELL_BORDER,
        ]
    }

    fn cell_center(&self, index: isize) -> Vec<f64> {
        let half_x = (CELL_WIDTH - CELL_BORDER) / 2.0;
        let half_y = (CELL_HEIGHT - CELL_BORDER) / 2.0;
        add(&self.cell_coords(index), &[half_x, half_y])
    }

    fn index_coords(&self, index: isize) -> (Vec<f64>, Vec<f64>) {
        let cell = self.cell_coords(index);
        let x0 = STACK_X0 - CELL_WIDTH * 4.0 / 5.0;
        let x1 = STACK_X0 - CELL_WIDTH * 3.0 / 10.0;
        let y = cell[1] + CELL_HEIGHT / 2.0;
        let label = vec![x0 - CELL_WIDTH / 8.0, y + CELL_HEIGHT / 5.0];
        (vec![x0, y, x1, y], label)
    }

    fn create_array_cell<H: Host>(&mut self, host: &mut H, index: isize) -> ShapeId {
        let half = CELL_BORDER / 2.0;
        let coords = add(
            &self.cell_coords(index),
            &[-half, -half, CELL_BORDER - half, CELL_BORDER - half + 2.0],
        );
        let id = host.create_shape(ShapeKind::Rect, coords, ShapeStyle::outlined(CELL_BORDER_COLOR));
        host.store_mut().lower(id);
        id
    }

    fn create_cell_value<H: Host>(
        &mut self,
        host: &mut H,
        coords: &[f64],
        val: &str,
        color: Option<Color>,
    ) -> (ShapeId, ShapeId, Color) {
        let color = color.unwrap_or_else(|| self.anim.palette.next_color());
        let center = vec![(coords[0] + coords[2]) / 2.0, (coords[1] + coords[3]) / 2.0];
        let rect = host.create_shape(ShapeKind::Rect, coords.to_vec(), ShapeStyle::filled(color));
        let text =
            host.create_shape(ShapeKind::Text, center, ShapeStyle::text(val, VALUE_COLOR));
        host.store_mut().bind_activate(rect, val);
        host.store_mut().bind_activate(text, val);
        (rect, text, color)
    }

    /// Rebuild the whole display: the cell grid, surviving values, and the
    /// `top` arrow. Used at construction and by New.
    fn display<H: Host>(&mut self, host: &mut H) {
        host.store_mut().clear();
        self.cells.clear();
        for i in 0..self.size {
            let cell = self.create_array_cell(host, i as isize);
            self.cells.push(cell);
        }
        for i in 0..self.list.len() {
            let coords = self.cell_coords(i as isize);
            let val = self.list[i].val.clone();
            let color = self.list[i].color;
            let (rect, text, _) = self.create_cell_value(host, &coords, &val, Some(color));
            self.list[i].shape = rect;
            self.list[i].label = text;
        }
        let (arrow_coords, label_at) = self.index_coords(self.list.len() as isize - 1);
        let arrow =
            host.create_shape(ShapeKind::Line, arrow_coords, ShapeStyle::line(VARIABLE_COLOR, true));
        let label =
            host.create_shape(ShapeKind::Text, label_at, ShapeStyle::text("top", VARIABLE_COLOR));
        self.index = vec![arrow, label];
    }

    fn fix_positions<H: Host>(&mut self, host: &mut H) {
        for i in 0..self.list.len() {
            let coords = self.cell_coords(i as isize);
            let center = self.cell_center(i as isize);
            host.set_coords(self.list[i].shape, &coords);
            host.set_coords(self.list[i].label, &center);
        }
        let (arrow_coords, label_at) = self.index_coords(self.list.len() as isize - 1);
        host.set_coords(self.index[0], &arrow_coords);
        host.set_coords(self.index[1], &label_at);
    }

    fn finish_op<H: Host>(&mut self, host: &mut H, env: EnvToken) -> Result<(), AnimError> {
        self.anim.clean_up(host, env);
        if self.anim.depth() == 0 {
            self.fix_positions(host);
            host.flush()?;
        }
        Ok(())
    }

    pub fn push<H: Host>(&mut self, host: &mut H, val: &str) -> Result<(), AnimError> {
        self.anim.start();
        let env = self.anim.open_call();
        let result = self.push_body(host, env, val);
        self.finish_op(host, env)?;
        result
    }

    fn push_body<H: Host>(&mut self, host: &mut H, env: EnvToken, val: &str) -> Result<(), AnimError> {
        // The arrow moves up to the incoming cell first
        let index = self.index.clone();
        self.anim.move_items_by(host, &index, [0.0, -CELL_HEIGHT], 10, MOVE_DELAY)?;

        let n = self.list.len() as isize;
        let start = vec![STACK_X0, 0.0, STACK_X0 + CELL_WIDTH, CELL_HEIGHT];
        let (rect, text, color) = self.create_cell_value(host, &start, val, None);
        self.anim.adopt(env, &[rect, text]);
        self.anim.move_items_to(
            host,
            &[rect, text],
            &[self.cell_coords(n), self.cell_center(n)],
            CELL_HEIGHT as usize,
            MOVE_DELAY,
        )?;
        self.list.push(Drawable::new(val.to_string(), color, rect, text));
        self.anim.disown(env, &[rect, text]);
        Ok(())
    }

    /// Pop the top value. Empty stacks are a no-op returning `None`.
    pub fn pop<H: Host>(&mut self, host: &mut H) -> Result<Option<String>, AnimError> {
        if self.list.is_empty() {
            return Ok(None);
        }
        self.anim.start();
        let env = self.anim.open_call();
        let result = self.pop_body(host, env);
        self.finish_op(host, env)?;
        result
    }

    fn pop_body<H: Host>(&mut self, host: &mut H, env: EnvToken) -> Result<Option<String>, AnimError> {
        let Some(top) = self.list.pop() else {
            return Ok(None);
        };
        let items = top.items();
        self.anim.adopt(env, &items);
        self.anim.move_items_off(host, &items, CELL_HEIGHT as usize, MOVE_DELAY)?;
        let index = self.index.clone();
        self.anim.move_items_by(host, &index, [0.0, CELL_HEIGHT], 10, MOVE_DELAY)?;
        Ok(Some(top.val))
    }

    /// Show the top value in an output box without changing the stack.
    pub fn peek<H: Host>(&mut self, host: &mut H) -> Result<(), AnimError> {
        self.anim.start();
        let env = self.anim.open_call();
        let result = self.peek_body(host, env);
        self.finish_op(host, env)?;
        result
    }

    fn peek_body<H: Host>(&mut self, host: &mut H, env: EnvToken) -> Result<(), AnimError> {
        let box_coords = vec![
            STACK_X0 + CELL_WIDTH * 1.5,
            STACK_Y0 - CELL_HEIGHT,
            STACK_X0 + CELL_WIDTH * 2.5,
            STACK_Y0,
        ];
        let output_box =
            host.create_shape(ShapeKind::Rect, box_coords.clone(), ShapeStyle::filled(OPERATIONS_BG));
        self.anim.adopt(env, &[output_box]);

        if let Some(top) = self.list.last() {
            let copy = host.copy_shape(top.label);
            self.anim.adopt(env, &[copy]);
            let mid = vec![
                (box_coords[0] + box_coords[2]) / 2.0,
                (box_coords[1] + box_coords[3]) / 2.0,
            ];
            self.anim.move_items_to(host, &[copy], &[mid], 10, Duration::from_millis(20))?;
            self.anim.wait(host, Duration::from_millis(500))?;
        }
        Ok(())
    }

    /// Discard the contents and rebuild with a new capacity.
    pub fn new_stack<H: Host>(&mut self, host: &mut H, size: usize) {
        self.list.clear();
        self.size = size;
        self.display(host);
    }
}

impl<H: Host> Module<H> for StackViz {
    fn title(&self) -> &'static str {
        "Stack"
    }

    fn ops(&self) -> &'static [OpSpec] {
        &OPS
    }

    fn invoke(&mut self, host: &mut H, op: usize, arg: &str) -> Result<String, AnimError> {
        let result = match op {
            0 => match check_text_arg(arg) {
                Ok(_) if self.list.len() >= self.size => {
                    return Ok(String::from("Error! Stack is already full."));
                }
                Ok(val) => {
                    let val = val.to_string();
                    self.push(host, &val).map(|()| format!("Value {} pushed!", val))
                }
                Err(msg) => return Ok(msg),
            },
            1 => self.pop(host).map(|popped| match popped {
                Some(val) => format!("Value {} popped!", val),
                None => String::from("Error! Stack is empty."),
            }),
            2 => {
                if self.list.is_empty() {
                    return Ok(String::from("Error! Stack is empty."));
                }
                let val = self.list.last().map(|d| d.val.clone()).unwrap_or_default();
                self.peek(host)
                    .map(|()| format!("Value {} is at the top of the stack!", val))
            }
            _ => match arg.trim().parse::<usize>() {
                Ok(size) if (1..=MAX_SIZE).contains(&size) => {
                    self.new_stack(host, size);
                    host.flush()?;
                    Ok(format!("New stack created of size {}.", size))
                }
                _ => {
                    return Ok(format!(
                        "Error! Stack size must be an int between 1 and {}.",
                        MAX_SIZE
                    ))
                }
            },
        };
        absorb_stop(result)
    }
}
