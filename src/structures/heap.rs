#![allow(dead_code)] // Complete API module, the test-only accessors are unused in the binary
//! Max-heap visualization
//!
//! The heap lives in a vertical array of small cells. The display capacity
//! starts at two cells and doubles with an animated growth sequence when an
//! insert finds the array full. Sift-up and sift-down move a working copy of
//! the sifted item beside the array and slide displaced values along an arc.

use std::time::Duration;

use crate::engine::coords::add;
use crate::engine::{
    AnimError, Animator, Drawable, EnvToken, Host, ShapeId, ShapeKind, ShapeStyle,
};

use super::{absorb_stop, parse_small_int, Module, OpSpec, XorShift};
use super::{CELL_BORDER_COLOR, OPERATIONS_BG, VALUE_COLOR, VARIABLE_COLOR};

pub const MAX_SIZE: usize = 31;
const CELL_WIDTH: f64 = 25.0;
const CELL_HEIGHT: f64 = 12.0;
const CELL_BORDER: f64 = 2.0;
const HEAP_X0: f64 = 80.0;
const HEAP_Y0: f64 = 18.0;
const LEVEL_SPACING: f64 = 10.0;

const MOVE_DELAY: Duration = Duration::from_millis(10);
const COPY_DELAY: Duration = Duration::from_millis(20);
const COMPARE_PAUSE: Duration = Duration::from_millis(200);

const OPS: [OpSpec; 6] = [
    OpSpec { label: "Insert", arity: 1, hint: "value 0-99" },
    OpSpec { label: "Remove Max", arity: 0, hint: "" },
    OpSpec { label: "Peek", arity: 0, hint: "" },
    OpSpec { label: "Heapify", arity: 0, hint: "" },
    OpSpec { label: "Random Fill", arity: 1, hint: "count 1-31" },
    OpSpec { label: "New", arity: 0, hint: "" },
];

pub struct HeapViz {
    anim: Animator,
    list: Vec<Drawable<u32>>,
    /// Display capacity in cells; doubles when an insert finds it full.
    size: usize,
    cells: Vec<ShapeId>,
    /// Persistent `nItems` arrow pointing one past the last item.
    n_items_index: Vec<ShapeId>,
    rng: XorShift,
}

impl HeapViz {
    pub fn new<H: Host>(host: &mut H) -> Self {
        let mut viz = HeapViz {
            anim: Animator::new(),
            list: Vec::new(),
            size: 2,
            cells: Vec::new(),
            n_items_index: Vec::new(),
            rng: XorShift::new(271828),
        };
        viz.display(host);
        viz
    }

    pub fn values(&self) -> Vec<u32> {
        self.list.iter().map(|d| d.val).collect()
    }

    /// The heap-order invariant: every node at least as large as its children.
    pub fn is_heap(&self) -> bool {
        let n = self.list.len();
        (0..n / 2).all(|i| {
            self.list[i].val >= self.list[2 * i + 1].val
                && (2 * i + 2 >= n || self.list[i].val >= self.list[2 * i + 2].val)
        })
    }

    fn cell_coords(&self, index: usize) -> Vec<f64> {
        let i = index as f64;
        vec![
            HEAP_X0,
            HEAP_Y0 + CELL_HEIGHT * i,
            HEAP_X0 + CELL_WIDTH - CELL_BORDER,
            HEAP_Y0 + CELL_HEIGHT * (i + 1.0) - CELL_BORDER,
        ]
    }

    fn cell_center(&self, index: usize) -> Vec<f64> {
        let half_x = (CELL_WIDTH - CELL_BORDER) / 2.0;
        let half_y = (CELL_HEIGHT - CELL_BORDER) / 2.0;
        add(&self.cell_coords(index), &[half_x, half_y])
    }

    fn array_cell_coords(&self, index: usize) -> Vec<f64> {
        let half = CELL_BORDER / 2.0;
        add(&self.cell_coords(index), &[-half, -half, CELL_BORDER - half, CELL_BORDER - half])
    }

    fn create_array_cell<H: Host>(&mut self, host: &mut H, index: usize) -> ShapeId {
        let id = host.create_shape(
            ShapeKind::Rect,
            self.array_cell_coords(index),
            ShapeStyle::outlined(CELL_BORDER_COLOR),
        );
        host.store_mut().lower(id);
        id
    }

    /// Index arrow beside a cell: positive levels sit to the left of the
    /// array, negative levels to the right.
    fn index_coords(&self, index: usize, level: f64) -> (Vec<f64>, Vec<f64>) {
        let y = self.cell_center(index)[1];
        let (x0, x1) = if level > 0.0 {
            (HEAP_X0 - CELL_WIDTH * 0.8 - level * LEVEL_SPACING, HEAP_X0 - CELL_WIDTH * 0.3)
        } else {
            (HEAP_X0 + 1.8 * CELL_WIDTH - level * LEVEL_SPACING, HEAP_X0 + CELL_WIDTH * 1.3)
        };
        let separation = if x1 < x0 { 3.0 } else { -3.0 };
        (vec![x0, y, x1, y], vec![x0 + separation * 4.0, y])
    }

    fn create_index<H: Host>(
        &mut self,
        host: &mut H,
        index: usize,
        name: &str,
        level: f64,
    ) -> Vec<ShapeId> {
        let (arrow_coords, label_at) = self.index_coords(index, level);
        let arrow = host.create_shape(
            ShapeKind::Line,
            arrow_coords,
            ShapeStyle::line(VARIABLE_COLOR, true),
        );
        let label =
            host.create_shape(ShapeKind::Text, label_at, ShapeStyle::text(name, VARIABLE_COLOR));
        vec![arrow, label]
    }

    fn create_cell_value<H: Host>(
        &mut self,
        host: &mut H,
        coords: &[f64],
        val: u32,
        color: Option<ratatui::style::Color>,
    ) -> (ShapeId, ShapeId, ratatui::style::Color) {
        let color = color.unwrap_or_else(|| self.anim.palette.next_color());
        let center = vec![(coords[0] + coords[2]) / 2.0, (coords[1] + coords[3]) / 2.0];
        let rect = host.create_shape(ShapeKind::Rect, coords.to_vec(), ShapeStyle::filled(color));
        let text =
            host.create_shape(ShapeKind::Text, center, ShapeStyle::text(val.to_string(), VALUE_COLOR));
        host.store_mut().bind_activate(rect, val.to_string());
        host.store_mut().bind_activate(text, val.to_string());
        (rect, text, color)
    }

    fn display<H: Host>(&mut self, host: &mut H) {
        host.store_mut().clear();
        self.cells.clear();
        for i in 0..self.size {
            let cell = self.create_array_cell(host, i);
            self.cells.push(cell);
        }
        self.n_items_index = self.create_index(host, self.list.len(), "nItems", 1.0);
        for i in 0..self.list.len() {
            let coords = self.cell_coords(i);
            let val = self.list[i].val;
            let color = self.list[i].color;
            let (rect, text, _) = self.create_cell_value(host, &coords, val, Some(color));
            self.list[i].shape = rect;
            self.list[i].label = text;
        }
    }

    /// Replace every y component of a coordinate list with `y`.
    fn retarget_y(coords: &[f64], y: f64) -> Vec<f64> {
        coords
            .iter()
            .enumerate()
            .map(|(i, &c)| if i % 2 == 1 { y } else { c })
            .collect()
    }

    fn fix_positions<H: Host>(&mut self, host: &mut H) {
        for i in 0..self.list.len() {
            let coords = self.cell_coords(i);
            let center = self.cell_center(i);
            host.set_coords(self.list[i].shape, &coords);
            host.set_coords(self.list[i].label, &center);
        }
        for i in 0..self.cells.len() {
            let coords = self.array_cell_coords(i);
            host.set_coords(self.cells[i], &coords);
        }
        // Re-aim the nItems arrow one past the end of the array
        let y = self.cell_center(self.list.len())[1];
        for &item in &self.n_items_index {
            let coords = Self::retarget_y(host.coords(item), y);
            host.set_coords(item, &coords);
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
        if self.size <= self.list.len() {
            self.grow_display(host, env)?;
        }

        let n = self.list.len();
        let start = vec![HEAP_X0, 0.0, HEAP_X0 + CELL_WIDTH, CELL_HEIGHT];
        let (rect, text, color) = self.create_cell_value(host, &start, val, None);
        self.anim.adopt(env, &[rect, text]);
        self.anim.move_items_to(
            host,
            &[rect, text],
            &[self.cell_coords(n), self.cell_center(n)],
            CELL_HEIGHT as usize,
            MOVE_DELAY,
        )?;
        self.list.push(Drawable::new(val, color, rect, text));
        self.anim.disown(env, &[rect, text]);

        // Slide the nItems arrow to one past the inserted item
        let y = self.cell_center(self.list.len())[1];
        let items = self.n_items_index.clone();
        let targets: Vec<Vec<f64>> =
            items.iter().map(|&i| Self::retarget_y(host.coords(i), y)).collect();
        self.anim.move_items_to(host, &items, &targets, 10, MOVE_DELAY)?;

        self.sift_up(host, self.list.len() - 1)
    }

    /// Double the cell array with the original's growth choreography: shift
    /// everything right, lay down the doubled grid, copy the values back.
    fn grow_display<H: Host>(&mut self, host: &mut H, env: EnvToken) -> Result<(), AnimError> {
        let shift = [2.0 * CELL_WIDTH, 0.0];
        let mut cells_and_values = self.cells.clone();
        for d in &self.list {
            cells_and_values.extend(d.items());
        }
        self.anim.move_items_by(host, &cells_and_values, shift, 10, COPY_DELAY)?;

        for i in 0..self.size {
            let temp = self.create_array_cell(host, i);
            self.anim.adopt(env, &[temp]);
            let lasting = self.create_array_cell(host, i + self.size);
            self.cells.push(lasting);
        }
        self.size *= 2;

        // Copies of the values drift back into the doubled array
        for i in 0..self.list.len() {
            let copy_rect = host.copy_shape(self.list[i].shape);
            let copy_text = host.copy_shape(self.list[i].label);
            self.anim.adopt(env, &[copy_rect, copy_text]);
            self.anim.move_items_by(
                host,
                &[copy_rect, copy_text],
                [-shift[0], -shift[1]],
                10,
                MOVE_DELAY,
            )?;
        }

        // The originals snap back underneath in one step
        self.anim.move_items_by(host, &cells_and_values, [-shift[0], -shift[1]], 1, MOVE_DELAY)
    }

    pub fn sift_up<H: Host>(&mut self, host: &mut H, i: usize) -> Result<(), AnimError> {
        if i == 0 {
            return Ok(());
        }
        self.anim.start();
        let env = self.anim.open_call();
        let result = self.sift_up_body(host, env, i);
        self.finish_op(host, env)?;
        result
    }

    fn sift_up_body<H: Host>(&mut self, host: &mut H, env: EnvToken, mut i: usize) -> Result<(), AnimError> {
        let item_val = self.list[i].val;
        let item_color = self.list[i].color;
        let copy_item = [host.copy_shape(self.list[i].shape), host.copy_shape(self.list[i].label)];
        self.anim.adopt(env, &copy_item);
        let item_delta = [3.0 * CELL_WIDTH, 0.0];
        self.anim.move_items_by(host, &copy_item, item_delta, 10, COPY_DELAY)?;

        let i_index = self.create_index(host, i, "i", -1.0);
        let parent_index = self.create_index(host, (i - 1) / 2, "parent", -2.0);
        self.anim.adopt(env, &i_index);
        self.anim.adopt(env, &parent_index);

        while i > 0 {
            let parent = (i - 1) / 2;
            let delta = self.cell_center(parent)[1] - host.coords(parent_index[0])[1];
            if delta != 0.0 {
                self.anim.move_items_by(host, &parent_index, [0.0, delta], 10, MOVE_DELAY)?;
            }
            self.anim.wait(host, COMPARE_PAUSE)?;

            if self.list[parent].val < item_val {
                // The parent's value slides down into node i along an arc
                let copy_val =
                    [host.copy_shape(self.list[parent].shape), host.copy_shape(self.list[parent].label)];
                self.anim.adopt(env, &copy_val);
                let angle = -90.0 * 11.0 / (10.0 + (i - parent) as f64);
                self.anim.move_items_on_curve(
                    host,
                    &copy_val,
                    &[self.cell_coords(i), self.cell_center(i)],
                    angle,
                    10,
                    COPY_DELAY,
                )?;
                self.list[i].val = self.list[parent].val;
                self.list[i].color = self.list[parent].color;
                host.delete_shape(self.list[i].shape);
                host.delete_shape(self.list[i].label);
                self.list[i].shape = copy_val[0];
                self.list[i].label = copy_val[1];
                self.anim.disown(env, &copy_val);
            } else {
                break;
            }

            let delta = self.cell_center(parent)[1] - self.cell_center(i)[1];
            let mut moving = i_index.clone();
            moving.extend(copy_item);
            self.anim.move_items_by(host, &moving, [0.0, delta], 10, MOVE_DELAY)?;
            i = parent;
        }

        // Drop the working copy into its final cell
        self.anim.move_items_by(host, &copy_item, [-item_delta[0], -item_delta[1]], 10, MOVE_DELAY)?;
        host.delete_shape(self.list[i].shape);
        host.delete_shape(self.list[i].label);
        self.list[i].val = item_val;
        self.list[i].color = item_color;
        self.list[i].shape = copy_item[0];
        self.list[i].label = copy_item[1];
        self.anim.disown(env, &copy_item);
        Ok(())
    }

    pub fn sift_down<H: Host>(&mut self, host: &mut H, i: usize) -> Result<(), AnimError> {
        let first_leaf = self.list.len() / 2;
        if i >= first_leaf {
            return Ok(());
        }
        self.anim.start();
        let env = self.anim.open_call();
        let result = self.sift_down_body(host, env, i);
        self.finish_op(host, env)?;
        result
    }

    fn sift_down_body<H: Host>(&mut self, host: &mut H, env: EnvToken, mut i: usize) -> Result<(), AnimError> {
        let first_leaf = self.list.len() / 2;
        let item_val = self.list[i].val;
        let item_color = self.list[i].color;
        let copy_item = [host.copy_shape(self.list[i].shape), host.copy_shape(self.list[i].label)];
        self.anim.adopt(env, &copy_item);
        let item_delta = [3.0 * CELL_WIDTH, 0.0];
        self.anim.move_items_by(host, &copy_item, item_delta, 10, COPY_DELAY)?;

        let i_index = self.create_index(host, i, "i", -1.0);
        let max_child_index = self.create_index(host, 2 * i + 1, "maxChild", -2.0);
        self.anim.adopt(env, &i_index);
        self.anim.adopt(env, &max_child_index);

        while i < first_leaf {
            let left = 2 * i + 1;
            let right = 2 * i + 2;
            let mut maxi = left;
            if right < self.list.len() && self.list[left].val < self.list[right].val {
                maxi = right;
            }

            let delta = self.cell_center(maxi)[1] - host.coords(max_child_index[0])[1];
            if delta != 0.0 {
                self.anim.move_items_by(host, &max_child_index, [0.0, delta], 10, MOVE_DELAY)?;
                self.anim.wait(host, COMPARE_PAUSE)?;
            }

            if item_val < self.list[maxi].val {
                // The larger child's value slides up into node i
                let copy_val =
                    [host.copy_shape(self.list[maxi].shape), host.copy_shape(self.list[maxi].label)];
                self.anim.adopt(env, &copy_val);
                self.anim.move_items_on_curve(
                    host,
                    &copy_val,
                    &[self.cell_coords(i), self.cell_center(i)],
                    90.0,
                    10,
                    COPY_DELAY,
                )?;
                host.delete_shape(self.list[i].shape);
                host.delete_shape(self.list[i].label);
                self.list[i].val = self.list[maxi].val;
                self.list[i].color = self.list[maxi].color;
                self.list[i].shape = copy_val[0];
                self.list[i].label = copy_val[1];
                self.anim.disown(env, &copy_val);

                let delta = self.cell_center(maxi)[1] - self.cell_center(i)[1];
                let mut moving = i_index.clone();
                moving.extend(copy_item);
                self.anim.move_items_by(host, &moving, [0.0, delta], 10, MOVE_DELAY)?;
                i = maxi;
            } else {
                break;
            }
        }

        self.anim.move_items_by(host, &copy_item, [-item_delta[0], -item_delta[1]], 10, MOVE_DELAY)?;
        host.delete_shape(self.list[i].shape);
        host.delete_shape(self.list[i].label);
        self.list[i].val = item_val;
        self.list[i].color = item_color;
        self.list[i].shape = copy_item[0];
        self.list[i].label = copy_item[1];
        self.anim.disown(env, &copy_item);
        Ok(())
    }

    pub fn remove_max<H: Host>(&mut self, host: &mut H) -> Result<Option<u32>, AnimError> {
        if self.list.is_empty() {
            return Ok(None);
        }
        self.anim.start();
        let env = self.anim.open_call();
        let result = self.remove_max_body(host, env);
        self.finish_op(host, env)?;
        result
    }

    fn remove_max_body<H: Host>(&mut self, host: &mut H, env: EnvToken) -> Result<Option<u32>, AnimError> {
        // Complete the logical removal first: the last item replaces the
        // root, and the root's shapes become transient. A stop anywhere
        // below then unwinds to a layout matching the logical state.
        let Some(last) = self.list.pop() else {
            return Ok(None);
        };
        let root = if self.list.is_empty() {
            last
        } else {
            std::mem::replace(&mut self.list[0], last)
        };

        let root_items = root.items();
        self.anim.adopt(env, &root_items);
        self.anim.move_items_off(host, &root_items, CELL_HEIGHT as usize, Duration::from_millis(50))?;
        self.anim.dispose(host, env, &root_items);

        if !self.list.is_empty() {
            self.swap_root(host)?;
            self.sift_down(host, 0)?;
        }
        Ok(Some(root.val))
    }

    /// Slide the former last cell pair into the vacated root slot.
    fn swap_root<H: Host>(&mut self, host: &mut H) -> Result<(), AnimError> {
        let env = self.anim.open_call();
        let items = self.list[0].items();
        let result = self.anim.move_items_to(
            host,
            &items,
            &[self.cell_coords(0), self.cell_center(0)],
            10,
            MOVE_DELAY,
        );
        self.anim.clean_up(host, env);
        result
    }

    pub fn heapify<H: Host>(&mut self, host: &mut H) -> Result<(), AnimError> {
        self.anim.start();
        let env = self.anim.open_call();
        let result = self.heapify_body(host, env);
        self.finish_op(host, env)?;
        result
    }

    fn heapify_body<H: Host>(&mut self, host: &mut H, _env: EnvToken) -> Result<(), AnimError> {
        for lo in (0..self.list.len() / 2).rev() {
            self.sift_down(host, lo)?;
        }
        Ok(())
    }

    pub fn peek<H: Host>(&mut self, host: &mut H) -> Result<(), AnimError> {
        self.anim.start();
        let env = self.anim.open_call();
        let result = self.peek_body(host, env);
        self.finish_op(host, env)?;
        result
    }

    fn peek_body<H: Host>(&mut self, host: &mut H, env: EnvToken) -> Result<(), AnimError> {
        let padding = 10.0;
        let spacing = CELL_WIDTH * 3.0 / 4.0;
        let box_coords = vec![
            HEAP_X0 * 2.0 + padding,
            crate::engine::CANVAS_H - CELL_WIDTH - padding,
            HEAP_X0 * 2.0 + spacing + padding * 2.0,
            crate::engine::CANVAS_H - padding,
        ];
        let output_box =
            host.create_shape(ShapeKind::Rect, box_coords.clone(), ShapeStyle::filled(OPERATIONS_BG));
        self.anim.adopt(env, &[output_box]);

        if let Some(root) = self.list.first() {
            let copy = host.copy_shape(root.label);
            self.anim.adopt(env, &[copy]);
            let mid = vec![
                (box_coords[0] + box_coords[2]) / 2.0,
                (box_coords[1] + box_coords[3]) / 2.0,
            ];
            self.anim.move_items_to(host, &[copy], &[mid], 10, Duration::from_millis(20))?;
            let label = host.create_shape(
                ShapeKind::Text,
                vec![box_coords[2] + spacing, box_coords[3] - padding],
                ShapeStyle::text("root", VARIABLE_COLOR),
            );
            self.anim.adopt(env, &[label]);
            self.anim.wait(host, Duration::from_millis(500))?;
        }
        Ok(())
    }

    /// Rebuild with `n` random values, unordered; the user runs Heapify.
    pub fn random_fill<H: Host>(&mut self, host: &mut H, n: usize) {
        self.size = n.max(2);
        self.list.clear();
        for _ in 0..n {
            let val = self.rng.below(99);
            let color = self.anim.palette.next_color();
            self.list.push(Drawable::new(val, color, 0, 0));
        }
        self.display(host);
    }

    pub fn new_array<H: Host>(&mut self, host: &mut H) {
        self.list.clear();
        self.size = 2;
        self.display(host);
    }
}

impl<H: Host> Module<H> for HeapViz {
    fn title(&self) -> &'static str {
        "Heap"
    }

    fn ops(&self) -> &'static [OpSpec] {
        &OPS
    }

    fn invoke(&mut self, host: &mut H, op: usize, arg: &str) -> Result<String, AnimError> {
        let result = match op {
            0 => match parse_small_int(arg) {
                Ok(_) if self.list.len() >= MAX_SIZE => {
                    return Ok(String::from("Error! Heap is already full."))
                }
                Ok(val) => self.insert(host, val).map(|()| format!("Value {} inserted", val)),
                Err(msg) => return Ok(msg),
            },
            1 => self.remove_max(host).map(|removed| match removed {
                Some(val) => format!("{} was removed!", val),
                None => String::from("Heap is empty!"),
            }),
            2 => {
                if self.list.is_empty() {
                    return Ok(String::from("Error! Heap is empty."));
                }
                let val = self.list[0].val;
                self.peek(host).map(|()| format!("{} is the root value!", val))
            }
            3 => self.heapify(host).map(|()| String::from("Heap order restored")),
            4 => match arg.trim().parse::<usize>() {
                Ok(n) if (1..=MAX_SIZE).contains(&n) => {
                    self.random_fill(host, n);
                    host.flush()?;
                    Ok(format!("Filled with {} random values", n))
                }
                _ => {
                    return Ok(format!(
                        "Input value must be an integer from 1 to {}.",
                        MAX_SIZE
                    ))
                }
            },
            _ => {
                self.new_array(host);
                host.flush()?;
                Ok(String::from("New heap created"))
            }
        };
        absorb_stop(result)
    }
}
