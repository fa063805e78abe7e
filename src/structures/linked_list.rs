#![allow(dead_code)] // Complete API module, the test-only accessors are unused in the binary
//! Singly linked list visualization
//!
//! Nodes are head-inserted and laid out five to a row with wrap-around.
//! Each node owns a cell rectangle, its value text, a next-pointer dot,
//! and (except the last node) a polyline arrow to the next node. A small
//! header box with a `first` arrow anchors the chain.

use std::time::Duration;

use ratatui::style::Color;

use crate::engine::{AnimError, Animator, EnvToken, Host, ShapeId, ShapeKind, ShapeStyle};

use super::{absorb_stop, check_text_arg, Module, OpSpec};
use super::{FOUND_COLOR, OPERATIONS_BG, VALUE_COLOR, VARIABLE_COLOR};

pub const MAX_SIZE: usize = 20;
const CELL_WIDTH: f64 = 120.0;
const CELL_HEIGHT: f64 = 50.0;
const CELL_GAP: f64 = 20.0;
const CELL_SIZE: f64 = 50.0;
const DOT_SIZE: f64 = 10.0;
const LL_X0: f64 = 100.0;
const LL_Y0: f64 = 100.0;
const LEN_ROW: i64 = 5;
const ROW_GAP: f64 = 50.0;
const LEVEL_SPACING: f64 = 14.0;

const DOT_COLOR: Color = Color::Rgb(220, 60, 60);
const HEADER_COLOR: Color = Color::Rgb(180, 180, 190);

const MOVE_DELAY: Duration = Duration::from_millis(20);
const COMPARE_PAUSE: Duration = Duration::from_millis(200);

const OPS: [OpSpec; 6] = [
    OpSpec { label: "Search", arity: 1, hint: "value, up to 8 chars" },
    OpSpec { label: "Insert", arity: 1, hint: "value, up to 8 chars" },
    OpSpec { label: "Delete", arity: 1, hint: "value, up to 8 chars" },
    OpSpec { label: "Delete First", arity: 0, hint: "" },
    OpSpec { label: "Get First", arity: 0, hint: "" },
    OpSpec { label: "New", arity: 0, hint: "" },
];

/// One link node and its canvas items.
struct Node {
    key: String,
    color: Color,
    cell: ShapeId,
    value: ShapeId,
    dot: ShapeId,
    next_ptr: Option<ShapeId>,
}

impl Node {
    fn items(&self) -> Vec<ShapeId> {
        let mut items = vec![self.cell, self.value, self.dot];
        items.extend(self.next_ptr);
        items
    }
}

pub struct ListViz {
    anim: Animator,
    list: Vec<Node>,
    /// Arrow from the header dot to the first node, when the list is not empty.
    first: Option<ShapeId>,
    header: Vec<ShapeId>,
}

impl ListViz {
    pub fn new<H: Host>(host: &mut H) -> Self {
        let mut viz =
            ListViz { anim: Animator::new(), list: Vec::new(), first: None, header: Vec::new() };
        viz.display(host);
        viz
    }

    pub fn values(&self) -> Vec<String> {
        self.list.iter().map(|n| n.key.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    // Position 0 is the header; links occupy positions 1..=len. Position -1
    // is the staging row above the list where new nodes appear.
    fn x_y_offset(&self, pos: i64) -> [f64; 2] {
        let x = LL_X0 + (pos.max(0) % LEN_ROW) as f64 * (CELL_WIDTH + CELL_GAP);
        let y = LL_Y0 + (pos.max(-1).div_euclid(LEN_ROW)) as f64 * (CELL_HEIGHT + ROW_GAP);
        [x, y]
    }

    fn cell_coords(&self, pos: i64) -> Vec<f64> {
        let [x, y] = self.x_y_offset(pos);
        vec![x, y, x + CELL_WIDTH, y + CELL_HEIGHT]
    }

    fn cell_text(&self, pos: i64) -> Vec<f64> {
        let [x, y] = self.x_y_offset(pos);
        vec![x + CELL_HEIGHT, y + CELL_HEIGHT / 2.0]
    }

    fn cell_next(&self, pos: i64) -> [f64; 2] {
        let [x, y] = self.x_y_offset(pos);
        [x + CELL_HEIGHT * 2.0, y + CELL_HEIGHT / 2.0]
    }

    fn next_dot(&self, pos: i64) -> Vec<f64> {
        let [x, y] = self.cell_next(pos);
        let r = DOT_SIZE / 2.0;
        vec![x - r, y - r, x + r, y + r]
    }

    fn index_tip(&self, pos: i64) -> [f64; 2] {
        if pos == 0 {
            let dot = self.cell_next(0);
            return [dot[0], dot[1] - CELL_HEIGHT / 2.0];
        }
        let [x, y] = self.x_y_offset(pos);
        if pos > 0 {
            [x + CELL_WIDTH / 2.0, y]
        } else {
            [x, y + CELL_HEIGHT / 2.0]
        }
    }

    fn index_coords(&self, pos: i64, level: f64) -> Vec<f64> {
        let tip = self.index_tip(pos);
        let delta = if pos >= 0 { [0.0, CELL_SIZE / 5.0] } else { [CELL_SIZE * 4.0 / 5.0, 0.0] };
        let start = [tip[0] - delta[0], tip[1] - delta[1] - level * LEVEL_SPACING];
        vec![start[0], start[1], tip[0], tip[1]]
    }

    fn create_index<H: Host>(
        &mut self,
        host: &mut H,
        pos: i64,
        name: &str,
        level: f64,
    ) -> Vec<ShapeId> {
        let coords = self.index_coords(pos, level);
        let label_at = vec![coords[0], coords[1]];
        let arrow =
            host.create_shape(ShapeKind::Line, coords, ShapeStyle::line(VARIABLE_COLOR, true));
        let label =
            host.create_shape(ShapeKind::Text, label_at, ShapeStyle::text(name, VARIABLE_COLOR));
        vec![arrow, label]
    }

    /// Polyline from the next-pointer dot at `pos` to the node at
    /// `pos + d`, routed below the row gap when the target wrapped to the
    /// next row.
    fn next_link_coords(&self, pos: i64, d: i64) -> Vec<f64> {
        let cell0 = self.cell_next(pos);
        let cell1 = self.cell_next((pos + d).max(1));
        let spans_rows = cell1[1] > cell0[1];
        let tip = if spans_rows {
            [cell1[0], cell1[1] - CELL_HEIGHT / 2.0]
        } else {
            [cell1[0] - CELL_HEIGHT * 2.0, cell1[1]]
        };
        let delta = [(tip[0] - cell0[0]) * 0.33, (tip[1] - cell0[1]) * 0.33];
        let p1 = if spans_rows {
            [cell0[0], cell0[1] + (CELL_HEIGHT + ROW_GAP) / 2.0]
        } else {
            [cell0[0] + delta[0], cell0[1] + delta[1]]
        };
        let p2 = if spans_rows {
            [tip[0], tip[1] - ROW_GAP / 2.0]
        } else {
            [tip[0] - delta[0], tip[1] - delta[1]]
        };
        vec![cell0[0], cell0[1], p1[0], p1[1], p2[0], p2[1], tip[0], tip[1]]
    }

    fn create_next_arrow<H: Host>(&mut self, host: &mut H, pos: i64, d: i64) -> ShapeId {
        host.create_shape(
            ShapeKind::Line,
            self.next_link_coords(pos, d),
            ShapeStyle::line(VALUE_COLOR, true),
        )
    }

    /// Create the canvas items for one link node at a list position (or the
    /// staging position -1), optionally with a next arrow.
    fn create_link<H: Host>(
        &mut self,
        host: &mut H,
        pos: i64,
        key: &str,
        with_arrow: bool,
        color: Option<Color>,
    ) -> Node {
        let color = color.unwrap_or_else(|| self.anim.palette.next_color());
        let cell = host.create_shape(
            ShapeKind::Rect,
            self.cell_coords(pos),
            ShapeStyle::filled(color),
        );
        let value = host.create_shape(
            ShapeKind::Text,
            self.cell_text(pos),
            ShapeStyle::text(key, VALUE_COLOR),
        );
        let dot =
            host.create_shape(ShapeKind::Oval, self.next_dot(pos), ShapeStyle::filled(DOT_COLOR));
        host.store_mut().bind_activate(cell, key);
        host.store_mut().bind_activate(value, key);
        let next_ptr = with_arrow.then(|| self.create_next_arrow(host, pos, 1));
        Node { key: key.to_string(), color, cell, value, dot, next_ptr }
    }

    /// The header box with its dot and `first` label.
    fn create_header<H: Host>(&mut self, host: &mut H) {
        let [x, y] = self.x_y_offset(0);
        let rect = host.create_shape(
            ShapeKind::Rect,
            vec![x + CELL_WIDTH * 2.0 / 3.0, y, x + CELL_WIDTH, y + CELL_HEIGHT],
            ShapeStyle::filled(HEADER_COLOR),
        );
        let dot =
            host.create_shape(ShapeKind::Oval, self.next_dot(0), ShapeStyle::filled(DOT_COLOR));
        let dot_coords = self.next_dot(0);
        let text = host.create_shape(
            ShapeKind::Text,
            vec![(dot_coords[0] + dot_coords[2]) / 2.0, (y + dot_coords[1]) / 2.0],
            ShapeStyle::text("first", VARIABLE_COLOR),
        );
        self.header = vec![rect, dot, text];
    }

    /// Rebuild the whole canvas from the logical list.
    fn display<H: Host>(&mut self, host: &mut H) {
        host.store_mut().clear();
        self.create_header(host);
        self.first = None;
        for i in 0..self.list.len() {
            let pos = i as i64 + 1;
            let key = self.list[i].key.clone();
            let color = self.list[i].color;
            let with_arrow = i + 1 < self.list.len();
            self.list[i] = self.create_link(host, pos, &key, with_arrow, Some(color));
        }
        if !self.list.is_empty() {
            self.first = Some(self.create_next_arrow(host, 0, 1));
        }
    }

    /// Move (or snap) the header arrow and every node to its canonical
    /// position.
    fn restore_positions<H: Host>(&mut self, host: &mut H, animate: bool) -> Result<(), AnimError> {
        let mut items = Vec::new();
        let mut targets = Vec::new();
        if let Some(first) = self.first {
            items.push(first);
            targets.push(self.next_link_coords(0, 1));
        }
        for i in 0..self.list.len() {
            let pos = i as i64 + 1;
            items.push(self.list[i].cell);
            targets.push(self.cell_coords(pos));
            items.push(self.list[i].value);
            targets.push(self.cell_text(pos));
            items.push(self.list[i].dot);
            targets.push(self.next_dot(pos));
            if let Some(arrow) = self.list[i].next_ptr {
                items.push(arrow);
                targets.push(self.next_link_coords(pos, 1));
            }
        }
        if animate {
            self.anim.move_items_to(host, &items, &targets, 10, Duration::from_millis(10))
        } else {
            for (&id, target) in items.iter().zip(&targets) {
                host.set_coords(id, target);
            }
            Ok(())
        }
    }

    fn fix_positions<H: Host>(&mut self, host: &mut H) {
        let _ = self.restore_positions(host, false);
    }

    fn finish_op<H: Host>(&mut self, host: &mut H, env: EnvToken) -> Result<(), AnimError> {
        self.anim.clean_up(host, env);
        if self.anim.depth() == 0 {
            self.fix_positions(host);
            host.flush()?;
        }
        Ok(())
    }

    /// Insert a new node at the front of the list.
    pub fn insert_elem<H: Host>(&mut self, host: &mut H, key: &str) -> Result<(), AnimError> {
        self.anim.start();
        let env = self.anim.open_call();
        let result = self.insert_body(host, env, key);
        self.finish_op(host, env)?;
        result
    }

    fn insert_body<H: Host>(&mut self, host: &mut H, env: EnvToken, key: &str) -> Result<(), AnimError> {
        let link_index = self.create_index(host, -1, "link", 0.0);
        self.anim.adopt(env, &link_index);

        // New node appears above row one, with an arrow to the current
        // first node when there is one
        let node = self.create_link(host, -1, key, !self.list.is_empty(), None);
        self.anim.adopt(env, &node.items());

        // Everything slides: the new node into position 1, each existing
        // node down one position
        let mut items = node.items();
        let mut targets = vec![self.cell_coords(1), self.cell_text(1), self.next_dot(1)];
        if node.next_ptr.is_some() {
            targets.push(self.next_link_coords(1, 1));
        }
        for i in 0..self.list.len() {
            let pos = i as i64 + 2;
            items.extend(self.list[i].items());
            targets.push(self.cell_coords(pos));
            targets.push(self.cell_text(pos));
            targets.push(self.next_dot(pos));
            if self.list[i].next_ptr.is_some() {
                targets.push(self.next_link_coords(pos, 1));
            }
        }
        self.anim.move_items_to(host, &items, &targets, 20, MOVE_DELAY)?;

        let node_items = node.items();
        self.list.insert(0, node);
        self.anim.disown(env, &node_items);

        if self.first.is_none() {
            self.first = Some(self.create_next_arrow(host, 0, 1));
        }
        Ok(())
    }

    /// Delete the first node whose key matches `goal`.
    pub fn delete<H: Host>(&mut self, host: &mut H, goal: &str) -> Result<Option<String>, AnimError> {
        self.anim.start();
        let env = self.anim.open_call();
        let result = self.delete_body(host, env, goal);
        self.finish_op(host, env)?;
        result
    }

    fn delete_body<H: Host>(
        &mut self,
        host: &mut H,
        env: EnvToken,
        goal: &str,
    ) -> Result<Option<String>, AnimError> {
        let previous_index = self.create_index(host, 0, "previous", 1.0);
        self.anim.adopt(env, &previous_index);
        let link_index = self.create_index(host, 1, "link", 0.0);
        self.anim.adopt(env, &link_index);

        let mut previous: usize = 0;
        while previous < self.list.len() {
            let link = previous as i64 + 1;
            if link > 1 {
                let coords = self.index_coords(link, 0.0);
                self.anim.move_items_to(
                    host,
                    &link_index,
                    &[coords.clone(), coords[..2].to_vec()],
                    10,
                    MOVE_DELAY,
                )?;
            }
            self.anim.wait(host, COMPARE_PAUSE)?;

            if self.list[previous].key == goal {
                let highlight = self.create_found_highlight(host, link);
                self.anim.adopt(env, &[highlight]);

                // Re-aim the predecessor's arrow past the victim
                let update_first = previous == 0;
                if self.list[previous].next_ptr.is_some() {
                    let to_move = if update_first {
                        self.first
                    } else {
                        self.list[previous - 1].next_ptr
                    };
                    if let Some(arrow) = to_move {
                        host.store_mut().raise(arrow);
                        let coords = self.next_link_coords(previous as i64, 2);
                        self.anim.move_items_to(
                            host,
                            &[arrow],
                            &[coords],
                            10,
                            Duration::from_millis(40),
                        )?;
                    }
                } else if update_first {
                    if let Some(arrow) = self.first.take() {
                        host.delete_shape(arrow);
                    }
                } else if let Some(arrow) = self.list[previous - 1].next_ptr.take() {
                    host.delete_shape(arrow);
                }

                // Logical removal completes before the victim slides away
                let victim = self.list.remove(previous);
                let mut off_items = victim.items();
                off_items.push(highlight);
                self.anim.adopt(env, &victim.items());
                self.anim.move_items_off(host, &off_items, 20, Duration::from_millis(10))?;

                self.restore_positions(host, true)?;
                return Ok(Some(goal.to_string()));
            }

            previous = link as usize;
            let coords = self.index_coords(previous as i64, 1.0);
            self.anim.move_items_to(
                host,
                &previous_index,
                &[coords.clone(), coords[..2].to_vec()],
                10,
                MOVE_DELAY,
            )?;
        }
        Ok(None)
    }

    /// Walk the chain looking for `goal`; returns its position (1-based).
    pub fn find<H: Host>(&mut self, host: &mut H, goal: &str) -> Result<Option<usize>, AnimError> {
        self.anim.start();
        let env = self.anim.open_call();
        let result = self.find_body(host, env, goal);
        self.finish_op(host, env)?;
        result
    }

    fn find_body<H: Host>(
        &mut self,
        host: &mut H,
        env: EnvToken,
        goal: &str,
    ) -> Result<Option<usize>, AnimError> {
        let link_index = self.create_index(host, 1, "link", 0.0);
        self.anim.adopt(env, &link_index);

        let mut link = 1usize;
        while link <= self.list.len() {
            if link > 1 {
                let coords = self.index_coords(link as i64, 0.0);
                self.anim.move_items_to(
                    host,
                    &link_index,
                    &[coords.clone(), coords[..2].to_vec()],
                    10,
                    MOVE_DELAY,
                )?;
            }
            self.anim.wait(host, COMPARE_PAUSE)?;
            if self.list[link - 1].key == goal {
                return Ok(Some(link));
            }
            link += 1;
        }
        Ok(None)
    }

    pub fn search<H: Host>(&mut self, host: &mut H, goal: &str) -> Result<Option<String>, AnimError> {
        self.anim.start();
        let env = self.anim.open_call();
        let result = self.search_body(host, env, goal);
        self.finish_op(host, env)?;
        result
    }

    fn search_body<H: Host>(
        &mut self,
        host: &mut H,
        env: EnvToken,
        goal: &str,
    ) -> Result<Option<String>, AnimError> {
        let link = self.find(host, goal)?;
        let pos = link.unwrap_or(0) as i64;
        let link_index = self.create_index(host, pos, "link", 0.0);
        self.anim.adopt(env, &link_index);
        if let Some(pos) = link {
            let highlight = self.create_found_highlight(host, pos as i64);
            self.anim.adopt(env, &[highlight]);
            self.anim.wait(host, Duration::from_millis(500))?;
            return Ok(Some(goal.to_string()));
        }
        Ok(None)
    }

    /// Show the first node's value in a peek box.
    pub fn get_first<H: Host>(&mut self, host: &mut H) -> Result<Option<String>, AnimError> {
        self.anim.start();
        let env = self.anim.open_call();
        let result = self.get_first_body(host, env);
        self.finish_op(host, env)?;
        result
    }

    fn get_first_body<H: Host>(
        &mut self,
        host: &mut H,
        env: EnvToken,
    ) -> Result<Option<String>, AnimError> {
        let Some(key) = self.list.first().map(|n| n.key.clone()) else {
            return Ok(None);
        };
        let first_index = self.create_index(host, 1, "first", 0.0);
        self.anim.adopt(env, &first_index);

        let peek_box = vec![
            LL_X0 / 2.0,
            LL_Y0 / 4.0,
            LL_X0 / 2.0 + CELL_WIDTH + CELL_GAP,
            LL_Y0 / 4.0 + CELL_HEIGHT,
        ];
        let output_box =
            host.create_shape(ShapeKind::Rect, peek_box.clone(), ShapeStyle::filled(OPERATIONS_BG));
        self.anim.adopt(env, &[output_box]);

        let text = host.create_shape(
            ShapeKind::Text,
            self.cell_text(1),
            ShapeStyle::text(key.clone(), VALUE_COLOR),
        );
        self.anim.adopt(env, &[text]);
        let mid = vec![(peek_box[0] + peek_box[2]) / 2.0, (peek_box[1] + peek_box[3]) / 2.0];
        self.anim.move_items_to(host, &[text], &[mid], 10, Duration::from_millis(50))?;
        self.anim.wait(host, Duration::from_millis(300))?;
        Ok(Some(key))
    }

    fn create_found_highlight<H: Host>(&mut self, host: &mut H, pos: i64) -> ShapeId {
        host.create_shape(
            ShapeKind::Rect,
            self.cell_coords(pos),
            ShapeStyle::outlined(FOUND_COLOR),
        )
    }

    pub fn new_linked_list<H: Host>(&mut self, host: &mut H) {
        self.list.clear();
        self.first = None;
        self.display(host);
    }
}

impl<H: Host> Module<H> for ListViz {
    fn title(&self) -> &'static str {
        "Linked List"
    }

    fn ops(&self) -> &'static [OpSpec] {
        &OPS
    }

    fn invoke(&mut self, host: &mut H, op: usize, arg: &str) -> Result<String, AnimError> {
        let result = match op {
            0 => match check_text_arg(arg) {
                Ok(val) => {
                    let val = val.to_string();
                    self.search(host, &val).map(|found| match found {
                        Some(_) => format!("Found {}!", val),
                        None => format!("Value {} not found", val),
                    })
                }
                Err(msg) => return Ok(msg),
            },
            1 => match check_text_arg(arg) {
                Ok(_) if self.list.len() >= MAX_SIZE => {
                    return Ok(String::from("Error! Linked List is already full."))
                }
                Ok(val) => {
                    let val = val.to_string();
                    self.insert_elem(host, &val).map(|()| format!("Value {} inserted", val))
                }
                Err(msg) => return Ok(msg),
            },
            2 => match check_text_arg(arg) {
                Ok(_) if self.list.is_empty() => {
                    return Ok(String::from("ERROR: Linked list is empty"))
                }
                Ok(val) => {
                    let val = val.to_string();
                    self.delete(host, &val).map(|deleted| match deleted {
                        Some(_) => format!("{} deleted!", val),
                        None => format!("Value {} not found", val),
                    })
                }
                Err(msg) => return Ok(msg),
            },
            3 => {
                let Some(key) = self.list.first().map(|n| n.key.clone()) else {
                    return Ok(String::from("ERROR: Linked list is empty"));
                };
                self.delete(host, &key).map(|_| String::from("first node deleted"))
            }
            4 => {
                if self.list.is_empty() {
                    return Ok(String::from("ERROR: Linked list is empty!"));
                }
                self.get_first(host).map(|first| match first {
                    Some(key) => format!("The first link's data is {}", key),
                    None => String::from("ERROR: Linked list is empty!"),
                })
            }
            _ => {
                self.new_linked_list(host);
                host.flush()?;
                Ok(String::from("New linked list created"))
            }
        };
        absorb_stop(result)
    }
}
