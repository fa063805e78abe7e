#![allow(dead_code)] // Shared across test binaries, not every helper is used by each
//! Mock host for engine and structure tests
//!
//! Flushes are counted instead of rendered, sleeps accumulate virtually so
//! tests run instantly, and transport commands are replayed from a script:
//! a command registered at index `k` is delivered at the `k`-th transport
//! poll from now.

use std::collections::VecDeque;
use std::io;
use std::time::Duration;

use dsviz::engine::{EventPump, ShapeKind, ShapeStore, Surface, Transport};

pub struct MockHost {
    store: ShapeStore,
    pub flushes: usize,
    pub polls: usize,
    pub slept: Duration,
    script: VecDeque<Vec<Transport>>,
}

impl MockHost {
    pub fn new() -> Self {
        MockHost {
            store: ShapeStore::new(),
            flushes: 0,
            polls: 0,
            slept: Duration::ZERO,
            script: VecDeque::new(),
        }
    }

    /// Deliver `commands` at the `poll`-th transport poll from now.
    pub fn script_at(&mut self, poll: usize, commands: &[Transport]) {
        if self.script.len() <= poll {
            self.script.resize(poll + 1, Vec::new());
        }
        self.script[poll].extend_from_slice(commands);
    }

    /// Canvas fingerprint: kind, rounded coordinates, and text content of
    /// every shape, sorted. Colors are left out so two hosts whose palette
    /// cursors diverged still compare equal.
    pub fn fingerprint(&self) -> Vec<(String, Vec<i64>, Option<String>)> {
        let mut shapes: Vec<_> = self
            .store
            .iter()
            .map(|(_, shape)| {
                (
                    format!("{:?}", shape.kind),
                    shape.coords.iter().map(|c| (c * 10.0).round() as i64).collect(),
                    shape.style.text.clone(),
                )
            })
            .collect();
        shapes.sort();
        shapes
    }

    /// Every text content on the canvas, sorted.
    pub fn texts(&self) -> Vec<String> {
        let mut texts: Vec<String> =
            self.store.iter().filter_map(|(_, s)| s.style.text.clone()).collect();
        texts.sort();
        texts
    }

    pub fn count_kind(&self, kind: ShapeKind) -> usize {
        self.store.iter().filter(|(_, s)| s.kind == kind).count()
    }

    /// Coordinates of every filled (non-outline) rectangle.
    pub fn filled_rect_coords(&self) -> Vec<Vec<f64>> {
        self.store
            .iter()
            .filter(|(_, s)| s.kind == ShapeKind::Rect && s.style.fill.is_some())
            .map(|(_, s)| s.coords.clone())
            .collect()
    }
}

impl Surface for MockHost {
    fn store(&self) -> &ShapeStore {
        &self.store
    }

    fn store_mut(&mut self) -> &mut ShapeStore {
        &mut self.store
    }

    fn flush(&mut self) -> io::Result<()> {
        self.flushes += 1;
        Ok(())
    }
}

impl EventPump for MockHost {
    fn poll_transport(&mut self) -> Vec<Transport> {
        self.polls += 1;
        self.script.pop_front().unwrap_or_default()
    }

    fn sleep(&mut self, duration: Duration) {
        self.slept += duration;
    }
}
