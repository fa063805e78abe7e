//! The animation engine
//!
//! [`Animator`] is the cooperative scheduler every structure composes with:
//! - the stepper: relocates shapes toward target coordinates across N
//!   discrete redraws, in lockstep for all shapes in a call, yielding to the
//!   host between frames so transport input is observed promptly;
//! - the run-state machine: play, pause, single-step, stop;
//! - the call environment stack: scoped ownership of transient shapes with
//!   guaranteed disposal on unwind.
//!
//! Operations are written as a wrapper and a body. The wrapper opens an
//! environment, runs the body, and cleans up unconditionally, so an early
//! return or a stop raised inside any nested move always releases the
//! environment's shapes:
//!
//! ```ignore
//! pub fn push<H: Host>(&mut self, host: &mut H, val: &str) -> Result<(), AnimError> {
//!     self.anim.start();
//!     let env = self.anim.open_call();
//!     let result = self.push_body(host, env, val);
//!     self.anim.clean_up(host, env);
//!     result
//! }
//! ```

use std::time::Duration;

use super::callenv::{CallEnv, EnvToken};
use super::control::RunState;
use super::coords::{divide, rotate, subtract, translate};
use super::drawable::PaletteState;
use super::errors::AnimError;
use super::surface::{Host, ShapeId, Transport};

/// Poll cadence while blocked at a suspend point in the paused state.
const PAUSE_POLL: Duration = Duration::from_millis(20);

#[derive(Debug, Default)]
pub struct Animator {
    state: RunState,
    envs: Vec<CallEnv>,
    /// Color cursor for newly created values, one per visualization.
    pub palette: PaletteState,
}

impl Animator {
    pub fn new() -> Self {
        Animator::default()
    }

    #[allow(dead_code)]
    pub fn state(&self) -> RunState {
        self.state
    }

    /// An operation is about to animate: leave the stopped state.
    pub fn start(&mut self) {
        if self.state == RunState::Stopped {
            self.state = RunState::Running;
        }
    }

    /// Cancel animation. Subsequent moves apply instantly.
    #[allow(dead_code)]
    pub fn stop(&mut self) {
        self.state = RunState::Stopped;
    }

    /// Number of open call environments.
    pub fn depth(&self) -> usize {
        self.envs.len()
    }

    /// Push a new call environment and return its token.
    pub fn open_call(&mut self) -> EnvToken {
        self.envs.push(CallEnv::new());
        EnvToken(self.envs.len() - 1)
    }

    /// Register shapes as owned by the environment at `token`.
    pub fn adopt(&mut self, token: EnvToken, ids: &[ShapeId]) {
        debug_assert!(
            ids.iter().all(|id| !self.envs.iter().any(|e| e.owned.contains(id))),
            "shape adopted into two call environments"
        );
        self.envs[token.0].owned.extend(ids.iter().copied());
    }

    /// Release shapes from the environment without deleting them, handing
    /// them to the structure's permanent display.
    pub fn disown(&mut self, token: EnvToken, ids: &[ShapeId]) {
        for id in ids {
            self.envs[token.0].owned.remove(id);
        }
    }

    /// Delete short-lived shapes now and drop them from the environment.
    pub fn dispose<H: Host>(&mut self, host: &mut H, token: EnvToken, ids: &[ShapeId]) {
        for &id in ids {
            self.envs[token.0].owned.remove(&id);
            host.delete_shape(id);
        }
    }

    /// Close the environment at `token` and any environment nested deeper,
    /// deleting every shape they still own. Runs on every exit path,
    /// including cancellation unwinds, and is idempotent with respect to
    /// shapes already gone. When the last environment closes the run state
    /// returns to stopped.
    pub fn clean_up<H: Host>(&mut self, host: &mut H, token: EnvToken) {
        while self.envs.len() > token.0 {
            if let Some(env) = self.envs.pop() {
                for id in env.owned {
                    if host.store().contains(id) {
                        host.delete_shape(id);
                    }
                }
            }
        }
        if self.envs.is_empty() {
            self.state = RunState::Stopped;
        }
    }

    fn apply(&mut self, cmd: Transport) {
        match cmd {
            Transport::PlayPause => {
                self.state = match self.state {
                    RunState::Running => RunState::Paused,
                    RunState::Paused => RunState::Running,
                    other => other,
                }
            }
            Transport::Step => {
                if self.state == RunState::Paused {
                    self.state = RunState::Stepping;
                }
            }
            Transport::Stop => self.state = RunState::Stopped,
        }
    }

    /// Observe transport input, blocking here while paused. Returns
    /// `Err(Stopped)` when a stop command cancels the in-flight move.
    fn check_transport<H: Host>(&mut self, host: &mut H) -> Result<(), AnimError> {
        for cmd in host.poll_transport() {
            self.apply(cmd);
        }
        while self.state == RunState::Paused {
            host.sleep(PAUSE_POLL);
            for cmd in host.poll_transport() {
                self.apply(cmd);
            }
        }
        if self.state == RunState::Stopped {
            return Err(AnimError::Stopped);
        }
        Ok(())
    }

    /// One suspend point: yield for `delay`, then observe transport.
    fn suspend<H: Host>(&mut self, host: &mut H, delay: Duration) -> Result<(), AnimError> {
        if !delay.is_zero() {
            host.sleep(delay);
        }
        self.check_transport(host)
    }

    /// A move or wait finished; if it was the single-stepped unit, re-pause.
    fn end_of_unit(&mut self) {
        if self.state == RunState::Stepping {
            self.state = RunState::Paused;
        }
    }

    /// Pure suspension for `duration` with no redraws, observing pause and
    /// stop like any stepper frame. No-op while stopped.
    pub fn wait<H: Host>(&mut self, host: &mut H, duration: Duration) -> Result<(), AnimError> {
        if !self.state.animating() {
            return Ok(());
        }
        let mut remaining = duration;
        while !remaining.is_zero() {
            let tick = remaining.min(PAUSE_POLL);
            host.sleep(tick);
            remaining -= tick;
            self.check_transport(host)?;
        }
        self.end_of_unit();
        Ok(())
    }

    /// Relocate each shape linearly to its target coordinate list, all
    /// shapes advancing in lockstep, with exactly `steps` redraws while
    /// animating or a single instantaneous redraw while stopped.
    pub fn move_items_to<H: Host>(
        &mut self,
        host: &mut H,
        items: &[ShapeId],
        targets: &[Vec<f64>],
        steps: usize,
        delay: Duration,
    ) -> Result<(), AnimError> {
        debug_assert_eq!(items.len(), targets.len(), "one target per moved shape");
        if !self.state.animating() {
            for (&id, to) in items.iter().zip(targets) {
                host.set_coords(id, to);
            }
            host.flush()?;
            return Ok(());
        }
        let starts: Vec<Vec<f64>> =
            items.iter().map(|&id| host.coords(id).to_vec()).collect();
        let steps = steps.max(1);
        for step in 1..=steps {
            let t = step as f64 / steps as f64;
            for ((&id, from), to) in items.iter().zip(&starts).zip(targets) {
                let frame: Vec<f64> = from
                    .iter()
                    .zip(to.iter())
                    .map(|(a, b)| a + (b - a) * t)
                    .collect();
                host.set_coords(id, &frame);
            }
            host.flush()?;
            self.suspend(host, delay)?;
        }
        self.end_of_unit();
        Ok(())
    }

    /// Translate shapes by `delta` over `steps` lockstep redraws.
    pub fn move_items_by<H: Host>(
        &mut self,
        host: &mut H,
        items: &[ShapeId],
        delta: [f64; 2],
        steps: usize,
        delay: Duration,
    ) -> Result<(), AnimError> {
        let targets: Vec<Vec<f64>> =
            items.iter().map(|&id| translate(host.coords(id), delta)).collect();
        self.move_items_to(host, items, &targets, steps, delay)
    }

    /// Slide shapes up past the top edge of the canvas.
    pub fn move_items_off<H: Host>(
        &mut self,
        host: &mut H,
        items: &[ShapeId],
        steps: usize,
        delay: Duration,
    ) -> Result<(), AnimError> {
        let bottom = items
            .iter()
            .map(|&id| host.bbox(id)[3])
            .fold(f64::NEG_INFINITY, f64::max);
        self.move_items_by(host, items, [0.0, -(bottom + 10.0)], steps, delay)
    }

    /// Relocate shapes along an arc instead of a straight line, for swap
    /// visuals. Each step moves every shape by its remaining delta divided
    /// by the steps left, rotated by an angle that decays from
    /// `start_angle` to zero (and grows slightly with the angle), then the
    /// final frame snaps to the exact targets.
    pub fn move_items_on_curve<H: Host>(
        &mut self,
        host: &mut H,
        items: &[ShapeId],
        targets: &[Vec<f64>],
        start_angle: f64,
        steps: usize,
        delay: Duration,
    ) -> Result<(), AnimError> {
        debug_assert_eq!(items.len(), targets.len(), "one target per moved shape");
        if !self.state.animating() {
            for (&id, to) in items.iter().zip(targets) {
                host.set_coords(id, to);
            }
            host.flush()?;
            return Ok(());
        }
        let steps = steps.max(1);
        for step in 0..steps {
            let to_go = (steps - 1 - step) as f64;
            let ang = start_angle * to_go / steps as f64;
            let scale = 1.0 + ang.abs() / 180.0;
            for (&id, target) in items.iter().zip(targets) {
                let current = host.coords(id).to_vec();
                let remaining = subtract(&target[..2], &current[..2]);
                let move_by = rotate(&divide(&remaining, to_go + 1.0), ang * scale);
                let frame = translate(&current, [move_by[0], move_by[1]]);
                host.set_coords(id, &frame);
            }
            host.flush()?;
            self.suspend(host, delay)?;
        }
        for (&id, to) in items.iter().zip(targets) {
            host.set_coords(id, to);
        }
        self.end_of_unit();
        Ok(())
    }
}
