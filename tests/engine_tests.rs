//! Animation engine contract tests: stepper redraw counts, transport
//! handling at suspend points, and call environment cleanup.

mod common;

use std::time::Duration;

use ratatui::style::Color;

use common::MockHost;
use dsviz::engine::{
    AnimError, Animator, RunState, ShapeId, ShapeKind, ShapeStyle, Surface, Transport,
};

const STEP_DELAY: Duration = Duration::from_millis(1);

fn square(host: &mut MockHost, coords: [f64; 4]) -> ShapeId {
    host.create_shape(ShapeKind::Rect, coords.to_vec(), ShapeStyle::outlined(Color::White))
}

#[test]
fn test_running_move_issues_one_redraw_per_step() {
    let mut host = MockHost::new();
    let id = square(&mut host, [0.0, 0.0, 10.0, 10.0]);
    let mut anim = Animator::new();
    anim.start();

    anim.move_items_to(&mut host, &[id], &[vec![40.0, 0.0, 50.0, 10.0]], 8, STEP_DELAY)
        .unwrap();

    assert_eq!(host.flushes, 8);
    assert_eq!(host.coords(id), &[40.0, 0.0, 50.0, 10.0][..]);
    assert_eq!(anim.state(), RunState::Running);
}

#[test]
fn test_stopped_move_jumps_with_a_single_redraw() {
    let mut host = MockHost::new();
    let id = square(&mut host, [0.0, 0.0, 10.0, 10.0]);
    let mut anim = Animator::new();

    anim.move_items_to(&mut host, &[id], &[vec![40.0, 0.0, 50.0, 10.0]], 8, STEP_DELAY)
        .unwrap();

    assert_eq!(host.flushes, 1);
    assert_eq!(host.polls, 0, "no suspend points while stopped");
    assert_eq!(host.coords(id), &[40.0, 0.0, 50.0, 10.0][..]);
}

#[test]
fn test_shapes_advance_in_lockstep_until_cancelled() {
    let mut host = MockHost::new();
    let a = square(&mut host, [0.0, 0.0, 10.0, 10.0]);
    let b = square(&mut host, [0.0, 20.0, 10.0, 30.0]);
    let mut anim = Animator::new();
    anim.start();
    host.script_at(0, &[Transport::Stop]);

    let err = anim
        .move_items_to(
            &mut host,
            &[a, b],
            &[vec![40.0, 0.0, 50.0, 10.0], vec![40.0, 20.0, 50.0, 30.0]],
            4,
            STEP_DELAY,
        )
        .unwrap_err();

    assert!(matches!(err, AnimError::Stopped));
    assert_eq!(anim.state(), RunState::Stopped);
    // Both shapes stopped at the same step: one quarter of the way
    assert_eq!(host.coords(a), &[10.0, 0.0, 20.0, 10.0][..]);
    assert_eq!(host.coords(b), &[10.0, 20.0, 20.0, 30.0][..]);
    assert_eq!(host.flushes, 1);
}

#[test]
fn test_pause_blocks_at_suspend_point_until_resumed() {
    let mut host = MockHost::new();
    let id = square(&mut host, [0.0, 0.0, 10.0, 10.0]);
    let mut anim = Animator::new();
    anim.start();
    host.script_at(0, &[Transport::PlayPause]);
    host.script_at(6, &[Transport::PlayPause]);

    anim.move_items_to(&mut host, &[id], &[vec![30.0, 0.0, 40.0, 10.0]], 3, STEP_DELAY)
        .unwrap();

    assert_eq!(host.flushes, 3, "pausing adds no redraws");
    assert!(host.polls >= 7, "blocked at the suspend point, polling");
    assert_eq!(anim.state(), RunState::Running);
    assert_eq!(host.coords(id), &[30.0, 0.0, 40.0, 10.0][..]);
}

#[test]
fn test_step_runs_one_unit_then_repauses() {
    let mut host = MockHost::new();
    let id = square(&mut host, [0.0, 0.0, 10.0, 10.0]);
    let mut anim = Animator::new();
    anim.start();
    host.script_at(0, &[Transport::PlayPause]);
    host.script_at(2, &[Transport::Step]);

    anim.move_items_to(&mut host, &[id], &[vec![50.0, 0.0, 60.0, 10.0]], 5, STEP_DELAY)
        .unwrap();

    assert_eq!(host.flushes, 5, "the stepped unit runs to completion");
    assert_eq!(anim.state(), RunState::Paused, "re-paused after one unit");
    assert_eq!(host.coords(id), &[50.0, 0.0, 60.0, 10.0][..]);
}

#[test]
fn test_wait_is_a_pure_suspension() {
    let mut host = MockHost::new();
    let mut anim = Animator::new();
    anim.start();

    anim.wait(&mut host, Duration::from_millis(100)).unwrap();

    assert_eq!(host.flushes, 0, "waits issue no redraws");
    assert!(host.slept >= Duration::from_millis(100));
    assert!(host.polls >= 1);
}

#[test]
fn test_wait_is_a_no_op_while_stopped() {
    let mut host = MockHost::new();
    let mut anim = Animator::new();

    anim.wait(&mut host, Duration::from_millis(100)).unwrap();

    assert_eq!(host.polls, 0);
    assert_eq!(host.slept, Duration::ZERO);
}

#[test]
fn test_stop_during_wait_cancels() {
    let mut host = MockHost::new();
    let mut anim = Animator::new();
    anim.start();
    host.script_at(0, &[Transport::Stop]);

    let err = anim.wait(&mut host, Duration::from_millis(100)).unwrap_err();

    assert!(matches!(err, AnimError::Stopped));
    assert_eq!(anim.state(), RunState::Stopped);
}

#[test]
fn test_cleanup_deletes_owned_and_spares_disowned() {
    let mut host = MockHost::new();
    let a = square(&mut host, [0.0, 0.0, 10.0, 10.0]);
    let b = square(&mut host, [20.0, 0.0, 30.0, 10.0]);
    let mut anim = Animator::new();
    anim.start();

    let env = anim.open_call();
    anim.adopt(env, &[a, b]);
    anim.disown(env, &[b]);
    anim.clean_up(&mut host, env);

    assert!(!host.store().contains(a), "still-owned shape deleted");
    assert!(host.store().contains(b), "disowned shape handed to the display");
    assert_eq!(anim.depth(), 0);
    assert_eq!(anim.state(), RunState::Stopped, "stack emptied, back to stopped");
}

#[test]
fn test_cleanup_unwinds_nested_environments() {
    let mut host = MockHost::new();
    let a = square(&mut host, [0.0, 0.0, 10.0, 10.0]);
    let b = square(&mut host, [20.0, 0.0, 30.0, 10.0]);
    let mut anim = Animator::new();
    anim.start();

    let outer = anim.open_call();
    anim.adopt(outer, &[a]);
    let inner = anim.open_call();
    anim.adopt(inner, &[b]);
    assert_eq!(anim.depth(), 2);

    // Closing the outer environment also unwinds the abandoned inner one
    anim.clean_up(&mut host, outer);

    assert!(host.store().is_empty());
    assert_eq!(anim.depth(), 0);
}

#[test]
fn test_stop_mid_move_unwinds_to_a_clean_canvas() {
    let mut host = MockHost::new();
    let mut anim = Animator::new();
    anim.start();
    host.script_at(2, &[Transport::Stop]);

    let env = anim.open_call();
    let id = square(&mut host, [0.0, 0.0, 10.0, 10.0]);
    anim.adopt(env, &[id]);
    let result =
        anim.move_items_to(&mut host, &[id], &[vec![80.0, 0.0, 90.0, 10.0]], 10, STEP_DELAY);
    anim.clean_up(&mut host, env);

    assert!(matches!(result, Err(AnimError::Stopped)));
    assert!(host.store().is_empty(), "cancelled move leaks no shapes");
    assert_eq!(anim.state(), RunState::Stopped);
}

#[test]
fn test_dispose_deletes_immediately() {
    let mut host = MockHost::new();
    let mut anim = Animator::new();
    anim.start();

    let env = anim.open_call();
    let id = square(&mut host, [0.0, 0.0, 10.0, 10.0]);
    anim.adopt(env, &[id]);
    anim.dispose(&mut host, env, &[id]);

    assert!(!host.store().contains(id));
    anim.clean_up(&mut host, env);
}

#[test]
#[cfg(debug_assertions)]
#[should_panic(expected = "shape adopted into two call environments")]
fn test_shape_cannot_join_two_environments() {
    let mut host = MockHost::new();
    let id = square(&mut host, [0.0, 0.0, 10.0, 10.0]);
    let mut anim = Animator::new();

    let outer = anim.open_call();
    anim.adopt(outer, &[id]);
    let inner = anim.open_call();
    anim.adopt(inner, &[id]);
}

#[test]
fn test_curve_move_lands_exactly_on_target() {
    let mut host = MockHost::new();
    let id = square(&mut host, [100.0, 100.0, 120.0, 120.0]);
    let mut anim = Animator::new();
    anim.start();

    anim.move_items_on_curve(
        &mut host,
        &[id],
        &[vec![200.0, 40.0, 220.0, 60.0]],
        -90.0,
        6,
        STEP_DELAY,
    )
    .unwrap();

    assert_eq!(host.flushes, 6);
    assert_eq!(host.coords(id), &[200.0, 40.0, 220.0, 60.0][..]);
}

#[test]
fn test_curve_move_jumps_while_stopped() {
    let mut host = MockHost::new();
    let id = square(&mut host, [100.0, 100.0, 120.0, 120.0]);
    let mut anim = Animator::new();

    anim.move_items_on_curve(
        &mut host,
        &[id],
        &[vec![200.0, 40.0, 220.0, 60.0]],
        -90.0,
        6,
        STEP_DELAY,
    )
    .unwrap();

    assert_eq!(host.flushes, 1);
    assert_eq!(host.coords(id), &[200.0, 40.0, 220.0, 60.0][..]);
}

#[test]
fn test_move_items_off_clears_the_top_edge() {
    let mut host = MockHost::new();
    let id = square(&mut host, [100.0, 100.0, 110.0, 110.0]);
    let mut anim = Animator::new();
    anim.start();

    anim.move_items_off(&mut host, &[id], 5, STEP_DELAY).unwrap();

    let coords = host.coords(id);
    assert!(coords[3] < 0.0, "shape fully above the canvas, got {:?}", coords);
}
