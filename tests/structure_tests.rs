//! Structure behavior against reference models, the concrete scenarios,
//! and cleanup idempotence under stop signals injected at arbitrary
//! suspend points.

mod common;

use common::MockHost;
use dsviz::engine::{ShapeKind, Transport};
use dsviz::structures::hash_chain::{is_prime, MAX_CELLS};
use dsviz::structures::{
    heap, ArrayViz, HashChainViz, HeapViz, ListViz, Module, StackViz, XorShift,
};

// ---- concrete scenarios ---------------------------------------------------

#[test]
fn test_stack_push_pop_peek_scenario() {
    let mut host = MockHost::new();
    let mut stack = StackViz::new(&mut host);
    assert!(stack.values().is_empty());

    stack.push(&mut host, "1").unwrap();
    stack.push(&mut host, "2").unwrap();
    stack.push(&mut host, "3").unwrap();
    assert_eq!(stack.values(), ["1", "2", "3"]);

    assert_eq!(stack.pop(&mut host).unwrap().as_deref(), Some("3"));
    assert_eq!(stack.pop(&mut host).unwrap().as_deref(), Some("2"));

    assert_eq!(stack.peek_value(), Some("1"));
    stack.peek(&mut host).unwrap();
    assert_eq!(stack.values(), ["1"], "peek leaves the stack unchanged");

    assert_eq!(stack.pop(&mut host).unwrap().as_deref(), Some("1"));
    assert_eq!(stack.pop(&mut host).unwrap(), None, "empty pop is a no-op");
}

#[test]
fn test_stack_invoke_reports_empty_and_overlong_input() {
    let mut host = MockHost::new();
    let mut stack = StackViz::new(&mut host);

    let msg = stack.invoke(&mut host, 1, "").unwrap();
    assert_eq!(msg, "Error! Stack is empty.");

    let msg = stack.invoke(&mut host, 0, "waytoolongvalue").unwrap();
    assert_eq!(msg, "Error! waytoolongvalue value is too long");
    assert!(stack.values().is_empty(), "rejected input mutates nothing");

    let msg = stack.invoke(&mut host, 0, "ok").unwrap();
    assert_eq!(msg, "Value ok pushed!");
}

#[test]
fn test_linked_list_insert_delete_scenario() {
    let mut host = MockHost::new();
    let mut list = ListViz::new(&mut host);

    list.insert_elem(&mut host, "a").unwrap();
    list.insert_elem(&mut host, "b").unwrap();
    list.insert_elem(&mut host, "c").unwrap();
    assert_eq!(list.values(), ["c", "b", "a"], "head insertion reverses order");

    assert_eq!(list.delete(&mut host, "b").unwrap().as_deref(), Some("b"));
    assert_eq!(list.values(), ["c", "a"]);

    assert_eq!(list.delete(&mut host, "z").unwrap(), None);
    assert_eq!(list.values(), ["c", "a"], "missing key leaves the list unchanged");
}

#[test]
fn test_hash_insert_triggers_exactly_one_growth_to_five() {
    let mut host = MockHost::new();
    let mut table = HashChainViz::new(&mut host);
    assert_eq!(table.n_cells(), 2);
    assert_eq!(table.max_load_factor(), 1.0);

    assert!(table.insert(&mut host, "1", true).unwrap());
    assert!(table.insert(&mut host, "2", true).unwrap());
    assert_eq!(table.n_cells(), 2, "load factor of exactly 1.0 does not grow");

    assert!(table.insert(&mut host, "3", true).unwrap());
    assert_eq!(table.n_cells(), 5, "grown to the smallest prime >= 2n + 1");
    assert_eq!(table.n_items(), 3);

    for key in ["1", "2", "3"] {
        assert!(table.search(&mut host, key).unwrap(), "key {} lost in growth", key);
    }
}

#[test]
fn test_hash_invoke_new_parses_cells_and_load_factor() {
    let mut host = MockHost::new();
    let mut table = HashChainViz::new(&mut host);

    let msg = table.invoke(&mut host, 3, "4 1.5").unwrap();
    assert_eq!(msg, "New hash table with 4 cells");
    assert_eq!(table.n_cells(), 4);
    assert!((table.max_load_factor() - 1.5).abs() < 1e-9);

    let msg = table.invoke(&mut host, 3, "0").unwrap();
    assert!(msg.starts_with("Number of cells must be"));
    assert_eq!(table.n_cells(), 4, "rejected input mutates nothing");
}

// ---- randomized sequences vs. reference models ----------------------------

#[test]
fn test_array_random_ops_match_reference() {
    let mut host = MockHost::new();
    let mut array = ArrayViz::new(&mut host);
    let mut reference = array.values();
    let mut rng = XorShift::new(424242);

    for _ in 0..120 {
        let val = rng.below(90);
        match rng.below(4) {
            0 if reference.len() < array.capacity() => {
                array.insert(&mut host, val).unwrap();
                reference.push(val);
            }
            1 => {
                let removed = array.remove(&mut host, val).unwrap();
                let expect = reference.iter().position(|&v| v == val);
                assert_eq!(removed, expect.is_some());
                if let Some(i) = expect {
                    reference.remove(i);
                }
            }
            2 => {
                let found = array.find(&mut host, val).unwrap();
                assert_eq!(found, reference.iter().position(|&v| v == val));
            }
            _ if !reference.is_empty() => {
                array.remove_from_end(&mut host).unwrap();
                reference.pop();
            }
            _ => {}
        }
        assert_eq!(array.values(), reference);
    }
}

#[test]
fn test_array_traverse_leaves_the_canvas_unchanged() {
    let mut host = MockHost::new();
    let mut array = ArrayViz::new(&mut host);
    let before = host.fingerprint();

    array.traverse(&mut host).unwrap();

    assert_eq!(host.fingerprint(), before, "traverse is display-only");
}

#[test]
fn test_stack_random_ops_match_reference() {
    let mut host = MockHost::new();
    let mut stack = StackViz::new(&mut host);
    let mut reference: Vec<String> = Vec::new();
    let mut rng = XorShift::new(99);

    for _ in 0..120 {
        let val = format!("v{}", rng.below(50));
        if rng.below(2) == 0 && reference.len() < stack.capacity() {
            stack.push(&mut host, &val).unwrap();
            reference.push(val);
        } else {
            assert_eq!(stack.pop(&mut host).unwrap(), reference.pop());
        }
        assert_eq!(stack.values(), reference);
    }
}

#[test]
fn test_heap_random_ops_match_reference_and_stay_heap_ordered() {
    let mut host = MockHost::new();
    let mut heap = HeapViz::new(&mut host);
    let mut reference: Vec<u32> = Vec::new();
    let mut rng = XorShift::new(777);

    for _ in 0..150 {
        match rng.below(3) {
            0 if reference.len() < heap::MAX_SIZE => {
                let val = rng.below(99);
                heap.insert(&mut host, val).unwrap();
                reference.push(val);
            }
            1 => {
                let removed = heap.remove_max(&mut host).unwrap();
                let expect = reference.iter().copied().max();
                assert_eq!(removed, expect);
                if let Some(max) = expect {
                    let i = reference.iter().position(|&v| v == max).unwrap();
                    reference.remove(i);
                }
            }
            _ => heap.peek(&mut host).unwrap(),
        }
        assert!(heap.is_heap(), "heap order violated: {:?}", heap.values());
        let mut vals = heap.values();
        vals.sort_unstable();
        let mut refs = reference.clone();
        refs.sort_unstable();
        assert_eq!(vals, refs);
    }
}

#[test]
fn test_heapify_restores_heap_order_after_random_fill() {
    let mut host = MockHost::new();
    let mut heap = HeapViz::new(&mut host);

    heap.random_fill(&mut host, 15);
    let mut before = heap.values();
    assert_eq!(before.len(), 15);

    heap.heapify(&mut host).unwrap();
    assert!(heap.is_heap());
    let mut after = heap.values();
    before.sort_unstable();
    after.sort_unstable();
    assert_eq!(before, after, "heapify permutes, never loses values");
}

#[test]
fn test_list_random_ops_match_reference() {
    let mut host = MockHost::new();
    let mut list = ListViz::new(&mut host);
    let mut reference: Vec<String> = Vec::new();
    let mut rng = XorShift::new(31337);

    for _ in 0..120 {
        let key = format!("n{}", rng.below(25));
        match rng.below(3) {
            0 if reference.len() < 20 => {
                list.insert_elem(&mut host, &key).unwrap();
                reference.insert(0, key);
            }
            1 => {
                let deleted = list.delete(&mut host, &key).unwrap();
                let expect = reference.iter().position(|k| k == &key);
                assert_eq!(deleted.is_some(), expect.is_some());
                if let Some(i) = expect {
                    reference.remove(i);
                }
            }
            _ => {
                let found = list.find(&mut host, &key).unwrap();
                assert_eq!(found, reference.iter().position(|k| k == &key).map(|i| i + 1));
            }
        }
        assert_eq!(list.values(), reference);
        assert_eq!(
            list.get_first(&mut host).unwrap(),
            reference.first().cloned(),
            "get_first mirrors the head"
        );
    }
}

#[test]
fn test_hash_random_ops_match_reference() {
    let mut host = MockHost::new();
    let mut table = HashChainViz::new(&mut host);
    let mut reference: Vec<String> = Vec::new();
    let mut rng = XorShift::new(8675309);

    for _ in 0..150 {
        let key = format!("k{}", rng.below(30));
        match rng.below(3) {
            0 => {
                let is_new = table.insert(&mut host, &key, true).unwrap();
                assert_eq!(is_new, !reference.contains(&key));
                if is_new {
                    reference.push(key);
                }
            }
            1 => {
                let deleted = table.delete(&mut host, &key).unwrap();
                assert_eq!(deleted, reference.contains(&key));
                reference.retain(|k| k != &key);
            }
            _ => {
                let found = table.search(&mut host, &key).unwrap();
                assert_eq!(found, reference.contains(&key));
            }
        }
        assert_eq!(table.n_items(), reference.len());
    }

    let mut keys = table.keys();
    keys.sort();
    reference.sort();
    assert_eq!(keys, reference);
    assert_eq!(table.traverse(&mut host).unwrap(), table.n_items());
}

// ---- growth properties ----------------------------------------------------

#[test]
fn test_hash_growth_keeps_sizes_prime_and_load_bounded() {
    let mut host = MockHost::new();
    let mut table = HashChainViz::new(&mut host);

    for k in 0..70 {
        let key = format!("k{}", k);
        assert!(table.insert(&mut host, &key, true).unwrap());
        assert!(
            table.load_factor() <= table.max_load_factor() || table.n_cells() == MAX_CELLS,
            "load factor {} over the limit below the cell cap",
            table.load_factor()
        );
        assert!(is_prime(table.n_cells()), "table size {} not prime", table.n_cells());
    }

    assert_eq!(table.n_cells(), MAX_CELLS, "growth stops at the cap");
    assert_eq!(table.n_items(), 70, "the table keeps serving past the cap");
    for k in (0..70).step_by(7) {
        assert!(table.search(&mut host, &format!("k{}", k)).unwrap());
    }
}

// ---- cleanup idempotence under injected stops -----------------------------

#[test]
fn test_stack_cleanup_after_stop_matches_uninterrupted_replay() {
    for stop_at in 0..40 {
        let mut host = MockHost::new();
        let mut stack = StackViz::new(&mut host);
        stack.push(&mut host, "a").unwrap();
        stack.push(&mut host, "b").unwrap();

        host.script_at(stop_at, &[Transport::Stop]);
        if stop_at % 2 == 0 {
            let _ = stack.pop(&mut host);
        } else {
            let _ = stack.push(&mut host, "c");
        }

        let mut host2 = MockHost::new();
        let mut replay = StackViz::new(&mut host2);
        for val in stack.values() {
            replay.push(&mut host2, &val).unwrap();
        }
        assert_eq!(
            host.fingerprint(),
            host2.fingerprint(),
            "layout diverged after stop at poll {}",
            stop_at
        );
    }
}

#[test]
fn test_array_cleanup_after_stop_matches_uninterrupted_replay() {
    for stop_at in [0, 3, 7, 12, 20, 35, 60, 90, 130] {
        let mut host = MockHost::new();
        let mut array = ArrayViz::new(&mut host);
        let victim = array.values()[2];

        host.script_at(stop_at, &[Transport::Stop]);
        let _ = array.remove(&mut host, victim);

        // Rebuild the same logical contents from scratch, uninterrupted
        let mut host2 = MockHost::new();
        let mut replay = ArrayViz::new(&mut host2);
        while !replay.values().is_empty() {
            replay.remove_from_end(&mut host2).unwrap();
        }
        for val in array.values() {
            replay.insert(&mut host2, val).unwrap();
        }
        assert_eq!(
            host.fingerprint(),
            host2.fingerprint(),
            "layout diverged after stop at poll {}",
            stop_at
        );
    }
}

#[test]
fn test_list_cleanup_after_stop_matches_uninterrupted_replay() {
    let victims = ["b", "a", "d"];
    for stop_at in 0..60 {
        let mut host = MockHost::new();
        let mut list = ListViz::new(&mut host);
        for key in ["a", "b", "c", "d"] {
            list.insert_elem(&mut host, key).unwrap();
        }

        host.script_at(stop_at, &[Transport::Stop]);
        let _ = list.delete(&mut host, victims[stop_at % victims.len()]);

        let mut host2 = MockHost::new();
        let mut replay = ListViz::new(&mut host2);
        for key in list.values().iter().rev() {
            replay.insert_elem(&mut host2, key).unwrap();
        }
        assert_eq!(
            host.fingerprint(),
            host2.fingerprint(),
            "layout diverged after stop at poll {}",
            stop_at
        );
    }
}

#[test]
fn test_hash_cleanup_after_stop_matches_uninterrupted_replay() {
    for stop_at in [0, 3, 6, 10, 15, 22, 30, 45, 60, 80, 100] {
        let mut host = MockHost::new();
        let mut table = HashChainViz::new(&mut host);
        table.insert(&mut host, "1", true).unwrap();
        table.insert(&mut host, "2", true).unwrap();

        // The third insert exceeds the load factor and grows the table
        host.script_at(stop_at, &[Transport::Stop]);
        let _ = table.insert(&mut host, "3", true);

        let mut host2 = MockHost::new();
        let mut replay = HashChainViz::new(&mut host2);
        replay.new_table(&mut host2, table.n_cells(), table.max_load_factor());
        for key in table.keys() {
            replay.insert(&mut host2, &key, false).unwrap();
        }
        assert_eq!(
            host.fingerprint(),
            host2.fingerprint(),
            "layout diverged after stop at poll {}",
            stop_at
        );
    }
}

#[test]
fn test_hash_cleanup_after_stopped_delete_matches_replay() {
    for stop_at in [0, 4, 9, 14, 20, 28, 40] {
        let mut host = MockHost::new();
        let mut table = HashChainViz::new(&mut host);
        for key in ["1", "2", "3", "4"] {
            table.insert(&mut host, key, false).unwrap();
        }

        host.script_at(stop_at, &[Transport::Stop]);
        let _ = table.delete(&mut host, "2");

        let mut host2 = MockHost::new();
        let mut replay = HashChainViz::new(&mut host2);
        replay.new_table(&mut host2, table.n_cells(), table.max_load_factor());
        for key in table.keys() {
            replay.insert(&mut host2, &key, false).unwrap();
        }
        assert_eq!(
            host.fingerprint(),
            host2.fingerprint(),
            "layout diverged after stop at poll {}",
            stop_at
        );
    }
}

/// The heap's transient sift state may leave a mid-sift value arrangement
/// behind (the logical mutation is allowed to be partial), but cleanup must
/// release every transient shape and snap what survives to the cell grid.
#[test]
fn test_heap_cleanup_after_stop_releases_transients() {
    const HEAP_X0: f64 = 80.0;
    const HEAP_Y0: f64 = 18.0;
    const CELL_HEIGHT: f64 = 12.0;

    for stop_at in [0, 5, 11, 18, 30, 55, 80, 120] {
        let mut host = MockHost::new();
        let mut heap = HeapViz::new(&mut host);
        for val in [3, 9, 4, 7] {
            heap.insert(&mut host, val).unwrap();
        }

        host.script_at(stop_at, &[Transport::Stop]);
        if stop_at % 2 == 0 {
            let _ = heap.insert(&mut host, 8);
        } else {
            let _ = heap.remove_max(&mut host);
        }

        let texts = host.texts();
        for label in ["i", "parent", "maxChild", "root"] {
            assert!(
                !texts.contains(&label.to_string()),
                "transient {} label leaked after stop at poll {}",
                label,
                stop_at
            );
        }
        assert_eq!(host.count_kind(ShapeKind::Line), 1, "only the nItems arrow survives");

        let n = heap.values().len();
        let mut cells = host.filled_rect_coords();
        assert_eq!(cells.len(), n, "one cell rectangle per heap entry");
        cells.sort_by(|a, b| a[1].total_cmp(&b[1]));
        for (i, cell) in cells.iter().enumerate() {
            assert_eq!(cell[0], HEAP_X0);
            assert_eq!(cell[1], HEAP_Y0 + CELL_HEIGHT * i as f64);
        }

        // A follow-up heapify runs on the cleaned canvas and restores order
        heap.heapify(&mut host).unwrap();
        assert!(heap.is_heap());
    }
}

#[test]
fn test_operations_resume_animating_after_a_stop() {
    let mut host = MockHost::new();
    let mut stack = StackViz::new(&mut host);

    host.script_at(0, &[Transport::Stop]);
    let _ = stack.push(&mut host, "a");
    let flushes_after_stop = host.flushes;

    stack.push(&mut host, "z").unwrap();
    assert_eq!(stack.values().last().map(String::as_str), Some("z"));
    assert!(host.flushes > flushes_after_stop + 10, "the next operation animates again");
}
