//! End-to-end input flow: raw terminal bytes through the decoder,
//! routers, and scene tree to widget handlers.

mod common;

use std::cell::RefCell;
use std::rc::Rc;

use cellscene::{KeyCode, NodeId, NodeOptions, PointerKind};
use common::{
    CaptureSink, KeyLog, PointerLog, Probe, SelectableText, abs_box, capture_engine, sgr_drag,
    sgr_move, sgr_press, sgr_release, sgr_scroll_down,
};

/// Two side-by-side boxes with recording widgets, hit grid ready.
fn two_boxes() -> (cellscene::Engine, CaptureSink, PointerLog, NodeId, NodeId) {
    let (mut engine, sink) = capture_engine(80, 24);
    let log: PointerLog = Rc::new(RefCell::new(Vec::new()));
    let root = engine.tree().root();
    let x = engine
        .create_node(NodeOptions {
            widget: Some(Probe::boxed("x", &log, true)),
            ..abs_box(0, 0, 10, 5)
        })
        .unwrap();
    let y = engine
        .create_node(NodeOptions {
            widget: Some(Probe::boxed("y", &log, true)),
            ..abs_box(20, 0, 10, 5)
        })
        .unwrap();
    engine.tree_mut().attach(x, root, None).unwrap();
    engine.tree_mut().attach(y, root, None).unwrap();
    assert!(engine.tick());
    (engine, sink, log, x, y)
}

fn taken(log: &PointerLog) -> Vec<(&'static str, PointerKind, Option<NodeId>)> {
    std::mem::take(&mut *log.borrow_mut())
}

// ============================================================================
// Drag and drop over the wire
// ============================================================================

#[test]
fn test_e2e_drag_drop_from_sgr_bytes() {
    let (mut engine, _sink, log, x, _y) = two_boxes();

    engine.feed_input(&sgr_press(2, 2));
    assert_eq!(engine.captured(), Some(x));
    engine.feed_input(&sgr_drag(25, 2));
    taken(&log);

    engine.feed_input(&sgr_release(25, 2));
    assert_eq!(
        taken(&log),
        vec![
            ("x", PointerKind::Up, None),
            ("x", PointerKind::DragEnd, None),
            ("y", PointerKind::Drop, Some(x)),
        ]
    );
    assert_eq!(engine.captured(), None);
    assert_eq!(engine.hovered(), Some(x));
}

#[test]
fn test_e2e_drag_keeps_routing_to_captured() {
    let (mut engine, _sink, log, _x, _y) = two_boxes();

    engine.feed_input(&sgr_press(2, 2));
    taken(&log);
    engine.feed_input(&sgr_drag(25, 2));
    let events = taken(&log);
    assert!(events.contains(&("x", PointerKind::Drag, None)));
    assert!(events.contains(&("y", PointerKind::Over, None)));
    assert!(!events.iter().any(|e| e.0 == "y" && e.1 == PointerKind::Drag));
}

#[test]
fn test_e2e_scroll_bypasses_capture() {
    let (mut engine, _sink, log, x, _y) = two_boxes();

    engine.feed_input(&sgr_press(2, 2));
    taken(&log);
    engine.feed_input(&sgr_scroll_down(25, 2));
    let events = taken(&log);
    assert_eq!(events, vec![("y", PointerKind::Scroll, None)]);
    assert_eq!(engine.hovered(), Some(x));
    assert_eq!(engine.captured(), Some(x));
}

#[test]
fn test_e2e_hover_synthesis_on_plain_motion() {
    let (mut engine, _sink, log, _x, _y) = two_boxes();

    engine.feed_input(&sgr_move(2, 2));
    engine.feed_input(&sgr_move(25, 2));
    let events = taken(&log);
    let kinds: Vec<(&str, PointerKind)> = events.iter().map(|e| (e.0, e.1)).collect();
    assert_eq!(
        kinds,
        vec![
            ("x", PointerKind::Over),
            ("x", PointerKind::Move),
            ("x", PointerKind::Out),
            ("y", PointerKind::Over),
            ("y", PointerKind::Move),
        ]
    );
}

#[test]
fn test_e2e_bytes_split_across_feeds() {
    let (mut engine, _sink, log, x, _y) = two_boxes();

    let bytes = sgr_press(2, 2);
    let (head, tail) = bytes.split_at(4);
    engine.feed_input(head);
    assert!(taken(&log).is_empty());
    engine.feed_input(tail);
    let events = taken(&log);
    assert_eq!(events.last(), Some(&("x", PointerKind::Down, None)));
    assert_eq!(engine.captured(), Some(x));
}

// ============================================================================
// Keyboard focus and bubbling
// ============================================================================

#[test]
fn test_e2e_key_bubbles_from_focused() {
    let (mut engine, _sink) = capture_engine(80, 24);
    let log: PointerLog = Rc::new(RefCell::new(Vec::new()));
    let keys: KeyLog = Rc::new(RefCell::new(Vec::new()));
    let root = engine.tree().root();
    let outer = engine
        .create_node(NodeOptions {
            focusable: true,
            widget: Some(Probe::with_keys("outer", &log, &keys, false)),
            ..abs_box(0, 0, 40, 10)
        })
        .unwrap();
    let inner = engine
        .create_node(NodeOptions {
            focusable: true,
            widget: Some(Probe::with_keys("inner", &log, &keys, false)),
            ..abs_box(0, 0, 10, 2)
        })
        .unwrap();
    engine.tree_mut().attach(outer, root, None).unwrap();
    engine.tree_mut().attach(inner, outer, None).unwrap();

    assert!(engine.focus(inner));
    engine.feed_input(b"\x1b[A");
    let seen: Vec<(&str, KeyCode)> = keys
        .borrow()
        .iter()
        .map(|(name, event)| (*name, event.code))
        .collect();
    assert_eq!(seen, vec![("inner", KeyCode::Up), ("outer", KeyCode::Up)]);
}

#[test]
fn test_e2e_destroyed_node_loses_focus_and_capture() {
    let (mut engine, _sink, log, x, _y) = two_boxes();

    engine.feed_input(&sgr_press(2, 2));
    assert_eq!(engine.captured(), Some(x));
    taken(&log);

    engine.destroy_node(x).unwrap();
    assert_eq!(engine.captured(), None);
    assert_eq!(engine.hovered(), None);
    // Next tick rebuilds the grid without the node; events there land
    // nowhere.
    engine.tick();
    engine.feed_input(&sgr_press(2, 2));
    assert!(taken(&log).is_empty());
}

// ============================================================================
// Selection gestures
// ============================================================================

#[test]
fn test_e2e_selection_across_sibling_texts() {
    let (mut engine, _sink) = capture_engine(80, 24);
    let root = engine.tree().root();
    let container = engine.create_node(abs_box(0, 0, 40, 10)).unwrap();
    let (alpha_widget, alpha_active) = SelectableText::boxed("alpha");
    let alpha = engine
        .create_node(NodeOptions {
            selectable: true,
            widget: Some(alpha_widget),
            ..abs_box(0, 0, 10, 1)
        })
        .unwrap();
    let (beta_widget, beta_active) = SelectableText::boxed("beta");
    let beta = engine
        .create_node(NodeOptions {
            selectable: true,
            widget: Some(beta_widget),
            ..abs_box(0, 2, 10, 1)
        })
        .unwrap();
    engine.tree_mut().attach(container, root, None).unwrap();
    engine.tree_mut().attach(alpha, container, None).unwrap();
    engine.tree_mut().attach(beta, container, None).unwrap();
    engine.tick();

    engine.feed_input(&sgr_press(2, 0));
    engine.feed_input(&sgr_drag(6, 2));
    engine.feed_input(&sgr_release(6, 2));

    assert!(*alpha_active.borrow());
    assert!(*beta_active.borrow());
    assert_eq!(engine.selected_text(), "alpha\nbeta");
    // The gesture never moved capture or hover.
    assert_eq!(engine.captured(), None);
}

#[test]
fn test_e2e_selection_escapes_container_and_returns() {
    // root > a > b > inner-text, with outer-text under a but outside b.
    let (mut engine, _sink) = capture_engine(80, 24);
    let root = engine.tree().root();
    let a = engine.create_node(abs_box(0, 0, 40, 10)).unwrap();
    let b = engine.create_node(abs_box(0, 0, 20, 10)).unwrap();
    let (inner_widget, inner_active) = SelectableText::boxed("inner");
    let inner = engine
        .create_node(NodeOptions {
            selectable: true,
            widget: Some(inner_widget),
            ..abs_box(0, 0, 10, 1)
        })
        .unwrap();
    let (outer_widget, outer_active) = SelectableText::boxed("outer");
    let outer = engine
        .create_node(NodeOptions {
            selectable: true,
            widget: Some(outer_widget),
            ..abs_box(25, 0, 10, 1)
        })
        .unwrap();
    engine.tree_mut().attach(a, root, None).unwrap();
    engine.tree_mut().attach(b, a, None).unwrap();
    engine.tree_mut().attach(inner, b, None).unwrap();
    engine.tree_mut().attach(outer, a, None).unwrap();
    engine.tick();

    // Start inside the inner text: scope is its container.
    engine.feed_input(&sgr_press(2, 0));
    assert!(*inner_active.borrow());
    assert!(!*outer_active.borrow());

    // Drag onto the outer text: the scope widens past b, whose contents
    // clear their highlight.
    engine.feed_input(&sgr_drag(27, 0));
    assert!(!*inner_active.borrow());
    assert!(*outer_active.borrow());

    // Drag back over b itself: the stack truncates back to it.
    engine.feed_input(&sgr_drag(15, 5));
    assert!(*inner_active.borrow());
    assert!(!*outer_active.borrow());

    engine.feed_input(&sgr_release(15, 5));
    assert_eq!(engine.selected_text(), "inner");
}

#[test]
fn test_e2e_press_elsewhere_drops_finished_highlights() {
    let (mut engine, _sink) = capture_engine(80, 24);
    let root = engine.tree().root();
    let (widget, active) = SelectableText::boxed("alpha");
    let text = engine
        .create_node(NodeOptions {
            selectable: true,
            widget: Some(widget),
            ..abs_box(0, 0, 10, 1)
        })
        .unwrap();
    engine.tree_mut().attach(text, root, None).unwrap();
    engine.tick();

    engine.feed_input(&sgr_press(2, 0));
    engine.feed_input(&sgr_drag(6, 0));
    engine.feed_input(&sgr_release(6, 0));
    assert!(*active.borrow());
    assert_eq!(engine.selected_text(), "alpha");

    // A later press on empty space starts no session and clears the
    // old highlight.
    engine.feed_input(&sgr_press(50, 20));
    assert!(!*active.borrow());
    assert_eq!(engine.selected_text(), "");
}

#[test]
fn test_e2e_clear_selection_drops_highlights() {
    let (mut engine, _sink) = capture_engine(80, 24);
    let root = engine.tree().root();
    let (widget, active) = SelectableText::boxed("alpha");
    let text = engine
        .create_node(NodeOptions {
            selectable: true,
            widget: Some(widget),
            ..abs_box(0, 0, 10, 1)
        })
        .unwrap();
    engine.tree_mut().attach(text, root, None).unwrap();
    engine.tick();

    engine.feed_input(&sgr_press(2, 0));
    engine.feed_input(&sgr_release(2, 0));
    assert!(*active.borrow());

    engine.clear_selection();
    assert!(!*active.borrow());
    assert_eq!(engine.selected_text(), "");
}
