//! Pointer routing: hit-testing, capture, hover, drag and drop.
//!
//! A state machine over raw mouse input. Left press over a hit node
//! captures it; while captured, every event except the release routes to
//! the captured node regardless of position, so a drag can leave the
//! node's bounds. The release delivers `Up` and `DragEnd` to the
//! captured node and `Drop` to whatever is under the cursor. Hover is
//! tracked across all motion with `Out` synthesized before `Over`.
//!
//! A left press over a selectable node that accepts selection opens a
//! text-selection session instead; drags then feed the selection engine
//! rather than node handlers until the release finalizes it.

use crate::hitgrid::HitGrid;
use crate::input::{MouseButton, MouseInput, MouseInputKind};
use crate::router::{PointerEvent, PointerKind, Propagation};
use crate::scene::{NodeId, SceneTree};
use crate::selection::SelectionEngine;

/// Deliver an event at `target` and bubble it toward the root until a
/// handler stops it.
pub(crate) fn dispatch(tree: &mut SceneTree, target: NodeId, event: &PointerEvent) {
    let mut current = Some(target);
    while let Some(id) = current {
        let Some(node) = tree.get_mut(id) else {
            return;
        };
        let parent = node.parent();
        if let Some(widget) = node.widget_mut() {
            if widget.on_pointer(event) == Propagation::Stop {
                return;
            }
        }
        current = parent;
    }
}

/// Mouse event router with capture and hover state.
#[derive(Debug, Default)]
pub struct PointerRouter {
    hovered: Option<NodeId>,
    captured: Option<NodeId>,
}

impl PointerRouter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The node currently under the pointer, if any.
    #[must_use]
    pub const fn hovered(&self) -> Option<NodeId> {
        self.hovered
    }

    /// The node currently holding mouse capture, if any.
    #[must_use]
    pub const fn captured(&self) -> Option<NodeId> {
        self.captured
    }

    /// Drop capture/hover references to a node (on destroy).
    pub fn forget(&mut self, id: NodeId) {
        if self.captured == Some(id) {
            self.captured = None;
        }
        if self.hovered == Some(id) {
            self.hovered = None;
        }
    }

    /// Clear capture state regardless of render or gesture progress.
    pub fn release_capture(&mut self) {
        self.captured = None;
    }

    /// Route one raw mouse event against the current frame's hit grid.
    pub fn route(
        &mut self,
        tree: &mut SceneTree,
        selection: &mut SelectionEngine,
        grid: &HitGrid,
        input: MouseInput,
    ) {
        let hit = grid.hit(input.x, input.y);

        match input.kind {
            MouseInputKind::ScrollUp | MouseInputKind::ScrollDown => {
                // Scroll bypasses capture and hover bookkeeping.
                if let Some(target) = hit {
                    let delta = if input.kind == MouseInputKind::ScrollUp {
                        -1
                    } else {
                        1
                    };
                    let mut event = base_event(PointerKind::Scroll, &input);
                    event.scroll_delta = delta;
                    dispatch(tree, target, &event);
                }
            }
            MouseInputKind::Press => self.route_press(tree, selection, input, hit),
            MouseInputKind::Move => self.route_move(tree, selection, input, hit),
            MouseInputKind::Release => self.route_release(tree, selection, input, hit),
        }
    }

    fn route_press(
        &mut self,
        tree: &mut SceneTree,
        selection: &mut SelectionEngine,
        input: MouseInput,
        hit: Option<NodeId>,
    ) {
        if input.button == MouseButton::Left {
            if let Some(target) = hit {
                let starts_selection = tree.get(target).is_some_and(|node| {
                    node.selectable()
                        && node
                            .widget
                            .as_deref()
                            .is_some_and(|w| w.should_start_selection(input.x, input.y))
                });
                if starts_selection {
                    selection.start(tree, target, input.x, input.y);
                    return;
                }
            }
            // A press that does not open a session drops any prior one,
            // highlights included.
            selection.clear(tree);
            self.update_hover(tree, hit, &input);
            self.captured = hit;
            if let Some(target) = hit {
                dispatch(tree, target, &base_event(PointerKind::Down, &input));
            }
            return;
        }

        // Non-left press: no capture change; captured node still takes
        // precedence.
        self.update_hover(tree, hit, &input);
        if let Some(target) = self.captured.or(hit) {
            dispatch(tree, target, &base_event(PointerKind::Down, &input));
        }
    }

    fn route_move(
        &mut self,
        tree: &mut SceneTree,
        selection: &mut SelectionEngine,
        input: MouseInput,
        hit: Option<NodeId>,
    ) {
        if selection.is_active() {
            selection.update(tree, hit, input.x, input.y);
            return;
        }
        self.update_hover(tree, hit, &input);
        let kind = if input.button == MouseButton::None {
            PointerKind::Move
        } else {
            PointerKind::Drag
        };
        if let Some(target) = self.captured.or(hit) {
            dispatch(tree, target, &base_event(kind, &input));
        }
    }

    fn route_release(
        &mut self,
        tree: &mut SceneTree,
        selection: &mut SelectionEngine,
        input: MouseInput,
        hit: Option<NodeId>,
    ) {
        if selection.is_active() {
            selection.finish();
            return;
        }
        if let Some(captured) = self.captured.take() {
            dispatch(tree, captured, &base_event(PointerKind::Up, &input));
            dispatch(tree, captured, &base_event(PointerKind::DragEnd, &input));
            if let Some(target) = hit {
                let mut drop = base_event(PointerKind::Drop, &input);
                drop.source = Some(captured);
                dispatch(tree, target, &drop);
            }
            // Re-aim hover at the released node; the next motion will
            // synthesize the usual out/over pair.
            self.hovered = Some(captured);
            return;
        }
        self.update_hover(tree, hit, &input);
        if let Some(target) = hit {
            dispatch(tree, target, &base_event(PointerKind::Up, &input));
        }
    }

    /// Synthesize `out` to the previously hovered node (captured node
    /// exempt) and `over` to the newly hovered one.
    fn update_hover(&mut self, tree: &mut SceneTree, hit: Option<NodeId>, input: &MouseInput) {
        if hit == self.hovered {
            return;
        }
        if let Some(old) = self.hovered {
            if self.captured != Some(old) {
                dispatch(tree, old, &base_event(PointerKind::Out, input));
            }
        }
        if let Some(new) = hit {
            dispatch(tree, new, &base_event(PointerKind::Over, input));
        }
        self.hovered = hit;
    }
}

fn base_event(kind: PointerKind, input: &MouseInput) -> PointerEvent {
    PointerEvent {
        kind,
        button: input.button,
        x: input.x,
        y: input.y,
        shift: input.shift,
        ctrl: input.ctrl,
        alt: input.alt,
        scroll_delta: 0,
        source: None,
    }
}
