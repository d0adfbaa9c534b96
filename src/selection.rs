//! Text-selection engine.
//!
//! One anchor/focus session per press-drag-release gesture, layered over
//! the scene tree. A selection may span multiple nested containers: when
//! the cursor drags out of the container it started in, ancestors are
//! pushed onto the container stack until one covers the cursor again;
//! when the cursor returns to a previously-exited container the stack is
//! truncated back to it. Nodes strictly inside an exited container are
//! told to clear their highlight.

use crate::scene::{NodeId, SceneTree};

/// A normalized selection as delivered to a node.
///
/// `anchor` is at or before `focus` in document order; the range is
/// half-open. `active` is false for nodes outside the current selection
/// scope, which should clear any stale local highlight.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Selection {
    /// Start of the selection in absolute cell coordinates.
    pub anchor: (i32, i32),
    /// One past the end of the selection in absolute cell coordinates.
    pub focus: (i32, i32),
    /// Whether this node should show the selection.
    pub active: bool,
}

/// Order an anchor/focus pair by document position.
///
/// When the raw anchor comes after the raw focus (by row, or by column
/// on the same row) the two are swapped and the new focus column is
/// bumped by one so the range stays half-open. Normalizing an
/// already-normalized pair is a no-op.
#[must_use]
pub fn normalize(anchor: (i32, i32), focus: (i32, i32)) -> ((i32, i32), (i32, i32)) {
    let backwards = anchor.1 > focus.1 || (anchor.1 == focus.1 && anchor.0 > focus.0);
    if backwards {
        (focus, (anchor.0 + 1, anchor.1))
    } else {
        (anchor, focus)
    }
}

/// Multi-container drag-selection state.
pub struct SelectionEngine {
    anchor: (i32, i32),
    focus: (i32, i32),
    active: bool,
    /// Exited containers first, current scope last.
    containers: Vec<NodeId>,
}

impl SelectionEngine {
    #[must_use]
    pub fn new() -> Self {
        Self {
            anchor: (0, 0),
            focus: (0, 0),
            active: false,
            containers: Vec::new(),
        }
    }

    /// Whether a selection gesture is in progress.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// The container stack, exited containers first.
    #[must_use]
    pub fn containers(&self) -> &[NodeId] {
        &self.containers
    }

    /// The normalized anchor/focus pair.
    #[must_use]
    pub fn normalized(&self) -> ((i32, i32), (i32, i32)) {
        normalize(self.anchor, self.focus)
    }

    /// Open a session at an absolute cell inside `node`, clearing any
    /// prior session. The initial scope is the node's parent.
    ///
    /// Returns true if any node's local highlight changed.
    pub fn start(&mut self, tree: &mut SceneTree, node: NodeId, x: i32, y: i32) -> bool {
        self.containers.clear();
        self.containers.push(tree.parent_or_root(node));
        self.anchor = (x, y);
        self.focus = (x, y);
        self.active = true;
        self.notify(tree)
    }

    /// Move the focus point and reconcile the container stack against
    /// the node currently under the cursor.
    ///
    /// A single motion can skip several nesting levels, so escaping
    /// pushes one ancestor per level until the hovered node falls under
    /// the scope (or the root is reached). Hovering a container already
    /// on the stack truncates back to it; hovering the current scope or
    /// anything inside it leaves the stack untouched.
    pub fn update(&mut self, tree: &mut SceneTree, hovered: Option<NodeId>, x: i32, y: i32) -> bool {
        if !self.active {
            return false;
        }
        self.focus = (x, y);
        // Escaping outward
        while let Some(&current) = self.containers.last() {
            if hovered.is_some_and(|h| tree.contains(current, h)) {
                break;
            }
            let parent = tree.parent_or_root(current);
            if parent == current {
                break;
            }
            self.containers.push(parent);
        }
        // Returning inward to a previously-exited container
        if let Some(h) = hovered {
            if let Some(i) = self.containers.iter().position(|&c| c == h) {
                self.containers.truncate(i + 1);
            }
        }
        self.notify(tree)
    }

    /// End the gesture. The anchor/focus pair persists until the next
    /// [`SelectionEngine::start`].
    pub fn finish(&mut self) {
        self.active = false;
    }

    /// Deactivate and drop the container stack, clearing highlights.
    pub fn clear(&mut self, tree: &mut SceneTree) -> bool {
        self.active = false;
        self.containers.clear();
        self.notify(tree)
    }

    /// Whether `node` falls inside the current scope and outside every
    /// exited container.
    fn node_active(&self, tree: &SceneTree, node: NodeId) -> bool {
        let Some((&current, exited)) = self.containers.split_last() else {
            return false;
        };
        if !tree.contains(current, node) {
            return false;
        }
        !exited.iter().any(|&e| tree.is_ancestor(e, node))
    }

    /// Deliver the normalized selection to every selectable node.
    ///
    /// Returns true if any node reported a highlight change.
    fn notify(&self, tree: &mut SceneTree) -> bool {
        let (anchor, focus) = self.normalized();
        let session_active = self.active;
        let targets: Vec<(NodeId, bool)> = tree
            .ids()
            .filter(|&id| tree.get(id).is_some_and(|n| n.selectable()))
            .map(|id| (id, session_active && self.node_active(tree, id)))
            .collect();
        let mut changed = false;
        for (id, active) in targets {
            let Some(node) = tree.get_mut(id) else {
                continue;
            };
            let (width, height) = (node.computed().width, node.computed().height);
            if let Some(widget) = node.widget_mut() {
                let selection = Selection {
                    anchor,
                    focus,
                    active,
                };
                if widget.on_selection_changed(&selection, width, height) {
                    changed = true;
                }
            }
        }
        changed
    }

    /// Concatenated selected text from active selectable nodes, in id
    /// order.
    #[must_use]
    pub fn selected_text(&self, tree: &SceneTree) -> String {
        let mut ids: Vec<NodeId> = tree
            .ids()
            .filter(|&id| {
                tree.get(id).is_some_and(|n| n.selectable()) && self.node_active(tree, id)
            })
            .collect();
        ids.sort_unstable();
        let mut out = Vec::new();
        for id in ids {
            if let Some(text) = tree
                .get(id)
                .and_then(|n| n.widget.as_deref())
                .and_then(crate::widget::Widget::selected_text)
            {
                out.push(text);
            }
        }
        out.join("\n")
    }
}

impl Default for SelectionEngine {
    fn default() -> Self {
        Self::new()
    }
}
