//! Keyboard routing: focus plus upward bubbling.

use crate::input::KeyEvent;
use crate::router::Propagation;
use crate::scene::{NodeId, SceneTree};

/// Delivers key events to the focused node, bubbling toward the root.
/// With no focus, events go to the root only.
#[derive(Debug, Default)]
pub struct KeyRouter {
    focused: Option<NodeId>,
}

impl KeyRouter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The focused node, if any.
    #[must_use]
    pub const fn focused(&self) -> Option<NodeId> {
        self.focused
    }

    /// Focus a node. Returns false (focus unchanged) if the node is
    /// unknown or not focusable.
    pub fn focus(&mut self, tree: &SceneTree, id: NodeId) -> bool {
        if tree.get(id).is_some_and(|node| node.focusable()) {
            self.focused = Some(id);
            true
        } else {
            false
        }
    }

    /// Clear focus.
    pub fn blur(&mut self) {
        self.focused = None;
    }

    /// Drop the focus reference to a node (on destroy).
    pub fn forget(&mut self, id: NodeId) {
        if self.focused == Some(id) {
            self.focused = None;
        }
    }

    /// Route a decoded key event.
    pub fn route(&mut self, tree: &mut SceneTree, event: &KeyEvent) {
        match self.focused {
            Some(id) if tree.get(id).is_some() => {
                let mut current = Some(id);
                while let Some(node_id) = current {
                    let Some(node) = tree.get_mut(node_id) else {
                        return;
                    };
                    let parent = node.parent();
                    if let Some(widget) = node.widget_mut() {
                        if widget.on_key(event) == Propagation::Stop {
                            return;
                        }
                    }
                    current = parent;
                }
            }
            _ => {
                // No focus: root only, no bubbling.
                let root = tree.root();
                if let Some(node) = tree.get_mut(root) {
                    if let Some(widget) = node.widget_mut() {
                        widget.on_key(event);
                    }
                }
            }
        }
    }
}
