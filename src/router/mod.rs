//! Event routing: pointer and keyboard delivery over the scene tree.
//!
//! Routed events bubble from the target node toward the root. Each
//! handler returns a [`Propagation`] decision; there is no shared
//! mutable event state.

pub mod keyboard;
pub mod pointer;

pub use keyboard::KeyRouter;
pub use pointer::PointerRouter;

use crate::input::MouseButton;
use crate::scene::NodeId;

/// Bubbling decision returned by event handlers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Propagation {
    /// Keep bubbling toward the root.
    #[default]
    Continue,
    /// Stop here; ancestors do not see the event.
    Stop,
}

/// Kind of routed pointer event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerKind {
    /// Button pressed over the node.
    Down,
    /// Button released.
    Up,
    /// Motion with no button held.
    Move,
    /// Motion with a button held.
    Drag,
    /// The drag on a captured node ended (synthesized before `Drop`).
    DragEnd,
    /// Something was dropped on the node (`source` names the dragged
    /// node).
    Drop,
    /// The pointer entered the node (synthesized).
    Over,
    /// The pointer left the node (synthesized).
    Out,
    /// Scroll wheel over the node.
    Scroll,
}

/// A routed pointer event, in absolute cell coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PointerEvent {
    pub kind: PointerKind,
    pub button: MouseButton,
    pub x: i32,
    pub y: i32,
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    /// Scroll direction: -1 up, +1 down, 0 for non-scroll events.
    pub scroll_delta: i32,
    /// The dragged node, set only for [`PointerKind::Drop`].
    pub source: Option<NodeId>,
}

impl PointerEvent {
    /// Create an event with no modifiers.
    #[must_use]
    pub fn new(kind: PointerKind, button: MouseButton, x: i32, y: i32) -> Self {
        Self {
            kind,
            button,
            x,
            y,
            shift: false,
            ctrl: false,
            alt: false,
            scroll_delta: 0,
            source: None,
        }
    }

    /// Same event with a different kind.
    #[must_use]
    pub fn with_kind(mut self, kind: PointerKind) -> Self {
        self.kind = kind;
        self
    }
}
