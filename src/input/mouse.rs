//! Raw mouse input, as decoded from the terminal byte stream.
//!
//! These are pre-routing events: position, button, and kind straight
//! from the wire. The pointer router turns them into node-addressed
//! [`crate::router::PointerEvent`]s with capture/hover/drag semantics.

/// Mouse button.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MouseButton {
    /// Left mouse button.
    Left,
    /// Middle mouse button (scroll wheel click).
    Middle,
    /// Right mouse button.
    Right,
    /// No button (move and scroll events).
    None,
}

/// Kind of raw mouse input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MouseInputKind {
    /// Button pressed.
    Press,
    /// Button released.
    Release,
    /// Mouse moved (button state in `button`).
    Move,
    /// Scroll wheel up.
    ScrollUp,
    /// Scroll wheel down.
    ScrollDown,
}

/// A raw mouse event in absolute cell coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MouseInput {
    /// Column, 0-indexed.
    pub x: i32,
    /// Row, 0-indexed.
    pub y: i32,
    /// Button involved.
    pub button: MouseButton,
    /// Kind of event.
    pub kind: MouseInputKind,
    /// Shift key held.
    pub shift: bool,
    /// Control key held.
    pub ctrl: bool,
    /// Alt key held.
    pub alt: bool,
}

impl MouseInput {
    /// Create a new raw mouse event.
    #[must_use]
    pub fn new(x: i32, y: i32, button: MouseButton, kind: MouseInputKind) -> Self {
        Self {
            x,
            y,
            button,
            kind,
            shift: false,
            ctrl: false,
            alt: false,
        }
    }

    /// Create a press event.
    #[must_use]
    pub fn press(x: i32, y: i32, button: MouseButton) -> Self {
        Self::new(x, y, button, MouseInputKind::Press)
    }

    /// Create a release event.
    #[must_use]
    pub fn release(x: i32, y: i32, button: MouseButton) -> Self {
        Self::new(x, y, button, MouseInputKind::Release)
    }

    /// Create a move event. A non-`None` button makes it a drag.
    #[must_use]
    pub fn move_to(x: i32, y: i32, button: MouseButton) -> Self {
        Self::new(x, y, button, MouseInputKind::Move)
    }

    /// Set modifier keys.
    #[must_use]
    pub fn with_modifiers(mut self, shift: bool, ctrl: bool, alt: bool) -> Self {
        self.shift = shift;
        self.ctrl = ctrl;
        self.alt = alt;
        self
    }

    /// Check if this is a scroll event.
    #[must_use]
    pub fn is_scroll(&self) -> bool {
        matches!(
            self.kind,
            MouseInputKind::ScrollUp | MouseInputKind::ScrollDown
        )
    }
}
