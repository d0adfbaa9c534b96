//! Widget seam: behavior attached to a scene node.
//!
//! Concrete widgets (buttons, text areas, lists) live outside this crate.
//! They plug into a node through this trait: painting, input handling,
//! selection participation, and sizing callbacks. All methods have
//! defaults so simple widgets implement only what they need.

use crate::buffer::CellBuffer;
use crate::geometry::Rect;
use crate::input::KeyEvent;
use crate::router::{PointerEvent, Propagation};
use crate::selection::Selection;

/// Behavior attached to a scene node.
pub trait Widget {
    /// Paint into the target buffer. `area` is the node's rectangle in
    /// the buffer's coordinate space (origin-relative for buffered
    /// nodes, absolute for direct painting).
    fn paint(&mut self, buffer: &mut CellBuffer, area: Rect);

    /// Handle a routed pointer event. Return [`Propagation::Stop`] to
    /// end bubbling.
    fn on_pointer(&mut self, event: &PointerEvent) -> Propagation {
        let _ = event;
        Propagation::Continue
    }

    /// Handle a routed key event.
    fn on_key(&mut self, event: &KeyEvent) -> Propagation {
        let _ = event;
        Propagation::Continue
    }

    /// Whether a left press at the given absolute cell should open a
    /// text-selection session instead of a normal click.
    fn should_start_selection(&self, x: i32, y: i32) -> bool {
        let _ = (x, y);
        false
    }

    /// The normalized selection changed. `width`/`height` are the node's
    /// computed dimensions. Return true if the node's local highlight
    /// changed and a repaint is needed.
    fn on_selection_changed(&mut self, selection: &Selection, width: u32, height: u32) -> bool {
        let _ = (selection, width, height);
        false
    }

    /// The node's currently selected text, if any.
    fn selected_text(&self) -> Option<String> {
        None
    }

    /// Intrinsic size in cells, consulted for auto size requests.
    fn measure(&self) -> Option<(u32, u32)> {
        None
    }

    /// The node's computed size changed.
    fn on_resize(&mut self, width: u32, height: u32) {
        let _ = (width, height);
    }
}
