//! Terminal dimensions, debounced resize, and split mode.
//!
//! Resize signals arrive in bursts while the user drags the terminal
//! edge; they are coalesced and applied once after a quiet period. In
//! split mode a number of terminal rows below the viewport is reserved
//! for foreign output (a shell prompt, a REPL); resizes then apply
//! immediately so the reserved rows never visibly jitter.

use std::time::{Duration, Instant};

/// Quiet period before a coalesced resize is applied.
pub const RESIZE_DEBOUNCE: Duration = Duration::from_millis(150);

/// Terminal dimensions and resize state.
///
/// Invariant: `viewport_height() + reserved_rows() == terminal height`
/// at all times.
#[derive(Clone, Debug)]
pub struct Viewport {
    width: u32,
    height: u32,
    reserved_rows: u32,
    pending: Option<(u32, u32)>,
    pending_since: Option<Instant>,
    debounce: Duration,
}

impl Viewport {
    /// Create a viewport for the given terminal size.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
            reserved_rows: 0,
            pending: None,
            pending_since: None,
            debounce: RESIZE_DEBOUNCE,
        }
    }

    /// Override the debounce quiet period.
    #[must_use]
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// Terminal width in cells.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Terminal height in cells.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Height of the managed viewport (terminal height minus reserved
    /// rows).
    #[must_use]
    pub const fn viewport_height(&self) -> u32 {
        self.height - self.reserved_rows
    }

    /// Rows reserved below the viewport. Non-zero means split mode.
    #[must_use]
    pub const fn reserved_rows(&self) -> u32 {
        self.reserved_rows
    }

    /// Whether split mode is active.
    #[must_use]
    pub const fn is_split(&self) -> bool {
        self.reserved_rows > 0
    }

    /// Reserve rows below the viewport. Clamped so at least one viewport
    /// row remains.
    pub fn set_reserved_rows(&mut self, rows: u32) {
        self.reserved_rows = rows.min(self.height - 1);
    }

    /// Leave split mode.
    pub fn clear_reserved_rows(&mut self) {
        self.reserved_rows = 0;
    }

    /// Whether a resize is waiting out the debounce period.
    #[must_use]
    pub const fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Record a terminal resize signal.
    ///
    /// Returns the applied dimensions immediately in split mode;
    /// otherwise the signal is coalesced and [`Viewport::take_ready`]
    /// will release it after the quiet period.
    pub fn on_resize_signal(&mut self, width: u32, height: u32, now: Instant) -> Option<(u32, u32)> {
        let width = width.max(1);
        let height = height.max(1);
        if self.is_split() {
            self.pending = None;
            self.pending_since = None;
            self.apply(width, height);
            return Some((width, height));
        }
        self.pending = Some((width, height));
        // Restart the quiet period on every signal.
        self.pending_since = Some(now);
        None
    }

    /// Release a coalesced resize once the quiet period has elapsed.
    pub fn take_ready(&mut self, now: Instant) -> Option<(u32, u32)> {
        let since = self.pending_since?;
        if now.duration_since(since) < self.debounce {
            return None;
        }
        self.pending_since = None;
        let (width, height) = self.pending.take()?;
        self.apply(width, height);
        Some((width, height))
    }

    /// Drop any pending resize (on engine stop).
    pub fn cancel_pending(&mut self) {
        self.pending = None;
        self.pending_since = None;
    }

    fn apply(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        // Keep the split invariant when the terminal shrinks below the
        // reservation.
        self.reserved_rows = self.reserved_rows.min(self.height - 1);
    }
}
