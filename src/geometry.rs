//! Geometry primitives: size requests, position modes, rectangles.

/// A size request along one axis.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Dimension {
    /// Sized by content measurement (or stretched by the layout engine).
    #[default]
    Auto,
    /// Fixed size in cells.
    Cells(u32),
    /// Percentage of the parent's size, 0.0..=100.0.
    Percent(f32),
}

impl Dimension {
    /// Check if this is an auto request.
    #[must_use]
    pub fn is_auto(&self) -> bool {
        matches!(self, Self::Auto)
    }
}

/// How a node is positioned relative to its parent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PositionMode {
    /// In normal flow, no offsets applied.
    #[default]
    Static,
    /// In normal flow, shifted by offsets; position recomputed every
    /// layout pass.
    Relative,
    /// Out of flow at an explicit position; eligible for the
    /// position-only layout fast path.
    Absolute,
}

/// An edge of a node's box, for offsets.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Edge {
    Top,
    Right,
    Bottom,
    Left,
}

/// Optional per-edge offsets.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Offsets {
    pub top: Option<Dimension>,
    pub right: Option<Dimension>,
    pub bottom: Option<Dimension>,
    pub left: Option<Dimension>,
}

impl Offsets {
    /// Get the offset for an edge.
    #[must_use]
    pub fn get(&self, edge: Edge) -> Option<Dimension> {
        match edge {
            Edge::Top => self.top,
            Edge::Right => self.right,
            Edge::Bottom => self.bottom,
            Edge::Left => self.left,
        }
    }

    /// Set the offset for an edge.
    pub fn set(&mut self, edge: Edge, value: Option<Dimension>) {
        match edge {
            Edge::Top => self.top = value,
            Edge::Right => self.right = value,
            Edge::Bottom => self.bottom = value,
            Edge::Left => self.left = value,
        }
    }
}

/// A resolved rectangle in cells. Position is parent-relative and may be
/// negative; dimensions are always at least 1.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    /// Create a new rectangle.
    #[must_use]
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Check if a point is inside the rectangle.
    #[must_use]
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x
            && y >= self.y
            && x < self.x.saturating_add(self.width as i32)
            && y < self.y.saturating_add(self.height as i32)
    }

    /// Translate by an offset.
    #[must_use]
    pub fn translated(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x.saturating_add(dx),
            y: self.y.saturating_add(dy),
            ..*self
        }
    }
}

impl Default for Rect {
    fn default() -> Self {
        Self::new(0, 0, 1, 1)
    }
}
