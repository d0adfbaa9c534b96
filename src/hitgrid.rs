//! Viewport-sized grid mapping each cell to the topmost interactive node.
//!
//! Rebuilt every rendered frame during scene traversal. Painting order is
//! back-to-front, so later writes win and the grid ends up holding the
//! topmost node at each cell. Point lookups are then O(1) per pointer
//! event.

use crate::geometry::Rect;
use crate::scene::NodeId;

/// Grid of node ownership for pointer hit-testing.
#[derive(Clone, Debug)]
pub struct HitGrid {
    width: u32,
    height: u32,
    cells: Vec<Option<NodeId>>,
}

impl HitGrid {
    /// Create a grid for the given viewport dimensions.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        let len = (width as usize).saturating_mul(height as usize);
        Self {
            width,
            height,
            cells: vec![None; len],
        }
    }

    /// Grid width in cells.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Grid height in cells.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Reset every cell to no owner.
    pub fn clear(&mut self) {
        self.cells.fill(None);
    }

    /// Resize the grid, clearing all ownership.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        let len = (width as usize).saturating_mul(height as usize);
        self.cells.clear();
        self.cells.resize(len, None);
    }

    /// Claim a rectangle for a node. Out-of-bounds portions are clipped.
    pub fn fill_rect(&mut self, rect: Rect, id: NodeId) {
        let x0 = rect.x.max(0) as u32;
        let y0 = rect.y.max(0) as u32;
        let x1 = rect
            .x
            .saturating_add(rect.width as i32)
            .clamp(0, self.width as i32) as u32;
        let y1 = rect
            .y
            .saturating_add(rect.height as i32)
            .clamp(0, self.height as i32) as u32;
        for y in y0..y1 {
            let row = (y * self.width) as usize;
            for x in x0..x1 {
                self.cells[row + x as usize] = Some(id);
            }
        }
    }

    /// Topmost node at a point, if any.
    #[must_use]
    pub fn hit(&self, x: i32, y: i32) -> Option<NodeId> {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return None;
        }
        self.cells[(y as u32 * self.width + x as u32) as usize]
    }
}
