//! Cell-based frame buffer.
//!
//! [`CellBuffer`] is the drawing surface for the render pass: the ambient
//! frame target and the off-screen buffer owned by each buffered node.
//! Compositing one buffer into another skips fully transparent blank
//! cells, so off-screen buffers layer correctly over their parent.
//!
//! # Coordinate System
//!
//! Coordinates are (x, y) with (0, 0) top-left; x grows right, y grows
//! down. All operations silently clip to the buffer bounds.

use crate::cell::{Cell, CellContent};
use crate::color::Rgba;
use crate::style::Style;
use unicode_width::UnicodeWidthChar;

/// A 2D grid of cells.
///
/// Dimensions are clamped to a minimum of 1 in each axis; a degenerate
/// zero-size buffer cannot exist.
#[derive(Clone, Debug)]
pub struct CellBuffer {
    width: u32,
    height: u32,
    cells: Vec<Cell>,
}

impl CellBuffer {
    /// Create a new buffer with the given dimensions.
    ///
    /// Uses saturating multiplication so extreme dimensions cannot
    /// overflow the allocation size computation.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        let size = (width as usize).saturating_mul(height as usize);
        Self {
            width,
            height,
            cells: vec![Cell::clear(Rgba::TRANSPARENT); size],
        }
    }

    /// Get buffer dimensions.
    #[must_use]
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Get buffer width.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Get buffer height.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Estimated byte size of the cell storage.
    #[must_use]
    pub fn byte_size(&self) -> usize {
        self.cells.len() * std::mem::size_of::<Cell>()
    }

    /// Compute cell index with overflow protection.
    #[inline]
    fn cell_index(&self, x: u32, y: u32) -> Option<usize> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let row_offset = (y as usize).checked_mul(self.width as usize)?;
        let idx = row_offset.checked_add(x as usize)?;
        if idx < self.cells.len() { Some(idx) } else { None }
    }

    /// Get cell at position.
    #[must_use]
    pub fn get(&self, x: u32, y: u32) -> Option<&Cell> {
        self.cell_index(x, y).map(|idx| &self.cells[idx])
    }

    /// Get mutable cell at position.
    pub fn get_mut(&mut self, x: u32, y: u32) -> Option<&mut Cell> {
        self.cell_index(x, y).map(|idx| &mut self.cells[idx])
    }

    /// Set cell at position. Out-of-bounds writes are ignored.
    pub fn set(&mut self, x: u32, y: u32, cell: Cell) {
        if let Some(idx) = self.cell_index(x, y) {
            self.cells[idx] = cell;
        }
    }

    /// Set cell with alpha blending of the background over existing content.
    pub fn set_blended(&mut self, x: u32, y: u32, mut cell: Cell) {
        if let Some(idx) = self.cell_index(x, y) {
            let dst = self.cells[idx];
            if !cell.bg.is_opaque() {
                cell.bg = cell.bg.blend_over(dst.bg);
                if cell.is_blank() && !dst.is_blank() {
                    cell.content = dst.content;
                    cell.fg = dst.fg;
                    cell.attributes = dst.attributes;
                }
            }
            self.cells[idx] = cell;
        }
    }

    /// Fill the whole buffer with an empty cell of the given background.
    pub fn clear(&mut self, bg: Rgba) {
        self.cells.fill(Cell::clear(bg));
    }

    /// Fill a rectangle with an empty cell of the given background.
    pub fn fill_rect(&mut self, x: u32, y: u32, width: u32, height: u32, bg: Rgba) {
        let cell = Cell::clear(bg);
        for row in y..y.saturating_add(height).min(self.height) {
            for col in x..x.saturating_add(width).min(self.width) {
                if let Some(idx) = self.cell_index(col, row) {
                    self.cells[idx] = cell;
                }
            }
        }
    }

    /// Draw text starting at (x, y), advancing by display width.
    ///
    /// Wide characters write a continuation cell in their second column.
    /// Zero-width characters are skipped. Text is clipped at the right
    /// edge; a wide character that would only half-fit is dropped.
    pub fn draw_text(&mut self, x: u32, y: u32, text: &str, style: Style) {
        if y >= self.height {
            return;
        }
        let mut col = x;
        for ch in text.chars() {
            let w = ch.width().unwrap_or(0) as u32;
            if w == 0 {
                continue;
            }
            if col.saturating_add(w) > self.width {
                break;
            }
            self.set(col, y, Cell::new(ch, style));
            if w == 2 {
                let bg = style.bg.unwrap_or(Rgba::TRANSPARENT);
                self.set(col + 1, y, Cell::continuation(bg));
            }
            col += w;
        }
    }

    /// Composite another buffer into this one at (x, y).
    ///
    /// Source cells that are blank with a fully transparent background
    /// are skipped (see-through); others are alpha-blended in.
    pub fn composite(&mut self, src: &Self, x: i32, y: i32) {
        for sy in 0..src.height {
            let dy = y.saturating_add(sy as i32);
            if dy < 0 {
                continue;
            }
            let dy = dy as u32;
            if dy >= self.height {
                break;
            }
            for sx in 0..src.width {
                let dx = x.saturating_add(sx as i32);
                if dx < 0 || dx as u32 >= self.width {
                    continue;
                }
                let Some(cell) = src.get(sx, sy) else { continue };
                if cell.content == CellContent::Empty && cell.bg.is_transparent() {
                    continue;
                }
                self.set_blended(dx as u32, dy, *cell);
            }
        }
    }

    /// Resize the buffer, preserving overlapping content.
    pub fn resize(&mut self, width: u32, height: u32) {
        let width = width.max(1);
        let height = height.max(1);
        if (width, height) == (self.width, self.height) {
            return;
        }
        let size = (width as usize).saturating_mul(height as usize);
        let mut cells = vec![Cell::clear(Rgba::TRANSPARENT); size];
        for y in 0..self.height.min(height) {
            for x in 0..self.width.min(width) {
                if let Some(idx) = self.cell_index(x, y) {
                    cells[(y as usize) * (width as usize) + x as usize] = self.cells[idx];
                }
            }
        }
        self.width = width;
        self.height = height;
        self.cells = cells;
    }

    /// Render the buffer contents as plain text rows (for tests and dumps).
    #[must_use]
    pub fn to_text(&self) -> Vec<String> {
        let mut rows = Vec::with_capacity(self.height as usize);
        for y in 0..self.height {
            let mut row = String::with_capacity(self.width as usize);
            for x in 0..self.width {
                if let Some(cell) = self.get(x, y) {
                    if !cell.is_continuation() {
                        row.push(cell.display_char());
                    }
                }
            }
            rows.push(row);
        }
        rows
    }
}

impl Default for CellBuffer {
    fn default() -> Self {
        Self::new(80, 24)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ============================================
    // Construction & Sizing
    // ============================================

    #[test]
    fn test_new_buffer() {
        let buf = CellBuffer::new(80, 24);
        assert_eq!(buf.size(), (80, 24));
    }

    #[test]
    fn test_zero_dimensions_clamped() {
        let buf = CellBuffer::new(0, 0);
        assert_eq!(buf.size(), (1, 1));
    }

    #[test]
    fn test_out_of_bounds_get() {
        let buf = CellBuffer::new(10, 10);
        assert!(buf.get(10, 0).is_none());
        assert!(buf.get(0, 10).is_none());
        assert!(buf.get(100, 100).is_none());
    }

    #[test]
    fn test_byte_size() {
        let buf = CellBuffer::new(10, 10);
        assert_eq!(buf.byte_size(), 100 * std::mem::size_of::<Cell>());
    }

    // ============================================
    // Set / Fill / Clear
    // ============================================

    #[test]
    fn test_set_and_get() {
        let mut buf = CellBuffer::new(10, 10);
        buf.set(5, 5, Cell::new('X', Style::NONE));
        assert_eq!(buf.get(5, 5).unwrap().display_char(), 'X');
    }

    #[test]
    fn test_set_out_of_bounds_ignored() {
        let mut buf = CellBuffer::new(10, 10);
        buf.set(100, 100, Cell::new('X', Style::NONE));
        // No panic, nothing stored
        assert!(buf.get(100, 100).is_none());
    }

    #[test]
    fn test_clear_fills_background() {
        let mut buf = CellBuffer::new(4, 4);
        buf.set(0, 0, Cell::new('A', Style::NONE));
        buf.clear(Rgba::BLUE);
        let cell = buf.get(0, 0).unwrap();
        assert!(cell.is_blank());
        assert_eq!(cell.bg, Rgba::BLUE);
    }

    #[test]
    fn test_fill_rect_clips() {
        let mut buf = CellBuffer::new(10, 10);
        buf.fill_rect(8, 8, 5, 5, Rgba::RED);
        assert_eq!(buf.get(9, 9).unwrap().bg, Rgba::RED);
        assert_eq!(buf.get(7, 7).unwrap().bg, Rgba::TRANSPARENT);
    }

    // ============================================
    // Text Drawing
    // ============================================

    #[test]
    fn test_draw_text_basic() {
        let mut buf = CellBuffer::new(20, 2);
        buf.draw_text(2, 1, "hi", Style::NONE);
        assert_eq!(buf.get(2, 1).unwrap().display_char(), 'h');
        assert_eq!(buf.get(3, 1).unwrap().display_char(), 'i');
    }

    #[test]
    fn test_draw_text_clips_at_right_edge() {
        let mut buf = CellBuffer::new(4, 1);
        buf.draw_text(2, 0, "abcdef", Style::NONE);
        assert_eq!(buf.get(2, 0).unwrap().display_char(), 'a');
        assert_eq!(buf.get(3, 0).unwrap().display_char(), 'b');
    }

    #[test]
    fn test_draw_text_wide_char_continuation() {
        let mut buf = CellBuffer::new(10, 1);
        buf.draw_text(0, 0, "世x", Style::NONE);
        assert_eq!(buf.get(0, 0).unwrap().display_char(), '世');
        assert!(buf.get(1, 0).unwrap().is_continuation());
        assert_eq!(buf.get(2, 0).unwrap().display_char(), 'x');
    }

    #[test]
    fn test_draw_text_wide_char_half_fit_dropped() {
        let mut buf = CellBuffer::new(3, 1);
        buf.draw_text(2, 0, "世", Style::NONE);
        assert!(buf.get(2, 0).unwrap().is_blank());
    }

    #[test]
    fn test_draw_text_below_buffer_ignored() {
        let mut buf = CellBuffer::new(10, 2);
        buf.draw_text(0, 5, "nope", Style::NONE);
        assert!(buf.get(0, 0).unwrap().is_blank());
    }

    // ============================================
    // Compositing
    // ============================================

    #[test]
    fn test_composite_places_content() {
        let mut dst = CellBuffer::new(10, 10);
        let mut src = CellBuffer::new(3, 1);
        src.draw_text(0, 0, "abc", Style::NONE);
        dst.composite(&src, 4, 2);
        assert_eq!(dst.get(4, 2).unwrap().display_char(), 'a');
        assert_eq!(dst.get(6, 2).unwrap().display_char(), 'c');
    }

    #[test]
    fn test_composite_transparent_cells_see_through() {
        let mut dst = CellBuffer::new(5, 1);
        dst.draw_text(0, 0, "xxxxx", Style::NONE);
        let mut src = CellBuffer::new(3, 1);
        src.set(1, 0, Cell::new('o', Style::NONE));
        dst.composite(&src, 0, 0);
        // Transparent blank columns of src leave dst intact
        assert_eq!(dst.get(0, 0).unwrap().display_char(), 'x');
        assert_eq!(dst.get(1, 0).unwrap().display_char(), 'o');
        assert_eq!(dst.get(2, 0).unwrap().display_char(), 'x');
    }

    #[test]
    fn test_composite_negative_offset_clips() {
        let mut dst = CellBuffer::new(4, 1);
        let mut src = CellBuffer::new(3, 1);
        src.draw_text(0, 0, "abc", Style::NONE);
        dst.composite(&src, -1, 0);
        assert_eq!(dst.get(0, 0).unwrap().display_char(), 'b');
        assert_eq!(dst.get(1, 0).unwrap().display_char(), 'c');
    }

    #[test]
    fn test_composite_opaque_bg_overwrites() {
        let mut dst = CellBuffer::new(3, 1);
        dst.draw_text(0, 0, "abc", Style::NONE);
        let mut src = CellBuffer::new(3, 1);
        src.clear(Rgba::BLUE);
        dst.composite(&src, 0, 0);
        assert!(dst.get(0, 0).unwrap().is_blank());
        assert_eq!(dst.get(0, 0).unwrap().bg, Rgba::BLUE);
    }

    // ============================================
    // Resize
    // ============================================

    #[test]
    fn test_resize_preserves_overlap() {
        let mut buf = CellBuffer::new(10, 10);
        buf.set(2, 2, Cell::new('K', Style::NONE));
        buf.resize(5, 5);
        assert_eq!(buf.size(), (5, 5));
        assert_eq!(buf.get(2, 2).unwrap().display_char(), 'K');
    }

    #[test]
    fn test_resize_grows_with_blank_cells() {
        let mut buf = CellBuffer::new(2, 2);
        buf.resize(4, 4);
        assert!(buf.get(3, 3).unwrap().is_blank());
    }

    #[test]
    fn test_resize_same_size_is_noop() {
        let mut buf = CellBuffer::new(4, 4);
        buf.set(1, 1, Cell::new('Q', Style::NONE));
        buf.resize(4, 4);
        assert_eq!(buf.get(1, 1).unwrap().display_char(), 'Q');
    }

    #[test]
    fn test_to_text() {
        let mut buf = CellBuffer::new(3, 2);
        buf.draw_text(0, 0, "ab", Style::NONE);
        let rows = buf.to_text();
        assert_eq!(rows[0], "ab ");
        assert_eq!(rows[1], "   ");
    }
}
