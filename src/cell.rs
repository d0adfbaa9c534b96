//! Terminal cell type representing a single character position.
//!
//! A frame is a grid of cells; each cell holds one character and its
//! styling. Wide characters (CJK, emoji) occupy two columns: the first
//! holds the character, the second a continuation marker.

use crate::color::Rgba;
use crate::style::{Style, TextAttributes};

/// Content of a terminal cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CellContent {
    /// A character (display width 1 or 2).
    Char(char),
    /// Empty cell, renders as space.
    #[default]
    Empty,
    /// Occupied by the wide character in the preceding cell.
    Continuation,
}

/// A single character position with styling.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Cell {
    /// What is displayed.
    pub content: CellContent,
    /// Foreground color.
    pub fg: Rgba,
    /// Background color.
    pub bg: Rgba,
    /// Rendering attributes.
    pub attributes: TextAttributes,
}

impl Cell {
    /// Create a cell with a character and style.
    #[must_use]
    pub fn new(ch: char, style: Style) -> Self {
        Self {
            content: CellContent::Char(ch),
            fg: style.fg.unwrap_or(Rgba::WHITE),
            bg: style.bg.unwrap_or(Rgba::TRANSPARENT),
            attributes: style.attributes,
        }
    }

    /// Create an empty cell with a background color.
    #[must_use]
    pub fn clear(bg: Rgba) -> Self {
        Self {
            content: CellContent::Empty,
            fg: Rgba::WHITE,
            bg,
            attributes: TextAttributes::empty(),
        }
    }

    /// Create a continuation cell (second column of a wide character).
    #[must_use]
    pub fn continuation(bg: Rgba) -> Self {
        Self {
            content: CellContent::Continuation,
            fg: Rgba::WHITE,
            bg,
            attributes: TextAttributes::empty(),
        }
    }

    /// Check if this cell is a continuation marker.
    #[must_use]
    pub fn is_continuation(&self) -> bool {
        self.content == CellContent::Continuation
    }

    /// Check if this cell has no visible glyph.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        matches!(self.content, CellContent::Empty) || self.content == CellContent::Char(' ')
    }

    /// The character to emit for this cell.
    #[must_use]
    pub fn display_char(&self) -> char {
        match self.content {
            CellContent::Char(c) => c,
            CellContent::Empty | CellContent::Continuation => ' ',
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_new() {
        let cell = Cell::new('A', Style::fg(Rgba::GREEN));
        assert_eq!(cell.content, CellContent::Char('A'));
        assert_eq!(cell.fg, Rgba::GREEN);
        assert_eq!(cell.display_char(), 'A');
    }

    #[test]
    fn test_cell_clear() {
        let cell = Cell::clear(Rgba::BLACK);
        assert!(cell.is_blank());
        assert_eq!(cell.bg, Rgba::BLACK);
        assert_eq!(cell.display_char(), ' ');
    }

    #[test]
    fn test_continuation() {
        let cell = Cell::continuation(Rgba::TRANSPARENT);
        assert!(cell.is_continuation());
        assert_eq!(cell.display_char(), ' ');
    }

    #[test]
    fn test_space_is_blank() {
        let cell = Cell::new(' ', Style::NONE);
        assert!(cell.is_blank());
        let cell = Cell::new('x', Style::NONE);
        assert!(!cell.is_blank());
    }
}
