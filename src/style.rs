//! Text styling with attributes and colors.

use crate::color::Rgba;
use bitflags::bitflags;

bitflags! {
    /// Text rendering attributes (bold, italic, underline, etc.).
    ///
    /// Not all terminals support all attributes.
    #[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
    pub struct TextAttributes: u8 {
        /// Bold/increased intensity.
        const BOLD          = 0x01;
        /// Dim/decreased intensity.
        const DIM           = 0x02;
        /// Italic (not widely supported).
        const ITALIC        = 0x04;
        /// Underlined text.
        const UNDERLINE     = 0x08;
        /// Swapped foreground/background.
        const INVERSE       = 0x10;
        /// Strikethrough text.
        const STRIKETHROUGH = 0x20;
    }
}

/// Complete text style: colors plus attributes.
///
/// `None` for a color means "use terminal default" rather than a specific
/// color, so styled text respects the user's terminal theme.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Style {
    /// Foreground color (None = terminal default).
    pub fg: Option<Rgba>,
    /// Background color (None = terminal default).
    pub bg: Option<Rgba>,
    /// Text rendering attributes.
    pub attributes: TextAttributes,
}

impl Style {
    /// Empty style with no colors or attributes.
    pub const NONE: Self = Self {
        fg: None,
        bg: None,
        attributes: TextAttributes::empty(),
    };

    /// Style with only a foreground color.
    #[must_use]
    pub const fn fg(color: Rgba) -> Self {
        Self {
            fg: Some(color),
            bg: None,
            attributes: TextAttributes::empty(),
        }
    }

    /// Style with only a background color.
    #[must_use]
    pub const fn bg(color: Rgba) -> Self {
        Self {
            fg: None,
            bg: Some(color),
            attributes: TextAttributes::empty(),
        }
    }

    /// Bold-only style.
    #[must_use]
    pub const fn bold() -> Self {
        Self {
            fg: None,
            bg: None,
            attributes: TextAttributes::BOLD,
        }
    }

    /// Dim-only style.
    #[must_use]
    pub const fn dim() -> Self {
        Self {
            fg: None,
            bg: None,
            attributes: TextAttributes::DIM,
        }
    }

    /// Return this style with a background color set.
    #[must_use]
    pub const fn with_bg(mut self, color: Rgba) -> Self {
        self.bg = Some(color);
        self
    }

    /// Return this style with the inverse attribute added.
    ///
    /// Selection highlights are drawn this way.
    #[must_use]
    pub fn with_inverse(mut self) -> Self {
        self.attributes |= TextAttributes::INVERSE;
        self
    }

    /// Merge styles: `other` takes precedence where set, attributes OR.
    #[must_use]
    pub fn merge(&self, other: Self) -> Self {
        Self {
            fg: other.fg.or(self.fg),
            bg: other.bg.or(self.bg),
            attributes: self.attributes | other.attributes,
        }
    }
}
