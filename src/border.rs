//! Border - the eight glyphs of a rectangular frame

/// Glyphs for the four edges and four corners of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Border {
    pub left: char,
    pub right: char,
    pub top: char,
    pub bottom: char,
    pub upper_left: char,
    pub upper_right: char,
    pub lower_left: char,
    pub lower_right: char,
}

/// Box-drawing glyphs used by [`Border::line`]
pub mod glyph {
    pub const VLINE: char = '│';
    pub const HLINE: char = '─';
    pub const ULCORNER: char = '┌';
    pub const URCORNER: char = '┐';
    pub const LLCORNER: char = '└';
    pub const LRCORNER: char = '┘';
}

impl Border {
    /// One glyph everywhere.
    pub const fn uniform(c: char) -> Self {
        Self::explicit(c, c, c, c, c, c, c, c)
    }

    /// Vertical edges, horizontal edges, and one glyph for all corners.
    pub const fn new(v: char, h: char, corner: char) -> Self {
        Self::explicit(v, v, h, h, corner, corner, corner, corner)
    }

    pub const fn with_corners(v: char, h: char, ul: char, ur: char, ll: char, lr: char) -> Self {
        Self::explicit(v, v, h, h, ul, ur, ll, lr)
    }

    #[allow(clippy::too_many_arguments)]
    pub const fn explicit(
        left: char,
        right: char,
        top: char,
        bottom: char,
        upper_left: char,
        upper_right: char,
        lower_left: char,
        lower_right: char,
    ) -> Self {
        Self {
            left,
            right,
            top,
            bottom,
            upper_left,
            upper_right,
            lower_left,
            lower_right,
        }
    }

    pub const fn blank() -> Self {
        Self::uniform(' ')
    }

    pub const fn line() -> Self {
        Self::with_corners(
            glyph::VLINE,
            glyph::HLINE,
            glyph::ULCORNER,
            glyph::URCORNER,
            glyph::LLCORNER,
            glyph::LRCORNER,
        )
    }

    /// The line border with its edges swapped for the given glyphs.
    pub const fn edges(v: char, h: char) -> Self {
        let line = Self::line();
        Self::with_corners(v, h, line.upper_left, line.upper_right, line.lower_left, line.lower_right)
    }

    /// Glyphs in curses `wborder` argument order.
    pub fn glyphs(&self) -> [char; 8] {
        [
            self.left,
            self.right,
            self.top,
            self.bottom,
            self.upper_left,
            self.upper_right,
            self.lower_left,
            self.lower_right,
        ]
    }
}

impl Default for Border {
    fn default() -> Self {
        Self::line()
    }
}
