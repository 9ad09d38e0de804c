//! Geometry - terminal cell coordinates and rectangles

use std::fmt;

use crate::error::{ensure, Result};

/// A terminal cell, addressed by row then column.
///
/// The derived ordering is row-major: rows compare first, columns break ties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Coord {
    pub row: u16,
    pub col: u16,
}

impl Coord {
    pub const fn new(row: u16, col: u16) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.row, self.col)
    }
}

impl From<(u16, u16)> for Coord {
    fn from((row, col): (u16, u16)) -> Self {
        Self { row, col }
    }
}

/// A rectangle spanned by its top-left and bottom-right corners.
///
/// The top-left corner always strictly precedes the bottom-right one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rect {
    tl: Coord,
    br: Coord,
}

impl Rect {
    pub fn new(tl: Coord, br: Coord) -> Result<Self> {
        ensure(tl < br, "rect corners out of order")?;
        Ok(Self { tl, br })
    }

    /// Rectangle of the given size with its top-left corner at `origin`.
    pub fn from_size(origin: Coord, height: u16, width: u16) -> Result<Self> {
        let br = Coord::new(
            origin.row.saturating_add(height),
            origin.col.saturating_add(width),
        );
        Self::new(origin, br)
    }

    pub fn top_left(&self) -> Coord {
        self.tl
    }

    pub fn bottom_right(&self) -> Coord {
        self.br
    }

    /// Column span. Zero when the corners are ordered by row only.
    pub fn width(&self) -> u16 {
        self.br.col.saturating_sub(self.tl.col)
    }

    pub fn height(&self) -> u16 {
        self.br.row - self.tl.row
    }

    /// Whether `pos` lies inside the half-open span of the rectangle.
    pub fn contains(&self, pos: Coord) -> bool {
        (self.tl.row..self.br.row).contains(&pos.row) && (self.tl.col..self.br.col).contains(&pos.col)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use proptest::prelude::*;

    #[test]
    fn test_row_major_order() {
        assert!(Coord::new(2, 3) < Coord::new(2, 5));
        assert!(!(Coord::new(3, 0) < Coord::new(2, 999)));
        assert!(Coord::new(2, 999) < Coord::new(3, 0));
        assert_eq!(Coord::new(4, 4), Coord::new(4, 4));
        assert_ne!(Coord::new(4, 4), Coord::new(4, 5));
    }

    #[test]
    fn test_rect_dimensions() {
        let r = Rect::new(Coord::new(0, 0), Coord::new(5, 10)).unwrap();
        assert_eq!(r.width(), 10);
        assert_eq!(r.height(), 5);
    }

    #[test]
    fn test_rect_rejects_unordered_corners() {
        let same = Rect::new(Coord::new(5, 5), Coord::new(5, 5));
        assert!(matches!(same, Err(Error::Assertion(_))));

        let reversed = Rect::new(Coord::new(5, 5), Coord::new(2, 2));
        assert!(matches!(reversed, Err(Error::Assertion(_))));
    }

    #[test]
    fn test_rect_row_ordered_only() {
        // Valid under row-major order even though the columns go backwards
        let r = Rect::new(Coord::new(0, 8), Coord::new(3, 2)).unwrap();
        assert_eq!(r.height(), 3);
        assert_eq!(r.width(), 0);
    }

    #[test]
    fn test_from_size_and_contains() {
        let r = Rect::from_size(Coord::new(10, 0), 3, 80).unwrap();
        assert_eq!(r.bottom_right(), Coord::new(13, 80));
        assert!(r.contains(Coord::new(10, 0)));
        assert!(r.contains(Coord::new(12, 79)));
        assert!(!r.contains(Coord::new(13, 0)));
        assert!(!r.contains(Coord::new(11, 80)));
        assert!(Rect::from_size(Coord::new(1, 1), 0, 0).is_err());
    }

    fn coord() -> impl Strategy<Value = Coord> {
        (0u16..50, 0u16..50).prop_map(|(r, c)| Coord::new(r, c))
    }

    proptest! {
        #[test]
        fn prop_order_is_irreflexive(a in coord()) {
            prop_assert!(!(a < a));
        }

        #[test]
        fn prop_order_is_transitive(a in coord(), b in coord(), c in coord()) {
            if a < b && b < c {
                prop_assert!(a < c);
            }
        }

        #[test]
        fn prop_order_is_total(a in coord(), b in coord()) {
            let count = [a < b, b < a, a == b].iter().filter(|x| **x).count();
            prop_assert_eq!(count, 1);
        }

        #[test]
        fn prop_order_is_row_major(a in coord(), b in coord()) {
            let expected = a.row < b.row || (a.row == b.row && a.col < b.col);
            prop_assert_eq!(a < b, expected);
        }

        #[test]
        fn prop_rect_accepts_exactly_ordered_corners(a in coord(), b in coord()) {
            prop_assert_eq!(Rect::new(a, b).is_ok(), a < b);
        }
    }
}
