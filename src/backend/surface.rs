//! Surface buffers shared by the backends
//!
//! Each surface keeps a grid of cells, a cursor and its current attributes,
//! following curses output rules: text wraps at the right edge, a newline
//! clears to the end of the line, and writing past the last cell fails.

use std::collections::BTreeMap;

use super::{Status, SurfaceId};
use crate::attr::Attr;
use crate::border::Border;

/// A single character cell
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Cell {
    pub ch: char,
    pub attr: Attr,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            ch: ' ',
            attr: Attr::normal(),
        }
    }
}

/// A rectangular drawing area
#[derive(Clone, Debug)]
pub(crate) struct Surface {
    /// Screen position (row, col)
    pub beg: (u16, u16),
    pub height: u16,
    pub width: u16,
    /// Cursor position (row, col) relative to the surface
    pub cursor: (u16, u16),
    pub attr: Attr,
    pub keypad: bool,
    cells: Vec<Cell>,
}

impl Surface {
    pub fn new(height: u16, width: u16, row: u16, col: u16) -> Self {
        Self {
            beg: (row, col),
            height,
            width,
            cursor: (0, 0),
            attr: Attr::normal(),
            keypad: false,
            cells: vec![Cell::default(); usize::from(height) * usize::from(width)],
        }
    }

    fn index(&self, row: u16, col: u16) -> usize {
        usize::from(row) * usize::from(self.width) + usize::from(col)
    }

    fn in_bounds(&self, row: u16, col: u16) -> bool {
        row < self.height && col < self.width
    }

    pub fn cell(&self, row: u16, col: u16) -> Option<Cell> {
        if self.in_bounds(row, col) {
            Some(self.cells[self.index(row, col)])
        } else {
            None
        }
    }

    pub fn row_text(&self, row: u16) -> String {
        (0..self.width)
            .filter_map(|col| self.cell(row, col))
            .map(|cell| cell.ch)
            .collect()
    }

    fn set(&mut self, row: u16, col: u16, ch: char) {
        let i = self.index(row, col);
        self.cells[i] = Cell { ch, attr: self.attr };
    }

    pub fn move_to(&mut self, row: u16, col: u16) -> Status {
        if !self.in_bounds(row, col) {
            return Status::Err;
        }
        self.cursor = (row, col);
        Status::Ok
    }

    /// Write one character at the cursor and advance it.
    pub fn put(&mut self, ch: char) -> Status {
        let (row, col) = self.cursor;
        if ch == '\n' {
            for c in col..self.width {
                self.set(row, c, ' ');
            }
            return self.advance_line();
        }

        self.set(row, col, ch);
        if col + 1 < self.width {
            self.cursor = (row, col + 1);
            Status::Ok
        } else {
            self.advance_line()
        }
    }

    fn advance_line(&mut self) -> Status {
        let row = self.cursor.0;
        if row + 1 < self.height {
            self.cursor = (row + 1, 0);
            Status::Ok
        } else {
            // No scrolling: the cursor stays in the last cell
            self.cursor = (row, self.width.saturating_sub(1));
            Status::Err
        }
    }

    pub fn add_str(&mut self, text: &str) -> Status {
        for ch in text.chars() {
            if !self.put(ch).is_ok() {
                return Status::Err;
            }
        }
        Status::Ok
    }

    /// Horizontal run starting at (row, col), clipped to the right edge.
    ///
    /// The cursor moves to the start of the run.
    pub fn hline(&mut self, row: u16, col: u16, ch: char, len: u16) -> Status {
        if !self.move_to(row, col).is_ok() {
            return Status::Err;
        }
        let end = col.saturating_add(len).min(self.width);
        for c in col..end {
            self.set(row, c, ch);
        }
        Status::Ok
    }

    /// Frame along the outer cells. The cursor does not move.
    pub fn border(&mut self, b: &Border) -> Status {
        if self.height == 0 || self.width == 0 {
            return Status::Err;
        }
        let bottom = self.height - 1;
        let right = self.width - 1;

        for c in 1..right {
            self.set(0, c, b.top);
            self.set(bottom, c, b.bottom);
        }
        for r in 1..bottom {
            self.set(r, 0, b.left);
            self.set(r, right, b.right);
        }
        self.set(0, 0, b.upper_left);
        self.set(0, right, b.upper_right);
        self.set(bottom, 0, b.lower_left);
        self.set(bottom, right, b.lower_right);
        Status::Ok
    }

    /// Cells of one row, left to right.
    pub fn row_cells(&self, row: u16) -> impl Iterator<Item = Cell> + '_ {
        let start = self.index(row, 0);
        self.cells[start..start + usize::from(self.width)].iter().copied()
    }
}

/// The set of live surfaces of one terminal session
#[derive(Debug, Default)]
pub(crate) struct Surfaces {
    /// Screen size (rows, cols)
    pub screen: (u16, u16),
    next_id: u32,
    surfaces: BTreeMap<SurfaceId, Surface>,
}

impl Surfaces {
    pub fn new(rows: u16, cols: u16) -> Self {
        Self {
            screen: (rows, cols),
            next_id: 0,
            surfaces: BTreeMap::new(),
        }
    }

    /// Allocate with curses `newwin` rules: zero extends to the screen edge,
    /// and the surface must lie entirely on screen.
    pub fn allocate(&mut self, height: u16, width: u16, row: u16, col: u16) -> Option<SurfaceId> {
        let (rows, cols) = self.screen;
        if row >= rows || col >= cols {
            return None;
        }
        let height = if height == 0 { rows - row } else { height };
        let width = if width == 0 { cols - col } else { width };
        if u32::from(row) + u32::from(height) > u32::from(rows)
            || u32::from(col) + u32::from(width) > u32::from(cols)
        {
            return None;
        }

        let id = SurfaceId(self.next_id);
        self.next_id += 1;
        self.surfaces.insert(id, Surface::new(height, width, row, col));
        Some(id)
    }

    pub fn release(&mut self, id: SurfaceId) -> Status {
        Status::from_bool(self.surfaces.remove(&id).is_some())
    }

    pub fn get(&self, id: SurfaceId) -> Option<&Surface> {
        self.surfaces.get(&id)
    }

    /// Run `f` on a live surface, failing for unknown ids.
    pub fn with(&mut self, id: SurfaceId, f: impl FnOnce(&mut Surface) -> Status) -> Status {
        match self.surfaces.get_mut(&id) {
            Some(surface) => f(surface),
            None => Status::Err,
        }
    }

    pub fn query(&self, id: SurfaceId, f: impl FnOnce(&Surface) -> (u16, u16)) -> (u16, u16) {
        self.surfaces.get(&id).map(f).unwrap_or((0, 0))
    }

    pub fn len(&self) -> usize {
        self.surfaces.len()
    }
}
