//! Native terminal-control service.
//!
//! This module defines the curses-shaped service the rest of the crate is
//! written against:
//!
//! - **Backend**: the trait itself, one method per native primitive
//! - **terminal**: the real implementation on top of crossterm
//! - **recording**: an in-memory implementation that logs every call
//!
//! # Failure signaling
//!
//! Fallible primitives return the [`Status::Err`] sentinel, or `None` when
//! they would produce a handle. Nothing above [`crate::window`] ever sees a
//! sentinel: [`crate::error::check`] turns it into an operation fault.
//!
//! # Surfaces
//!
//! A surface is a rectangular drawing area with its own cursor, attributes
//! and keypad flag. Draws land in the surface's buffer; `refresh` pushes the
//! buffer to the physical terminal.

pub mod recording;
mod surface;
pub mod terminal;

pub use recording::{Call, CallLog, RecordingBackend};
pub use terminal::TerminalBackend;

use crate::attr::{Attr, ColorPair};
use crate::border::Border;
use crate::key::Key;

/// Handle to a native surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SurfaceId(pub u32);

/// Result of a fallible native primitive
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok,
    Err,
}

impl Status {
    pub fn from_bool(ok: bool) -> Self {
        if ok {
            Status::Ok
        } else {
            Status::Err
        }
    }

    pub fn is_ok(self) -> bool {
        self == Status::Ok
    }
}

/// The primitives consumed by windows and the screen session.
///
/// Dimension and position queries return `(row, col)` pairs and `(0, 0)`
/// for a surface that does not exist.
pub trait Backend {
    /// Start the terminal subsystem and return the full-screen surface.
    fn init(&mut self) -> Option<SurfaceId>;

    /// Restore the terminal to its pre-session state.
    fn end(&mut self) -> Status;

    /// Allocate a surface. A zero height or width extends to the screen edge.
    fn new_surface(&mut self, height: u16, width: u16, row: u16, col: u16) -> Option<SurfaceId>;

    fn del_surface(&mut self, id: SurfaceId) -> Status;

    /// Surface size as `(height, width)`
    fn max_yx(&self, id: SurfaceId) -> (u16, u16);

    /// Screen position of the surface's top-left cell
    fn beg_yx(&self, id: SurfaceId) -> (u16, u16);

    fn cur_yx(&self, id: SurfaceId) -> (u16, u16);

    fn move_cursor(&mut self, id: SurfaceId, row: u16, col: u16) -> Status;

    fn attr_get(&self, id: SurfaceId) -> Attr;

    fn attr_set(&mut self, id: SurfaceId, attr: Attr) -> Status;

    fn add_str(&mut self, id: SurfaceId, text: &str) -> Status;

    fn mv_add_str(&mut self, id: SurfaceId, row: u16, col: u16, text: &str) -> Status;

    fn add_ch(&mut self, id: SurfaceId, ch: char) -> Status;

    fn mv_add_ch(&mut self, id: SurfaceId, row: u16, col: u16, ch: char) -> Status;

    /// Frame with the given edge glyphs and default corners
    fn draw_box(&mut self, id: SurfaceId, v: char, h: char) -> Status;

    fn border(&mut self, id: SurfaceId, border: &Border) -> Status;

    fn mv_hline(&mut self, id: SurfaceId, row: u16, col: u16, ch: char, len: u16) -> Status;

    fn refresh(&mut self, id: SurfaceId) -> Status;

    /// Block until a key is available. `None` signals failure.
    fn get_key(&mut self, id: SurfaceId) -> Option<Key>;

    fn keypad(&mut self, id: SurfaceId, enable: bool) -> Status;

    fn raw(&mut self, enable: bool) -> Status;

    fn cbreak(&mut self, enable: bool) -> Status;

    fn echo(&mut self, enable: bool) -> Status;

    fn has_colors(&self) -> bool;

    fn start_color(&mut self) -> Status;

    fn init_pair(&mut self, pair: &ColorPair) -> Status;

    /// Whether the terminal can deliver the given special key decoded
    fn has_key(&self, key: Key) -> bool;
}
