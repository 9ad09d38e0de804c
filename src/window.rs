//! Window - an owned drawing surface
//!
//! A [`Window`] wraps one native surface together with the attributes its
//! next draw call will use. Every draw applies those attributes first, then
//! writes into the surface buffer. Nothing reaches the terminal until
//! [`Window::refresh`]: issue a batch of draws, then refresh once.
//!
//! # Ownership
//!
//! A window owns its surface and releases it exactly once, when dropped.
//! Windows cannot be cloned; moving one moves the responsibility with it.
//! The only non-owning window is the full-screen one inside [`Screen`],
//! whose surface belongs to the session.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use tracing::{debug, warn};

use crate::attr::Attr;
use crate::backend::{Backend, SurfaceId};
use crate::border::Border;
use crate::error::{check, Error, Result};
use crate::geom::{Coord, Rect};
use crate::key::Key;
use crate::screen::Screen;

/// Shared handle onto the session's native service
#[derive(Clone)]
pub(crate) struct Native(Rc<RefCell<dyn Backend>>);

impl Native {
    pub(crate) fn new<B: Backend + 'static>(backend: B) -> Self {
        Native(Rc::new(RefCell::new(backend)))
    }

    pub(crate) fn call<R>(&self, f: impl FnOnce(&mut dyn Backend) -> R) -> R {
        f(&mut *self.0.borrow_mut())
    }

    pub(crate) fn query<R>(&self, f: impl FnOnce(&dyn Backend) -> R) -> R {
        f(&*self.0.borrow())
    }
}

/// A rectangular drawing surface and its pending attributes
pub struct Window {
    native: Native,
    id: SurfaceId,
    owns: bool,
    attr: Attr,
}

impl Window {
    /// Wrap an existing surface, picking up its current attributes.
    pub(crate) fn wrap(native: Native, id: SurfaceId, owns: bool) -> Self {
        let attr = native.query(|b| b.attr_get(id));
        Self { native, id, owns, attr }
    }

    /// Allocate a new window of the given size at (row, col).
    pub fn create(screen: &Screen, height: u16, width: u16, row: u16, col: u16) -> Result<Window> {
        let native = screen.native().clone();
        let id = native
            .call(|b| b.new_surface(height, width, row, col))
            .ok_or(Error::Operation)?;
        debug!("window {:?}: {}x{} at ({},{})", id, height, width, row, col);
        Ok(Self::wrap(native, id, true))
    }

    /// Allocate a new window covering `bounds`.
    pub fn create_in(screen: &Screen, bounds: Rect) -> Result<Window> {
        let tl = bounds.top_left();
        Self::create(screen, bounds.height(), bounds.width(), tl.row, tl.col)
    }

    pub(crate) fn native(&self) -> &Native {
        &self.native
    }

    pub fn id(&self) -> SurfaceId {
        self.id
    }

    pub fn width(&self) -> u16 {
        self.native.query(|b| b.max_yx(self.id)).1
    }

    pub fn height(&self) -> u16 {
        self.native.query(|b| b.max_yx(self.id)).0
    }

    /// Screen position of the top-left cell
    pub fn beg(&self) -> Coord {
        self.native.query(|b| b.beg_yx(self.id)).into()
    }

    /// Cursor position within the window
    pub fn cur(&self) -> Coord {
        self.native.query(|b| b.cur_yx(self.id)).into()
    }

    // ─── Drawing ────────────────────────────────────────────────────────

    fn apply_attr(&self) -> Result<()> {
        check(self.native.call(|b| b.attr_set(self.id, self.attr)))
    }

    /// Write `text` at the cursor.
    pub fn print(&mut self, text: &str) -> Result<()> {
        self.apply_attr()?;
        check(self.native.call(|b| b.add_str(self.id, text)))
    }

    pub fn print_at(&mut self, text: &str, row: u16, col: u16) -> Result<()> {
        self.apply_attr()?;
        check(self.native.call(|b| b.mv_add_str(self.id, row, col, text)))
    }

    /// Frame with the given edge glyphs and the default corners.
    pub fn draw_box(&mut self, v: char, h: char) -> Result<()> {
        self.apply_attr()?;
        check(self.native.call(|b| b.draw_box(self.id, v, h)))
    }

    pub fn border(&mut self, border: &Border) -> Result<()> {
        self.apply_attr()?;
        check(self.native.call(|b| b.border(self.id, border)))
    }

    pub fn hline(&mut self, glyph: char, start: Coord, len: u16) -> Result<()> {
        self.apply_attr()?;
        check(self.native.call(|b| b.mv_hline(self.id, start.row, start.col, glyph, len)))
    }

    /// Cover the interior, inside a one-cell border margin, with `glyph`.
    pub fn fill(&mut self, glyph: char) -> Result<()> {
        let height = self.height();
        let width = self.width().saturating_sub(2);
        for row in 1..height.saturating_sub(1) {
            self.hline(glyph, Coord::new(row, 1), width)?;
        }
        Ok(())
    }

    pub fn addch_at(&mut self, glyph: char, pos: Coord) -> Result<()> {
        self.apply_attr()?;
        check(self.native.call(|b| b.mv_add_ch(self.id, pos.row, pos.col, glyph)))
    }

    pub fn addch(&mut self, glyph: char) -> Result<()> {
        self.apply_attr()?;
        check(self.native.call(|b| b.add_ch(self.id, glyph)))
    }

    pub fn move_to(&mut self, pos: Coord) -> Result<()> {
        check(self.native.call(|b| b.move_cursor(self.id, pos.row, pos.col)))
    }

    /// Push everything drawn so far to the terminal.
    pub fn refresh(&mut self) -> Result<()> {
        check(self.native.call(|b| b.refresh(self.id)))
    }

    // ─── Attributes ─────────────────────────────────────────────────────

    /// Attributes the next draw call will apply
    pub fn attrs(&mut self) -> &mut Attr {
        &mut self.attr
    }

    pub fn attr(&self) -> Attr {
        self.attr
    }

    // ─── Input ──────────────────────────────────────────────────────────

    /// Block until the next key arrives.
    pub fn getch(&mut self) -> Result<Key> {
        self.native.call(|b| b.get_key(self.id)).ok_or(Error::Operation)
    }

    /// Decode special keys into single codes instead of raw escape bytes.
    pub fn keypad(&mut self, enable: bool) -> Result<()> {
        check(self.native.call(|b| b.keypad(self.id, enable)))
    }
}

impl fmt::Debug for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Window")
            .field("id", &self.id)
            .field("owns", &self.owns)
            .field("attr", &self.attr)
            .finish()
    }
}

impl Drop for Window {
    fn drop(&mut self) {
        if !self.owns {
            return;
        }
        if self.native.call(|b| b.del_surface(self.id)).is_ok() {
            debug!("window {:?} released", self.id);
        } else {
            warn!("failed to release window {:?}", self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attr::{Color, Colors};
    use crate::backend::{Call, RecordingBackend};
    use crate::screen::InputMode;

    fn screen() -> (Screen, crate::backend::CallLog) {
        let backend = RecordingBackend::new();
        let log = backend.log();
        let screen = Screen::with_backend(backend, InputMode::Cbreak, true, false).unwrap();
        (screen, log)
    }

    #[test]
    fn test_create_and_query() {
        let (screen, _log) = screen();
        let mut win = Window::create(&screen, 5, 20, 2, 3).unwrap();
        assert_eq!(win.height(), 5);
        assert_eq!(win.width(), 20);
        assert_eq!(win.beg(), Coord::new(2, 3));
        assert_eq!(win.cur(), Coord::new(0, 0));

        win.print_at("abc", 1, 4).unwrap();
        assert_eq!(win.cur(), Coord::new(1, 7));
    }

    #[test]
    fn test_create_in_rect() {
        let (screen, log) = screen();
        let bounds = Rect::new(Coord::new(1, 2), Coord::new(4, 12)).unwrap();
        let win = Window::create_in(&screen, bounds).unwrap();
        assert_eq!((win.height(), win.width()), (3, 10));
        assert!(log
            .calls()
            .contains(&Call::NewSurface { height: 3, width: 10, row: 1, col: 2 }));
    }

    #[test]
    fn test_create_out_of_range_fails() {
        let (screen, _log) = screen();
        let err = Window::create(&screen, 10, 10, 20, 0).unwrap_err();
        assert_eq!(err, Error::Operation);
    }

    #[test]
    fn test_drop_releases_once() {
        let (screen, log) = screen();
        let win = Window::create(&screen, 3, 3, 0, 0).unwrap();
        let id = win.id();
        assert_eq!(log.live_surfaces(), 2);

        let moved = win;
        drop(moved);
        assert_eq!(log.live_surfaces(), 1);
        let releases = log.calls().iter().filter(|c| **c == Call::DelSurface(id)).count();
        assert_eq!(releases, 1);
    }

    #[test]
    fn test_draw_applies_attr_first() {
        let (screen, log) = screen();
        let mut win = Window::create(&screen, 3, 10, 0, 0).unwrap();
        win.attrs().color(2).reverse(true);
        log.clear();

        win.addch_at('@', Coord::new(1, 1)).unwrap();
        let expected = *Attr::normal().color(2).reverse(true);
        assert_eq!(
            log.calls(),
            vec![
                Call::AttrSet(win.id(), expected),
                Call::MvAddCh { surface: win.id(), row: 1, col: 1, ch: '@' },
            ]
        );
        assert_eq!(log.cell_attr(win.id(), 1, 1), Some(expected));
    }

    #[test]
    fn test_print_out_of_bounds_is_operation_fault() {
        let (screen, _log) = screen();
        let mut win = Window::create(&screen, 3, 10, 0, 0).unwrap();
        assert_eq!(win.print_at("x", 3, 0), Err(Error::Operation));
        assert_eq!(win.addch_at('x', Coord::new(0, 10)), Err(Error::Operation));
    }

    #[test]
    fn test_print_at_cursor() {
        let (screen, log) = screen();
        let mut win = Window::create(&screen, 3, 10, 0, 0).unwrap();
        win.move_to(Coord::new(2, 1)).unwrap();
        win.print("hi").unwrap();
        win.addch('!').unwrap();
        assert_eq!(log.row_text(win.id(), 2).unwrap(), " hi!      ");
    }

    #[test]
    fn test_fill_interior() {
        let (screen, log) = screen();
        let mut win = Window::create(&screen, 4, 6, 0, 0).unwrap();
        win.border(&Border::line()).unwrap();
        win.fill('#').unwrap();
        assert_eq!(log.row_text(win.id(), 0).unwrap(), "┌────┐");
        assert_eq!(log.row_text(win.id(), 1).unwrap(), "│####│");
        assert_eq!(log.row_text(win.id(), 2).unwrap(), "│####│");
        assert_eq!(log.row_text(win.id(), 3).unwrap(), "└────┘");
    }

    #[test]
    fn test_fill_tiny_window_is_noop() {
        let (screen, log) = screen();
        let mut win = Window::create(&screen, 1, 1, 0, 0).unwrap();
        log.clear();
        win.fill('#').unwrap();
        assert!(log.calls().is_empty());
    }

    #[test]
    fn test_draw_box() {
        let (screen, log) = screen();
        let mut win = Window::create(&screen, 3, 4, 0, 0).unwrap();
        win.draw_box('|', '-').unwrap();
        assert_eq!(log.row_text(win.id(), 0).unwrap(), "┌--┐");
        assert_eq!(log.row_text(win.id(), 1).unwrap(), "|  |");
    }

    #[test]
    fn test_colored_hline() {
        let (mut screen, log) = screen();
        let mut cs = Colors::new();
        cs.add_pair(Color::Green, Color::Black).unwrap();
        screen.set_colors(cs).unwrap();

        let mut win = Window::create(&screen, 3, 10, 0, 0).unwrap();
        win.attrs().color(1);
        win.hline('.', Coord::new(1, 2), 3).unwrap();
        assert_eq!(log.row_text(win.id(), 1).unwrap(), "  ...     ");
        assert_eq!(log.cell_attr(win.id(), 1, 2).map(|a| a.pair()), Some(1));
        assert_eq!(log.cell_attr(win.id(), 1, 5).map(|a| a.pair()), Some(0));
    }

    #[test]
    fn test_getch_and_keypad() {
        let backend = RecordingBackend::new().with_keys([Key::Left, Key::Char('q')]);
        let log = backend.log();
        let screen = Screen::with_backend(backend, InputMode::Raw, false, false).unwrap();
        let mut win = Window::create(&screen, 3, 10, 0, 0).unwrap();

        win.keypad(true).unwrap();
        assert_eq!(log.keypad(win.id()), Some(true));
        assert_eq!(win.getch(), Ok(Key::Left));
        assert_eq!(win.getch(), Ok(Key::Char('q')));
        assert_eq!(win.getch(), Err(Error::Operation));
    }

    #[test]
    fn test_refresh_failure() {
        let backend = RecordingBackend::new().fail_when(|c| matches!(c, Call::Refresh(_)));
        let screen = Screen::with_backend(backend, InputMode::Cbreak, true, false).unwrap();
        let mut win = Window::create(&screen, 3, 10, 0, 0).unwrap();
        assert_eq!(win.refresh(), Err(Error::Operation));
    }
}
