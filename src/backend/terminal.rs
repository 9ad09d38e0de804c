//! Terminal backend using crossterm
//!
//! Surfaces live in memory; `refresh` paints one surface onto the alternate
//! screen at its position. Later refreshes paint over earlier ones, the same
//! way overlapping curses windows behave.
//!
//! # Input modes
//!
//! crossterm only knows raw and cooked mode. cbreak is raw mode with signal
//! generation switched back on through termios, so Ctrl+C still interrupts;
//! raw switches it off again. termios is applied to the same terminal
//! crossterm uses, `/dev/tty` when stdin is redirected.
//! Echo is done here rather than by the tty: a typed character is drawn into
//! the surface being read from, as curses does.

use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};

use crossterm::{
    cursor::{MoveTo, Show},
    event::{self, Event, KeyEventKind},
    queue,
    style::{
        available_color_count, Attribute, Color as CtColor, Print, ResetColor,
        SetAttribute, SetBackgroundColor, SetForegroundColor,
    },
    terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen},
};
use tracing::{debug, warn};

use super::surface::{Surface, Surfaces};
use super::{Backend, Status, SurfaceId};
use crate::attr::{Attr, Color, ColorPair, Modifiers, PairIndex};
use crate::border::Border;
use crate::key::{Key, KeyMapper};

/// The physical terminal is process-wide; only one session may drive it.
static SESSION_ACTIVE: AtomicBool = AtomicBool::new(false);

impl Color {
    /// Convert to crossterm Color
    pub fn to_crossterm(self) -> CtColor {
        CtColor::AnsiValue(self.number())
    }
}

/// [`Backend`] driving the real terminal through crossterm
pub struct TerminalBackend {
    surfaces: Surfaces,
    /// Surfaces drawn to since their last refresh
    dirty: BTreeSet<SurfaceId>,
    active: bool,
    raw: bool,
    cbreak: bool,
    echo: bool,
    color_started: bool,
    pairs: BTreeMap<PairIndex, (Color, Color)>,
    /// Keys decoded from one event but not yet returned
    pending: VecDeque<Key>,
}

impl Default for TerminalBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl TerminalBackend {
    pub fn new() -> Self {
        Self {
            surfaces: Surfaces::default(),
            dirty: BTreeSet::new(),
            active: false,
            raw: false,
            cbreak: false,
            echo: true,
            color_started: false,
            pairs: BTreeMap::new(),
            pending: VecDeque::new(),
        }
    }

    fn enter_screen(&mut self) -> io::Result<SurfaceId> {
        let (cols, rows) = terminal::size()?;
        let mut stdout = io::stdout();
        queue!(stdout, EnterAlternateScreen, Clear(ClearType::All), MoveTo(0, 0))?;
        stdout.flush()?;

        self.surfaces = Surfaces::new(rows, cols);
        self.surfaces
            .allocate(rows, cols, 0, 0)
            .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "empty terminal"))
    }

    fn leave_screen(&mut self) -> io::Result<()> {
        let mut stdout = io::stdout();
        queue!(stdout, SetAttribute(Attribute::Reset), ResetColor, Show, LeaveAlternateScreen)?;
        stdout.flush()?;
        terminal::disable_raw_mode()
    }

    /// Bring the tty in line with the raw/cbreak flags.
    fn apply_mode(&self) -> io::Result<()> {
        if self.raw || self.cbreak {
            // enable_raw_mode is a no-op when already raw, so ISIG is set
            // explicitly on every transition
            terminal::enable_raw_mode()?;
            set_signals(!self.raw)
        } else {
            terminal::disable_raw_mode()
        }
    }

    /// Run a drawing primitive on a live surface and mark it for refresh.
    fn draw(&mut self, id: SurfaceId, f: impl FnOnce(&mut Surface) -> Status) -> Status {
        if !self.active {
            return Status::Err;
        }
        self.dirty.insert(id);
        self.surfaces.with(id, f)
    }

    fn paint(&self, surface: &Surface) -> io::Result<()> {
        let mut stdout = io::stdout().lock();
        let (top, left) = surface.beg;
        let mut current: Option<Attr> = None;

        for row in 0..surface.height {
            queue!(stdout, MoveTo(left, top + row))?;
            for cell in surface.row_cells(row) {
                if current != Some(cell.attr) {
                    self.apply_attr(&mut stdout, cell.attr)?;
                    current = Some(cell.attr);
                }
                queue!(stdout, Print(cell.ch))?;
            }
        }

        let (cur_row, cur_col) = surface.cursor;
        queue!(
            stdout,
            SetAttribute(Attribute::Reset),
            ResetColor,
            MoveTo(left + cur_col, top + cur_row)
        )?;
        stdout.flush()
    }

    /// Apply cell attributes
    fn apply_attr<W: Write>(&self, out: &mut W, attr: Attr) -> io::Result<()> {
        queue!(out, SetAttribute(Attribute::Reset), ResetColor)?;

        if let Some((fg, bg)) = self.pairs.get(&attr.pair()) {
            queue!(
                out,
                SetForegroundColor(fg.to_crossterm()),
                SetBackgroundColor(bg.to_crossterm())
            )?;
        }

        let mods = attr.modifiers();
        if mods.contains(Modifiers::REVERSE) {
            queue!(out, SetAttribute(Attribute::Reverse))?;
        }
        if mods.contains(Modifiers::BOLD) {
            queue!(out, SetAttribute(Attribute::Bold))?;
        }
        if mods.contains(Modifiers::UNDERLINE) {
            queue!(out, SetAttribute(Attribute::Underlined))?;
        }
        if mods.contains(Modifiers::DIM) {
            queue!(out, SetAttribute(Attribute::Dim))?;
        }
        if mods.contains(Modifiers::BLINK) {
            queue!(out, SetAttribute(Attribute::SlowBlink))?;
        }
        Ok(())
    }

    /// Block until a key event maps to at least one key.
    fn read_key(&mut self, keypad: bool) -> io::Result<Key> {
        if let Some(key) = self.pending.pop_front() {
            return Ok(key);
        }
        loop {
            if let Event::Key(ev) = event::read()? {
                if ev.kind == KeyEventKind::Release {
                    continue;
                }
                let mut keys = KeyMapper::map(&ev, keypad).into_iter();
                if let Some(first) = keys.next() {
                    self.pending.extend(keys);
                    return Ok(first);
                }
            }
        }
    }
}

impl Backend for TerminalBackend {
    fn init(&mut self) -> Option<SurfaceId> {
        if SESSION_ACTIVE.swap(true, Ordering::SeqCst) {
            return None;
        }
        match self.enter_screen() {
            Ok(id) => {
                self.active = true;
                debug!("terminal session started ({:?})", self.surfaces.screen);
                Some(id)
            }
            Err(e) => {
                debug!("terminal init failed: {}", e);
                SESSION_ACTIVE.store(false, Ordering::SeqCst);
                None
            }
        }
    }

    fn end(&mut self) -> Status {
        if !self.active {
            return Status::Err;
        }
        self.active = false;
        self.raw = false;
        self.cbreak = false;
        self.pending.clear();
        let result = self.leave_screen();
        SESSION_ACTIVE.store(false, Ordering::SeqCst);
        Status::from_bool(result.is_ok())
    }

    fn new_surface(&mut self, height: u16, width: u16, row: u16, col: u16) -> Option<SurfaceId> {
        if !self.active {
            return None;
        }
        self.surfaces.allocate(height, width, row, col)
    }

    fn del_surface(&mut self, id: SurfaceId) -> Status {
        self.dirty.remove(&id);
        self.surfaces.release(id)
    }

    fn max_yx(&self, id: SurfaceId) -> (u16, u16) {
        self.surfaces.query(id, |s| (s.height, s.width))
    }

    fn beg_yx(&self, id: SurfaceId) -> (u16, u16) {
        self.surfaces.query(id, |s| s.beg)
    }

    fn cur_yx(&self, id: SurfaceId) -> (u16, u16) {
        self.surfaces.query(id, |s| s.cursor)
    }

    fn move_cursor(&mut self, id: SurfaceId, row: u16, col: u16) -> Status {
        self.draw(id, |s| s.move_to(row, col))
    }

    fn attr_get(&self, id: SurfaceId) -> Attr {
        self.surfaces.get(id).map(|s| s.attr).unwrap_or_default()
    }

    fn attr_set(&mut self, id: SurfaceId, attr: Attr) -> Status {
        if !self.active {
            return Status::Err;
        }
        self.surfaces.with(id, |s| {
            s.attr = attr;
            Status::Ok
        })
    }

    fn add_str(&mut self, id: SurfaceId, text: &str) -> Status {
        self.draw(id, |s| s.add_str(text))
    }

    fn mv_add_str(&mut self, id: SurfaceId, row: u16, col: u16, text: &str) -> Status {
        self.draw(id, |s| {
            if !s.move_to(row, col).is_ok() {
                return Status::Err;
            }
            s.add_str(text)
        })
    }

    fn add_ch(&mut self, id: SurfaceId, ch: char) -> Status {
        self.draw(id, |s| s.put(ch))
    }

    fn mv_add_ch(&mut self, id: SurfaceId, row: u16, col: u16, ch: char) -> Status {
        self.draw(id, |s| {
            if !s.move_to(row, col).is_ok() {
                return Status::Err;
            }
            s.put(ch)
        })
    }

    fn draw_box(&mut self, id: SurfaceId, v: char, h: char) -> Status {
        self.draw(id, |s| s.border(&Border::edges(v, h)))
    }

    fn border(&mut self, id: SurfaceId, border: &Border) -> Status {
        self.draw(id, |s| s.border(border))
    }

    fn mv_hline(&mut self, id: SurfaceId, row: u16, col: u16, ch: char, len: u16) -> Status {
        self.draw(id, |s| s.hline(row, col, ch, len))
    }

    fn refresh(&mut self, id: SurfaceId) -> Status {
        if !self.active {
            return Status::Err;
        }
        let Some(surface) = self.surfaces.get(id) else {
            return Status::Err;
        };
        let result = self.paint(surface);
        self.dirty.remove(&id);
        Status::from_bool(result.is_ok())
    }

    fn get_key(&mut self, id: SurfaceId) -> Option<Key> {
        if !self.active {
            return None;
        }
        let keypad = self.surfaces.get(id)?.keypad;
        // curses refreshes a touched window before reading from it
        if self.dirty.contains(&id) && !self.refresh(id).is_ok() {
            return None;
        }

        let key = self.read_key(keypad).ok()?;
        if self.echo {
            if let Key::Char(ch) = key {
                if !ch.is_control() && !(self.add_ch(id, ch).is_ok() && self.refresh(id).is_ok()) {
                    warn!("echo of {:?} into {:?} failed", ch, id);
                }
            }
        }
        Some(key)
    }

    fn keypad(&mut self, id: SurfaceId, enable: bool) -> Status {
        self.surfaces.with(id, |s| {
            s.keypad = enable;
            Status::Ok
        })
    }

    fn raw(&mut self, enable: bool) -> Status {
        if !self.active {
            return Status::Err;
        }
        // raw implies character-at-a-time input; leaving it keeps cbreak
        self.raw = enable;
        if enable {
            self.cbreak = true;
        }
        Status::from_bool(self.apply_mode().is_ok())
    }

    fn cbreak(&mut self, enable: bool) -> Status {
        if !self.active {
            return Status::Err;
        }
        // Either way raw mode is left, as ncurses does
        self.cbreak = enable;
        self.raw = false;
        Status::from_bool(self.apply_mode().is_ok())
    }

    fn echo(&mut self, enable: bool) -> Status {
        if !self.active {
            return Status::Err;
        }
        self.echo = enable;
        Status::Ok
    }

    fn has_colors(&self) -> bool {
        available_color_count() >= 8
    }

    fn start_color(&mut self) -> Status {
        if !self.active || !self.has_colors() {
            return Status::Err;
        }
        self.color_started = true;
        Status::Ok
    }

    fn init_pair(&mut self, pair: &ColorPair) -> Status {
        if !self.color_started || pair.index == 0 {
            return Status::Err;
        }
        self.pairs.insert(pair.index, (pair.fg, pair.bg));
        Status::Ok
    }

    fn has_key(&self, key: Key) -> bool {
        key.is_special()
    }
}

impl Drop for TerminalBackend {
    fn drop(&mut self) {
        if self.active {
            let _ = self.end();
        }
    }
}

/// Check whether stdin is connected to a terminal.
#[cfg(unix)]
fn is_tty() -> bool {
    // SAFETY: isatty only inspects the descriptor.
    unsafe { libc::isatty(libc::STDIN_FILENO) != 0 }
}

/// Run `f` on the terminal crossterm drives: stdin when it is a tty,
/// otherwise the controlling terminal.
#[cfg(unix)]
fn with_tty_fd<R>(f: impl FnOnce(libc::c_int) -> io::Result<R>) -> io::Result<R> {
    use std::os::unix::io::AsRawFd;

    if is_tty() {
        return f(libc::STDIN_FILENO);
    }
    let tty = std::fs::OpenOptions::new().read(true).write(true).open("/dev/tty")?;
    f(tty.as_raw_fd())
}

/// Switch ISIG on top of raw mode: on for cbreak, off for raw.
#[cfg(unix)]
fn set_signals(on: bool) -> io::Result<()> {
    with_tty_fd(|fd| {
        // SAFETY: termios is plain data; tcgetattr fills it before it is read.
        unsafe {
            let mut tio: libc::termios = std::mem::zeroed();
            if libc::tcgetattr(fd, &mut tio) != 0 {
                return Err(io::Error::last_os_error());
            }
            if on {
                tio.c_lflag |= libc::ISIG;
            } else {
                tio.c_lflag &= !libc::ISIG;
            }
            if libc::tcsetattr(fd, libc::TCSANOW, &tio) != 0 {
                return Err(io::Error::last_os_error());
            }
        }
        Ok(())
    })
}

#[cfg(not(unix))]
fn set_signals(_on: bool) -> io::Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inactive_backend_rejects_calls() {
        let mut b = TerminalBackend::new();
        assert!(b.new_surface(1, 1, 0, 0).is_none());
        assert_eq!(b.end(), Status::Err);
        assert_eq!(b.raw(true), Status::Err);
        assert_eq!(b.refresh(SurfaceId(0)), Status::Err);
        assert!(b.get_key(SurfaceId(0)).is_none());
        assert_eq!(b.max_yx(SurfaceId(0)), (0, 0));
    }

    #[test]
    fn test_init_pair_requires_start_color() {
        let mut b = TerminalBackend::new();
        let pair = ColorPair { index: 1, fg: Color::Red, bg: Color::Black };
        assert_eq!(b.init_pair(&pair), Status::Err);
    }

    #[test]
    fn test_color_conversion() {
        assert_eq!(Color::Red.to_crossterm(), CtColor::AnsiValue(1));
        assert_eq!(Color::White.to_crossterm(), CtColor::AnsiValue(7));
    }

    #[test]
    fn test_has_key_is_special_only() {
        let b = TerminalBackend::new();
        assert!(b.has_key(Key::Up));
        assert!(b.has_key(Key::F(3)));
        assert!(!b.has_key(Key::Char('x')));
    }

    #[cfg(unix)]
    fn signals_enabled() -> bool {
        with_tty_fd(|fd| {
            // SAFETY: as in set_signals
            unsafe {
                let mut tio: libc::termios = std::mem::zeroed();
                if libc::tcgetattr(fd, &mut tio) != 0 {
                    return Err(io::Error::last_os_error());
                }
                Ok(tio.c_lflag & libc::ISIG != 0)
            }
        })
        .unwrap()
    }

    #[cfg(unix)]
    #[test]
    fn test_signals_follow_controlling_tty() {
        // Works with stdin redirected as long as a controlling terminal exists
        if !is_tty() && std::fs::File::open("/dev/tty").is_err() {
            return;
        }
        let before = signals_enabled();
        set_signals(before).unwrap();
        assert_eq!(signals_enabled(), before);
    }

    // The only test that starts a session: the guard is process-wide.
    #[cfg(unix)]
    #[test]
    fn test_input_modes_and_single_session_on_tty() {
        if !is_tty() {
            return;
        }
        let mut b = TerminalBackend::new();
        assert!(b.init().is_some());

        let mut second = TerminalBackend::new();
        assert!(second.init().is_none());

        assert!(b.cbreak(true).is_ok());
        assert_eq!((b.raw, b.cbreak), (false, true));
        assert!(terminal::is_raw_mode_enabled().unwrap());
        assert!(signals_enabled());

        assert!(b.raw(true).is_ok());
        assert_eq!((b.raw, b.cbreak), (true, true));
        assert!(!signals_enabled());

        assert!(b.cbreak(true).is_ok());
        assert_eq!((b.raw, b.cbreak), (false, true));
        assert!(signals_enabled());

        assert!(b.raw(true).is_ok());
        assert!(b.raw(false).is_ok());
        assert_eq!((b.raw, b.cbreak), (false, true));
        assert!(signals_enabled());

        // Line mode
        assert!(b.raw(false).is_ok());
        assert!(b.cbreak(false).is_ok());
        assert_eq!((b.raw, b.cbreak), (false, false));
        assert!(!terminal::is_raw_mode_enabled().unwrap());

        assert!(b.end().is_ok());
        let mut third = TerminalBackend::new();
        assert!(third.init().is_some());
        assert!(third.end().is_ok());
    }
}
