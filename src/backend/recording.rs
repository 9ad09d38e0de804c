//! Recording backend
//!
//! An in-memory terminal that records every native call it receives. It
//! keeps real surface buffers, so geometry queries, bounds failures and
//! drawn text behave as they would on a terminal, without touching one.
//!
//! The backend is moved into a [`crate::Screen`]; keep a [`CallLog`] handle
//! to inspect what happened afterwards.
//!
//! ```
//! use ncwin::backend::{Call, RecordingBackend};
//! use ncwin::{InputMode, Screen};
//!
//! let backend = RecordingBackend::new();
//! let log = backend.log();
//! let screen = Screen::with_backend(backend, InputMode::Raw, true, false)?;
//! assert_eq!(log.calls()[0], Call::Init);
//! assert_eq!(log.calls()[1], Call::Raw(true));
//! drop(screen);
//! assert_eq!(log.calls().last(), Some(&Call::End));
//! # Ok::<(), ncwin::Error>(())
//! ```

use std::cell::RefCell;
use std::collections::{BTreeMap, VecDeque};
use std::rc::Rc;

use tracing::warn;

use super::surface::Surfaces;
use super::{Backend, Status, SurfaceId};
use crate::attr::{Attr, Color, ColorPair, PairIndex};
use crate::border::Border;
use crate::key::Key;

/// One native call, with its arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Init,
    End,
    NewSurface { height: u16, width: u16, row: u16, col: u16 },
    DelSurface(SurfaceId),
    Move { surface: SurfaceId, row: u16, col: u16 },
    AttrSet(SurfaceId, Attr),
    AddStr { surface: SurfaceId, text: String },
    MvAddStr { surface: SurfaceId, row: u16, col: u16, text: String },
    AddCh { surface: SurfaceId, ch: char },
    MvAddCh { surface: SurfaceId, row: u16, col: u16, ch: char },
    Box { surface: SurfaceId, v: char, h: char },
    Border { surface: SurfaceId, glyphs: [char; 8] },
    MvHline { surface: SurfaceId, row: u16, col: u16, ch: char, len: u16 },
    Refresh(SurfaceId),
    GetKey(SurfaceId),
    Keypad { surface: SurfaceId, enable: bool },
    Raw(bool),
    Cbreak(bool),
    Echo(bool),
    StartColor,
    InitPair { index: PairIndex, fg: Color, bg: Color },
}

type FailWhen = Box<dyn Fn(&Call) -> bool>;

struct Inner {
    calls: Vec<Call>,
    surfaces: Surfaces,
    active: bool,
    colors: bool,
    special_keys: bool,
    color_started: bool,
    echo: bool,
    pairs: BTreeMap<PairIndex, (Color, Color)>,
    keys: VecDeque<Key>,
    fail_when: Option<FailWhen>,
}

impl Inner {
    /// Record a call and decide whether it may proceed.
    fn enter(&mut self, call: Call) -> bool {
        let fail = self.fail_when.as_ref().is_some_and(|f| f(&call));
        self.calls.push(call);
        !fail
    }

    fn live(&mut self, call: Call) -> bool {
        self.enter(call) && self.active
    }
}

/// In-memory [`Backend`] that logs every call
pub struct RecordingBackend {
    inner: Rc<RefCell<Inner>>,
}

impl Default for RecordingBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingBackend {
    /// A 24x80 color terminal with every special key available.
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(Inner {
                calls: Vec::new(),
                surfaces: Surfaces::new(24, 80),
                active: false,
                colors: true,
                special_keys: true,
                color_started: false,
                echo: true,
                pairs: BTreeMap::new(),
                keys: VecDeque::new(),
                fail_when: None,
            })),
        }
    }

    pub fn with_size(self, rows: u16, cols: u16) -> Self {
        self.inner.borrow_mut().surfaces.screen = (rows, cols);
        self
    }

    pub fn without_colors(self) -> Self {
        self.inner.borrow_mut().colors = false;
        self
    }

    /// Report every special key as unsupported.
    pub fn without_special_keys(self) -> Self {
        self.inner.borrow_mut().special_keys = false;
        self
    }

    /// Queue keys to be returned by blocking reads, in order.
    pub fn with_keys(self, keys: impl IntoIterator<Item = Key>) -> Self {
        self.inner.borrow_mut().keys.extend(keys);
        self
    }

    /// Make every call matching `pred` report failure. The call is still logged.
    pub fn fail_when(self, pred: impl Fn(&Call) -> bool + 'static) -> Self {
        self.inner.borrow_mut().fail_when = Some(Box::new(pred));
        self
    }

    /// A handle onto this backend's log that outlives the move into a screen.
    pub fn log(&self) -> CallLog {
        CallLog {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl Backend for RecordingBackend {
    fn init(&mut self) -> Option<SurfaceId> {
        let mut inner = self.inner.borrow_mut();
        if !inner.enter(Call::Init) || inner.active {
            return None;
        }
        inner.active = true;
        let (rows, cols) = inner.surfaces.screen;
        inner.surfaces.allocate(rows, cols, 0, 0)
    }

    fn end(&mut self) -> Status {
        let mut inner = self.inner.borrow_mut();
        if !inner.live(Call::End) {
            return Status::Err;
        }
        inner.active = false;
        inner.color_started = false;
        Status::Ok
    }

    fn new_surface(&mut self, height: u16, width: u16, row: u16, col: u16) -> Option<SurfaceId> {
        let mut inner = self.inner.borrow_mut();
        if !inner.live(Call::NewSurface { height, width, row, col }) {
            return None;
        }
        inner.surfaces.allocate(height, width, row, col)
    }

    fn del_surface(&mut self, id: SurfaceId) -> Status {
        // Releasing is allowed after the session has ended
        let mut inner = self.inner.borrow_mut();
        if !inner.enter(Call::DelSurface(id)) {
            return Status::Err;
        }
        inner.surfaces.release(id)
    }

    fn max_yx(&self, id: SurfaceId) -> (u16, u16) {
        self.inner.borrow().surfaces.query(id, |s| (s.height, s.width))
    }

    fn beg_yx(&self, id: SurfaceId) -> (u16, u16) {
        self.inner.borrow().surfaces.query(id, |s| s.beg)
    }

    fn cur_yx(&self, id: SurfaceId) -> (u16, u16) {
        self.inner.borrow().surfaces.query(id, |s| s.cursor)
    }

    fn move_cursor(&mut self, id: SurfaceId, row: u16, col: u16) -> Status {
        let mut inner = self.inner.borrow_mut();
        if !inner.live(Call::Move { surface: id, row, col }) {
            return Status::Err;
        }
        inner.surfaces.with(id, |s| s.move_to(row, col))
    }

    fn attr_get(&self, id: SurfaceId) -> Attr {
        let inner = self.inner.borrow();
        inner.surfaces.get(id).map(|s| s.attr).unwrap_or_default()
    }

    fn attr_set(&mut self, id: SurfaceId, attr: Attr) -> Status {
        let mut inner = self.inner.borrow_mut();
        if !inner.live(Call::AttrSet(id, attr)) {
            return Status::Err;
        }
        inner.surfaces.with(id, |s| {
            s.attr = attr;
            Status::Ok
        })
    }

    fn add_str(&mut self, id: SurfaceId, text: &str) -> Status {
        let mut inner = self.inner.borrow_mut();
        if !inner.live(Call::AddStr { surface: id, text: text.to_string() }) {
            return Status::Err;
        }
        inner.surfaces.with(id, |s| s.add_str(text))
    }

    fn mv_add_str(&mut self, id: SurfaceId, row: u16, col: u16, text: &str) -> Status {
        let mut inner = self.inner.borrow_mut();
        let call = Call::MvAddStr { surface: id, row, col, text: text.to_string() };
        if !inner.live(call) {
            return Status::Err;
        }
        inner.surfaces.with(id, |s| {
            if !s.move_to(row, col).is_ok() {
                return Status::Err;
            }
            s.add_str(text)
        })
    }

    fn add_ch(&mut self, id: SurfaceId, ch: char) -> Status {
        let mut inner = self.inner.borrow_mut();
        if !inner.live(Call::AddCh { surface: id, ch }) {
            return Status::Err;
        }
        inner.surfaces.with(id, |s| s.put(ch))
    }

    fn mv_add_ch(&mut self, id: SurfaceId, row: u16, col: u16, ch: char) -> Status {
        let mut inner = self.inner.borrow_mut();
        if !inner.live(Call::MvAddCh { surface: id, row, col, ch }) {
            return Status::Err;
        }
        inner.surfaces.with(id, |s| {
            if !s.move_to(row, col).is_ok() {
                return Status::Err;
            }
            s.put(ch)
        })
    }

    fn draw_box(&mut self, id: SurfaceId, v: char, h: char) -> Status {
        let mut inner = self.inner.borrow_mut();
        if !inner.live(Call::Box { surface: id, v, h }) {
            return Status::Err;
        }
        inner.surfaces.with(id, |s| s.border(&Border::edges(v, h)))
    }

    fn border(&mut self, id: SurfaceId, border: &Border) -> Status {
        let mut inner = self.inner.borrow_mut();
        if !inner.live(Call::Border { surface: id, glyphs: border.glyphs() }) {
            return Status::Err;
        }
        inner.surfaces.with(id, |s| s.border(border))
    }

    fn mv_hline(&mut self, id: SurfaceId, row: u16, col: u16, ch: char, len: u16) -> Status {
        let mut inner = self.inner.borrow_mut();
        if !inner.live(Call::MvHline { surface: id, row, col, ch, len }) {
            return Status::Err;
        }
        inner.surfaces.with(id, |s| s.hline(row, col, ch, len))
    }

    fn refresh(&mut self, id: SurfaceId) -> Status {
        let mut inner = self.inner.borrow_mut();
        if !inner.live(Call::Refresh(id)) {
            return Status::Err;
        }
        Status::from_bool(inner.surfaces.get(id).is_some())
    }

    fn get_key(&mut self, id: SurfaceId) -> Option<Key> {
        let mut inner = self.inner.borrow_mut();
        if !inner.live(Call::GetKey(id)) || inner.surfaces.get(id).is_none() {
            return None;
        }
        // An exhausted script stands in for a read error
        let key = inner.keys.pop_front()?;
        if inner.echo {
            if let Key::Char(ch) = key {
                if !inner.surfaces.with(id, |s| s.put(ch)).is_ok() {
                    warn!("echo of {:?} into {:?} failed", ch, id);
                }
            }
        }
        Some(key)
    }

    fn keypad(&mut self, id: SurfaceId, enable: bool) -> Status {
        let mut inner = self.inner.borrow_mut();
        if !inner.live(Call::Keypad { surface: id, enable }) {
            return Status::Err;
        }
        inner.surfaces.with(id, |s| {
            s.keypad = enable;
            Status::Ok
        })
    }

    fn raw(&mut self, enable: bool) -> Status {
        let mut inner = self.inner.borrow_mut();
        Status::from_bool(inner.live(Call::Raw(enable)))
    }

    fn cbreak(&mut self, enable: bool) -> Status {
        let mut inner = self.inner.borrow_mut();
        Status::from_bool(inner.live(Call::Cbreak(enable)))
    }

    fn echo(&mut self, enable: bool) -> Status {
        let mut inner = self.inner.borrow_mut();
        if !inner.live(Call::Echo(enable)) {
            return Status::Err;
        }
        inner.echo = enable;
        Status::Ok
    }

    fn has_colors(&self) -> bool {
        self.inner.borrow().colors
    }

    fn start_color(&mut self) -> Status {
        let mut inner = self.inner.borrow_mut();
        if !inner.live(Call::StartColor) || !inner.colors {
            return Status::Err;
        }
        inner.color_started = true;
        Status::Ok
    }

    fn init_pair(&mut self, pair: &ColorPair) -> Status {
        let mut inner = self.inner.borrow_mut();
        let call = Call::InitPair { index: pair.index, fg: pair.fg, bg: pair.bg };
        if !inner.live(call) || !inner.color_started || pair.index == 0 {
            return Status::Err;
        }
        inner.pairs.insert(pair.index, (pair.fg, pair.bg));
        Status::Ok
    }

    fn has_key(&self, key: Key) -> bool {
        key.is_special() && self.inner.borrow().special_keys
    }
}

/// Shared view onto a [`RecordingBackend`]
#[derive(Clone)]
pub struct CallLog {
    inner: Rc<RefCell<Inner>>,
}

impl CallLog {
    pub fn calls(&self) -> Vec<Call> {
        self.inner.borrow().calls.clone()
    }

    pub fn clear(&self) {
        self.inner.borrow_mut().calls.clear();
    }

    /// Whether a session is currently running on the backend
    pub fn is_active(&self) -> bool {
        self.inner.borrow().active
    }

    /// Number of surfaces allocated and not yet released
    pub fn live_surfaces(&self) -> usize {
        self.inner.borrow().surfaces.len()
    }

    /// Text of one row of a surface's buffer
    pub fn row_text(&self, id: SurfaceId, row: u16) -> Option<String> {
        let inner = self.inner.borrow();
        let surface = inner.surfaces.get(id)?;
        (row < surface.height).then(|| surface.row_text(row))
    }

    /// Attributes a cell was drawn with
    pub fn cell_attr(&self, id: SurfaceId, row: u16, col: u16) -> Option<Attr> {
        let inner = self.inner.borrow();
        inner.surfaces.get(id)?.cell(row, col).map(|c| c.attr)
    }

    pub fn keypad(&self, id: SurfaceId) -> Option<bool> {
        self.inner.borrow().surfaces.get(id).map(|s| s.keypad)
    }

    /// Colors registered for a pair index
    pub fn pair(&self, index: PairIndex) -> Option<(Color, Color)> {
        self.inner.borrow().pairs.get(&index).copied()
    }

    pub fn push_key(&self, key: Key) {
        self.inner.borrow_mut().keys.push_back(key);
    }
}
