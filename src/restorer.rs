//! Scoped attribute restore
//!
//! [`AttrRestorer`] remembers a window's attributes when created and writes
//! them back when dropped, whether the scope ends normally, through `?`, or
//! by unwinding. In between, the guard stands in for the window.
//!
//! ```
//! use ncwin::backend::RecordingBackend;
//! use ncwin::{AttrRestorer, InputMode, Screen};
//!
//! let mut screen = Screen::with_backend(RecordingBackend::new(), InputMode::Raw, true, false)?;
//! screen.attrs().color(1);
//! {
//!     let mut guard = AttrRestorer::new(&mut screen);
//!     guard.attrs().color(3).reverse(true);
//!     guard.print_at("highlighted", 0, 0)?;
//! }
//! assert_eq!(screen.attr().pair(), 1);
//! assert!(!screen.attr().is_reverse());
//! # Ok::<(), ncwin::Error>(())
//! ```

use std::ops::{Deref, DerefMut};

use crate::attr::Attr;
use crate::window::Window;

/// Restores a window's attributes on drop
pub struct AttrRestorer<'w> {
    window: &'w mut Window,
    saved: Attr,
}

impl<'w> AttrRestorer<'w> {
    pub fn new(window: &'w mut Window) -> Self {
        let saved = window.attr();
        Self { window, saved }
    }

    /// The attributes that will be put back
    pub fn saved(&self) -> Attr {
        self.saved
    }
}

impl Deref for AttrRestorer<'_> {
    type Target = Window;

    fn deref(&self) -> &Window {
        self.window
    }
}

impl DerefMut for AttrRestorer<'_> {
    fn deref_mut(&mut self) -> &mut Window {
        self.window
    }
}

impl Drop for AttrRestorer<'_> {
    fn drop(&mut self) {
        *self.window.attrs() = self.saved;
    }
}
