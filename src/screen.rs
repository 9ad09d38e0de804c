//! Screen - the terminal session
//!
//! [`Screen`] starts the terminal subsystem when constructed and restores
//! the terminal when dropped. It owns the global input mode, echo setting
//! and color-pair registrations; nothing else may change them. Through
//! `Deref` it is also the full-screen [`Window`].
//!
//! ```text
//! uninitialized ──new()──▶ active ──end() / drop──▶ torn down
//! ```
//!
//! Only one session may be active on a terminal at a time; constructing a
//! second fails with an operation fault. Windows must not be drawn on after
//! their session has ended.

use std::fmt;
use std::ops::{Deref, DerefMut};
use std::thread;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use crate::attr::Colors;
use crate::backend::{Backend, TerminalBackend};
use crate::config::ScreenConfig;
use crate::error::{check, Error, Result};
use crate::key::Key;
use crate::window::{Native, Window};

/// How typed input reaches the program
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputMode {
    /// Line buffered, as in a normal shell
    Line,
    /// Character at a time; interrupt keys still raise signals
    #[default]
    Cbreak,
    /// Character at a time; interrupt keys are delivered as input
    Raw,
}

/// The whole-terminal session
pub struct Screen {
    window: Window,
    colors: Colors,
    active: bool,
}

impl Screen {
    /// Start a session on the real terminal.
    pub fn new(mode: InputMode, keypad: bool, echo: bool) -> Result<Self> {
        Self::with_backend(TerminalBackend::new(), mode, keypad, echo)
    }

    /// Start a session on the given native service.
    pub fn with_backend<B: Backend + 'static>(
        backend: B,
        mode: InputMode,
        keypad: bool,
        echo: bool,
    ) -> Result<Self> {
        let native = Native::new(backend);
        let id = native.call(|b| b.init()).ok_or(Error::Operation)?;

        // From here on a failure drops the screen, which ends the session
        let mut screen = Self {
            window: Window::wrap(native, id, false),
            colors: Colors::new(),
            active: true,
        };
        screen.set_input_mode(mode)?;
        screen.keypad(keypad)?;
        screen.set_echo(echo)?;

        if screen.has_colors() {
            check(screen.native().call(|b| b.start_color()))?;
        }
        debug!("session started: {:?}, keypad={}, echo={}", mode, keypad, echo);
        Ok(screen)
    }

    /// Start a session on the real terminal from configuration.
    pub fn from_config(config: &ScreenConfig) -> Result<Self> {
        Self::from_config_with_backend(TerminalBackend::new(), config)
    }

    pub fn from_config_with_backend<B: Backend + 'static>(backend: B, config: &ScreenConfig) -> Result<Self> {
        let palette = config.palette()?;
        let mut screen = Self::with_backend(backend, config.input_mode, config.keypad, config.echo)?;
        if !palette.is_empty() {
            screen.set_colors(palette)?;
        }
        Ok(screen)
    }

    pub fn set_input_mode(&mut self, mode: InputMode) -> Result<()> {
        let native = self.native();
        match mode {
            InputMode::Line => {
                check(native.call(|b| b.raw(false)))?;
                check(native.call(|b| b.cbreak(false)))?;
            }
            InputMode::Cbreak => check(native.call(|b| b.cbreak(true)))?,
            InputMode::Raw => check(native.call(|b| b.raw(true)))?,
        }
        debug!("input mode: {:?}", mode);
        Ok(())
    }

    /// Whether typed characters are echoed into the window being read.
    pub fn set_echo(&mut self, enable: bool) -> Result<()> {
        check(self.native().call(|b| b.echo(enable)))
    }

    /// Replace the color table and register every pair with the terminal.
    ///
    /// Must happen before drawing with any of the pair indices. On a
    /// terminal without color support the table is kept but not registered.
    pub fn set_colors(&mut self, colors: Colors) -> Result<()> {
        self.colors = colors;
        if !self.has_colors() {
            warn!("terminal has no color support; {} pairs not registered", self.colors.len());
            return Ok(());
        }
        let native = self.window.native();
        for pair in &self.colors {
            check(native.call(|b| b.init_pair(pair)))?;
            debug!("color pair {}: {:?} on {:?}", pair.index, pair.fg, pair.bg);
        }
        Ok(())
    }

    pub fn colors(&self) -> &Colors {
        &self.colors
    }

    pub fn has_colors(&self) -> bool {
        self.native().query(|b| b.has_colors())
    }

    /// Whether the terminal can deliver `key` as a decoded special key.
    pub fn has_key(&self, key: Key) -> bool {
        self.native().query(|b| b.has_key(key))
    }

    /// End the session, reporting failure instead of panicking.
    pub fn end(mut self) -> Result<()> {
        self.teardown()
    }

    fn teardown(&mut self) -> Result<()> {
        if !self.active {
            return Ok(());
        }
        self.active = false;
        let result = check(self.native().call(|b| b.end()));
        debug!("session ended: {:?}", result);
        result
    }
}

impl Deref for Screen {
    type Target = Window;

    fn deref(&self) -> &Window {
        &self.window
    }
}

/// Mutable access to the full-screen window.
///
/// Swapping it out with `mem::swap` moves ownership along with the value:
/// the session's surface is never released by a window, and a swapped-in
/// owning window still releases its own surface exactly once, after the
/// session ends.
impl DerefMut for Screen {
    fn deref_mut(&mut self) -> &mut Window {
        &mut self.window
    }
}

impl fmt::Debug for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Screen")
            .field("window", &self.window)
            .field("colors", &self.colors)
            .field("active", &self.active)
            .finish()
    }
}

impl Drop for Screen {
    fn drop(&mut self) {
        if let Err(e) = self.teardown() {
            error!("terminal teardown failed: {}", e);
            // Nothing can recover the terminal after this point
            if !thread::panicking() {
                panic!("terminal teardown failed: {}", e);
            }
        }
    }
}
