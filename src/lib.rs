//! ncwin - resource-safe windows over a curses-style terminal API
//!
//! ncwin wraps a text terminal in a small set of owned, typed primitives:
//!
//! - **Screen**: the terminal session; input mode, echo, color pairs
//! - **Window**: an owned drawing surface with its own pending attributes
//! - **Attr / Colors**: color pair selection and display modifiers
//! - **Border**: the eight glyphs of a frame
//! - **Coord / Rect**: cell geometry
//! - **AttrRestorer**: scoped save and restore of a window's attributes
//!
//! # Architecture
//!
//! ```text
//! Screen (session, derefs to the full-screen Window)
//! ├── Window ... (owned surfaces, released on drop)
//! └── Backend (native service)
//!     ├── TerminalBackend (crossterm)
//!     └── RecordingBackend (in-memory, logs every call)
//! ```
//!
//! # Example
//!
//! ```no_run
//! use ncwin::{Border, Color, Colors, InputMode, Screen, Window};
//!
//! fn main() -> ncwin::Result<()> {
//!     let mut screen = Screen::new(InputMode::Raw, true, false)?;
//!
//!     let mut colors = Colors::new();
//!     let red = colors.add_pair(Color::Red, Color::Black)?;
//!     screen.set_colors(colors)?;
//!
//!     let mut stats = Window::create(&screen, 10, screen.width(), 0, 0)?;
//!     stats.attrs().color(red);
//!     stats.border(&Border::line())?;
//!     stats.print_at("Str: 1", 1, 5)?;
//!     stats.refresh()?;
//!
//!     stats.getch()?;
//!     Ok(())
//! }
//! ```
//!
//! Everything is single-threaded: screens and windows share the session
//! through `Rc`, so they are neither `Send` nor `Sync`.

pub mod attr;
pub mod backend;
pub mod border;
pub mod config;
pub mod error;
pub mod geom;
pub mod key;
pub mod restorer;
pub mod screen;
pub mod window;

pub use attr::{Attr, Color, ColorPair, Colors, Modifiers, PairIndex, MAX_PAIRS};
pub use border::Border;
pub use config::{ConfigError, ScreenConfig};
pub use error::{Error, Result};
pub use geom::{Coord, Rect};
pub use key::Key;
pub use restorer::AttrRestorer;
pub use screen::{InputMode, Screen};
pub use window::Window;
