//! Key input model
//!
//! [`Key`] is what a blocking read returns: either a plain character code
//! or a decoded special key. Special keys carry the numeric codes curses
//! uses, so callers that think in `KEY_UP`-style constants can still match
//! on them.
//!
//! [`KeyMapper`] turns crossterm key events into keys. With keypad decoding
//! off, special keys come through as the raw escape sequence a terminal
//! would send, one [`Key::Char`] per byte.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use bitflags::bitflags;

pub const KEY_DOWN: u32 = 0o402;
pub const KEY_UP: u32 = 0o403;
pub const KEY_LEFT: u32 = 0o404;
pub const KEY_RIGHT: u32 = 0o405;
pub const KEY_HOME: u32 = 0o406;
pub const KEY_BACKSPACE: u32 = 0o407;
pub const KEY_F0: u32 = 0o410;
pub const KEY_DC: u32 = 0o512;
pub const KEY_IC: u32 = 0o513;
pub const KEY_NPAGE: u32 = 0o522;
pub const KEY_PPAGE: u32 = 0o523;
pub const KEY_BTAB: u32 = 0o541;
pub const KEY_END: u32 = 0o550;

/// Highest function key number with a code of its own
const MAX_FKEY: u8 = 63;

/// A single input event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Char(char),
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    Backspace,
    Delete,
    Insert,
    PageUp,
    PageDown,
    BackTab,
    F(u8),
}

impl Key {
    /// Numeric code: the character value, or the curses special key code.
    pub fn code(self) -> u32 {
        match self {
            Key::Char(c) => c as u32,
            Key::Up => KEY_UP,
            Key::Down => KEY_DOWN,
            Key::Left => KEY_LEFT,
            Key::Right => KEY_RIGHT,
            Key::Home => KEY_HOME,
            Key::End => KEY_END,
            Key::Backspace => KEY_BACKSPACE,
            Key::Delete => KEY_DC,
            Key::Insert => KEY_IC,
            Key::PageUp => KEY_PPAGE,
            Key::PageDown => KEY_NPAGE,
            Key::BackTab => KEY_BTAB,
            Key::F(n) => KEY_F0 + u32::from(n),
        }
    }

    /// Inverse of [`Key::code`]. Codes below 0x100 are characters.
    pub fn from_code(code: u32) -> Option<Key> {
        let key = match code {
            KEY_UP => Key::Up,
            KEY_DOWN => Key::Down,
            KEY_LEFT => Key::Left,
            KEY_RIGHT => Key::Right,
            KEY_HOME => Key::Home,
            KEY_END => Key::End,
            KEY_BACKSPACE => Key::Backspace,
            KEY_DC => Key::Delete,
            KEY_IC => Key::Insert,
            KEY_PPAGE => Key::PageUp,
            KEY_NPAGE => Key::PageDown,
            KEY_BTAB => Key::BackTab,
            c if (KEY_F0..=KEY_F0 + u32::from(MAX_FKEY)).contains(&c) => Key::F((c - KEY_F0) as u8),
            c if c < 0x100 => Key::Char(char::from_u32(c)?),
            _ => return None,
        };
        Some(key)
    }

    pub fn is_special(self) -> bool {
        !matches!(self, Key::Char(_))
    }
}

impl From<char> for Key {
    fn from(c: char) -> Self {
        Key::Char(c)
    }
}

bitflags! {
    /// Modifier keys
    #[derive(Clone, Copy, Debug, Default, PartialEq)]
    struct Modifiers: u8 {
        const SHIFT = 0b0001;
        const CTRL  = 0b0010;
        const ALT   = 0b0100;
    }
}

impl From<KeyModifiers> for Modifiers {
    fn from(mods: KeyModifiers) -> Self {
        let mut result = Modifiers::empty();
        if mods.contains(KeyModifiers::SHIFT) {
            result |= Modifiers::SHIFT;
        }
        if mods.contains(KeyModifiers::CONTROL) {
            result |= Modifiers::CTRL;
        }
        if mods.contains(KeyModifiers::ALT) {
            result |= Modifiers::ALT;
        }
        result
    }
}

/// Key mapper for converting crossterm key events to keys
pub struct KeyMapper;

impl KeyMapper {
    /// Map a key event. `keypad` selects decoded special keys over raw bytes.
    ///
    /// Returns an empty vector for events with no terminal representation.
    pub fn map(event: &KeyEvent, keypad: bool) -> Vec<Key> {
        let mods = Modifiers::from(event.modifiers);

        if keypad {
            if let Some(key) = Self::decoded(event.code) {
                return vec![key];
            }
        }

        let bytes = match event.code {
            KeyCode::Char(ch) => return Self::map_char(ch, mods),
            // curses translates carriage return to newline
            KeyCode::Enter => vec![b'\n'],
            KeyCode::Backspace => {
                if mods.contains(Modifiers::ALT) {
                    vec![0x1B, 0x7F]
                } else {
                    vec![0x7F]
                }
            }
            KeyCode::Tab => vec![0x09],
            KeyCode::BackTab => b"\x1b[Z".to_vec(),
            KeyCode::Esc => vec![0x1B],

            KeyCode::Up => Self::csi_key(b'A', mods),
            KeyCode::Down => Self::csi_key(b'B', mods),
            KeyCode::Right => Self::csi_key(b'C', mods),
            KeyCode::Left => Self::csi_key(b'D', mods),
            KeyCode::Home => Self::csi_key(b'H', mods),
            KeyCode::End => Self::csi_key(b'F', mods),

            KeyCode::PageUp => Self::tilde_key(5, mods),
            KeyCode::PageDown => Self::tilde_key(6, mods),
            KeyCode::Insert => Self::tilde_key(2, mods),
            KeyCode::Delete => Self::tilde_key(3, mods),

            KeyCode::F(n) => Self::function_key(n, mods),

            _ => Vec::new(),
        };
        bytes.into_iter().map(|b| Key::Char(char::from(b))).collect()
    }

    /// Special keys that keypad mode decodes into a single code
    fn decoded(code: KeyCode) -> Option<Key> {
        let key = match code {
            KeyCode::Up => Key::Up,
            KeyCode::Down => Key::Down,
            KeyCode::Left => Key::Left,
            KeyCode::Right => Key::Right,
            KeyCode::Home => Key::Home,
            KeyCode::End => Key::End,
            KeyCode::Backspace => Key::Backspace,
            KeyCode::Delete => Key::Delete,
            KeyCode::Insert => Key::Insert,
            KeyCode::PageUp => Key::PageUp,
            KeyCode::PageDown => Key::PageDown,
            KeyCode::BackTab => Key::BackTab,
            KeyCode::F(n) if n <= MAX_FKEY => Key::F(n),
            _ => return None,
        };
        Some(key)
    }

    /// Map a character with modifiers
    fn map_char(ch: char, mods: Modifiers) -> Vec<Key> {
        let ctrl = mods.contains(Modifiers::CTRL);
        let alt = mods.contains(Modifiers::ALT);

        if ctrl {
            let code = if ch.is_ascii_alphabetic() {
                Some((ch.to_ascii_lowercase() as u8) - b'a' + 1)
            } else {
                match ch {
                    '@' | '`' | ' ' => Some(0x00),
                    '[' => Some(0x1B),
                    '\\' => Some(0x1C),
                    ']' => Some(0x1D),
                    '^' | '~' => Some(0x1E),
                    '_' | '?' => Some(0x1F),
                    _ => None,
                }
            };
            if let Some(code) = code {
                let ctrl_key = Key::Char(char::from(code));
                return if alt {
                    vec![Key::Char('\x1b'), ctrl_key]
                } else {
                    vec![ctrl_key]
                };
            }
        }

        // Alt + key = ESC + key
        if alt {
            return vec![Key::Char('\x1b'), Key::Char(ch)];
        }

        vec![Key::Char(ch)]
    }

    /// Cursor and Home/End sequence: ESC [ X, or ESC [ 1 ; mod X
    fn csi_key(key: u8, mods: Modifiers) -> Vec<u8> {
        if mods.is_empty() {
            vec![0x1B, b'[', key]
        } else {
            let mod_code = Self::modifier_code(mods);
            format!("\x1b[1;{}{}", mod_code, key as char).into_bytes()
        }
    }

    /// Tilde key sequence (PageUp, PageDown, Insert, Delete)
    fn tilde_key(code: u8, mods: Modifiers) -> Vec<u8> {
        if mods.is_empty() {
            format!("\x1b[{}~", code).into_bytes()
        } else {
            let mod_code = Self::modifier_code(mods);
            format!("\x1b[{};{}~", code, mod_code).into_bytes()
        }
    }

    /// Function key sequence
    fn function_key(n: u8, mods: Modifiers) -> Vec<u8> {
        let tilde = match n {
            1..=4 => {
                let key = b"PQRS"[usize::from(n - 1)];
                return if mods.is_empty() {
                    vec![0x1B, b'O', key]
                } else {
                    let mod_code = Self::modifier_code(mods);
                    format!("\x1b[1;{}{}", mod_code, key as char).into_bytes()
                };
            }
            5 => 15,
            6..=10 => n + 11,
            11 | 12 => n + 12,
            _ => return Vec::new(),
        };
        Self::tilde_key(tilde, mods)
    }

    /// Calculate xterm modifier code
    fn modifier_code(mods: Modifiers) -> u8 {
        1 + if mods.contains(Modifiers::SHIFT) { 1 } else { 0 }
            + if mods.contains(Modifiers::ALT) { 2 } else { 0 }
            + if mods.contains(Modifiers::CTRL) { 4 } else { 0 }
    }
}
