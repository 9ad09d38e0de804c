//! Attribute and color model
//!
//! An [`Attr`] keeps the color pair selection and the display modifiers as
//! two separate fields. They are only combined by the backend when a draw
//! call applies them, so changing one never clobbers the other.
//!
//! Color pairs are registered through a [`Colors`] table, which hands out
//! sequential 1-based indices. Index 0 always means the terminal default.

use std::slice;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::error::{ensure, Result};

/// Maximum number of registered color pairs.
pub const MAX_PAIRS: usize = 8;

/// Index of a registered color pair. 0 selects the terminal default colors.
pub type PairIndex = u16;

bitflags! {
    /// Display modifiers applied to drawn characters
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        const REVERSE   = 0b0000_0001;
        const BOLD      = 0b0000_0010;
        const UNDERLINE = 0b0000_0100;
        const DIM       = 0b0000_1000;
        const BLINK     = 0b0001_0000;
    }
}

/// Pending draw attributes of a window.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Attr {
    pair: PairIndex,
    modifiers: Modifiers,
}

impl Attr {
    /// Normal attributes: default colors, no modifiers.
    pub const fn normal() -> Self {
        Self {
            pair: 0,
            modifiers: Modifiers::empty(),
        }
    }

    pub const fn from_parts(pair: PairIndex, modifiers: Modifiers) -> Self {
        Self { pair, modifiers }
    }

    /// Select a color pair, keeping the modifiers as they are.
    pub fn color(&mut self, pair: PairIndex) -> &mut Self {
        self.pair = pair;
        self
    }

    pub fn reverse(&mut self, on: bool) -> &mut Self {
        self.modifiers.set(Modifiers::REVERSE, on);
        self
    }

    pub fn toggle_reverse(&mut self) -> &mut Self {
        self.modifiers.toggle(Modifiers::REVERSE);
        self
    }

    pub fn bold(&mut self, on: bool) -> &mut Self {
        self.modifiers.set(Modifiers::BOLD, on);
        self
    }

    pub fn underline(&mut self, on: bool) -> &mut Self {
        self.modifiers.set(Modifiers::UNDERLINE, on);
        self
    }

    /// Set or clear an arbitrary set of modifiers.
    pub fn modifier(&mut self, flags: Modifiers, on: bool) -> &mut Self {
        self.modifiers.set(flags, on);
        self
    }

    pub fn pair(&self) -> PairIndex {
        self.pair
    }

    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    pub fn is_reverse(&self) -> bool {
        self.modifiers.contains(Modifiers::REVERSE)
    }
}

/// The eight base terminal colors, numbered as curses numbers them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Black = 0,
    Red = 1,
    Green = 2,
    Yellow = 3,
    Blue = 4,
    Magenta = 5,
    Cyan = 6,
    White = 7,
}

impl Color {
    pub const ALL: [Color; 8] = [
        Color::Black,
        Color::Red,
        Color::Green,
        Color::Yellow,
        Color::Blue,
        Color::Magenta,
        Color::Cyan,
        Color::White,
    ];

    /// ANSI palette number (0-7)
    pub fn number(self) -> u8 {
        self as u8
    }
}

/// A registered foreground/background combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColorPair {
    pub index: PairIndex,
    pub fg: Color,
    pub bg: Color,
}

/// Ordered table of color pairs, at most [`MAX_PAIRS`] long.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Colors {
    pairs: Vec<ColorPair>,
}

impl Colors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a pair and return the index it was given.
    pub fn add_pair(&mut self, fg: Color, bg: Color) -> Result<PairIndex> {
        ensure(self.pairs.len() < MAX_PAIRS, "color pair table is full")?;
        let index = self.pairs.len() as PairIndex + 1;
        self.pairs.push(ColorPair { index, fg, bg });
        Ok(index)
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Look up a pair by its 1-based index.
    pub fn get(&self, index: usize) -> Result<&ColorPair> {
        ensure(index > 0 && index <= self.pairs.len(), "color pair index out of range")?;
        Ok(&self.pairs[index - 1])
    }

    pub fn get_mut(&mut self, index: usize) -> Result<&mut ColorPair> {
        ensure(index > 0 && index <= self.pairs.len(), "color pair index out of range")?;
        Ok(&mut self.pairs[index - 1])
    }

    pub fn iter(&self) -> slice::Iter<'_, ColorPair> {
        self.pairs.iter()
    }
}

impl<'a> IntoIterator for &'a Colors {
    type Item = &'a ColorPair;
    type IntoIter = slice::Iter<'a, ColorPair>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_color_keeps_reverse() {
        let mut attr = Attr::normal();
        attr.color(2).reverse(true);
        assert_eq!(attr.pair(), 2);
        assert!(attr.is_reverse());

        attr.color(5);
        assert_eq!(attr.pair(), 5);
        assert!(attr.is_reverse());
    }

    #[test]
    fn test_reverse_keeps_color() {
        let mut attr = Attr::normal();
        attr.color(3).reverse(true).reverse(false);
        assert_eq!(attr.pair(), 3);
        assert!(!attr.is_reverse());
    }

    #[test]
    fn test_toggle_reverse() {
        let mut attr = Attr::normal();
        attr.toggle_reverse();
        assert!(attr.is_reverse());
        attr.toggle_reverse();
        assert!(!attr.is_reverse());
        assert_eq!(attr, Attr::normal());
    }

    #[test]
    fn test_other_modifiers_independent() {
        let mut attr = Attr::normal();
        attr.bold(true).underline(true).reverse(true);
        attr.reverse(false);
        assert_eq!(attr.modifiers(), Modifiers::BOLD | Modifiers::UNDERLINE);

        attr.modifier(Modifiers::BOLD | Modifiers::DIM, true);
        assert!(attr.modifiers().contains(Modifiers::DIM));
        attr.modifier(Modifiers::BOLD | Modifiers::UNDERLINE | Modifiers::DIM, false);
        assert!(attr.modifiers().is_empty());
    }

    #[test]
    fn test_add_pair_sequential_indices() {
        let mut cs = Colors::new();
        for (i, color) in Color::ALL.iter().enumerate() {
            let idx = cs.add_pair(*color, Color::Black).unwrap();
            assert_eq!(idx as usize, i + 1);
        }
        assert_eq!(cs.len(), MAX_PAIRS);
        assert_eq!(cs.add_pair(Color::Red, Color::Red), Err(Error::Assertion("color pair table is full")));
        assert_eq!(cs.len(), MAX_PAIRS);
    }

    #[test]
    fn test_get_bounds() {
        let mut cs = Colors::new();
        cs.add_pair(Color::Red, Color::Black).unwrap();
        cs.add_pair(Color::Blue, Color::Black).unwrap();
        cs.add_pair(Color::Green, Color::White).unwrap();

        assert!(matches!(cs.get(0), Err(Error::Assertion(_))));
        assert!(matches!(cs.get(4), Err(Error::Assertion(_))));
        assert!(matches!(cs.get(9), Err(Error::Assertion(_))));

        let third = cs.get(3).unwrap();
        assert_eq!(*third, ColorPair { index: 3, fg: Color::Green, bg: Color::White });
    }

    #[test]
    fn test_get_mut() {
        let mut cs = Colors::new();
        cs.add_pair(Color::Red, Color::Black).unwrap();
        cs.get_mut(1).unwrap().bg = Color::Yellow;
        assert_eq!(cs.get(1).unwrap().bg, Color::Yellow);
        assert!(cs.get_mut(2).is_err());
    }

    #[test]
    fn test_color_numbers() {
        assert_eq!(Color::Black.number(), 0);
        assert_eq!(Color::Yellow.number(), 3);
        assert_eq!(Color::White.number(), 7);
    }
}
