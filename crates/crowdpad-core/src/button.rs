//! Buttons and the bitmask encoding understood by the emulator.
//!
//! Bit values match the emulator's key codes:
//!
//! ```text
//! A=1  B=2  SELECT=4  START=8  RIGHT=16  LEFT=32  UP=64  DOWN=128  R=256  L=512
//! ```
//!
//! A [`ButtonMask`] is the full set of held buttons at one instant and
//! is what travels over the wire.

use std::fmt;

use crate::error::CodecError;

/// One of the ten physical buttons.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Button {
    A,
    B,
    Select,
    Start,
    Right,
    Left,
    Up,
    Down,
    R,
    L,
}

impl Button {
    /// Every button, in bit order.
    pub const ALL: [Button; 10] = [
        Button::A,
        Button::B,
        Button::Select,
        Button::Start,
        Button::Right,
        Button::Left,
        Button::Up,
        Button::Down,
        Button::R,
        Button::L,
    ];

    /// The single bit this button occupies.
    pub fn bit(self) -> u16 {
        match self {
            Button::A => 1,
            Button::B => 2,
            Button::Select => 4,
            Button::Start => 8,
            Button::Right => 16,
            Button::Left => 32,
            Button::Up => 64,
            Button::Down => 128,
            Button::R => 256,
            Button::L => 512,
        }
    }

    /// Canonical upper-case token name (`"SELECT"`, `"LEFT"`, ...).
    pub fn name(self) -> &'static str {
        match self {
            Button::A => "A",
            Button::B => "B",
            Button::Select => "SELECT",
            Button::Start => "START",
            Button::Right => "RIGHT",
            Button::Left => "LEFT",
            Button::Up => "UP",
            Button::Down => "DOWN",
            Button::R => "R",
            Button::L => "L",
        }
    }

    /// Look a button up by its token name (case-sensitive).
    pub fn from_name(name: &str) -> Option<Self> {
        Button::ALL.iter().copied().find(|b| b.name() == name)
    }
}

impl fmt::Display for Button {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Set of held buttons, always within the ten named bits.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub struct ButtonMask(u16);

impl ButtonMask {
    /// No buttons held.
    pub const EMPTY: ButtonMask = ButtonMask(0);

    /// Union of all ten named bits (`0x03FF`).
    pub const VALID_BITS: u16 = 0x03FF;

    /// Build a mask from raw bits, rejecting anything outside the named set.
    pub fn from_bits(bits: u16) -> Option<Self> {
        if bits & !Self::VALID_BITS == 0 {
            Some(ButtonMask(bits))
        } else {
            None
        }
    }

    pub fn bits(self) -> u16 {
        self.0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn contains(self, button: Button) -> bool {
        self.0 & button.bit() != 0
    }

    /// Number of buttons held.
    pub fn count(self) -> u32 {
        self.0.count_ones()
    }

    /// `self | other`
    pub fn union(self, other: ButtonMask) -> ButtonMask {
        ButtonMask(self.0 | other.0)
    }

    /// `self & !other`
    pub fn difference(self, other: ButtonMask) -> ButtonMask {
        ButtonMask(self.0 & !other.0)
    }
}

impl From<Button> for ButtonMask {
    fn from(button: Button) -> Self {
        ButtonMask(button.bit())
    }
}

impl fmt::Display for ButtonMask {
    /// Ten-digit binary, L on the left and A on the right.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:010b}", self.0)
    }
}

/// Map a button name to its mask.
///
/// Fails with [`CodecError::UnknownButton`] for anything that is not one
/// of the ten token names.
pub fn encode(name: &str) -> Result<ButtonMask, CodecError> {
    Button::from_name(name)
        .map(ButtonMask::from)
        .ok_or_else(|| CodecError::UnknownButton(name.to_string()))
}
