//! Press / release direction and the transition event built from it.

use std::fmt;

use crate::button::Button;

/// Whether a button went down or came back up.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Direction {
    Press,
    Release,
}

impl Direction {
    /// Parse the web page prefix (`'D'` / `'U'`, case-sensitive).
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'D' => Some(Direction::Press),
            'U' => Some(Direction::Release),
            _ => None,
        }
    }

    /// Parse the readable form (`"press"` / `"release"`).
    pub fn from_word(word: &str) -> Option<Self> {
        match word {
            "press" => Some(Direction::Press),
            "release" => Some(Direction::Release),
            _ => None,
        }
    }

    pub fn as_word(self) -> &'static str {
        match self {
            Direction::Press => "press",
            Direction::Release => "release",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_word())
    }
}

/// A single button transition from one client.
///
/// Consumed immediately by [`InputState`](crate::InputState); never stored.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct InputEvent {
    pub direction: Direction,
    pub button: Button,
}

impl InputEvent {
    pub fn press(button: Button) -> Self {
        InputEvent {
            direction: Direction::Press,
            button,
        }
    }

    pub fn release(button: Button) -> Self {
        InputEvent {
            direction: Direction::Release,
            button,
        }
    }
}
