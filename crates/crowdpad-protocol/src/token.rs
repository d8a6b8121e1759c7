// crates/crowdpad-protocol/src/token.rs

//! Button tokens sent by the web front-end.
//!
//! Accepted forms:
//!
//! - Web page:  `D_GBA_<BUTTON>` (press) / `U_GBA_<BUTTON>` (release),
//!   e.g. `D_GBA_START`, `U_GBA_LEFT`.
//! - Readable:  `press <BUTTON>` / `release <BUTTON>`, e.g. `press A`.
//!
//! `<BUTTON>` is one of `A B SELECT START RIGHT LEFT UP DOWN R L`
//! (case-sensitive). Parsing is split in two steps so that a
//! well-formed direction with an unknown button can be reported as
//! "unrecognized button" rather than "malformed token".

use std::fmt;

use crowdpad_core::{Button, Direction, InputEvent, Rejected};

const WEB_BUTTON_PREFIX: &str = "GBA_";

/// Reasons a token cannot be turned into an [`InputEvent`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// Not `D_GBA_*`, `U_GBA_*`, `press *` or `release *`.
    Malformed(String),
    /// Direction parsed, button name did not.
    UnknownButton(String),
}

impl fmt::Display for TokenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenError::Malformed(t) => write!(f, "Malformed token: {}", t),
            TokenError::UnknownButton(b) => write!(f, "Unknown button: {}", b),
        }
    }
}

impl std::error::Error for TokenError {}

impl From<TokenError> for Rejected {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Malformed(t) => Rejected::MalformedToken(t),
            TokenError::UnknownButton(b) => Rejected::UnrecognizedButton(b),
        }
    }
}

/// Split a token into direction and (unvalidated) button name.
pub fn split_token(token: &str) -> Result<(Direction, &str), TokenError> {
    let malformed = || TokenError::Malformed(token.to_string());

    if let Some((word, name)) = token.split_once(' ') {
        let direction = Direction::from_word(word).ok_or_else(malformed)?;
        let name = name.trim();
        if name.is_empty() {
            return Err(malformed());
        }
        return Ok((direction, name));
    }

    // D_GBA_<NAME> / U_GBA_<NAME>
    let mut chars = token.chars();
    let direction = chars
        .next()
        .and_then(Direction::from_char)
        .ok_or_else(malformed)?;
    let rest = chars.as_str().strip_prefix('_').ok_or_else(malformed)?;
    let name = rest.strip_prefix(WEB_BUTTON_PREFIX).ok_or_else(malformed)?;
    if name.is_empty() {
        return Err(malformed());
    }
    Ok((direction, name))
}

/// Parse a full token into an event.
pub fn parse_token(token: &str) -> Result<InputEvent, TokenError> {
    let (direction, name) = split_token(token)?;
    let button =
        Button::from_name(name).ok_or_else(|| TokenError::UnknownButton(name.to_string()))?;
    Ok(InputEvent { direction, button })
}
