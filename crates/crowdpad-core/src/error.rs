//! Error types for the core crate.
//!
//! None of these are fatal: they describe why a single client request
//! was turned away. Transport problems never show up here; the sender
//! absorbs them.

use thiserror::Error;

/// Failure to map a button name to a mask.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("unrecognized button: {0}")]
    UnknownButton(String),
}

/// Why a submitted button event was not applied.
///
/// The `Display` form is the short reason reported back to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejected {
    /// Direction was fine, the button name was not one of the ten.
    #[error("unrecognized button")]
    UnrecognizedButton(String),

    /// The token did not look like `press`/`release` + button at all.
    #[error("malformed token")]
    MalformedToken(String),
}

impl From<CodecError> for Rejected {
    fn from(err: CodecError) -> Self {
        match err {
            CodecError::UnknownButton(name) => Rejected::UnrecognizedButton(name),
        }
    }
}
