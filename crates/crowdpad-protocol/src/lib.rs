//! crowdpad-protocol
//!
//! Byte- and string-level formats at the edges of the bridge:
//!
//! - [`wire`]  : 2-byte little-endian snapshots sent to the emulator
//! - [`token`] : button tokens posted by the web front-end

pub mod wire;
pub mod token;

pub use wire::{decode_snapshot, decode_stream, encode_snapshot, WireError, SNAPSHOT_LEN};
pub use token::{parse_token, split_token, TokenError};
