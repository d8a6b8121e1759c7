//! Emulator wire format.
//!
//! The stream to the emulator has no framing and no handshake. Every
//! message is exactly two bytes: the full held-button mask as an
//! unsigned 16-bit little-endian integer.
//!
//! ```text
//! [0] : mask bits 0..8  (A, B, SELECT, START, RIGHT, LEFT, UP, DOWN)
//! [1] : mask bits 8..10 (R, L), upper six bits always zero
//! ```

use std::fmt;

use crowdpad_core::ButtonMask;

/// Bytes per snapshot on the wire.
pub const SNAPSHOT_LEN: usize = 2;

/// Errors when decoding bytes coming off an emulator-side stream.
#[derive(Debug, PartialEq, Eq)]
pub enum WireError {
    /// Fewer than [`SNAPSHOT_LEN`] bytes.
    Truncated,
    /// Value has bits outside the ten named buttons.
    OutOfRange(u16),
}

impl fmt::Display for WireError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WireError::Truncated => write!(f, "Buffer truncated"),
            WireError::OutOfRange(v) => write!(f, "Snapshot out of range: {}", v),
        }
    }
}

impl std::error::Error for WireError {}

/// Encode one snapshot.
pub fn encode_snapshot(mask: ButtonMask) -> [u8; SNAPSHOT_LEN] {
    mask.bits().to_le_bytes()
}

/// Decode the first snapshot in `buf`. Trailing bytes are ignored.
///
/// The bridge itself only ever encodes; decoding is the emulator's side
/// of the link, kept here for stand-in emulators and diagnostics tools.
pub fn decode_snapshot(buf: &[u8]) -> Result<ButtonMask, WireError> {
    if buf.len() < SNAPSHOT_LEN {
        return Err(WireError::Truncated);
    }

    let raw = u16::from_le_bytes([buf[0], buf[1]]);
    ButtonMask::from_bits(raw).ok_or(WireError::OutOfRange(raw))
}

/// Decode a buffer holding back-to-back snapshots (emulator side).
///
/// A trailing odd byte is reported as `Truncated`.
pub fn decode_stream(buf: &[u8]) -> Result<Vec<ButtonMask>, WireError> {
    if buf.len() % SNAPSHOT_LEN != 0 {
        return Err(WireError::Truncated);
    }
    buf.chunks_exact(SNAPSHOT_LEN).map(decode_snapshot).collect()
}
