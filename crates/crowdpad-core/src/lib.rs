//! crowdpad-core
//!
//! Transport-agnostic state for the crowd controller bridge:
//! - buttons and their bitmask encoding
//! - the shared held-button state
//! - the ordered delivery queue drained by the socket sender
//! - presence tracking and the connection flag used for status
//!
//! Nothing in here performs I/O; the server crate owns sockets and HTTP.

pub mod button;
pub mod direction;
pub mod input_state;
pub mod delivery_queue;
pub mod presence;
pub mod status;
pub mod controller;
pub mod error;

pub use button::{encode, Button, ButtonMask};
pub use direction::{Direction, InputEvent};
pub use input_state::InputState;
pub use delivery_queue::{DeliveryQueue, DEFAULT_QUEUE_LIMIT};
pub use presence::{PresenceTracker, STALENESS_WINDOW_SECS};
pub use status::{connection_status, StatusReader, StatusWriter};
pub use controller::{Controller, Status};
pub use error::{CodecError, Rejected};
