//! Entry points used by the HTTP layer.
//!
//! The controller ties the shared pieces together:
//! - `submit_button_event`: codec -> input state -> delivery queue.
//! - `get_status`: presence touch + count, plus the connection flag.
//!
//! All parts are injected so tests (and several independent bridges in
//! one process) can build their own.

use std::sync::Arc;

use crate::button::{self, ButtonMask};
use crate::delivery_queue::DeliveryQueue;
use crate::direction::{Direction, InputEvent};
use crate::error::Rejected;
use crate::input_state::InputState;
use crate::presence::PresenceTracker;
use crate::status::StatusReader;

/// Snapshot returned to status pollers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Status {
    pub connected: bool,
    pub player_count: usize,
}

/// Inbound side of the bridge.
#[derive(Debug)]
pub struct Controller {
    input: InputState,
    queue: Arc<DeliveryQueue>,
    presence: PresenceTracker,
    status: StatusReader,
}

impl Controller {
    pub fn new(
        input: InputState,
        queue: Arc<DeliveryQueue>,
        presence: PresenceTracker,
        status: StatusReader,
    ) -> Self {
        Controller {
            input,
            queue,
            presence,
            status,
        }
    }

    /// Apply a button transition by name and enqueue the resulting state.
    ///
    /// On rejection nothing is touched. On success the returned mask is the
    /// snapshot that was queued.
    pub fn submit_button_event(
        &self,
        direction: Direction,
        button_name: &str,
    ) -> Result<ButtonMask, Rejected> {
        let mask = button::encode(button_name)?;
        Ok(self.apply(direction, mask))
    }

    /// Same as [`submit_button_event`](Self::submit_button_event) for an
    /// already-decoded event. Cannot fail.
    pub fn submit_event(&self, event: InputEvent) -> ButtonMask {
        self.apply(event.direction, event.button.into())
    }

    /// Report connection state and live player count, refreshing `client_id`.
    pub fn get_status(&self, client_id: &str) -> Status {
        self.presence.touch(client_id);
        Status {
            connected: self.status.is_connected(),
            player_count: self.presence.count(),
        }
    }

    pub fn current_input(&self) -> ButtonMask {
        self.input.get()
    }

    pub fn queue(&self) -> &Arc<DeliveryQueue> {
        &self.queue
    }

    fn apply(&self, direction: Direction, mask: ButtonMask) -> ButtonMask {
        let (snapshot, _evicted) = self
            .input
            .apply_transition_with(direction, mask, |snapshot| self.queue.push(snapshot));
        snapshot
    }
}
