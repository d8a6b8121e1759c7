//! The single authoritative "what is held right now" bitmask.
//!
//! Every request handler funnels through [`InputState::apply_transition`].
//! The read-modify-write happens under one mutex so that two presses
//! arriving at the same time can never overwrite each other.

use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::button::ButtonMask;
use crate::direction::Direction;

/// Current held-button state, starting at zero.
#[derive(Debug, Default)]
pub struct InputState {
    held: Mutex<ButtonMask>,
}

impl InputState {
    pub fn new() -> Self {
        InputState::default()
    }

    /// Current mask.
    pub fn get(&self) -> ButtonMask {
        *self.lock()
    }

    /// Apply a transition and return the resulting state.
    ///
    /// - `Press`:   `state | mask`
    /// - `Release`: `state & !mask`
    pub fn apply_transition(&self, direction: Direction, mask: ButtonMask) -> ButtonMask {
        self.apply_transition_with(direction, mask, |_| ()).0
    }

    /// Like [`apply_transition`](Self::apply_transition), but runs
    /// `on_applied` with the new state before the lock is released.
    ///
    /// Used to enqueue the snapshot while still holding the state, so the
    /// queue order always equals the order transitions were applied in.
    pub fn apply_transition_with<R>(
        &self,
        direction: Direction,
        mask: ButtonMask,
        on_applied: impl FnOnce(ButtonMask) -> R,
    ) -> (ButtonMask, R) {
        let mut held = self.lock();
        *held = match direction {
            Direction::Press => held.union(mask),
            Direction::Release => held.difference(mask),
        };
        let snapshot = *held;
        let out = on_applied(snapshot);
        (snapshot, out)
    }

    // A panic while holding the lock cannot leave a half-written mask behind.
    fn lock(&self) -> MutexGuard<'_, ButtonMask> {
        self.held.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
