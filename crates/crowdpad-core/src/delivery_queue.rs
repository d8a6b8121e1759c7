//! FIFO of mask snapshots waiting to be written to the emulator.
//!
//! Many producers (one per HTTP request), one consumer (the sender
//! loop). Order is strict: the emulator must never see an older
//! snapshot after a newer one.
//!
//! Growth policy: an optional length limit. When full, the *oldest*
//! snapshot is discarded to make room, since every newer snapshot
//! already carries the complete held state. A limit of `0` disables
//! the cap entirely.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::button::ButtonMask;

/// Default cap used by the server configuration.
pub const DEFAULT_QUEUE_LIMIT: usize = 4096;

#[derive(Debug, Default)]
struct Inner {
    entries: VecDeque<ButtonMask>,
    /// Snapshots evicted by the length limit, for diagnostics.
    dropped: u64,
}

/// Ordered, mutex-guarded snapshot queue.
#[derive(Debug, Default)]
pub struct DeliveryQueue {
    inner: Mutex<Inner>,
    limit: usize,
}

impl DeliveryQueue {
    /// Unbounded queue.
    pub fn new() -> Self {
        DeliveryQueue::default()
    }

    /// Queue that holds at most `limit` entries (drop-oldest on overflow).
    /// `limit == 0` means unbounded.
    pub fn with_capacity_limit(limit: usize) -> Self {
        DeliveryQueue {
            inner: Mutex::new(Inner::default()),
            limit,
        }
    }

    /// Append at the tail. Never blocks on I/O.
    ///
    /// Returns the snapshot that was evicted to respect the limit, if any.
    pub fn push(&self, mask: ButtonMask) -> Option<ButtonMask> {
        let mut inner = self.lock();
        let evicted = if self.limit != 0 && inner.entries.len() >= self.limit {
            inner.dropped += 1;
            inner.entries.pop_front()
        } else {
            None
        };
        inner.entries.push_back(mask);
        evicted
    }

    /// Remove and return the head, or `None` when empty.
    pub fn pop_oldest(&self) -> Option<ButtonMask> {
        self.lock().entries.pop_front()
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().entries.is_empty()
    }

    /// Configured limit (`0` = unbounded).
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Total snapshots discarded by the limit since creation.
    pub fn dropped(&self) -> u64 {
        self.lock().dropped
    }

    /// Copy of the pending snapshots, oldest first.
    pub fn pending(&self) -> Vec<ButtonMask> {
        self.lock().entries.iter().copied().collect()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
