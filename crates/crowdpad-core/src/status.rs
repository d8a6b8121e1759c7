//! Shared "is the emulator socket up" flag.
//!
//! Split into a writer, handed to the sender loop and nobody else, and
//! any number of cheap readers for status reporting.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Create a linked writer/reader pair, initially disconnected.
pub fn connection_status() -> (StatusWriter, StatusReader) {
    let flag = Arc::new(AtomicBool::new(false));
    (
        StatusWriter { flag: flag.clone() },
        StatusReader { flag },
    )
}

/// Write side. Not `Clone`: only the sender writes.
#[derive(Debug)]
pub struct StatusWriter {
    flag: Arc<AtomicBool>,
}

impl StatusWriter {
    pub fn set_connected(&self) {
        self.flag.store(true, Ordering::Release);
    }

    pub fn set_disconnected(&self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Read side.
#[derive(Debug, Clone)]
pub struct StatusReader {
    flag: Arc<AtomicBool>,
}

impl StatusReader {
    pub fn is_connected(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}
