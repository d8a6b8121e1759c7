//! Shared handle types for the server.

use std::sync::Arc;

use crowdpad_core::Controller;
use tokio::sync::watch;

use crate::sender::SenderState;

/// Controller shared by all HTTP handlers.
pub type SharedController = Arc<Controller>;

/// Receiver side of the sender's state channel.
pub type SenderStateRx = watch::Receiver<SenderState>;
