//! Top-level wiring.
//!
//! This module:
//! - builds the shared state (input state, queue, presence, status flag),
//! - spawns the single [`SocketSender`] task that owns the emulator socket,
//! - serves the HTTP routes on the configured address.
//!
//! The sender and the HTTP handlers only meet through the
//! [`DeliveryQueue`] and the connection flag.

use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crowdpad_core::{connection_status, Controller, DeliveryQueue, InputState, PresenceTracker};

use crate::config::Config;
use crate::http::{self, AppState};
use crate::sender::{SenderState, SocketSender};
use crate::types::{SenderStateRx, SharedController};

/// Handles to a running bridge (everything except the HTTP listener).
pub struct Bridge {
    pub controller: SharedController,
    pub sender_state: SenderStateRx,
    pub sender_task: JoinHandle<SenderState>,
}

/// Build the shared state and start the sender task.
pub fn start_bridge(config: &Config) -> Bridge {
    let queue = Arc::new(DeliveryQueue::with_capacity_limit(config.app.max_queue_len));
    let (status_writer, status_reader) = connection_status();

    let controller = Arc::new(Controller::new(
        InputState::new(),
        queue.clone(),
        PresenceTracker::new(),
        status_reader,
    ));

    let sender = SocketSender::new(config.sender_config(), queue, status_writer);
    let sender_state = sender.subscribe();
    let sender_task = tokio::spawn(sender.run());

    Bridge {
        controller,
        sender_state,
        sender_task,
    }
}

/// Run the bridge and HTTP server with the given configuration.
pub async fn run(config: Config) -> anyhow::Result<()> {
    info!(
        emulator = %config.socket_addr_string(),
        tick_rate = config.app.tick_rate,
        run_forever = config.app.run_forever,
        "starting crowdpad"
    );

    let Bridge {
        controller,
        sender_task,
        ..
    } = start_bridge(&config);

    // A bounded sender may stop; keep serving so status reports "disconnected".
    tokio::spawn(async move {
        match sender_task.await {
            Ok(state) => warn!(?state, "socket sender exited"),
            Err(err) => warn!(error = %err, "socket sender task failed"),
        }
    });

    let addr = config.http_addr_string();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind HTTP listener on {}", addr))?;
    info!(%addr, "HTTP listening");

    axum::serve(listener, http::router(AppState { controller }))
        .await
        .context("HTTP server error")?;

    Ok(())
}
