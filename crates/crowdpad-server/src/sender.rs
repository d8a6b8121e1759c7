// crates/crowdpad-server/src/sender.rs

//! Emulator socket sender.
//!
//! Owns the single outbound TCP connection and drains the
//! [`DeliveryQueue`] into it at a fixed tick rate.
//!
//! State machine:
//!
//! ```text
//!             connect ok                    peer closed / send failed
//! Disconnected ---------> Connecting ---> Connected -------------------> Disconnected
//!      ^                      |
//!      |  refused / timeout / |  (bounded policy, budget spent)
//!      +----------------------+-----------------------------------------> Stopped
//! ```
//!
//! While connected, every tick:
//! 1. sleep `1 / tick_rate` (unconditionally, even when idle),
//! 2. check whether the emulator hung up,
//! 3. pop the oldest snapshot, if any, and write it as 2 bytes LE.
//!
//! Transport errors never leave this module; they only move the state
//! machine. A snapshot whose write fails is dropped, not retried: the
//! next queued snapshot already carries the complete held state.

use std::io::ErrorKind;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::sync::watch;
use tokio::time::{sleep, timeout};
use tracing::{debug, error, info, warn};

use crowdpad_core::{DeliveryQueue, StatusWriter};
use crowdpad_protocol::wire;

/// Observable sender state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SenderState {
    Disconnected,
    Connecting,
    Connected,
    /// Terminal; only reachable under a bounded [`RetryPolicy`].
    Stopped,
}

/// How connect failures are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub retry_forever: bool,
    /// Consecutive failed connects tolerated when `retry_forever` is false.
    pub max_attempts: u32,
    /// Pause after each failed connect.
    pub retry_delay: Duration,
}

impl RetryPolicy {
    pub fn forever(retry_delay: Duration) -> Self {
        RetryPolicy {
            retry_forever: true,
            max_attempts: 0,
            retry_delay,
        }
    }

    pub fn bounded(max_attempts: u32, retry_delay: Duration) -> Self {
        RetryPolicy {
            retry_forever: false,
            max_attempts,
            retry_delay,
        }
    }

    /// Whether `failures` consecutive failed connects means giving up.
    pub fn exhausted(&self, failures: u32) -> bool {
        !self.retry_forever && failures >= self.max_attempts
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy::forever(Duration::from_secs(1))
    }
}

/// Everything the sender needs to know about its peer.
#[derive(Debug, Clone)]
pub struct SenderConfig {
    /// Emulator `host:port`.
    pub addr: String,
    /// Sends per second.
    pub tick_rate: u32,
    pub retry: RetryPolicy,
    pub connect_timeout: Duration,
}

impl SenderConfig {
    pub fn new(addr: impl Into<String>) -> Self {
        SenderConfig {
            addr: addr.into(),
            tick_rate: 120,
            retry: RetryPolicy::default(),
            connect_timeout: Duration::from_secs(3),
        }
    }

    /// Delay between drain attempts. A zero tick rate is treated as 1/s.
    pub fn tick_period(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.tick_rate.max(1)))
    }
}

/// Why a connected session ended.
#[derive(Debug)]
enum Disconnect {
    /// Emulator closed its end.
    PeerClosed,
    /// Reading the liveness probe failed.
    ReadFailed(std::io::Error),
    /// Writing a snapshot failed; the snapshot bits are lost.
    SendFailed { bits: u16, err: std::io::Error },
}

/// The long-lived sender task.
pub struct SocketSender {
    config: SenderConfig,
    queue: Arc<DeliveryQueue>,
    status: StatusWriter,
    state_tx: watch::Sender<SenderState>,
    /// Consecutive failed connects since the last success.
    failures: u32,
    /// Last seen value of the queue's drop counter.
    seen_dropped: u64,
}

impl SocketSender {
    pub fn new(config: SenderConfig, queue: Arc<DeliveryQueue>, status: StatusWriter) -> Self {
        let (state_tx, _) = watch::channel(SenderState::Disconnected);
        SocketSender {
            config,
            queue,
            status,
            state_tx,
            failures: 0,
            seen_dropped: 0,
        }
    }

    /// Watch state transitions.
    pub fn subscribe(&self) -> watch::Receiver<SenderState> {
        self.state_tx.subscribe()
    }

    /// Run until the retry budget runs out. Under an unbounded policy this
    /// never returns. The return value is always [`SenderState::Stopped`].
    pub async fn run(mut self) -> SenderState {
        loop {
            let Some(stream) = self.connect().await else {
                self.status.set_disconnected();
                self.transition(SenderState::Stopped);
                warn!(
                    addr = %self.config.addr,
                    attempts = self.failures,
                    "giving up on emulator connection"
                );
                return SenderState::Stopped;
            };

            self.status.set_connected();
            self.transition(SenderState::Connected);
            info!(addr = %self.config.addr, "connected to emulator");

            let reason = self.pump(stream).await;

            // The stream was dropped (closed) inside `pump`.
            self.status.set_disconnected();
            self.transition(SenderState::Disconnected);
            match reason {
                Disconnect::PeerClosed => info!("emulator closed the connection"),
                Disconnect::ReadFailed(err) => {
                    warn!(error = %err, "emulator connection lost");
                    sleep(self.config.retry.retry_delay).await;
                }
                Disconnect::SendFailed { bits, err } => {
                    warn!(error = %err, bits, "send failed, dropping snapshot")
                }
            }
        }
    }

    /// Try to connect until it works or the policy says stop.
    ///
    /// Returns `None` only when the budget is exhausted.
    async fn connect(&mut self) -> Option<TcpStream> {
        loop {
            self.transition(SenderState::Connecting);
            info!(
                addr = %self.config.addr,
                attempt = self.failures + 1,
                "connecting to emulator"
            );

            match timeout(self.config.connect_timeout, TcpStream::connect(&self.config.addr)).await {
                Ok(Ok(stream)) => {
                    if let Err(err) = stream.set_nodelay(true) {
                        debug!(error = %err, "set_nodelay failed");
                    }
                    self.failures = 0;
                    return Some(stream);
                }
                Ok(Err(err)) if err.kind() == ErrorKind::ConnectionRefused => {
                    warn!(addr = %self.config.addr, "connection refused");
                }
                Ok(Err(err)) => {
                    error!(addr = %self.config.addr, error = %err, "connect failed");
                }
                Err(_elapsed) => {
                    warn!(
                        addr = %self.config.addr,
                        timeout_ms = (self.config.connect_timeout.as_millis() as u64),
                        "connect timed out"
                    );
                }
            }

            self.failures += 1;
            self.transition(SenderState::Disconnected);
            if self.config.retry.exhausted(self.failures) {
                return None;
            }
            sleep(self.config.retry.retry_delay).await;
        }
    }

    /// Steady state: drain one snapshot per tick until the link breaks.
    async fn pump(&mut self, mut stream: TcpStream) -> Disconnect {
        let period = self.config.tick_period();

        loop {
            sleep(period).await;

            if let Some(reason) = probe_peer(&stream) {
                return reason;
            }

            self.report_overflow();

            let Some(snapshot) = self.queue.pop_oldest() else {
                continue;
            };

            let frame = wire::encode_snapshot(snapshot);
            if let Err(err) = stream.write_all(&frame).await {
                return Disconnect::SendFailed {
                    bits: snapshot.bits(),
                    err,
                };
            }
            debug!(
                input = %snapshot,
                pending = self.queue.len(),
                "sent snapshot"
            );
        }
    }

    fn report_overflow(&mut self) {
        let dropped = self.queue.dropped();
        if dropped > self.seen_dropped {
            warn!(
                newly_dropped = dropped - self.seen_dropped,
                limit = self.queue.limit(),
                "delivery queue full, oldest snapshots discarded"
            );
            self.seen_dropped = dropped;
        }
    }

    fn transition(&self, next: SenderState) {
        self.state_tx.send_if_modified(|state| {
            if *state == next {
                false
            } else {
                debug!(from = ?*state, to = ?next, "sender state");
                *state = next;
                true
            }
        });
    }
}

/// Non-blocking check for a hung-up peer.
///
/// The emulator never sends anything meaningful, so any bytes that do
/// show up are discarded.
fn probe_peer(stream: &TcpStream) -> Option<Disconnect> {
    let mut scratch = [0u8; 256];
    loop {
        match stream.try_read(&mut scratch) {
            Ok(0) => return Some(Disconnect::PeerClosed),
            Ok(n) => debug!(bytes = n, "discarding bytes from emulator"),
            Err(err) if err.kind() == ErrorKind::WouldBlock => return None,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Some(Disconnect::ReadFailed(err)),
        }
    }
}
