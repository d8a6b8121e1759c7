//! crowdpad-server
//!
//! Bridges many web clients to one emulator:
//! - HTTP routes receive button tokens and status polls,
//! - a single socket sender drains queued snapshots to the emulator
//!   over TCP at a fixed tick rate, reconnecting as needed.

pub mod config;
pub mod types;
pub mod sender;
pub mod http;
pub mod server;

pub use config::{Config, ConfigError};
pub use sender::{RetryPolicy, SenderConfig, SenderState, SocketSender};
