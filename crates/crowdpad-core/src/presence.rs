//! Approximate "players connected" count.
//!
//! Each browser polls the status endpoint every few seconds with an
//! opaque client id. We remember when each id was last seen and treat
//! anything older than the staleness window as gone. Eviction happens
//! lazily, whenever the count is read.

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;

/// How long a client id survives without a poll.
pub const STALENESS_WINDOW_SECS: i64 = 7;

/// clientId -> last-seen time.
#[derive(Debug)]
pub struct PresenceTracker {
    last_seen: DashMap<String, DateTime<Utc>>,
    window: Duration,
}

impl Default for PresenceTracker {
    fn default() -> Self {
        PresenceTracker::with_window(Duration::seconds(STALENESS_WINDOW_SECS))
    }
}

impl PresenceTracker {
    pub fn new() -> Self {
        PresenceTracker::default()
    }

    pub fn with_window(window: Duration) -> Self {
        PresenceTracker {
            last_seen: DashMap::new(),
            window,
        }
    }

    /// Record `client_id` as seen now.
    pub fn touch(&self, client_id: &str) {
        self.touch_at(client_id, Utc::now());
    }

    /// Record `client_id` as seen at `now`. First sighting inserts it.
    pub fn touch_at(&self, client_id: &str, now: DateTime<Utc>) {
        self.last_seen.insert(client_id.to_string(), now);
    }

    /// Live client count, evicting stale ids as a side effect.
    pub fn count(&self) -> usize {
        self.count_at(Utc::now())
    }

    /// Live client count relative to `now`.
    ///
    /// An id last seen exactly `window` ago is already stale.
    pub fn count_at(&self, now: DateTime<Utc>) -> usize {
        let window = self.window;
        self.last_seen.retain(|_, seen| now.signed_duration_since(*seen) < window);
        self.last_seen.len()
    }

    /// Whether `client_id` is currently tracked (no eviction).
    pub fn contains(&self, client_id: &str) -> bool {
        self.last_seen.contains_key(client_id)
    }
}
