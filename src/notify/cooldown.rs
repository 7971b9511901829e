//! Per-recipient DM cooldown gate
//!
//! Tracks the last send attempt per recipient and rejects sends inside a
//! dynamic window derived from the message characteristics. The record is
//! debited on attempt, not on confirmed delivery.

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::debug;

/// Base cooldown window in seconds
const BASE_COOLDOWN_SECS: i64 = 5;
/// Extra seconds for messages longer than `LONG_MESSAGE_THRESHOLD`
const LONG_MESSAGE_EXTRA_SECS: i64 = 2;
/// Message length above which the long-message penalty applies
const LONG_MESSAGE_THRESHOLD: usize = 200;
/// Extra seconds when the message carries rich content
const RICH_CONTENT_EXTRA_SECS: i64 = 1;

/// Service-scoped cooldown state, created with the notifier and pruned
/// periodically so the map stays bounded in long-running processes.
#[derive(Debug, Default)]
pub struct CooldownGate {
    // Map of recipient user id -> last send attempt
    last_attempt: DashMap<u64, DateTime<Utc>>,
}

impl CooldownGate {
    /// Create an empty gate
    #[must_use]
    pub fn new() -> Self {
        Self {
            last_attempt: DashMap::new(),
        }
    }

    /// Compute the cooldown window for a message
    #[must_use]
    pub fn window(message_len: usize, has_rich_content: bool) -> Duration {
        let mut secs = BASE_COOLDOWN_SECS;
        if message_len > LONG_MESSAGE_THRESHOLD {
            secs += LONG_MESSAGE_EXTRA_SECS;
        }
        if has_rich_content {
            secs += RICH_CONTENT_EXTRA_SECS;
        }
        Duration::seconds(secs)
    }

    /// Check whether a send to `recipient` is allowed right now, recording
    /// the attempt if it is. Returns false without touching the record when
    /// the recipient is still inside the window.
    pub fn allow(&self, recipient: u64, message_len: usize, has_rich_content: bool) -> bool {
        self.allow_at(recipient, message_len, has_rich_content, Utc::now())
    }

    /// Clock-injected variant of [`CooldownGate::allow`].
    ///
    /// The dashmap entry holds a shard write lock for the whole
    /// check-and-record, so concurrent calls for the same recipient cannot
    /// both pass inside one window.
    pub fn allow_at(
        &self,
        recipient: u64,
        message_len: usize,
        has_rich_content: bool,
        now: DateTime<Utc>,
    ) -> bool {
        let window = Self::window(message_len, has_rich_content);

        match self.last_attempt.entry(recipient) {
            Entry::Occupied(mut entry) => {
                if now - *entry.get() < window {
                    debug!(
                        target: crate::NOTIFY_TARGET,
                        recipient = recipient,
                        window_secs = window.num_seconds(),
                        "DM suppressed by cooldown"
                    );
                    false
                } else {
                    entry.insert(now);
                    true
                }
            }
            Entry::Vacant(entry) => {
                entry.insert(now);
                true
            }
        }
    }

    /// Drop records older than `max_age`
    pub fn prune(&self, max_age: Duration) {
        let cutoff = Utc::now() - max_age;
        self.last_attempt.retain(|_, last| *last >= cutoff);
    }

    /// Number of recipients currently tracked
    #[must_use]
    pub fn tracked(&self) -> usize {
        self.last_attempt.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_send_within_window_rejected() {
        let gate = CooldownGate::new();
        let now = Utc::now();

        assert!(gate.allow_at(1, 50, false, now));
        // 3 seconds later, still inside the 5 second base window
        assert!(!gate.allow_at(1, 50, false, now + Duration::seconds(3)));
    }

    #[test]
    fn test_sends_beyond_window_both_allowed() {
        let gate = CooldownGate::new();
        let now = Utc::now();

        assert!(gate.allow_at(1, 50, false, now));
        assert!(gate.allow_at(1, 50, false, now + Duration::seconds(5)));
    }

    #[test]
    fn test_window_monotonic_in_inputs() {
        let plain = CooldownGate::window(50, false);
        let long = CooldownGate::window(201, false);
        let long_rich = CooldownGate::window(201, true);

        assert_eq!(plain, Duration::seconds(5));
        assert_eq!(long, Duration::seconds(7));
        assert_eq!(long_rich, Duration::seconds(8));
        assert!(long_rich >= long && long >= plain);
    }

    #[test]
    fn test_rich_content_extends_window() {
        let gate = CooldownGate::new();
        let now = Utc::now();

        assert!(gate.allow_at(1, 50, true, now));
        // 5 seconds would clear a plain message but not a rich one (6s window)
        assert!(!gate.allow_at(1, 50, true, now + Duration::seconds(5)));
        assert!(gate.allow_at(1, 50, true, now + Duration::seconds(6)));
    }

    #[test]
    fn test_rejection_does_not_reset_window() {
        let gate = CooldownGate::new();
        let now = Utc::now();

        assert!(gate.allow_at(1, 50, false, now));
        assert!(!gate.allow_at(1, 50, false, now + Duration::seconds(4)));
        // Had the rejection debited the record, this would still be blocked
        assert!(gate.allow_at(1, 50, false, now + Duration::seconds(5)));
    }

    #[test]
    fn test_recipients_are_independent() {
        let gate = CooldownGate::new();
        let now = Utc::now();

        assert!(gate.allow_at(1, 50, false, now));
        assert!(gate.allow_at(2, 50, false, now));
        assert!(!gate.allow_at(1, 50, false, now + Duration::seconds(1)));
        assert!(!gate.allow_at(2, 50, false, now + Duration::seconds(1)));
    }

    #[test]
    fn test_prune_drops_stale_entries() {
        let gate = CooldownGate::new();
        let old = Utc::now() - Duration::minutes(30);

        assert!(gate.allow_at(1, 50, false, old));
        assert!(gate.allow_at(2, 50, false, Utc::now()));
        assert_eq!(gate.tracked(), 2);

        gate.prune(Duration::minutes(10));
        assert_eq!(gate.tracked(), 1);
    }
}
