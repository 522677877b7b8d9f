use std::collections::BTreeMap;

use tracing::debug;

use murmur_types::models::{PresenceEntry, PresenceSnapshot};

use crate::{Result, Store, duration_ms, require};

#[derive(Debug, Clone, Copy)]
struct Seen {
    last_seen: i64,
    is_typing: bool,
}

/// One channel's participants, ordered by username.
#[derive(Default)]
pub(crate) struct PresencePartition {
    users: BTreeMap<String, Seen>,
}

impl PresencePartition {
    /// Drop entries idle for longer than `ttl_ms`. Returns how many went.
    fn sweep(&mut self, now: i64, ttl_ms: i64) -> usize {
        let before = self.users.len();
        self.users.retain(|_, seen| now - seen.last_seen <= ttl_ms);
        before - self.users.len()
    }

    fn entries(&self) -> impl Iterator<Item = PresenceEntry> + '_ {
        self.users.iter().map(|(username, seen)| PresenceEntry {
            username: username.clone(),
            last_seen: seen.last_seen,
            is_typing: seen.is_typing,
        })
    }
}

impl Store {
    /// Record a heartbeat, sweep idle participants and return the live roster.
    pub fn heartbeat(
        &self,
        channel_id: &str,
        username: &str,
        is_typing: bool,
    ) -> Result<Vec<PresenceEntry>> {
        require(channel_id, "channelId")?;
        require(username, "username")?;

        let now = self.now_ms();
        let ttl_ms = duration_ms(self.config.presence_ttl);

        let roster = self.presence.with(channel_id, |partition| {
            partition.users.insert(
                username.to_string(),
                Seen {
                    last_seen: now,
                    is_typing,
                },
            );
            let swept = partition.sweep(now, ttl_ms);
            if swept > 0 {
                debug!("Swept {} idle user(s) from channel {}", swept, channel_id);
            }
            partition.entries().collect()
        });
        Ok(roster)
    }

    /// Read-only roster with the derived `online` flag. Never sweeps.
    pub fn roster(&self, channel_id: &str) -> Vec<PresenceSnapshot> {
        let now = self.now_ms();
        let window_ms = duration_ms(self.config.online_window);

        self.presence
            .with_existing(channel_id, |partition| {
                partition
                    .entries()
                    .map(|entry| PresenceSnapshot {
                        online: now - entry.last_seen < window_ms,
                        entry,
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Sweep every channel's presence. Returns the number of entries removed.
    pub fn sweep_presence(&self) -> usize {
        let now = self.now_ms();
        let ttl_ms = duration_ms(self.config.presence_ttl);
        let mut total = 0;
        self.presence.for_each(|_, partition| {
            total += partition.sweep(now, ttl_ms);
        });
        total
    }
}
