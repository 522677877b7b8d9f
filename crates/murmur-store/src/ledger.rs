use std::collections::VecDeque;

use tracing::{debug, info};

use murmur_types::models::{Message, Reactions};

use crate::ids::generate_message_id;
use crate::{Result, Store, StoreError, require};

/// A message as submitted by a poster, before the store canonicalizes it.
#[derive(Debug, Clone, Default)]
pub struct NewMessage {
    pub username: String,
    pub content: String,
    /// Caller-chosen id; generated when `None` or empty.
    pub id: Option<String>,
    /// Epoch ms; assigned at acceptance when `None` or not positive.
    pub timestamp: Option<i64>,
    pub reactions: Option<Reactions>,
    pub file_url: Option<String>,
    pub file_name: Option<String>,
    pub file_type: Option<String>,
    pub file_size: Option<u64>,
}

impl NewMessage {
    pub fn text(username: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            content: content.into(),
            ..Default::default()
        }
    }
}

/// One channel's retained messages, oldest first.
#[derive(Default)]
pub(crate) struct ChannelLedger {
    messages: VecDeque<Message>,
}

impl ChannelLedger {
    fn contains(&self, id: &str) -> bool {
        self.messages.iter().any(|m| m.id == id)
    }

    /// Push and trim to `cap`. Returns how many old messages were evicted.
    fn push(&mut self, message: Message, cap: usize) -> usize {
        self.messages.push_back(message);
        let mut evicted = 0;
        while self.messages.len() > cap {
            self.messages.pop_front();
            evicted += 1;
        }
        evicted
    }

    fn get_mut(&mut self, id: &str) -> Option<&mut Message> {
        self.messages.iter_mut().find(|m| m.id == id)
    }
}

impl Store {
    /// Validate, canonicalize and append a message, trimming the channel to
    /// its retention cap. The channel is created if this is its first message.
    pub fn post_message(&self, channel_id: &str, new: NewMessage) -> Result<Message> {
        require(channel_id, "channelId")?;
        require(&new.username, "username")?;
        let has_attachment = new.file_url.as_deref().is_some_and(|u| !u.is_empty());
        if new.content.is_empty() && !has_attachment {
            return Err(StoreError::Validation("content"));
        }

        let now = self.now_ms();
        let cap = self.config.max_messages_per_channel.max(1);

        self.ledgers.with(channel_id, |ledger| {
            let id = match new.id.filter(|id| !id.is_empty()) {
                Some(id) if ledger.contains(&id) => return Err(StoreError::DuplicateId(id)),
                Some(id) => id,
                None => loop {
                    let id = generate_message_id(now);
                    if !ledger.contains(&id) {
                        break id;
                    }
                },
            };

            let message = Message {
                id,
                username: new.username,
                content: new.content,
                timestamp: new.timestamp.filter(|ts| *ts > 0).unwrap_or(now),
                channel_id: channel_id.to_string(),
                reactions: new.reactions.unwrap_or_default(),
                file_url: new.file_url,
                file_name: new.file_name,
                file_type: new.file_type,
                file_size: new.file_size,
            };

            let evicted = ledger.push(message.clone(), cap);
            if evicted > 0 {
                debug!("Evicted {} message(s) from channel {}", evicted, channel_id);
            }
            info!("Message {} saved to channel {}", message.id, channel_id);
            Ok(message)
        })
    }

    /// Every retained message in the channel, oldest first. Unknown channels
    /// yield an empty list.
    pub fn messages(&self, channel_id: &str) -> Vec<Message> {
        self.ledgers
            .with_existing(channel_id, |ledger| ledger.messages.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn message(&self, channel_id: &str, message_id: &str) -> Option<Message> {
        self.ledgers
            .with_existing(channel_id, |ledger| {
                ledger.messages.iter().find(|m| m.id == message_id).cloned()
            })
            .flatten()
    }

    pub fn message_ids(&self, channel_id: &str) -> Vec<String> {
        self.ledgers
            .with_existing(channel_id, |ledger| {
                ledger.messages.iter().map(|m| m.id.clone()).collect()
            })
            .unwrap_or_default()
    }

    /// Apply `f` to the stored message under the channel lock.
    ///
    /// The only failure is `MessageNotFound`, in which case nothing is touched.
    pub fn mutate_message<F, T>(&self, channel_id: &str, message_id: &str, f: F) -> Result<T>
    where
        F: FnOnce(&mut Message) -> T,
    {
        self.ledgers
            .with_existing(channel_id, |ledger| ledger.get_mut(message_id).map(f))
            .flatten()
            .ok_or_else(|| StoreError::MessageNotFound {
                channel_id: channel_id.to_string(),
                message_id: message_id.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StoreConfig;

    fn store_with_cap(cap: usize) -> Store {
        Store::new(StoreConfig {
            max_messages_per_channel: cap,
            ..Default::default()
        })
    }

    #[test]
    fn test_post_assigns_id_and_timestamp() {
        let store = Store::default();
        let msg = store.post_message("general", NewMessage::text("alice", "hi")).unwrap();

        assert!(!msg.id.is_empty());
        assert!(msg.timestamp > 0);
        assert!(msg.reactions.is_empty());
        assert_eq!(msg.channel_id, "general");
        assert_eq!(store.messages("general"), vec![msg]);
    }

    #[test]
    fn test_post_keeps_caller_id_and_timestamp() {
        let store = Store::default();
        let msg = store
            .post_message(
                "general",
                NewMessage {
                    id: Some("client-1".into()),
                    timestamp: Some(1234),
                    ..NewMessage::text("alice", "hi")
                },
            )
            .unwrap();
        assert_eq!(msg.id, "client-1");
        assert_eq!(msg.timestamp, 1234);
    }

    #[test]
    fn test_duplicate_caller_id_rejected() {
        let store = Store::default();
        let first = NewMessage {
            id: Some("dup".into()),
            ..NewMessage::text("alice", "one")
        };
        store.post_message("general", first.clone()).unwrap();

        let err = store.post_message("general", first).unwrap_err();
        assert_eq!(err, StoreError::DuplicateId("dup".into()));
        assert_eq!(store.messages("general").len(), 1);

        // Same id in another channel is fine
        store
            .post_message(
                "random",
                NewMessage {
                    id: Some("dup".into()),
                    ..NewMessage::text("bob", "two")
                },
            )
            .unwrap();
    }

    #[test]
    fn test_validation() {
        let store = Store::default();
        assert_eq!(
            store.post_message("general", NewMessage::text("", "hi")),
            Err(StoreError::Validation("username"))
        );
        assert_eq!(
            store.post_message("general", NewMessage::text("alice", "")),
            Err(StoreError::Validation("content"))
        );
        assert_eq!(
            store.post_message("", NewMessage::text("alice", "hi")),
            Err(StoreError::Validation("channelId"))
        );
        assert!(store.messages("general").is_empty());
    }

    #[test]
    fn test_file_only_message_allowed() {
        let store = Store::default();
        let msg = store
            .post_message(
                "general",
                NewMessage {
                    file_url: Some("/uploads/1-report.pdf".into()),
                    file_name: Some("report.pdf".into()),
                    file_type: Some("application/pdf".into()),
                    file_size: Some(10),
                    ..NewMessage::text("alice", "")
                },
            )
            .unwrap();
        assert_eq!(msg.file_url.as_deref(), Some("/uploads/1-report.pdf"));
        assert_eq!(msg.file_size, Some(10));
        assert!(msg.content.is_empty());
    }

    #[test]
    fn test_retention_evicts_oldest_first() {
        let store = Store::default();
        for i in 0..101 {
            store
                .post_message("general", NewMessage::text("alice", format!("m{}", i)))
                .unwrap();
        }

        let msgs = store.messages("general");
        assert_eq!(msgs.len(), 100);
        for (i, msg) in msgs.iter().enumerate() {
            assert_eq!(msg.content, format!("m{}", i + 1));
        }
    }

    #[test]
    fn test_retention_with_small_cap() {
        let store = store_with_cap(3);
        for i in 0..7 {
            store
                .post_message("general", NewMessage::text("alice", format!("m{}", i)))
                .unwrap();
        }
        let contents: Vec<String> = store.messages("general").into_iter().map(|m| m.content).collect();
        assert_eq!(contents, vec!["m4", "m5", "m6"]);
    }

    #[test]
    fn test_unknown_channel_is_empty() {
        let store = Store::default();
        assert!(store.messages("nowhere").is_empty());
        assert!(store.message("nowhere", "x").is_none());
        assert!(store.message_ids("nowhere").is_empty());
    }

    #[test]
    fn test_list_returns_copies() {
        let store = Store::default();
        let msg = store.post_message("general", NewMessage::text("alice", "hi")).unwrap();

        let mut snapshot = store.messages("general");
        snapshot[0].content = "tampered".into();
        snapshot[0].reactions.add("👍", "mallory");

        let stored = store.message("general", &msg.id).unwrap();
        assert_eq!(stored.content, "hi");
        assert!(stored.reactions.is_empty());
    }

    #[test]
    fn test_mutate_unknown_message() {
        let store = Store::default();
        store.post_message("general", NewMessage::text("alice", "hi")).unwrap();

        let err = store.mutate_message("general", "missing", |_| ()).unwrap_err();
        assert!(matches!(err, StoreError::MessageNotFound { .. }));

        let err = store.mutate_message("nowhere", "missing", |_| ()).unwrap_err();
        assert!(matches!(err, StoreError::MessageNotFound { .. }));
    }
}
