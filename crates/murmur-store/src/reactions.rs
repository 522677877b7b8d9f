use tracing::debug;

use murmur_types::models::Reactions;

use crate::{Result, Store, require};

/// Result of a reaction toggle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToggleOutcome {
    /// true if the user's reaction was added, false if it was removed.
    pub added: bool,
    /// The message's full reaction mapping after the toggle.
    pub reactions: Reactions,
}

/// Add `username` under `emoji` if absent, otherwise remove it.
///
/// Calling this twice with the same arguments restores the original mapping.
pub fn toggle(reactions: &mut Reactions, emoji: &str, username: &str) -> bool {
    if reactions.contains(emoji, username) {
        reactions.remove(emoji, username);
        false
    } else {
        reactions.add(emoji, username);
        true
    }
}

impl Store {
    /// Toggle one user's emoji reaction on a message as a single
    /// read-modify-write under the channel lock.
    pub fn toggle_reaction(
        &self,
        channel_id: &str,
        message_id: &str,
        emoji: &str,
        username: &str,
    ) -> Result<ToggleOutcome> {
        require(channel_id, "channelId")?;
        require(message_id, "messageId")?;
        require(emoji, "emoji")?;
        require(username, "username")?;

        let outcome = self.mutate_message(channel_id, message_id, |message| {
            let added = toggle(&mut message.reactions, emoji, username);
            ToggleOutcome {
                added,
                reactions: message.reactions.clone(),
            }
        })?;

        debug!(
            "{} reaction {} from {} on message {} in channel {}",
            if outcome.added { "Added" } else { "Removed" },
            emoji,
            username,
            message_id,
            channel_id
        );
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{NewMessage, StoreError};

    fn store_with_message() -> (Store, String) {
        let store = Store::default();
        let msg = store.post_message("general", NewMessage::text("alice", "hi")).unwrap();
        (store, msg.id)
    }

    #[test]
    fn test_toggle_is_its_own_inverse() {
        let (store, id) = store_with_message();
        store.toggle_reaction("general", &id, "🎉", "carol").unwrap();
        let before = store.message("general", &id).unwrap().reactions;

        let first = store.toggle_reaction("general", &id, "👍", "bob").unwrap();
        assert!(first.added);
        assert_eq!(first.reactions.get("👍").unwrap(), ["bob".to_string()]);

        let second = store.toggle_reaction("general", &id, "👍", "bob").unwrap();
        assert!(!second.added);
        assert_eq!(second.reactions, before);
    }

    #[test]
    fn test_toggle_is_its_own_inverse_for_existing_reactor() {
        let (store, id) = store_with_message();
        store.toggle_reaction("general", &id, "👍", "bob").unwrap();
        store.toggle_reaction("general", &id, "👍", "carol").unwrap();
        store.toggle_reaction("general", &id, "🎉", "dave").unwrap();
        let before = store.message("general", &id).unwrap().reactions;

        let first = store.toggle_reaction("general", &id, "👍", "bob").unwrap();
        assert!(!first.added);
        assert_eq!(first.reactions.get("👍").unwrap(), ["carol".to_string()]);

        let second = store.toggle_reaction("general", &id, "👍", "bob").unwrap();
        assert!(second.added);
        assert_eq!(second.reactions, before);
        assert_eq!(store.message("general", &id).unwrap().reactions, before);
    }

    #[test]
    fn test_last_reactor_removes_emoji_key() {
        let (store, id) = store_with_message();
        store.toggle_reaction("general", &id, "👍", "bob").unwrap();
        store.toggle_reaction("general", &id, "👍", "carol").unwrap();
        store.toggle_reaction("general", &id, "👍", "bob").unwrap();

        let r = store.toggle_reaction("general", &id, "👍", "carol").unwrap().reactions;
        assert!(r.get("👍").is_none());
        assert_eq!(serde_json::to_string(&r).unwrap(), "{}");
    }

    #[test]
    fn test_unknown_message_leaves_others_alone() {
        let (store, id) = store_with_message();
        store.toggle_reaction("general", &id, "👍", "bob").unwrap();
        let before = store.messages("general");

        let err = store.toggle_reaction("general", "gone", "👍", "bob").unwrap_err();
        assert!(matches!(err, StoreError::MessageNotFound { .. }));
        assert_eq!(store.messages("general"), before);
    }

    #[test]
    fn test_reaction_on_evicted_message_is_not_found() {
        let store = Store::new(crate::StoreConfig {
            max_messages_per_channel: 1,
            ..Default::default()
        });
        let old = store.post_message("general", NewMessage::text("alice", "old")).unwrap();
        store.post_message("general", NewMessage::text("alice", "new")).unwrap();

        assert!(store.toggle_reaction("general", &old.id, "👍", "bob").is_err());
    }

    #[test]
    fn test_empty_fields_rejected() {
        let (store, id) = store_with_message();
        assert_eq!(
            store.toggle_reaction("general", &id, "", "bob"),
            Err(StoreError::Validation("emoji"))
        );
        assert_eq!(
            store.toggle_reaction("general", &id, "👍", ""),
            Err(StoreError::Validation("username"))
        );
        assert!(store.message("general", &id).unwrap().reactions.is_empty());
    }

    #[test]
    fn test_scenario_post_toggle_toggle_list() {
        let store = Store::default();
        let msg = store.post_message("general", NewMessage::text("alice", "hi")).unwrap();

        let r = store.toggle_reaction("general", &msg.id, "👍", "bob").unwrap().reactions;
        assert_eq!(serde_json::to_value(&r).unwrap(), serde_json::json!({"👍": ["bob"]}));

        let r = store.toggle_reaction("general", &msg.id, "👍", "bob").unwrap().reactions;
        assert_eq!(serde_json::to_value(&r).unwrap(), serde_json::json!({}));

        let listed = store.messages("general");
        assert_eq!(listed.len(), 1);
        assert!(listed[0].reactions.is_empty());
    }
}
