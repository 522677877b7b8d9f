use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A chat message as stored in a channel ledger and returned to pollers.
///
/// `content` may be empty only when `file_url` carries an attachment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub username: String,
    pub content: String,
    /// Epoch milliseconds.
    pub timestamp: i64,
    pub channel_id: String,
    #[serde(default)]
    pub reactions: Reactions,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_size: Option<u64>,
}

/// Emoji -> usernames who reacted with it.
///
/// Emoji keep the order in which they were first added, and that order is
/// preserved on the wire as JSON object key order. An emoji never maps to an
/// empty list. The order of usernames under one emoji carries no meaning, so
/// equality treats each list as a set.
#[derive(Debug, Clone, Default)]
pub struct Reactions(Vec<(String, Vec<String>)>);

impl PartialEq for Reactions {
    fn eq(&self, other: &Self) -> bool {
        self.0.len() == other.0.len()
            && self.0.iter().zip(&other.0).all(|((a, a_users), (b, b_users))| {
                // usernames are unique per emoji, so equal length + containment is set equality
                a == b
                    && a_users.len() == b_users.len()
                    && a_users.iter().all(|u| b_users.contains(u))
            })
    }
}

impl Eq for Reactions {}

impl Reactions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of distinct emoji.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, emoji: &str) -> Option<&[String]> {
        self.0
            .iter()
            .find(|(e, _)| e == emoji)
            .map(|(_, users)| users.as_slice())
    }

    pub fn contains(&self, emoji: &str, username: &str) -> bool {
        self.get(emoji)
            .is_some_and(|users| users.iter().any(|u| u == username))
    }

    /// Adds `username` under `emoji`. Returns false if it was already there.
    pub fn add(&mut self, emoji: &str, username: &str) -> bool {
        match self.0.iter_mut().find(|(e, _)| e == emoji) {
            Some((_, users)) => {
                if users.iter().any(|u| u == username) {
                    return false;
                }
                users.push(username.to_string());
            }
            None => self.0.push((emoji.to_string(), vec![username.to_string()])),
        }
        true
    }

    /// Removes `username` from `emoji`, dropping the emoji once nobody is left.
    /// Returns false if there was nothing to remove.
    pub fn remove(&mut self, emoji: &str, username: &str) -> bool {
        let Some(pos) = self.0.iter().position(|(e, _)| e == emoji) else {
            return false;
        };
        let users = &mut self.0[pos].1;
        let before = users.len();
        users.retain(|u| u != username);
        let removed = users.len() != before;
        if users.is_empty() {
            self.0.remove(pos);
        }
        removed
    }
}

impl Serialize for Reactions {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (emoji, users) in &self.0 {
            map.serialize_entry(emoji, users)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Reactions {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ReactionsVisitor;

        impl<'de> Visitor<'de> for ReactionsVisitor {
            type Value = Reactions;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of emoji to usernames")
            }

            fn visit_unit<E: serde::de::Error>(self) -> Result<Reactions, E> {
                Ok(Reactions::new())
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Reactions, A::Error> {
                let mut reactions = Reactions::new();
                while let Some((emoji, users)) = access.next_entry::<String, Vec<String>>()? {
                    // add() dedupes and never leaves an empty list behind
                    for user in &users {
                        reactions.add(&emoji, user);
                    }
                }
                Ok(reactions)
            }
        }

        deserializer.deserialize_any(ReactionsVisitor)
    }
}

/// One participant's presence in a channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresenceEntry {
    pub username: String,
    /// Epoch milliseconds of the last heartbeat.
    pub last_seen: i64,
    pub is_typing: bool,
}

/// A presence entry plus the read-time `online` classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresenceSnapshot {
    #[serde(flatten)]
    pub entry: PresenceEntry,
    pub online: bool,
}
