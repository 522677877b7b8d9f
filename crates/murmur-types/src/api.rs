use serde::{Deserialize, Serialize};

use crate::DEFAULT_CHANNEL;
use crate::models::{Message, PresenceEntry, PresenceSnapshot, Reactions};

// -- Queries --

#[derive(Debug, Default, Deserialize)]
pub struct ChannelQuery {
    pub channel: Option<String>,
}

impl ChannelQuery {
    /// The requested channel, falling back to `general` when absent or blank.
    pub fn channel_or_default(&self) -> &str {
        match self.channel.as_deref() {
            Some(c) if !c.is_empty() => c,
            _ => DEFAULT_CHANNEL,
        }
    }
}

// -- Messages --

/// Fields are optional on the wire so missing ones surface as a 400 with a
/// readable error instead of a deserialization rejection.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostMessageRequest {
    pub channel_id: Option<String>,
    pub username: Option<String>,
    pub content: Option<String>,
    pub id: Option<String>,
    pub timestamp: Option<i64>,
    pub reactions: Option<Reactions>,
    pub file_url: Option<String>,
    pub file_name: Option<String>,
    pub file_type: Option<String>,
    pub file_size: Option<u64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessagesResponse {
    pub messages: Vec<Message>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostMessageResponse {
    pub success: bool,
    pub message_id: String,
    pub message: Message,
}

// -- Reactions --

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleReactionRequest {
    pub channel_id: Option<String>,
    pub message_id: Option<String>,
    pub emoji: Option<String>,
    pub username: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ToggleReactionResponse {
    pub success: bool,
    /// true when this toggle added the reaction, false when it removed it.
    pub added: bool,
    /// Authoritative mapping after the toggle; clients overwrite local state with it.
    pub reactions: Reactions,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReactionDebugResponse {
    pub channel_id: String,
    pub message_count: usize,
    pub messages: Vec<ReactionDebugEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReactionDebugEntry {
    pub id: String,
    /// First 50 characters of the message content.
    pub content: String,
    pub reactions: Reactions,
}

// -- Presence --

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeartbeatRequest {
    pub channel_id: Option<String>,
    pub username: Option<String>,
    pub is_typing: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HeartbeatResponse {
    pub users: Vec<PresenceEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterResponse {
    pub channel_id: String,
    pub user_count: usize,
    pub users: Vec<PresenceSnapshot>,
}

// -- Files --

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub success: bool,
    /// Public URL to put in a message's `fileUrl`.
    pub file_url: String,
    /// Stored name, as accepted by the download endpoint.
    pub filename: String,
    pub original_name: String,
    pub size: u64,
    #[serde(rename = "type")]
    pub content_type: String,
}
