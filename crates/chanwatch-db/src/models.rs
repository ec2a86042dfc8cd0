/// Database row types. Name lists and frame params are stored as JSON arrays
/// in TEXT columns and decoded on the way out.
use anyhow::Result;

use chanwatch_types::models::{ChannelRoster, ChatRecord};

pub struct ChatMessageRow {
    pub channel: String,
    pub message: String,
    pub timestamp: i64,
    pub name: String,
    pub user: String,
    pub host: String,
    pub params: String,
}

impl ChatMessageRow {
    pub fn into_record(self) -> Result<ChatRecord> {
        Ok(ChatRecord {
            channel: self.channel,
            message: self.message,
            timestamp: self.timestamp,
            name: self.name,
            user: self.user,
            host: self.host,
            params: serde_json::from_str(&self.params)?,
        })
    }
}

pub struct ChannelRow {
    pub channel_name: String,
    pub names: String,
}

impl ChannelRow {
    pub fn into_roster(self) -> Result<ChannelRoster> {
        Ok(ChannelRoster {
            channel: self.channel_name,
            names: serde_json::from_str(&self.names)?,
        })
    }
}
