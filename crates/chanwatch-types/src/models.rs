use serde::{Deserialize, Serialize};

/// A chat line as persisted and pushed to web clients.
///
/// Field names on the wire are the short keys the browser client reads.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ChatRecord {
    #[serde(rename = "c")]
    pub channel: String,
    #[serde(rename = "m")]
    pub message: String,
    /// Milliseconds since the epoch, assigned when the record is stored.
    #[serde(rename = "t")]
    pub timestamp: i64,
    #[serde(rename = "n")]
    pub name: String,
    #[serde(rename = "u")]
    pub user: String,
    #[serde(rename = "h")]
    pub host: String,
    /// Raw frame parameters. Stored, never sent to clients.
    #[serde(skip)]
    pub params: Vec<String>,
}

impl ChatRecord {
    pub fn new(channel: impl Into<String>, message: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
            message: message.into(),
            name: name.into(),
            ..Self::default()
        }
    }
}

/// Member list of one channel (or private conversation).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelRoster {
    #[serde(rename = "channelName")]
    pub channel: String,
    pub names: Vec<String>,
}

impl ChannelRoster {
    pub fn new(channel: impl Into<String>, names: Vec<String>) -> Self {
        Self {
            channel: channel.into(),
            names,
        }
    }
}
