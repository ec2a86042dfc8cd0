use serde::{Deserialize, Serialize};

use crate::models::ChatRecord;

/// "Something changed" signals pushed to the web subscriber.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ChangeToken {
    /// Greeting sent when a subscriber attaches. Nothing is replayed.
    Hello,

    /// Bare signal with no payload, posted to force clients to re-fetch.
    Ping,

    /// A chat line was stored.
    Message(ChatRecord),
}
