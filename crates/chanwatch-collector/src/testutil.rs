use std::sync::Mutex;

use anyhow::{Result, bail};

use chanwatch_db::RecordStore;
use chanwatch_irc::{Message, Outbound};
use chanwatch_types::models::{ChannelRoster, ChatRecord};

/// Outbound double that keeps every frame it is handed.
#[derive(Default)]
pub struct RecordingOutbound {
    sent: Mutex<Vec<Message>>,
}

impl RecordingOutbound {
    pub fn sent(&self) -> Vec<Message> {
        self.sent.lock().unwrap().clone()
    }
}

impl Outbound for RecordingOutbound {
    fn send(&self, message: Message) {
        self.sent.lock().unwrap().push(message);
    }
}

/// Store whose every operation fails.
pub struct FailingStore;

impl RecordStore for FailingStore {
    fn insert_message(&self, _record: &ChatRecord) -> Result<()> {
        bail!("disk full")
    }

    fn messages_for_channel(&self, _channel: &str) -> Result<Vec<ChatRecord>> {
        bail!("disk full")
    }

    fn find_roster(&self, _channel: &str) -> Result<Option<ChannelRoster>> {
        bail!("disk full")
    }

    fn insert_roster(&self, _roster: &ChannelRoster) -> Result<bool> {
        bail!("disk full")
    }

    fn upsert_roster(&self, _roster: &ChannelRoster) -> Result<()> {
        bail!("disk full")
    }

    fn rosters(&self) -> Result<Vec<ChannelRoster>> {
        bail!("disk full")
    }
}
