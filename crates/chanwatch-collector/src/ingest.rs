use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use tracing::{debug, error, warn};

use chanwatch_db::RecordStore;
use chanwatch_gateway::ChangeNotifier;
use chanwatch_irc::{Message, Outbound};
use chanwatch_types::events::ChangeToken;
use chanwatch_types::models::{ChannelRoster, ChatRecord};

/// Store-and-notify path shared by the dispatcher and the REST layer.
///
/// All methods block: call them from the dispatch thread or from
/// `spawn_blocking`, never directly inside an async task.
#[derive(Clone)]
pub struct IngestPipeline {
    store: Arc<dyn RecordStore>,
    notifier: ChangeNotifier,
    sender_name: String,
    last_stamp: Arc<AtomicI64>,
}

impl IngestPipeline {
    /// `sender_name` is the identity recorded on messages we send ourselves.
    pub fn new(store: Arc<dyn RecordStore>, notifier: ChangeNotifier, sender_name: impl Into<String>) -> Self {
        Self {
            store,
            notifier,
            sender_name: sender_name.into(),
            last_stamp: Arc::new(AtomicI64::new(0)),
        }
    }

    pub fn store(&self) -> &Arc<dyn RecordStore> {
        &self.store
    }

    /// Persist `record` and tell the subscriber about it. Returns the record
    /// as stored, timestamp included.
    pub fn ingest(&self, mut record: ChatRecord) -> ChatRecord {
        self.ensure_roster(&record);

        record.timestamp = self.stamp();

        // A failed insert still notifies
        if let Err(e) = self.store.insert_message(&record) {
            error!("Error recording message for channel {}: {:#}", record.channel, e);
        }

        if let Err(e) = self.notifier.post_blocking(ChangeToken::Message(record.clone())) {
            warn!("Change for channel {} not queued: {}", record.channel, e);
        }

        record
    }

    /// Record a message we are sending ourselves, then put it on the wire.
    pub fn send_outbound(&self, outbound: &dyn Outbound, channel: &str, text: &str) -> ChatRecord {
        let record = self.ingest(ChatRecord::new(channel, text, self.sender_name.clone()));
        outbound.send(Message::privmsg(channel, text));
        record
    }

    /// Seed a roster holding just the sender the first time a channel (or
    /// private conversation) shows up. Only roster replies grow it later.
    fn ensure_roster(&self, record: &ChatRecord) {
        match self.store.find_roster(&record.channel) {
            Ok(Some(_)) => return,
            Ok(None) => {}
            Err(e) => warn!("Roster lookup failed for channel {}: {:#}", record.channel, e),
        }

        let roster = ChannelRoster::new(record.channel.clone(), vec![record.name.clone()]);
        match self.store.insert_roster(&roster) {
            Ok(true) => debug!("New channel {} seen, roster seeded with {}", record.channel, record.name),
            Ok(false) => {}
            Err(e) => error!("Error creating roster for channel {}: {:#}", record.channel, e),
        }
    }

    /// Wall-clock milliseconds, never below the previous stamp.
    fn stamp(&self) -> i64 {
        let now = chrono::Utc::now().timestamp_millis();
        let previous = self.last_stamp.fetch_max(now, Ordering::AcqRel);
        now.max(previous)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{FailingStore, RecordingOutbound};
    use chanwatch_db::Database;
    use chanwatch_gateway::{Relay, notifier};

    fn pipeline() -> (IngestPipeline, Arc<Database>, Relay) {
        let db = Arc::new(Database::open_in_memory().unwrap());
        let (notifier, relay) = notifier::channel(64);
        (IngestPipeline::new(db.clone(), notifier, "chanwatch"), db, relay)
    }

    fn chat(channel: &str, text: &str, name: &str) -> ChatRecord {
        let mut record = ChatRecord::new(channel, text, name);
        record.user = format!("~{}", name);
        record.host = "example.org".into();
        record
    }

    #[test]
    fn first_message_seeds_roster_with_sender_only() {
        let (pipeline, db, _relay) = pipeline();

        pipeline.ingest(chat("#x", "hi", "alice"));
        pipeline.ingest(chat("#x", "hello", "bob"));

        let rosters = db.rosters().unwrap();
        assert_eq!(rosters, vec![ChannelRoster::new("#x", vec!["alice".into()])]);
    }

    #[test]
    fn existing_roster_is_left_alone() {
        let (pipeline, db, _relay) = pipeline();
        let full = ChannelRoster::new("#x", vec!["carol".into(), "dave".into()]);
        db.upsert_roster(&full).unwrap();

        pipeline.ingest(chat("#x", "hi", "alice"));
        assert_eq!(db.find_roster("#x").unwrap(), Some(full));
    }

    #[test]
    fn stored_timestamps_never_decrease() {
        let (pipeline, db, _relay) = pipeline();

        let stamps: Vec<i64> = (0..20)
            .map(|i| pipeline.ingest(chat("#x", &i.to_string(), "alice")).timestamp)
            .collect();
        assert!(stamps.windows(2).all(|w| w[0] <= w[1]));

        let stored: Vec<i64> = db
            .messages_for_channel("#x")
            .unwrap()
            .iter()
            .map(|r| r.timestamp)
            .collect();
        assert_eq!(stored, stamps);
    }

    #[test]
    fn inbound_timestamp_is_overwritten() {
        let (pipeline, _db, _relay) = pipeline();
        let mut record = chat("#x", "hi", "alice");
        record.timestamp = 1;

        let stored = pipeline.ingest(record);
        assert!(stored.timestamp > 1);
    }

    #[test]
    fn ingest_posts_the_stored_record() {
        let (pipeline, _db, mut relay) = pipeline();

        let stored = pipeline.ingest(chat("#x", "hi", "alice"));
        assert_eq!(relay.try_recv(), Some(ChangeToken::Message(stored)));
        assert_eq!(relay.try_recv(), None);
    }

    #[test]
    fn failed_insert_still_notifies() {
        let (notifier, mut relay) = notifier::channel(8);
        let pipeline = IngestPipeline::new(Arc::new(FailingStore), notifier, "chanwatch");

        let stored = pipeline.ingest(chat("#x", "hi", "alice"));
        assert_eq!(relay.try_recv(), Some(ChangeToken::Message(stored)));
    }

    #[test]
    fn send_outbound_records_and_transmits() {
        let (pipeline, db, mut relay) = pipeline();
        let outbound = RecordingOutbound::default();

        let record = pipeline.send_outbound(&outbound, "#x", "hello all");

        assert_eq!(record.name, "chanwatch");
        assert!(record.user.is_empty() && record.host.is_empty());
        assert_eq!(outbound.sent(), vec![Message::privmsg("#x", "hello all")]);
        assert_eq!(db.messages_for_channel("#x").unwrap(), vec![record.clone()]);
        assert_eq!(db.find_roster("#x").unwrap().unwrap().names, vec!["chanwatch"]);
        assert_eq!(relay.try_recv(), Some(ChangeToken::Message(record)));
    }
}
