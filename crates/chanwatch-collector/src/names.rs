//! Roster accumulation across a `353`…`366` reply sequence.
//!
//! Each channel moves through its own two states. A channel is `Receiving`
//! while it has an entry in the pending map and `Idle` otherwise, so
//! interleaved sequences for different channels never disturb each other.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, error};

use chanwatch_db::RecordStore;
use chanwatch_types::models::ChannelRoster;

/// Where a channel's roster sequence currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RosterPhase {
    Idle,
    Receiving,
}

pub struct NamesAggregator {
    store: Arc<dyn RecordStore>,
    pending: HashMap<String, Vec<String>>,
}

impl NamesAggregator {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            store,
            pending: HashMap::new(),
        }
    }

    pub fn phase(&self, channel: &str) -> RosterPhase {
        if self.pending.contains_key(channel) {
            RosterPhase::Receiving
        } else {
            RosterPhase::Idle
        }
    }

    /// Names collected so far for a channel that is mid-sequence.
    pub fn pending(&self, channel: &str) -> Option<&[String]> {
        self.pending.get(channel).map(Vec::as_slice)
    }

    /// Handle one partial reply. The first reply for an idle channel starts
    /// a fresh list.
    pub fn accumulate(&mut self, channel: &str, payload: &str) {
        let names = self.pending.entry(channel.to_string()).or_default();
        names.extend(payload.split_whitespace().map(str::to_string));
    }

    /// Handle the end-of-roster marker: take the channel's list, return the
    /// channel to idle, and upsert the finished roster.
    ///
    /// A channel with no partial replies gets an empty roster. Store failures
    /// are logged and dropped.
    pub fn complete(&mut self, channel: &str) -> ChannelRoster {
        let names = self.pending.remove(channel).unwrap_or_default();
        let roster = ChannelRoster::new(channel, names);

        match self.store.upsert_roster(&roster) {
            Ok(()) => debug!("Roster for {} updated ({} names)", channel, roster.names.len()),
            Err(e) => error!("Error updating names for channel {}: {:#}", channel, e),
        }

        roster
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::FailingStore;
    use chanwatch_db::Database;

    fn aggregator() -> (NamesAggregator, Arc<Database>) {
        let db = Arc::new(Database::open_in_memory().unwrap());
        (NamesAggregator::new(db.clone()), db)
    }

    #[test]
    fn partial_replies_concatenate_in_order() {
        let (mut names, db) = aggregator();

        names.accumulate("#x", "alice bob");
        names.accumulate("#x", "carol");
        let roster = names.complete("#x");

        let expected = ChannelRoster::new("#x", vec!["alice".into(), "bob".into(), "carol".into()]);
        assert_eq!(roster, expected);
        assert_eq!(db.find_roster("#x").unwrap(), Some(expected));
    }

    #[test]
    fn phase_follows_the_sequence() {
        let (mut names, _db) = aggregator();
        assert_eq!(names.phase("#x"), RosterPhase::Idle);

        names.accumulate("#x", "alice");
        assert_eq!(names.phase("#x"), RosterPhase::Receiving);

        names.complete("#x");
        assert_eq!(names.phase("#x"), RosterPhase::Idle);
        assert_eq!(names.pending("#x"), None);
    }

    #[test]
    fn interleaved_channels_stay_separate() {
        let (mut names, db) = aggregator();

        names.accumulate("#a", "alice");
        names.accumulate("#b", "bob");
        names.accumulate("#a", "carol");
        names.complete("#a");

        assert_eq!(names.phase("#b"), RosterPhase::Receiving);
        names.accumulate("#b", "dave");
        names.complete("#b");

        assert_eq!(db.find_roster("#a").unwrap().unwrap().names, vec!["alice", "carol"]);
        assert_eq!(db.find_roster("#b").unwrap().unwrap().names, vec!["bob", "dave"]);
    }

    #[test]
    fn repeated_whitespace_yields_no_empty_names() {
        let (mut names, _db) = aggregator();
        names.accumulate("#x", "  @alice   +bob ");
        assert_eq!(names.pending("#x").unwrap(), ["@alice", "+bob"]);
    }

    #[test]
    fn a_second_sequence_replaces_the_first() {
        let (mut names, db) = aggregator();

        names.accumulate("#x", "alice bob");
        names.complete("#x");
        names.accumulate("#x", "carol");
        names.complete("#x");

        let rosters = db.rosters().unwrap();
        assert_eq!(rosters, vec![ChannelRoster::new("#x", vec!["carol".into()])]);
    }

    #[test]
    fn end_without_replies_stores_an_empty_roster() {
        let (mut names, db) = aggregator();
        let roster = names.complete("#quiet");
        assert!(roster.names.is_empty());
        assert_eq!(db.find_roster("#quiet").unwrap(), Some(roster));
    }

    #[test]
    fn failed_upsert_does_not_block_aggregation() {
        let mut names = NamesAggregator::new(Arc::new(FailingStore));

        names.accumulate("#x", "alice");
        let roster = names.complete("#x");
        assert_eq!(roster.names, vec!["alice"]);

        names.accumulate("#x", "bob");
        assert_eq!(names.pending("#x").unwrap(), ["bob"]);
    }
}
