//! Drives a full dispatcher over a recorded IRC session.

use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;

use chanwatch_collector::{Collector, IngestPipeline, build_dispatcher, run_dispatch_loop};
use chanwatch_db::{Database, RecordStore};
use chanwatch_gateway::notifier;
use chanwatch_irc::{Command, Message, Outbound};
use chanwatch_types::events::ChangeToken;

#[derive(Default)]
struct Wire {
    sent: Mutex<Vec<Message>>,
}

impl Outbound for Wire {
    fn send(&self, message: Message) {
        self.sent.lock().unwrap().push(message);
    }
}

const SESSION: &[&str] = &[
    ":irc.example.org NOTICE * :*** Looking up your hostname...",
    ":irc.example.org 001 watcher :Welcome to the network watcher",
    ":irc.example.org 375 watcher :- irc.example.org Message of the Day -",
    ":irc.example.org 376 watcher :End of /MOTD command.",
    "PING :irc.example.org",
    ":watcher!~watcher@host JOIN #juju-dev",
    ":irc.example.org 332 watcher #juju-dev :Juju development",
    ":irc.example.org 353 watcher = #juju-dev :watcher @alice",
    ":irc.example.org 353 watcher @ #other :zed",
    ":irc.example.org 353 watcher = #juju-dev :bob carol",
    ":irc.example.org 366 watcher #juju-dev :End of /NAMES list.",
    ":alice!~alice@example.org PRIVMSG #juju-dev :morning all",
    ":dave!~dave@example.net PRIVMSG #juju-dev :hi alice",
    ":irc.example.org CAP * ACK :multi-prefix",
];

#[test]
fn recorded_session_produces_rosters_messages_and_replies() {
    let db = Arc::new(Database::open_in_memory().unwrap());
    let (notifier, mut relay) = notifier::channel(64);
    let pipeline = IngestPipeline::new(db.clone(), notifier, "watcher");
    let wire = Arc::new(Wire::default());
    let dispatcher = build_dispatcher(
        Collector::new(pipeline, vec!["#juju-dev".into()]),
        wire.clone(),
    );

    let (tx, rx) = mpsc::channel(SESSION.len());
    for line in SESSION {
        tx.blocking_send(Message::parse(line).unwrap()).unwrap();
    }
    drop(tx);
    run_dispatch_loop(dispatcher, rx);

    let sent = wire.sent.lock().unwrap().clone();
    assert_eq!(
        sent,
        vec![
            Message::join("#juju-dev"),
            Message::new(Command::Pong, vec![], "irc.example.org"),
        ]
    );

    // Completed sequence stored; the unfinished #other one is not
    let roster = db.find_roster("#juju-dev").unwrap().unwrap();
    assert_eq!(roster.names, vec!["watcher", "@alice", "bob", "carol"]);
    assert!(db.find_roster("#other").unwrap().is_none());

    let messages = db.messages_for_channel("#juju-dev").unwrap();
    let lines: Vec<(&str, &str)> = messages
        .iter()
        .map(|m| (m.name.as_str(), m.message.as_str()))
        .collect();
    assert_eq!(lines, vec![("alice", "morning all"), ("dave", "hi alice")]);

    // Roster came from the names reply, so message senders did not touch it
    assert_eq!(db.rosters().unwrap().len(), 1);

    for stored in messages {
        assert_eq!(relay.try_recv(), Some(ChangeToken::Message(stored)));
    }
    assert_eq!(relay.try_recv(), None);
}
