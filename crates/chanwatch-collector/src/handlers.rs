use std::sync::Arc;

use tracing::{debug, info, warn};

use chanwatch_irc::{Command, Message, Outbound};
use chanwatch_types::models::ChatRecord;

use crate::dispatcher::EventDispatcher;
use crate::ingest::IngestPipeline;
use crate::names::NamesAggregator;

/// Server chatter we log and otherwise ignore.
const SERVER_MESSAGES: &[Command] = &[
    Command::RplMotdStart,
    Command::RplMotd,
    Command::RplEndOfMotd,
    Command::RplYourHost,
    Command::RplCreated,
    Command::RplMyInfo,
    Command::RplBounce,
    Command::RplLuserClient,
    Command::RplLuserOp,
    Command::RplLuserUnknown,
    Command::RplLuserChannels,
    Command::RplLuserMe,
    Command::RplLocalUsers,
    Command::RplGlobalUsers,
    Command::RplStatsDLine,
    Command::RplTopicWhoTime,
    Command::Mode,
    Command::Join,
    Command::Notice,
];

/// Dispatcher state for one IRC connection.
pub struct Collector {
    pub names: NamesAggregator,
    pub pipeline: IngestPipeline,
    /// Channels joined once the server says we are registered.
    pub autojoin: Vec<String>,
}

impl Collector {
    pub fn new(pipeline: IngestPipeline, autojoin: Vec<String>) -> Self {
        Self {
            names: NamesAggregator::new(pipeline.store().clone()),
            pipeline,
            autojoin,
        }
    }
}

/// Build a dispatcher with every built-in route registered.
pub fn build_dispatcher(collector: Collector, outbound: Arc<dyn Outbound>) -> EventDispatcher<Collector> {
    let mut dispatcher = EventDispatcher::new(collector, outbound);

    dispatcher.register(Command::RplWelcome, on_welcome);
    dispatcher.register(Command::Ping, on_ping);
    dispatcher.register_all(SERVER_MESSAGES, on_server_message);
    dispatcher.register_all(&[Command::Topic, Command::RplTopic, Command::RplNoTopic], on_topic);
    dispatcher.register_all(&[Command::RplNamReply, Command::RplEndOfNames], on_names);
    dispatcher.register(Command::Privmsg, on_privmsg);

    dispatcher
}

fn on_welcome(collector: &mut Collector, _msg: &Message, out: &dyn Outbound) {
    for channel in &collector.autojoin {
        info!("Joining {}", channel);
        out.send(Message::join(channel));
    }
}

fn on_ping(_collector: &mut Collector, msg: &Message, out: &dyn Outbound) {
    out.send(Message::new(Command::Pong, msg.params.clone(), msg.trailing.clone()));
}

fn on_server_message(_collector: &mut Collector, msg: &Message, _out: &dyn Outbound) {
    debug!("Server: {}", msg);
}

fn on_topic(_collector: &mut Collector, msg: &Message, _out: &dyn Outbound) {
    // 331 carries no topic text
    if msg.command != Command::RplNoTopic {
        info!("Topic: {}", msg.trailing);
    }
}

fn on_names(collector: &mut Collector, msg: &Message, _out: &dyn Outbound) {
    let Some(channel) = msg.params.last() else {
        warn!("Dropping {} without a channel parameter", msg.command);
        return;
    };

    if msg.command == Command::RplEndOfNames {
        collector.names.complete(channel);
    } else {
        collector.names.accumulate(channel, &msg.trailing);
    }
}

fn on_privmsg(collector: &mut Collector, msg: &Message, _out: &dyn Outbound) {
    let Some(target) = msg.params.first() else {
        warn!("Dropping PRIVMSG without a target");
        return;
    };
    let sender = msg.sender_name();

    // Messages addressed to us are keyed by who sent them
    let channel = if is_channel_name(target) || sender.is_empty() {
        target.clone()
    } else {
        sender.to_string()
    };
    let prefix = msg.prefix.clone().unwrap_or_default();

    collector.pipeline.ingest(ChatRecord {
        channel,
        message: msg.trailing.clone(),
        timestamp: 0,
        name: prefix.name,
        user: prefix.user,
        host: prefix.host,
        params: msg.params.clone(),
    });
}

/// Whether `target` names a channel rather than a nick.
pub fn is_channel_name(target: &str) -> bool {
    target.starts_with(['#', '&', '+', '!'])
}
