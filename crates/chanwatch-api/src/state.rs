use std::sync::Arc;

use chanwatch_collector::IngestPipeline;
use chanwatch_db::RecordStore;
use chanwatch_gateway::ChangeNotifier;
use chanwatch_irc::IrcSender;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub store: Arc<dyn RecordStore>,
    pub pipeline: IngestPipeline,
    pub notifier: ChangeNotifier,
    /// Live IRC link, absent when the collector is disabled.
    pub irc: Option<IrcSender>,
}
