//! The collector: routes IRC frames into rosters, stored messages, and
//! change notifications.

pub mod dispatcher;
pub mod handlers;
pub mod ingest;
pub mod names;

#[cfg(test)]
mod testutil;

use std::sync::Arc;

use anyhow::Result;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::info;

use chanwatch_irc::{ConnectConfig, IrcSender, Message, client};

pub use dispatcher::EventDispatcher;
pub use handlers::{Collector, build_dispatcher};
pub use ingest::IngestPipeline;
pub use names::{NamesAggregator, RosterPhase};

/// Feed frames to `dispatcher` one at a time until the stream ends.
///
/// Blocks the calling thread; run it on a dedicated thread or in
/// `spawn_blocking`.
pub fn run_dispatch_loop<S>(mut dispatcher: EventDispatcher<S>, mut inbound: mpsc::Receiver<Message>) {
    while let Some(message) = inbound.blocking_recv() {
        dispatcher.dispatch(&message);
    }
    info!("Inbound IRC stream ended, dispatcher stopped");
}

/// Connect to IRC and start dispatching on a blocking thread.
///
/// Returns the send handle for API-triggered messages and the dispatch task.
pub async fn start(
    config: &ConnectConfig,
    pipeline: IngestPipeline,
    autojoin: Vec<String>,
) -> Result<(IrcSender, JoinHandle<()>)> {
    let (sender, inbound) = client::connect(config).await?;
    let dispatcher = build_dispatcher(Collector::new(pipeline, autojoin), Arc::new(sender.clone()));
    let handle = tokio::task::spawn_blocking(move || run_dispatch_loop(dispatcher, inbound));
    Ok((sender, handle))
}
