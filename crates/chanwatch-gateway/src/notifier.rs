use std::sync::{Arc, Mutex};

use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, trace, warn};
use uuid::Uuid;

use chanwatch_types::events::ChangeToken;

/// Default depth of the change queue.
pub const DEFAULT_CAPACITY: usize = 1000;

/// Identifies one attachment to the subscriber slot.
pub type SubscriptionId = Uuid;

/// The subscriber went away.
#[derive(Debug, Error)]
#[error("subscriber closed")]
pub struct PushError;

/// The relay loop is no longer running.
#[derive(Debug, Error)]
#[error("change relay stopped")]
pub struct NotifyError;

/// Receiving end of the relay: the push transport.
pub trait Subscriber: Send + Sync {
    fn receive(&self, token: &ChangeToken) -> Result<(), PushError>;
}

/// Subscriber backed by a per-connection channel.
impl Subscriber for mpsc::UnboundedSender<ChangeToken> {
    fn receive(&self, token: &ChangeToken) -> Result<(), PushError> {
        self.send(token.clone()).map_err(|_| PushError)
    }
}

type Slot = Arc<Mutex<Option<(SubscriptionId, Arc<dyn Subscriber>)>>>;

/// Producer side: post change tokens and manage the subscriber slot.
#[derive(Clone)]
pub struct ChangeNotifier {
    tx: mpsc::Sender<ChangeToken>,
    slot: Slot,
}

/// Consumer side: drains the queue into whoever is attached.
pub struct Relay {
    rx: mpsc::Receiver<ChangeToken>,
    slot: Slot,
}

/// Build a notifier and its relay around a queue of `capacity` tokens.
pub fn channel(capacity: usize) -> (ChangeNotifier, Relay) {
    let (tx, rx) = mpsc::channel(capacity);
    let slot: Slot = Arc::new(Mutex::new(None));
    (
        ChangeNotifier {
            tx,
            slot: slot.clone(),
        },
        Relay { rx, slot },
    )
}

impl ChangeNotifier {
    /// Enqueue from async code. Waits while the queue is full.
    pub async fn post(&self, token: ChangeToken) -> Result<(), NotifyError> {
        self.tx.send(token).await.map_err(|_| NotifyError)
    }

    /// Enqueue from a blocking thread. Blocks while the queue is full.
    ///
    /// Must not be called from inside an async task.
    pub fn post_blocking(&self, token: ChangeToken) -> Result<(), NotifyError> {
        self.tx.blocking_send(token).map_err(|_| NotifyError)
    }

    /// Enqueue a bare `Ping` so clients re-fetch.
    pub async fn notify_ping(&self) -> Result<(), NotifyError> {
        self.post(ChangeToken::Ping).await
    }

    /// Put `subscriber` in the slot, replacing whoever was there.
    pub fn attach(&self, subscriber: Arc<dyn Subscriber>) -> SubscriptionId {
        let id = Uuid::new_v4();
        let mut slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());
        if slot.is_some() {
            debug!("Replacing attached subscriber with {}", id);
        }
        *slot = Some((id, subscriber));
        id
    }

    /// Empty the slot, but only if `id` still owns it.
    pub fn detach(&self, id: SubscriptionId) {
        let mut slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());
        if slot.as_ref().is_some_and(|(current, _)| *current == id) {
            *slot = None;
        }
    }

    pub fn is_attached(&self) -> bool {
        self.slot.lock().unwrap_or_else(|e| e.into_inner()).is_some()
    }
}

impl Relay {
    /// Run until every notifier handle is dropped.
    pub async fn run(mut self) {
        while self.relay_one().await {}
        debug!("Change relay stopped");
    }

    /// Wait for one token and push it. Returns `false` once the queue is closed.
    pub async fn relay_one(&mut self) -> bool {
        match self.rx.recv().await {
            Some(token) => {
                self.push(token);
                true
            }
            None => false,
        }
    }

    /// Pull the next pending token without pushing it anywhere.
    pub fn try_recv(&mut self) -> Option<ChangeToken> {
        self.rx.try_recv().ok()
    }

    fn push(&self, token: ChangeToken) {
        // Clone the handle out so a slow subscriber never holds the lock
        let current = self
            .slot
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .map(|(id, sub)| (*id, sub.clone()));

        match current {
            Some((id, subscriber)) => {
                // Failures leave the subscriber attached; its connection detaches itself
                if let Err(e) = subscriber.receive(&token) {
                    warn!("Push to subscriber {} failed: {}", id, e);
                }
            }
            None => trace!("No subscriber attached, dropping change token"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use chanwatch_types::models::ChatRecord;

    #[derive(Default)]
    struct Recorder {
        tokens: Mutex<Vec<ChangeToken>>,
    }

    impl Subscriber for Recorder {
        fn receive(&self, token: &ChangeToken) -> Result<(), PushError> {
            self.tokens.lock().unwrap().push(token.clone());
            Ok(())
        }
    }

    struct Broken;

    impl Subscriber for Broken {
        fn receive(&self, _token: &ChangeToken) -> Result<(), PushError> {
            Err(PushError)
        }
    }

    fn message(text: &str) -> ChangeToken {
        ChangeToken::Message(ChatRecord::new("#x", text, "alice"))
    }

    #[tokio::test]
    async fn tokens_without_subscriber_are_not_replayed() {
        let (notifier, mut relay) = channel(8);

        notifier.post(message("early")).await.unwrap();
        assert!(relay.relay_one().await);

        let recorder = Arc::new(Recorder::default());
        notifier.attach(recorder.clone());
        notifier.post(message("late")).await.unwrap();
        assert!(relay.relay_one().await);

        assert_eq!(*recorder.tokens.lock().unwrap(), vec![message("late")]);
    }

    #[tokio::test]
    async fn new_subscriber_replaces_the_old_one() {
        let (notifier, mut relay) = channel(8);
        let first = Arc::new(Recorder::default());
        let second = Arc::new(Recorder::default());

        let first_id = notifier.attach(first.clone());
        notifier.attach(second.clone());
        notifier.post(ChangeToken::Ping).await.unwrap();
        relay.relay_one().await;

        assert!(first.tokens.lock().unwrap().is_empty());
        assert_eq!(*second.tokens.lock().unwrap(), vec![ChangeToken::Ping]);

        // A late detach from the replaced connection must not evict the new one
        notifier.detach(first_id);
        assert!(notifier.is_attached());
    }

    #[tokio::test]
    async fn push_failure_keeps_subscriber_attached() {
        let (notifier, mut relay) = channel(8);
        notifier.attach(Arc::new(Broken));

        notifier.post(ChangeToken::Ping).await.unwrap();
        notifier.post(ChangeToken::Ping).await.unwrap();
        assert!(relay.relay_one().await);
        assert!(relay.relay_one().await);
        assert!(notifier.is_attached());
    }

    #[tokio::test]
    async fn detach_empties_the_slot() {
        let (notifier, _relay) = channel(8);
        let id = notifier.attach(Arc::new(Recorder::default()));
        notifier.detach(id);
        assert!(!notifier.is_attached());
    }

    #[tokio::test]
    async fn relay_stops_when_notifiers_are_dropped() {
        let (notifier, relay) = channel(8);
        let handle = tokio::spawn(relay.run());
        notifier.notify_ping().await.unwrap();
        drop(notifier);
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn full_queue_makes_producers_wait() {
        let (notifier, mut relay) = channel(1);
        let recorder = Arc::new(Recorder::default());
        notifier.attach(recorder.clone());

        notifier.post(message("first")).await.unwrap();

        let waiting = notifier.clone();
        let mut second = tokio::spawn(async move { waiting.post(message("second")).await });
        assert!(
            tokio::time::timeout(Duration::from_millis(50), &mut second)
                .await
                .is_err()
        );

        assert!(relay.relay_one().await);
        second.await.unwrap().unwrap();
        assert!(relay.relay_one().await);

        assert_eq!(
            *recorder.tokens.lock().unwrap(),
            vec![message("first"), message("second")]
        );
    }

    #[test]
    fn blocking_post_is_fifo() {
        let (notifier, mut relay) = channel(8);
        notifier.post_blocking(message("a")).unwrap();
        notifier.post_blocking(ChangeToken::Ping).unwrap();

        assert_eq!(relay.try_recv(), Some(message("a")));
        assert_eq!(relay.try_recv(), Some(ChangeToken::Ping));
        assert_eq!(relay.try_recv(), None);
    }
}
