use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::{info, warn};

use chanwatch_types::events::ChangeToken;

use crate::notifier::ChangeNotifier;

/// Heartbeat interval: server sends a Ping every 15 seconds.
/// If 2 consecutive Pongs are missed (~30s), the connection is dropped.
const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(15);

/// Serve one WebSocket subscriber.
///
/// The socket takes over the notifier's subscriber slot, gets a `Hello`,
/// and then receives every change token relayed while it stays attached.
pub async fn handle_connection(socket: WebSocket, notifier: ChangeNotifier) {
    let (mut sender, mut receiver) = socket.split();

    let (tx, mut rx) = mpsc::unbounded_channel::<ChangeToken>();
    let id = notifier.attach(Arc::new(tx));
    info!("Subscriber {} connected", id);

    if send_token(&mut sender, &ChangeToken::Hello).await.is_err() {
        notifier.detach(id);
        return;
    }

    let pong_received = Arc::new(AtomicBool::new(true));
    let pong_flag_send = pong_received.clone();
    let pong_flag_recv = pong_received;

    let mut send_task = tokio::spawn(async move {
        let mut heartbeat = tokio::time::interval(HEARTBEAT_INTERVAL);
        heartbeat.tick().await;
        let mut missed_heartbeats: u8 = 0;
        // Cleared once a newer connection takes the slot; the socket stays open but idle
        let mut attached = true;

        loop {
            tokio::select! {
                token = rx.recv(), if attached => {
                    match token {
                        Some(token) => {
                            if send_token(&mut sender, &token).await.is_err() {
                                break;
                            }
                        }
                        None => {
                            info!("Subscriber {} replaced by a newer connection", id);
                            attached = false;
                        }
                    }
                }
                _ = heartbeat.tick() => {
                    if pong_flag_send.swap(false, Ordering::Acquire) {
                        missed_heartbeats = 0;
                    } else {
                        missed_heartbeats += 1;
                        if missed_heartbeats >= 2 {
                            warn!("Heartbeat timeout (missed {} pongs), dropping subscriber", missed_heartbeats);
                            break;
                        }
                    }
                    if sender.send(Message::Ping(vec![].into())).await.is_err() {
                        break;
                    }
                }
            }
        }
    });

    // Clients have nothing to say; only liveness and close frames matter
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            match msg {
                Message::Pong(_) => pong_flag_recv.store(true, Ordering::Release),
                Message::Close(_) => break,
                _ => {}
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    notifier.detach(id);
    info!("Subscriber {} disconnected", id);
}

async fn send_token(
    sender: &mut futures_util::stream::SplitSink<WebSocket, Message>,
    token: &ChangeToken,
) -> anyhow::Result<()> {
    let text = serde_json::to_string(token)?;
    sender.send(Message::Text(text.into())).await?;
    Ok(())
}
