use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::{error, info, warn};

use chanwatch_types::api::SendMessageRequest;
use chanwatch_types::models::ChatRecord;

use crate::state::AppState;

/// Messages for `#{channel}`.
pub async fn channel_messages(
    State(state): State<AppState>,
    Path(channel): Path<String>,
) -> Result<impl IntoResponse, StatusCode> {
    load_messages(state, format!("#{}", channel)).await
}

/// Messages of the private conversation with `channel`.
pub async fn private_messages(
    State(state): State<AppState>,
    Path(channel): Path<String>,
) -> Result<impl IntoResponse, StatusCode> {
    load_messages(state, channel).await
}

async fn load_messages(state: AppState, channel: String) -> Result<Json<Vec<ChatRecord>>, StatusCode> {
    let store = state.store.clone();
    let mut records = tokio::task::spawn_blocking(move || store.messages_for_channel(&channel))
        .await
        .map_err(|e| { error!("spawn_blocking join error: {}", e); StatusCode::INTERNAL_SERVER_ERROR })?
        .map_err(|e| { error!("Loading messages failed: {:#}", e); StatusCode::INTERNAL_SERVER_ERROR })?;

    delta_encode(&mut records);
    Ok(Json(records))
}

/// Rewrite every timestamp after the first as an offset from the first.
pub fn delta_encode(records: &mut [ChatRecord]) {
    let Some(base) = records.first().map(|r| r.timestamp) else {
        return;
    };
    for record in records.iter_mut().skip(1) {
        record.timestamp -= base;
    }
}

/// Send a message to a channel (or nick) and record it.
pub async fn say(
    State(state): State<AppState>,
    Json(req): Json<SendMessageRequest>,
) -> Result<impl IntoResponse, StatusCode> {
    let Some(irc) = state.irc.clone().filter(|irc| !irc.is_closed()) else {
        warn!("Cannot send to {}: IRC link is down", req.channel);
        return Err(StatusCode::SERVICE_UNAVAILABLE);
    };
    info!("Sending to {}: {}", req.channel, req.message);

    let pipeline = state.pipeline.clone();
    let record = tokio::task::spawn_blocking(move || pipeline.send_outbound(&irc, &req.channel, &req.message))
        .await
        .map_err(|e| { error!("spawn_blocking join error: {}", e); StatusCode::INTERNAL_SERVER_ERROR })?;

    Ok(Json(record))
}

/// Tell subscribers to re-fetch.
pub async fn ping(State(state): State<AppState>) -> StatusCode {
    match state.notifier.notify_ping().await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            error!("Ping not queued: {}", e);
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
