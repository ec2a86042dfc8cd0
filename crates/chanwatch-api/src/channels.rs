use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use tracing::error;

use crate::state::AppState;

/// Every known roster.
pub async fn list_channels(State(state): State<AppState>) -> Result<impl IntoResponse, StatusCode> {
    let store = state.store.clone();
    let rosters = tokio::task::spawn_blocking(move || store.rosters())
        .await
        .map_err(|e| { error!("spawn_blocking join error: {}", e); StatusCode::INTERNAL_SERVER_ERROR })?
        .map_err(|e| { error!("Listing rosters failed: {:#}", e); StatusCode::INTERNAL_SERVER_ERROR })?;

    Ok(Json(rosters))
}
