pub mod channels;
pub mod messages;
pub mod state;

use axum::{
    Router,
    routing::{any, get, post},
};

pub use state::{AppState, AppStateInner};

/// REST routes under `/API`.
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/API/chan", get(channels::list_channels))
        .route("/API/chan/msgs/{channel}", get(messages::channel_messages))
        .route("/API/priv/msgs/{channel}", get(messages::private_messages))
        .route("/API/say", post(messages::say))
        .route("/API/ping", any(messages::ping))
        .with_state(state)
}
