mod config;

use std::sync::Arc;

use axum::{
    Router,
    extract::{State, WebSocketUpgrade},
    response::IntoResponse,
    routing::get,
};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use chanwatch_api::{AppState, AppStateInner};
use chanwatch_collector::IngestPipeline;
use chanwatch_db::{Database, RecordStore};
use chanwatch_gateway::{ChangeNotifier, connection, notifier};
use chanwatch_irc::ConnectConfig;

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chanwatch=debug,chanwatch_collector=debug,chanwatch_gateway=debug,chanwatch_irc=info,tower_http=debug".into()),
        )
        .init();

    let config = Config::from_env()?;

    // Init database
    let store: Arc<dyn RecordStore> = Arc::new(Database::open(&config.db_path)?);

    // Change relay: producers post, the WebSocket subscriber receives
    let (notifier, relay) = notifier::channel(config.notify_capacity);
    tokio::spawn(relay.run());

    let pipeline = IngestPipeline::new(store.clone(), notifier.clone(), config.sender_name.clone());

    let irc = if config.irc_enabled {
        let irc_config = ConnectConfig::new(config.irc_server.clone(), config.irc_nick.clone());
        match chanwatch_collector::start(&irc_config, pipeline.clone(), config.irc_channels.clone()).await {
            Ok((sender, dispatch)) => {
                tokio::spawn(async move {
                    match dispatch.await {
                        Ok(()) => warn!("IRC collector stopped; outbound sends are unavailable"),
                        Err(e) => error!("IRC dispatch thread failed: {}", e),
                    }
                });
                Some(sender)
            }
            Err(e) => {
                // Serve the stored history even without a live link
                error!("IRC connect to {} failed: {:#}", irc_config.server_addr, e);
                None
            }
        }
    } else {
        info!("IRC collector disabled");
        None
    };

    let app_state: AppState = Arc::new(AppStateInner {
        store,
        pipeline,
        notifier: notifier.clone(),
        irc,
    });

    let ws_route = Router::new()
        .route("/gateway", get(ws_upgrade))
        .with_state(notifier);

    let app = Router::new()
        .merge(chanwatch_api::routes(app_state))
        .merge(ws_route)
        .fallback_service(ServeDir::new(&config.static_dir))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    info!("chanwatch listening on {}", config.addr);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn ws_upgrade(
    State(notifier): State<ChangeNotifier>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| connection::handle_connection(socket, notifier))
}
