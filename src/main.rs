//! partner-quiz-back binary entrypoint wiring REST, SSE and the room store.

use std::{env, net::SocketAddr, sync::Arc};

use anyhow::Context;
use partner_quiz_back::{
    build_app,
    config::AppConfig,
    dao::room_store::{RoomStore, memory::MemoryRoomStore},
    state::{AppState, SharedState},
};
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::load();
    let app_state = init_state(config).await;
    let app = build_app(app_state);

    let port = env::var("PORT")
        .or_else(|_| env::var("SERVER_PORT"))
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(8080);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(%addr, "starting server");

    let listener = TcpListener::bind(addr).await.context("binding server")?;
    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving axum")?;

    Ok(())
}

/// Pick the room store: MongoDB behind the storage supervisor when `MONGO_URI` is set,
/// the in-memory store otherwise.
async fn init_state(config: AppConfig) -> SharedState {
    match env::var("MONGO_URI") {
        Ok(uri) => mongo_state(config, uri).await,
        Err(_) => {
            warn!("MONGO_URI not set; rooms are kept in memory and lost on restart");
            memory_state(config).await
        }
    }
}

async fn memory_state(config: AppConfig) -> SharedState {
    AppState::with_store(config, Arc::new(MemoryRoomStore::new())).await
}

#[cfg(feature = "mongo-store")]
async fn mongo_state(config: AppConfig, uri: String) -> SharedState {
    use partner_quiz_back::{
        dao::{room_store::mongodb::MongoRoomStore, storage::StorageError},
        services::storage_supervisor,
    };

    let db_name = env::var("MONGO_DB").ok();
    let state = AppState::new(config);
    info!("using MongoDB room store; degraded until connected");

    tokio::spawn(storage_supervisor::run(state.clone(), move || {
        let uri = uri.clone();
        let db_name = db_name.clone();
        async move {
            let store = MongoRoomStore::connect(&uri, db_name.as_deref())
                .await
                .map_err(StorageError::from)?;
            Ok(Arc::new(store) as Arc<dyn RoomStore>)
        }
    }));
    state
}

#[cfg(not(feature = "mongo-store"))]
async fn mongo_state(config: AppConfig, _uri: String) -> SharedState {
    warn!("built without mongo-store; ignoring MONGO_URI and keeping rooms in memory");
    memory_state(config).await
}

/// Configure tracing subscribers so logs include spans by default.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=debug".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Wait for Ctrl+C or SIGTERM and shut the server down gracefully.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = term.recv() => {},
                }
            }
            Err(err) => {
                warn!(error = %err, "failed to install SIGTERM handler; waiting for Ctrl+C only");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
