//! WhisperNotes REST API.
//!
//! Exposes the note store and theme store over JSON/HTTP under `/api`.

pub mod config;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use config::ServerConfig;
pub use error::AppError;
pub use routes::create_router;
pub use state::AppState;

use anyhow::Context;
use log::info;
use std::future::Future;
use tokio::net::TcpListener;
use whispernotes_core::db::open_db;

/// Opens the database, binds the configured address and serves until
/// Ctrl-C.
pub async fn serve(config: &ServerConfig) -> anyhow::Result<()> {
    let conn = open_db(&config.db_path).context("failed to start note store")?;
    let listener = TcpListener::bind(config.bind_addr())
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr()))?;
    run(listener, AppState::new(conn), shutdown_signal()).await
}

/// Serves `state` on an already bound listener until `shutdown` resolves.
pub async fn run(
    listener: TcpListener,
    state: AppState,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    let addr = listener.local_addr()?;
    info!("event=server_start module=server status=ok addr={addr}");

    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(shutdown)
        .await
        .context("server terminated unexpectedly")?;

    info!("event=server_stop module=server status=ok addr={addr}");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        log::error!("event=server_signal module=server status=error error={err}");
        std::future::pending::<()>().await;
    }
}
