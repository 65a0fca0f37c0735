//! Mock API server binary.
//!
//! Starts an axum HTTP server with structured logging, storage
//! initialization, and graceful shutdown on SIGTERM/SIGINT.

use mockapi_db::{ensure_schema, DbRuntimeSettings, StorageHandle, StoreError};
use mockapi_records::run_seeds;
use mockapi_server::config::{self, Backend};
use mockapi_server::{app, AppState};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

fn resolve_config_path() -> (Option<String>, &'static str) {
    if let Some(path) = std::env::args()
        .nth(1)
        .filter(|value| !value.trim().is_empty())
    {
        return (Some(path), "cli-arg");
    }

    if let Ok(path) = std::env::var("MOCKAPI_CONFIG_PATH") {
        if !path.trim().is_empty() {
            return (Some(path), "env-var");
        }
    }

    (None, "default")
}

/// Creates missing tables and, if requested, loads the sample rows.
///
/// A store that already holds the samples rejects them on the unique email
/// constraint; that case is logged and skipped.
fn prepare_storage(storage: &StorageHandle, seed: bool) -> Result<(), StoreError> {
    let created = ensure_schema(storage)?;
    if created > 0 {
        tracing::info!(count = created, "created database tables");
    }

    if seed {
        match run_seeds(storage) {
            Ok(_) => {}
            Err(e) if e.is_constraint_violation() => {
                tracing::info!("database already holds sample data, skipping seed");
            }
            Err(e) => return Err(e),
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    let (resolved_config_path, config_source) = resolve_config_path();
    let selected_config_path = resolved_config_path.as_deref().or(Some("config.toml"));

    // Load configuration
    let config = config::load_config(selected_config_path)
        .expect("failed to load configuration — the server cannot start without valid config");

    // Initialize tracing
    let filter =
        EnvFilter::try_new(&config.logging.level).unwrap_or_else(|_| EnvFilter::new("info"));

    if config.logging.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    tracing::info!(
        source = config_source,
        path = selected_config_path.unwrap_or("<none>"),
        "resolved startup configuration path"
    );

    // Initialize storage
    let (state, storage) = match config.database.backend {
        Backend::Sqlite => {
            let storage = StorageHandle::new(
                &config.database.path,
                DbRuntimeSettings {
                    busy_timeout_ms: config.database.busy_timeout_ms,
                },
            );
            prepare_storage(&storage, config.database.seed)
                .expect("failed to initialize database — check database.path in config");
            tracing::info!(path = %config.database.path, "using sqlite backend");
            (AppState::sqlite(storage.clone()), Some(storage))
        }
        Backend::Memory => {
            tracing::info!("using in-memory backend");
            (AppState::in_memory(), None)
        }
    };

    // Build application
    let app = app(state);
    let addr = SocketAddr::new(config.server.host, config.server.port);

    tracing::info!(%addr, "starting mock api server");

    let listener = TcpListener::bind(addr)
        .await
        .expect("failed to bind to address — is another process using this port?");

    // Serve with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");

    if config.database.ephemeral {
        if let Some(storage) = storage {
            if let Err(e) = storage.teardown() {
                tracing::warn!(error = %e, "failed to remove ephemeral database");
            }
        }
    }

    tracing::info!("mock api server shut down");
}

/// Waits for a SIGINT (Ctrl+C) or SIGTERM signal for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => { tracing::info!("received SIGINT, initiating graceful shutdown"); }
        () = terminate => { tracing::info!("received SIGTERM, initiating graceful shutdown"); }
    }
}
