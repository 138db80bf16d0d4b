//! # Authorization HTTP Server
//!
//! Serves the merchant API operation table behind the authorization gate.
//!
//! ## Endpoints
//!
//! - `GET /health` - Health check
//! - `GET /users/me` - Principal behind the presented credential
//! - `POST /tokens` - Issue a credential for the caller
//! - `DELETE /tokens/:model_id` - Revoke a credential
//! - `GET /tor/services` - Optional authentication
//! - `/:resource[/:model_id]` - Gated CRUD operations
//!
//! ## Configuration
//!
//! Environment variables:
//! - `HOST` / `PORT` - Bind address (default: 0.0.0.0:8080)
//! - `RUST_LOG` - Log level (default: info)
//! - `AUTH_ENABLED` - Enforce authorization (default: true)
//! - `DATABASE_URL` - PostgreSQL store (requires the `postgres` feature)
//! - `BOOTSTRAP_TOKEN` - Credential bound to the gate

use anyhow::Context;
use merchant_authz::{
    http::{create_router, AppState},
    AuthorizationGate, AuthzConfig, CredentialStore, InMemoryCredentialStore, OperationTable,
};
use std::sync::Arc;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

async fn open_store(config: &AuthzConfig) -> anyhow::Result<Arc<dyn CredentialStore>> {
    match &config.database_url {
        #[cfg(feature = "postgres")]
        Some(url) => {
            let store = merchant_authz::store::PostgresCredentialStore::new(url).await?;
            store.run_migrations().await?;
            info!("Using PostgreSQL credential store");
            Ok(Arc::new(store))
        }
        #[cfg(not(feature = "postgres"))]
        Some(_) => {
            anyhow::bail!("DATABASE_URL is set but the postgres feature is disabled")
        }
        None => {
            warn!("No DATABASE_URL, using in-memory credential store");
            Ok(Arc::new(InMemoryCredentialStore::new()))
        }
    }
}

/// Graceful shutdown handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        }
        _ = terminate => {
            info!("Received SIGTERM signal");
        }
    }

    info!("Starting graceful shutdown");
}

/// Main server entrypoint
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AuthzConfig::from_env()?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting merchant authorization server v{}", merchant_authz::VERSION);
    info!("Configuration:");
    info!("  Bind: {}", config.bind_address());
    info!("  Enforcement: {}", if config.auth_enabled { "enabled" } else { "DISABLED" });
    info!("  Bootstrap token: {}", config.bootstrap_token.is_some());

    let store = open_store(&config).await?;
    let gate = AuthorizationGate::new(
        store.clone(),
        config.auth_enabled,
        config.bootstrap_token.clone(),
    );
    let operations = OperationTable::merchant_api();
    info!("Loaded {} operation declarations", operations.len());

    let app = create_router(AppState::new(gate, operations, store));

    let listener = tokio::net::TcpListener::bind(config.bind_address())
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_address()))?;

    info!("Starting HTTP server on {}", config.bind_address());
    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    info!("Server shut down gracefully");
    Ok(())
}
