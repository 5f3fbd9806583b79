//! `homestock-api` -- inventory and low-stock alert server.
//!
//! Serves the `/api/v1` REST surface (items, alerts, evaluation sweeps)
//! plus a root-level health probe. Startup wires the Postgres pool, picks
//! the notification transport, and hands the assembled router to axum
//! with graceful shutdown on SIGINT/SIGTERM.

use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use homestock_api::config::ServerConfig;
use homestock_api::engine::AlertEngine;
use homestock_api::router::build_app;
use homestock_api::state::AppState;
use homestock_notify::{EmailConfig, EmailNotifier, LogNotifier, Notifier};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "homestock_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = config.port, "Loaded server configuration");

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = homestock_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");

    homestock_db::health_check(&pool)
        .await
        .expect("Database health check failed");

    homestock_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");

    // --- Notification transport ---
    let notifier: Arc<dyn Notifier> = match EmailConfig::from_env() {
        Some(email) => {
            tracing::info!(
                host = %email.smtp_host,
                to = %email.to_address,
                "Email notifier configured"
            );
            Arc::new(EmailNotifier::new(email))
        }
        None => {
            tracing::info!("SMTP_HOST not set, low-stock notifications will be logged only");
            Arc::new(LogNotifier)
        }
    };

    // --- Application ---
    let engine = Arc::new(AlertEngine::new(pool.clone(), notifier));
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        engine,
    };
    let app = build_app(state);

    // --- Serve ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");
    tracing::info!(%addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    tracing::info!("Graceful shutdown complete");
}

/// Resolve when either SIGINT or SIGTERM arrives, whichever is first.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("Received SIGINT, starting graceful shutdown"),
        () = terminate => tracing::info!("Received SIGTERM, starting graceful shutdown"),
    }
}
