use anyhow::Context;
use dotenvy::dotenv;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use ticket_gate::config::Config;
use ticket_gate::routes::create_routes;
use ticket_gate::services::auth::bootstrap_admin;
use ticket_gate::state::AppState;
use ticket_gate::{db, notify};

const DEFAULT_LOG_FILTER: &str = "ticket_gate=info,tower_http=info";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    let config = Config::from_env();

    let pool = db::connect(&config.database_url)
        .await
        .context("Failed to open database")?;
    tracing::info!("Database ready, migrations applied");

    bootstrap_admin(&pool, &config.admin_username, &config.admin_password)
        .await
        .context("Failed to seed default administrator")?;

    let addr: SocketAddr = config
        .bind_addr
        .parse()
        .with_context(|| format!("Invalid BIND_ADDR '{}'", config.bind_addr))?;

    let notifier = notify::from_config(&config);
    let app = create_routes(AppState::new(pool, config, notifier.into()));

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("Server running at http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server failed")?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
