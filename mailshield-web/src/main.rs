//! HTTP server: masks PII in submitted emails and classifies them.

mod config;
mod error;
mod routes;
mod state;

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .init();

    if config.uses_default_secret() {
        warn!("API_SECRET is not set; using the insecure default secret");
    }

    let state = AppState::load(&config)?;
    let app = routes::router(state);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!("Email classifier listening on http://{addr}");
    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
