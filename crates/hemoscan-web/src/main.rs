//! hemoscan web server
//!
//! Run with: cargo run -p hemoscan-web

use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use hemoscan_classifier::ObliviousTreeModel;
use hemoscan_config::Config;
use hemoscan_web::{router::build_router, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting hemoscan web server...");

    let config = Config::load()?;

    // The classifier is read-only for the life of the process.
    let model = ObliviousTreeModel::load(&config.model.path)?;
    let state = AppState::new(Arc::new(model))?
        .with_max_upload_bytes(config.upload.max_bytes);

    let app = build_router(state);

    let addr = config.listen_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
