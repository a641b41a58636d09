mod config;
mod db;
mod document;
mod errors;
mod models;
mod profile;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::create_pool;
use crate::document::default_page_config;
use crate::profile::store::PgProfileRepository;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={},tower_http={}",
                env!("CARGO_CRATE_NAME"),
                &config.rust_log,
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Curriculum API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url, config.db_max_connections).await?;
    let repo = Arc::new(PgProfileRepository::new(db));

    // A4 portrait, 2 cm margins
    let page_config = default_page_config();
    info!(
        "Page config: {}x{}pt, margin {:.2}pt",
        page_config.width_pt, page_config.height_pt, page_config.margin_pt
    );
    info!(
        "Upload limits: images {} bytes, certificates {} bytes",
        config.upload_limits.max_image_bytes, config.upload_limits.max_certificate_bytes
    );

    // Build app state
    let state = AppState {
        repo,
        config: config.clone(),
        page_config,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
