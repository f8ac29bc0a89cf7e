// src/main.rs

use clap::Parser;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use giveglobe::api::http::build_router;
use giveglobe::config::CONFIG;
use giveglobe::state::AppState;

#[derive(Parser, Debug)]
#[command(name = "giveglobe", about = "Proxy gateway for the charity globe demo")]
struct Cli {
    /// Listen host (overrides HOST)
    #[arg(long, env = "HOST")]
    host: Option<String>,

    /// Listen port (overrides PORT)
    #[arg(long, env = "PORT")]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let level: Level = CONFIG.log_level.parse().unwrap_or(Level::INFO);
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting giveglobe proxy gateway");
    info!("Model: {}", CONFIG.gemini_model);
    info!("Search defaults: radius={}m keyword={:?}",
        CONFIG.search_radius_meters, CONFIG.search_keyword);

    if CONFIG.maps_api_key.is_empty() {
        warn!("GOOGLE_MAPS_API_KEY is empty; /api/maps will fail upstream");
    }
    if CONFIG.gemini_api_key.is_empty() {
        warn!("GEMINI_API_KEY is empty; /api/generative-ai will fail upstream");
    }

    let state = AppState::from_config(&CONFIG);
    let app = build_router(state, &CONFIG.cors_origin);

    let host = cli.host.unwrap_or_else(|| CONFIG.host.clone());
    let port = cli.port.unwrap_or(CONFIG.port);
    let bind_address = format!("{host}:{port}");

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    info!("Proxy gateway listening on http://{}", bind_address);
    info!("Allowed origin: {}", CONFIG.cors_origin);

    axum::serve(listener, app).await?;

    Ok(())
}
