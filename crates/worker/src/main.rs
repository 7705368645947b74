//! SHINJU DATE Worker - YouTube sync binary (standalone mode)
//!
//! This binary runs the worker as a standalone service.
//! For library usage, see the worker crate's lib.rs.

use anyhow::Result;
use shinju_shared::{init_db, init_env, init_tracing, run_migrations};
use tracing::info;
use worker::YouTubeClient;

#[tokio::main]
async fn main() -> Result<()> {
    init_env();
    let _guard = init_tracing("worker", &["worker"]);

    info!("Starting SHINJU DATE worker (standalone mode)");

    let config = worker::Config::from_env()?;

    let pool = init_db(&config.core).await?;
    run_migrations(&pool).await?;

    let client = YouTubeClient::new(&config)?;
    info!("YouTube client initialized: {}", config.youtube_api_base_url);

    // No shutdown token in standalone mode
    worker::run_worker(pool, client, config, None).await?;

    Ok(())
}
