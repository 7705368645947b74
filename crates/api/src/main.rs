use anyhow::Result;
use api::AppState;
use shinju_core::parse_timezone;
use shinju_shared::{init_db, init_env, init_tracing, run_migrations};

#[tokio::main]
async fn main() -> Result<()> {
    init_env();
    let _guard = init_tracing("api", &["api"]);

    tracing::info!("Starting SHINJU DATE API server");

    let config = api::config::Config::from_env()?;
    tracing::info!(
        "Server configuration loaded: {}:{}",
        config.host,
        config.port
    );

    let pool = init_db(&config.core).await?;
    run_migrations(&pool).await?;

    let state = AppState::new(pool, parse_timezone(&config.site_timezone)?);

    api::run_api(state, &config).await?;

    Ok(())
}
