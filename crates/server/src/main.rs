use anyhow::Result;
use shinju_core::parse_timezone;
use shinju_shared::{init_db, init_env, init_tracing, run_migrations};
use sqlx::PgPool;
use tokio::signal;
use tokio_util::sync::CancellationToken;

mod config;

#[tokio::main]
async fn main() -> Result<()> {
    init_env();

    // The guard must be kept alive for the duration of the program to ensure logs are flushed
    let _guard = init_tracing("server", &["server", "api", "worker"]);

    tracing::info!("🚀 Starting SHINJU DATE unified server");

    let config = config::UnifiedConfig::from_env()?;
    tracing::info!("✓ Configuration loaded");

    let pool = init_db(config.core()).await?;

    // Run migrations ONCE
    run_migrations(&pool).await?;

    let shutdown = CancellationToken::new();

    let api_handle = spawn_api(pool.clone(), config.clone(), shutdown.clone())?;
    let worker_handle = spawn_worker(pool.clone(), config.clone(), shutdown.clone())?;

    tracing::info!("✓ All services started");

    wait_for_shutdown().await?;
    tracing::info!("📡 Shutdown signal received");

    shutdown.cancel();

    let _ = tokio::join!(api_handle, worker_handle);

    tracing::info!("✓ All services stopped gracefully");
    Ok(())
}

fn spawn_api(
    pool: PgPool,
    config: config::UnifiedConfig,
    shutdown: CancellationToken,
) -> Result<tokio::task::JoinHandle<Result<()>>> {
    let state = api::AppState::new(pool, parse_timezone(&config.core().site_timezone)?);

    Ok(tokio::spawn(async move {
        tokio::select! {
            result = api::run_api(state, &config.api) => {
                tracing::error!("API service exited: {:?}", result);
                result
            }
            _ = shutdown.cancelled() => {
                tracing::info!("API service shutting down");
                Ok(())
            }
        }
    }))
}

fn spawn_worker(
    pool: PgPool,
    config: config::UnifiedConfig,
    shutdown: CancellationToken,
) -> Result<tokio::task::JoinHandle<Result<()>>> {
    let client = worker::YouTubeClient::new(&config.worker)?;

    Ok(tokio::spawn(async move {
        worker::run_worker(pool, client, config.worker, Some(shutdown)).await
    }))
}

async fn wait_for_shutdown() -> Result<()> {
    #[cfg(unix)]
    {
        let mut terminate = signal::unix::signal(signal::unix::SignalKind::terminate())?;
        tokio::select! {
            result = signal::ctrl_c() => result?,
            _ = terminate.recv() => {}
        }
    }

    #[cfg(not(unix))]
    signal::ctrl_c().await?;

    Ok(())
}
