use anyhow::Result;
use shinju_core::config::CoreConfig;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize dotenvy
pub fn init_env() {
    dotenvy::dotenv().ok();
}

/// Filter used when `RUST_LOG` is unset: `debug` for our crates, quieter sqlx
fn default_filter(debug_crates: &[&str]) -> String {
    let mut filter = String::from("info");
    for name in debug_crates {
        filter.push_str(&format!(",{}=debug", name));
    }
    filter.push_str(",sqlx=warn");
    filter
}

/// Initialize tracing for a service
///
/// Always logs to stdout. Unless `ENABLE_FILE_LOGGING` is `false`/`0`, also
/// writes JSON lines to `$LOG_DIR` (default `logs`). The returned guard must
/// be kept alive so buffered file logs are flushed on exit.
pub fn init_tracing(
    service_name: &str,
    debug_crates: &[&str],
) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter(debug_crates).into());

    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_target(true));

    let enable_file_logging = std::env::var("ENABLE_FILE_LOGGING")
        .map(|v| v.to_lowercase() != "false" && v != "0")
        .unwrap_or(true);

    if !enable_file_logging {
        registry.init();
        return None;
    }

    let log_dir = std::env::var("LOG_DIR").unwrap_or_else(|_| "logs".to_string());
    let now = chrono::Local::now().format("%y-%m-%d-%H-%M-%S").to_string();
    let filename = format!("shinju-date-{}.log.{}.jsonl", service_name, now);

    let file_appender = tracing_appender::rolling::never(&log_dir, filename);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    registry
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(non_blocking)
                .json(),
        )
        .init();

    Some(guard)
}

/// Initialize database pool
pub async fn init_db(config: &CoreConfig) -> Result<sqlx::PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(std::time::Duration::from_secs(10))
        .idle_timeout(std::time::Duration::from_secs(300))
        .max_lifetime(std::time::Duration::from_secs(1800)) // 30 minutes
        .connect(&config.database_url)
        .await?;

    tracing::info!(
        "✓ Database pool established (max_connections: {})",
        config.db_max_connections
    );

    Ok(pool)
}

/// Apply pending migrations
pub async fn run_migrations(pool: &sqlx::PgPool) -> Result<()> {
    sqlx::migrate!("../../migrations").run(pool).await?;
    tracing::info!("✓ Migrations completed");
    Ok(())
}
