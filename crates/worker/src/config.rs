//! Configuration for worker process
//!
//! Loads configuration from environment variables

use anyhow::{Context, Result};
use shinju_core::config::CoreConfig;
use std::env;
use std::ops::Deref;

use crate::youtube::DEFAULT_BASE_URL;

/// Worker configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Core configuration
    pub core: CoreConfig,

    /// YouTube Data API key
    pub youtube_api_key: String,

    /// YouTube Data API base URL
    pub youtube_api_base_url: String,

    /// Seconds between videos updates
    pub videos_interval_secs: u64,

    /// Seconds between channels updates
    pub channels_interval_secs: u64,

    /// Minimum seconds between two runs of the same update
    pub min_run_interval_secs: u64,

    /// Channels scraped at the same time
    pub scrape_concurrency: usize,

    /// Minimum milliseconds between starting two channel scrapes
    pub scrape_interval_ms: u64,
}

fn parse_var<T: std::str::FromStr>(name: &str, default: &str) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    env::var(name)
        .unwrap_or_else(|_| default.to_string())
        .parse()
        .with_context(|| format!("{} must be a valid integer", name))
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let core = CoreConfig::from_env()?;

        Ok(Self {
            core,
            youtube_api_key: env::var("YOUTUBE_API_KEY").context("YOUTUBE_API_KEY must be set")?,
            youtube_api_base_url: env::var("YOUTUBE_API_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            videos_interval_secs: parse_var("WORKER_VIDEOS_INTERVAL_SECS", "300")?,
            channels_interval_secs: parse_var("WORKER_CHANNELS_INTERVAL_SECS", "3600")?,
            min_run_interval_secs: parse_var("WORKER_MIN_RUN_INTERVAL_SECS", "90")?,
            scrape_concurrency: parse_var("WORKER_SCRAPE_CONCURRENCY", "1")?,
            scrape_interval_ms: parse_var("WORKER_SCRAPE_INTERVAL_MS", "250")?,
        })
    }
}

impl Deref for Config {
    type Target = CoreConfig;

    fn deref(&self) -> &Self::Target {
        &self.core
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: [&str; 9] = [
        "DATABASE_URL",
        "YOUTUBE_API_KEY",
        "YOUTUBE_API_BASE_URL",
        "WORKER_VIDEOS_INTERVAL_SECS",
        "WORKER_CHANNELS_INTERVAL_SECS",
        "WORKER_MIN_RUN_INTERVAL_SECS",
        "WORKER_SCRAPE_CONCURRENCY",
        "WORKER_SCRAPE_INTERVAL_MS",
        "SITE_TIMEZONE",
    ];

    fn clear() {
        for var in VARS {
            unsafe { env::remove_var(var) };
        }
    }

    #[test]
    #[serial]
    fn test_config_defaults() {
        clear();
        unsafe {
            env::set_var("DATABASE_URL", "postgres://test");
            env::set_var("YOUTUBE_API_KEY", "key");
        }

        let config = Config::from_env().unwrap();

        assert_eq!(config.youtube_api_key, "key");
        assert_eq!(config.youtube_api_base_url, DEFAULT_BASE_URL);
        assert_eq!(config.videos_interval_secs, 300);
        assert_eq!(config.channels_interval_secs, 3600);
        assert_eq!(config.min_run_interval_secs, 90);
        assert_eq!(config.scrape_concurrency, 1);
        assert_eq!(config.scrape_interval_ms, 250);
        // Deref to the core config
        assert_eq!(config.database_url, "postgres://test");

        clear();
    }

    #[test]
    #[serial]
    fn test_config_requires_api_key() {
        clear();
        unsafe { env::set_var("DATABASE_URL", "postgres://test") };

        let err = Config::from_env().unwrap_err();
        assert!(err.to_string().contains("YOUTUBE_API_KEY"));

        clear();
    }

    #[test]
    #[serial]
    fn test_config_rejects_bad_interval() {
        clear();
        unsafe {
            env::set_var("DATABASE_URL", "postgres://test");
            env::set_var("YOUTUBE_API_KEY", "key");
            env::set_var("WORKER_SCRAPE_INTERVAL_MS", "soon");
        }

        let err = Config::from_env().unwrap_err();
        assert!(err.to_string().contains("WORKER_SCRAPE_INTERVAL_MS"));

        clear();
    }
}
