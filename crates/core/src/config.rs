//! Shared configuration logic
//!
//! Handles loading of common environment variables.

use crate::error::ConfigError;
use std::env;

/// Common configuration used across services
#[derive(Debug, Clone)]
pub struct CoreConfig {
    /// Database connection URL
    pub database_url: String,

    /// Maximum database connections (default: 20)
    pub db_max_connections: u32,

    /// IANA timezone used to group the timeline by day (default: Asia/Tokyo)
    pub site_timezone: String,
}

impl CoreConfig {
    /// Load common configuration from environment variables
    ///
    /// This will also initialize dotenv if it hasn't been done yet.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        let site_timezone = env::var("SITE_TIMEZONE")
            .unwrap_or_else(|_| crate::timezone::SITE_TIMEZONE.to_string());
        crate::timezone::validate_timezone(&site_timezone).map_err(|_| {
            ConfigError::InvalidValue {
                name: "SITE_TIMEZONE".to_string(),
                value: site_timezone.clone(),
            }
        })?;

        Ok(Self {
            database_url: env::var("DATABASE_URL")
                .map_err(|_| ConfigError::MissingEnvVar("DATABASE_URL".to_string()))?,
            db_max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(20),
            site_timezone,
        })
    }
}
