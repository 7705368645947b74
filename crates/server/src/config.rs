use anyhow::Result;
use shinju_core::config::CoreConfig;

/// Settings for every service hosted by the unified binary
#[derive(Debug, Clone)]
pub struct UnifiedConfig {
    pub api: api::config::Config,
    pub worker: worker::Config,
}

impl UnifiedConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            api: api::config::Config::from_env()?,
            worker: worker::Config::from_env()?,
        })
    }

    pub fn core(&self) -> &CoreConfig {
        &self.api.core
    }
}
