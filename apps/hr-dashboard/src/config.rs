use anyhow::{Context, Result};
use ingest::IngestConfig;
use platform_db::DatabaseSettings;
use platform_obs::ObsConfig;

/// Everything the CLI reads from the environment.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database: DatabaseSettings,
    pub ingest: IngestConfig,
    pub obs: ObsConfig,
}

impl AppConfig {
    /// Loads `.env` when present, then reads the process environment.
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();
        let database = DatabaseSettings::from_env().context("invalid database settings")?;
        Ok(Self {
            database,
            ingest: IngestConfig::from_env(),
            obs: ObsConfig::for_service("hr-dashboard"),
        })
    }
}
