use std::process::ExitCode;

use anyhow::Context;
use ingest::{IngestConfig, ingest};
use platform_db::{DatabaseSettings, Store};
use platform_obs::{ObsConfig, init_tracing, shutdown_tracing};
use tracing::error;

const CONFIG_EXIT_CODE: u8 = 3;

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    if let Err(err) = init_tracing(ObsConfig::for_service("setup-database")) {
        eprintln!("failed to initialise logging: {err:#}");
        return ExitCode::from(CONFIG_EXIT_CODE);
    }

    let settings = match DatabaseSettings::from_env().context("invalid database settings") {
        Ok(settings) => settings,
        Err(err) => {
            error!("{err:#}");
            return ExitCode::from(CONFIG_EXIT_CODE);
        }
    };
    let store = Store::new(settings);
    let config = IngestConfig::from_env();

    let code = match ingest(&config, &store).await {
        Ok(report) => {
            println!("{report}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!(error = %err, "database setup failed");
            ExitCode::from(err.kind().exit_code())
        }
    };
    shutdown_tracing();
    code
}
