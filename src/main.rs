use anyhow::Context;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use joystick_client::adapters::outbound::init_session_logger;
use joystick_client::{Config, LoggingConsumer, SessionDriver};

async fn load_config() -> anyhow::Result<Config> {
    let config = match std::env::args().nth(1) {
        Some(path) => Config::from_file(&path)
            .await
            .with_context(|| format!("Failed to load configuration from {}", path))?,
        None => Config::default(),
    };
    config.with_env_overrides()
}

#[tokio::main]
async fn main() -> ExitCode {
    let config = match load_config().await {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{:#}", e);
            return ExitCode::FAILURE;
        }
    };

    // The file logger must claim the `log` facade before tracing does.
    let logger = init_session_logger(config.logging.file.as_deref(), &config.logging.level);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();

    logger.info("Joystick client (episode metadata receiver)");

    let consumer = Box::new(LoggingConsumer::new(logger.clone()));
    let mut driver = match SessionDriver::connect(&config, consumer, logger.clone()).await {
        Ok(driver) => driver,
        Err(e) => {
            logger.error(&format!("Unable to start session: {}", e));
            return ExitCode::FAILURE;
        }
    };

    match driver.run().await {
        Ok(report) => {
            logger.info(&format!(
                "Completed {} of {} episodes",
                report.delivered.len(),
                report.catalog.len()
            ));
            ExitCode::SUCCESS
        }
        Err(e) => {
            logger.error(&format!("Session failed: {}", e));
            ExitCode::FAILURE
        }
    }
}
