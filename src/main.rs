use std::process::ExitCode;

use anyhow::Result;
use tracing::{error, info};

use storefront_scraper::infrastructure::logging::{init_logging_with_config, log_system_info};
use storefront_scraper::{ConfigManager, CrawlOrchestrator, RunOutcome};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let manager = ConfigManager::new();
    let from_file = manager.config_file_present().await?;
    let config = manager.load_config().await?;

    init_logging_with_config(&config.logging)?;
    log_system_info();
    if from_file {
        info!("Loaded configuration from: {:?}", manager.config_path());
    } else {
        info!("No configuration file at {:?}, using defaults", manager.config_path());
    }

    let orchestrator = CrawlOrchestrator::from_config(&config)?;

    match orchestrator.run().await? {
        RunOutcome::Completed(summary) => {
            if let Some(artifact) = &summary.artifact {
                info!("Artifact: {}", artifact.display());
            }
            Ok(ExitCode::SUCCESS)
        }
        RunOutcome::Halted { reason, .. } => {
            error!("Run halted: {}", reason);
            Ok(ExitCode::FAILURE)
        }
    }
}
