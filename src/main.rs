use anyhow::{bail, Context};
use clap::Parser;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use aw_importer_ios_fitness::{
    cli::{Cli, Command},
    config::Config,
    services::{ImportProcessor, ImportWatcher, PathOutcome},
    storage::{ActivityWatchClient, EventStore},
    BUCKET_TYPE, WATCHER_NAME,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // Load config
    let config_path = cli.config.clone().unwrap_or_else(Config::default_path);
    let config = Config::load(Some(config_path.as_path()), &cli.overrides())
        .with_context(|| format!("failed to load configuration from {}", config_path.display()))?;

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("aw_importer_ios_fitness={}", config.log_level).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let server_url = config.effective_server_url();
    let client = Arc::new(ActivityWatchClient::new(
        server_url.clone(),
        WATCHER_NAME.to_string(),
        config.effective_hostname(),
    ));

    if let Err(e) = client.ping().await {
        tracing::warn!("ActivityWatch server at {} not reachable yet: {}", server_url, e);
    }

    let bucket_id = client.bucket_id();
    client
        .create_bucket_if_absent(&bucket_id, BUCKET_TYPE)
        .await
        .with_context(|| format!("failed to prepare bucket {}", bucket_id))?;
    tracing::info!("Using bucket {} on {}", bucket_id, server_url);

    let processor = Arc::new(ImportProcessor::new(client, bucket_id));
    let mut watcher = ImportWatcher::new(config.data_dir(), processor);

    match cli.command() {
        Command::Watch => {
            let shutdown = async {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    tracing::error!("Failed to listen for Ctrl-C: {}", e);
                    std::future::pending::<()>().await;
                }
            };
            watcher.watch(shutdown).await?;
        }
        Command::Import { file } => match watcher.handle_path(&file).await {
            PathOutcome::Imported { summary, marked } => {
                println!();
                tracing::info!(
                    "Imported {} ({} new, {} already present, {} skipped), renamed to {}",
                    file.display(),
                    summary.added,
                    summary.duplicates,
                    summary.skipped,
                    marked.display()
                );
            }
            PathOutcome::Discarded => {
                bail!("{} is not an unimported .csv export", file.display())
            }
            PathOutcome::Failed => bail!("failed to import {}", file.display()),
        },
    }

    Ok(())
}
