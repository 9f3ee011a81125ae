pub mod cli;
pub mod config;

use acct_watch_connector::{
    bootstrap::Bootstrapper, config::WatchConfig, dispatcher::EventDispatcher,
    storage::RecordWriter, workers::SubscriptionManager,
};
use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use crate::config::{load_config, DaemonConfig};
use std::sync::Arc;
use tokio::signal;

/// The main entry point for running the daemon.
/// This function handles CLI parsing, configuration, and service startup.
pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    let Commands::Run(run_cmd) = cli.command;
    let config = load_config_from_cli(run_cmd)?;
    acct_watch_logger::init(&config.log)?;
    tracing::debug!("Configuration loaded: {:#?}", &config);
    watch(config.connector).await?;

    Ok(())
}

/// Loads the daemon configuration based on the provided CLI command.
fn load_config_from_cli(run_cmd: cli::RunCmd) -> Result<DaemonConfig> {
    if let Some(config_path) = run_cmd.config.as_deref() {
        println!("Loading configuration from '{}'", config_path);
    }
    load_config(run_cmd.config.as_deref())
}

/// Bootstraps the connection, starts the subscriptions and records events until
/// every stream has closed or Ctrl+C is received.
///
/// Any bootstrap or registration failure is logged and returned; nothing is
/// written to the output file in that case.
pub async fn watch(config: WatchConfig) -> Result<()> {
    let output_path = config.watch.output_path.clone();

    let connection = Bootstrapper::new(config).connect().await.map_err(|e| {
        tracing::error!("Failed to start watching: {}", e);
        e
    })?;

    let account = connection.target.account;
    let dispatcher = EventDispatcher::new(
        connection.rpc_client.clone(),
        RecordWriter::to_file(&output_path),
    );
    let subscriptions = SubscriptionManager::new(
        Arc::new(connection.streams),
        dispatcher,
        account,
        connection.target.commitment,
    )
    .start()
    .await
    .map_err(|e| {
        tracing::error!("Failed to register subscriptions: {:#}", e);
        e
    })?;

    tracing::info!(%account, output = %output_path, "Watching account");

    tokio::select! {
        _ = subscriptions.join() => {
            tracing::warn!("No subscription is left running, exiting.");
        },
        res = signal::ctrl_c() => match res {
            Ok(()) => tracing::info!("Received Ctrl+C, shutting down."),
            Err(err) => tracing::error!(error = %err, "Failed to listen for shutdown signal."),
        },
    }

    Ok(())
}
