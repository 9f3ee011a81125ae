use acct_watch_connector::config::{WatchConfig, ACCOUNT_KEY, RPC_URL_KEY};
use acct_watch_logger::LogConfig;
use anyhow::{Context, Result};
use serde::Deserialize;

/// The prefix of environment variables overriding nested settings,
/// e.g. `ACCT_WATCH__LOG__LEVEL=debug`.
pub const ENV_PREFIX: &str = "ACCT_WATCH";

/// The top-level configuration for the acct-watch daemon.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub struct DaemonConfig {
    #[serde(default)]
    pub connector: WatchConfig,
    /// Logging configuration.
    #[serde(default)]
    pub log: LogConfig,
}

/// Loads the daemon configuration from an optional TOML file and the process environment.
///
/// `SOLANA_JSON_RPC_ENDPOINT_URL` and `SYSTEM_WALLET_PUBLIC_KEY_STRING` override
/// whatever the file says.
pub fn load_config(path: Option<&str>) -> Result<DaemonConfig> {
    load_config_with(path, |key| std::env::var(key).ok())
}

/// Like [`load_config`], reading the two required keys through `lookup`.
pub fn load_config_with<F>(path: Option<&str>, lookup: F) -> Result<DaemonConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let mut builder = config::Config::builder();
    if let Some(path) = path {
        builder = builder.add_source(config::File::with_name(path));
    }

    let builder = builder
        .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
        .set_override_option("connector.solana.rpc-url", lookup(RPC_URL_KEY))?
        .set_override_option("connector.watch.account", lookup(ACCOUNT_KEY))?;

    let source = path.unwrap_or("<environment>");
    let settings: DaemonConfig = builder
        .build()
        .context(format!("Failed to build configuration from '{}'", source))?
        .try_deserialize()
        .context("Failed to deserialize configuration")?;

    Ok(settings)
}
