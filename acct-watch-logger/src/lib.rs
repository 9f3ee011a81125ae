//! Operator log initialisation for the acct-watch binaries.
//!
//! Everything the daemon reports about itself (startup, lookup failures, write
//! failures) goes through `tracing`; this crate installs the subscriber.

use anyhow::Result;
use serde::Deserialize;
use std::{fs::OpenOptions, sync::Arc};
use tracing_subscriber::{filter::LevelFilter, fmt, prelude::*, EnvFilter, Registry};

#[derive(Debug, Deserialize, Clone, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    #[default]
    Plain,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    #[default]
    Stdout,
    File,
}

/// Logging configuration.
#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct LogConfig {
    /// Log level or filter directives, e.g. "info" or "acct_watch_connector=debug".
    #[serde(default = "default_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
    #[serde(default)]
    pub output: LogOutput,
    /// Path to the log file, required if output is "file".
    #[serde(default)]
    pub file_path: Option<String>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: LogFormat::default(),
            output: LogOutput::default(),
            file_path: None,
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}

/// Builds the level filter: `RUST_LOG` when set, otherwise the configured level.
///
/// Unparsable directives are dropped and the filter falls back to `info`.
pub fn env_filter(config: &LogConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::builder()
            .with_default_directive(LevelFilter::INFO.into())
            .parse_lossy(&config.level)
    })
}

/// Installs the global subscriber. Fails if one is already installed.
pub fn init(config: &LogConfig) -> Result<()> {
    let subscriber = Registry::default().with(env_filter(config));

    match config.output {
        LogOutput::File => {
            let file_path = config
                .file_path
                .as_deref()
                .ok_or_else(|| anyhow::anyhow!("Log output is 'file' but 'file_path' is not specified"))?;
            let log_file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(file_path)?;
            let file_writer = Arc::new(log_file);

            match config.format {
                LogFormat::Json => subscriber
                    .with(fmt::layer().with_writer(file_writer).json())
                    .try_init()?,
                LogFormat::Plain => subscriber
                    .with(fmt::layer().with_writer(file_writer).with_ansi(false))
                    .try_init()?,
            }
        }
        LogOutput::Stdout => match config.format {
            LogFormat::Json => subscriber
                .with(fmt::layer().with_writer(std::io::stdout).json())
                .try_init()?,
            LogFormat::Plain => subscriber
                .with(fmt::layer().with_writer(std::io::stdout).pretty())
                .try_init()?,
        },
    };

    Ok(())
}
