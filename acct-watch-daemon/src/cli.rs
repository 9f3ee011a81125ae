use clap::{Parser, Subcommand};

/// The main CLI structure for the acct-watch daemon.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Defines the available subcommands for the application.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Watch the configured account and append every observed event to the log file.
    Run(RunCmd),
}

/// Arguments for the `run` subcommand.
#[derive(Parser, Debug)]
pub struct RunCmd {
    /// Path to an optional TOML configuration file.
    /// Environment variables take precedence over its values.
    #[arg(short, long)]
    pub config: Option<String>,
}
