use serde::{Deserialize, Serialize};

use solana_sdk::commitment_config::{CommitmentConfig, CommitmentLevel};

/// The environment key holding the node's JSON-RPC endpoint.
pub const RPC_URL_KEY: &str = "SOLANA_JSON_RPC_ENDPOINT_URL";
/// The environment key holding the address of the monitored account.
pub const ACCOUNT_KEY: &str = "SYSTEM_WALLET_PUBLIC_KEY_STRING";
/// The file records are appended to when no other path is configured.
pub const DEFAULT_OUTPUT_PATH: &str = "account-change-log";

/// The top-level configuration for the `acct-watch-connector` library.
///
/// This struct aggregates the Solana endpoints, the monitored account and the
/// output location. It is usually deserialized as one section of the daemon's
/// configuration and handed to the [`Bootstrapper`](crate::bootstrap::Bootstrapper).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct WatchConfig {
    #[serde(default)]
    pub solana: Solana,
    #[serde(default)]
    pub watch: Watch,
    #[serde(default)]
    pub channels: ChannelConfig,
}

/// Defines the connection settings for the Solana cluster.
///
/// `rpc_url` has no default: a missing endpoint is a startup error.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Solana {
    #[serde(default)]
    pub rpc_url: Option<String>,
    /// Derived from `rpc_url` when unset.
    #[serde(default)]
    pub ws_url: Option<String>,
    #[serde(default = "default_commitment", with = "serde_commitment")]
    pub commitment: CommitmentLevel,
}

/// What to watch and where to record it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Watch {
    /// Base58 address of the monitored account.
    #[serde(default)]
    pub account: Option<String>,
    #[serde(default = "default_output_path")]
    pub output_path: String,
}

/// Defines capacities for the MPSC channels between subscriptions and workers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ChannelConfig {
    /// The buffer capacity of each subscription's event channel.
    pub stream_buffer: usize,
}

impl Solana {
    pub fn commitment_config(&self) -> CommitmentConfig {
        CommitmentConfig {
            commitment: self.commitment,
        }
    }
}

impl Default for Solana {
    fn default() -> Self {
        Self {
            rpc_url: None,
            ws_url: None,
            commitment: default_commitment(),
        }
    }
}

impl Default for Watch {
    fn default() -> Self {
        Self {
            account: None,
            output_path: default_output_path(),
        }
    }
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self { stream_buffer: 256 }
    }
}

fn default_commitment() -> CommitmentLevel {
    CommitmentLevel::Confirmed
}

fn default_output_path() -> String {
    DEFAULT_OUTPUT_PATH.to_string()
}

mod serde_commitment {

    use super::*;
    use serde::{Deserializer, Serializer};

    pub fn serialize<S>(c: &CommitmentLevel, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let s = match c {
            CommitmentLevel::Processed => "processed",
            CommitmentLevel::Confirmed => "confirmed",
            CommitmentLevel::Finalized => "finalized",
        };
        serializer.serialize_str(s)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<CommitmentLevel, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s: String = Deserialize::deserialize(deserializer)?;
        let level = match s.to_lowercase().as_str() {
            "processed" => CommitmentLevel::Processed,
            "finalized" => CommitmentLevel::Finalized,
            _ => CommitmentLevel::Confirmed,
        };
        Ok(level)
    }
}
