//! # Bootstrapper
//!
//! Validates the configuration, opens the ledger connection and confirms the
//! monitored account exists. Every failure is returned as a [`BootstrapError`];
//! deciding to terminate is left to the caller.

use crate::{
    client::LedgerClient,
    config::{WatchConfig, ACCOUNT_KEY, RPC_URL_KEY},
    listener::{PubsubStreams, StreamError},
};
use solana_client::{client_error::ClientError, nonblocking::rpc_client::RpcClient};
use solana_sdk::{commitment_config::CommitmentConfig, pubkey::Pubkey};
use std::sync::Arc;
use thiserror::Error;
use url::Url;

/// Fatal startup conditions.
#[derive(Error, Debug)]
pub enum BootstrapError {
    #[error("{0} is not defined in the environment variables")]
    MissingConfig(&'static str),

    #[error("invalid SYSTEM_WALLET_PUBLIC_KEY_STRING '{value}': {source}")]
    InvalidAddress {
        value: String,
        #[source]
        source: solana_sdk::pubkey::ParsePubkeyError,
    },

    #[error("invalid endpoint '{url}': {reason}")]
    InvalidEndpoint { url: String, reason: String },

    #[error("ledger node is unreachable: {0}")]
    Unreachable(#[from] ClientError),

    #[error("ledger node did not report a version")]
    NoVersion,

    #[error("account {0} not found on-chain; it might be a new account or on a different network")]
    AccountNotFound(Pubkey),

    #[error(transparent)]
    Subscription(#[from] StreamError),
}

/// The validated endpoints and monitored account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchTarget {
    pub rpc_url: String,
    pub ws_url: String,
    pub account: Pubkey,
    pub commitment: CommitmentConfig,
}

/// A live, verified connection ready to be handed to the subscription manager.
pub struct Connection {
    pub target: WatchTarget,
    pub rpc_client: Arc<RpcClient>,
    pub streams: PubsubStreams,
}

pub struct Bootstrapper {
    config: WatchConfig,
}

impl Bootstrapper {
    pub fn new(config: WatchConfig) -> Self {
        Self { config }
    }

    /// Checks the configuration without touching the network.
    ///
    /// The endpoint is checked before the address; empty values count as missing.
    pub fn resolve(&self) -> Result<WatchTarget, BootstrapError> {
        let rpc_url = non_empty(self.config.solana.rpc_url.as_deref())
            .ok_or(BootstrapError::MissingConfig(RPC_URL_KEY))?;
        let account_str = non_empty(self.config.watch.account.as_deref())
            .ok_or(BootstrapError::MissingConfig(ACCOUNT_KEY))?;

        let account = account_str
            .parse::<Pubkey>()
            .map_err(|source| BootstrapError::InvalidAddress {
                value: account_str.to_string(),
                source,
            })?;

        let ws_url = match non_empty(self.config.solana.ws_url.as_deref()) {
            Some(ws_url) => ws_url.to_string(),
            None => derive_ws_url(rpc_url)?,
        };

        Ok(WatchTarget {
            rpc_url: rpc_url.to_string(),
            ws_url,
            account,
            commitment: self.config.solana.commitment_config(),
        })
    }

    /// Confirms the node answers and the monitored account exists.
    pub async fn verify<C>(client: &C, target: &WatchTarget) -> Result<(), BootstrapError>
    where
        C: LedgerClient + ?Sized,
    {
        let version = client.get_version().await?;
        if version.solana_core.is_empty() {
            return Err(BootstrapError::NoVersion);
        }
        tracing::info!(version = %version.solana_core, "Connected to Solana node");

        match client.get_account(&target.account).await? {
            Some(_) => {
                tracing::info!(account = %target.account, "Monitored account verified on-chain");
                Ok(())
            }
            None => Err(BootstrapError::AccountNotFound(target.account)),
        }
    }

    /// Resolves, connects and verifies. There is no partial-start mode.
    pub async fn connect(self) -> Result<Connection, BootstrapError> {
        let target = self.resolve()?;
        let rpc_client = Arc::new(RpcClient::new_with_commitment(
            target.rpc_url.clone(),
            target.commitment,
        ));

        Self::verify(rpc_client.as_ref(), &target).await?;

        let streams =
            PubsubStreams::connect(&target.ws_url, self.config.channels.stream_buffer).await?;

        Ok(Connection {
            target,
            rpc_client,
            streams,
        })
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Maps an HTTP(S) RPC endpoint to its WebSocket counterpart.
///
/// The scheme becomes `ws`/`wss` and an explicit port moves up by one, which is
/// where a validator serves its pubsub endpoint.
pub fn derive_ws_url(rpc_url: &str) -> Result<String, BootstrapError> {
    let invalid = |reason: String| BootstrapError::InvalidEndpoint {
        url: rpc_url.to_string(),
        reason,
    };

    let mut url = Url::parse(rpc_url).map_err(|e| invalid(e.to_string()))?;
    let scheme = match url.scheme() {
        "http" => "ws",
        "https" => "wss",
        other => return Err(invalid(format!("unsupported scheme '{}'", other))),
    };
    url.set_scheme(scheme)
        .map_err(|_| invalid(format!("cannot switch scheme to '{}'", scheme)))?;

    if let Some(port) = url.port() {
        let next = port
            .checked_add(1)
            .ok_or_else(|| invalid(format!("port {} has no successor", port)))?;
        url.set_port(Some(next))
            .map_err(|_| invalid("cannot set port".to_string()))?;
    }

    Ok(url.to_string())
}
