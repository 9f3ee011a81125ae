//! # Push Subscriptions
//!
//! [`LedgerStreams`] registers the three push subscriptions the watcher relies
//! on and exposes each one as an MPSC channel of domain events.
//!
//! [`PubsubStreams`] is the WebSocket implementation. Every registration spawns a
//! forwarding task that owns the subscription for the rest of the process: it
//! converts notifications and pushes them into the channel until the node closes
//! the stream or the receiver is dropped. Nothing reconnects a closed stream.

use crate::records::{AccountSnapshot, LogEvent, SlotTransition};
use async_trait::async_trait;
use futures::stream::BoxStream;
use solana_account_decoder::UiAccountEncoding;
use solana_client::{
    nonblocking::pubsub_client::PubsubClient,
    rpc_config::{RpcAccountInfoConfig, RpcTransactionLogsConfig, RpcTransactionLogsFilter},
};
use solana_sdk::{commitment_config::CommitmentConfig, pubkey::Pubkey};
use std::{convert::Infallible, fmt::Display, sync::Arc};
use tokio::sync::{mpsc, oneshot};
use tokio_stream::StreamExt;

#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    #[error("failed to connect to {url}: {reason}")]
    Connect { url: String, reason: String },
    #[error("failed to subscribe to {stream} notifications: {reason}")]
    Subscribe { stream: &'static str, reason: String },
    #[error("{stream} subscription task ended before registering")]
    Aborted { stream: &'static str },
}

/// The three push channels offered by the ledger node.
#[async_trait]
pub trait LedgerStreams: Send + Sync {
    /// Notifications whenever the state of `address` changes.
    async fn account_changes(
        &self,
        address: Pubkey,
        commitment: CommitmentConfig,
    ) -> Result<mpsc::Receiver<AccountSnapshot>, StreamError>;

    /// Log output of every transaction that mentions `address`.
    async fn logs(
        &self,
        address: Pubkey,
        commitment: CommitmentConfig,
    ) -> Result<mpsc::Receiver<LogEvent>, StreamError>;

    /// Every slot advance on the node.
    async fn slot_changes(&self) -> Result<mpsc::Receiver<SlotTransition>, StreamError>;
}

/// [`LedgerStreams`] over a single shared WebSocket connection.
pub struct PubsubStreams {
    client: Arc<PubsubClient>,
    buffer: usize,
}

impl PubsubStreams {
    /// Opens the WebSocket connection. `buffer` is the capacity of each event channel.
    pub async fn connect(ws_url: &str, buffer: usize) -> Result<Self, StreamError> {
        let client = PubsubClient::new(ws_url)
            .await
            .map_err(|e| StreamError::Connect {
                url: ws_url.to_string(),
                reason: e.to_string(),
            })?;
        tracing::info!(url = ws_url, "Connected to WebSocket endpoint");
        Ok(Self {
            client: Arc::new(client),
            buffer,
        })
    }
}

#[async_trait]
impl LedgerStreams for PubsubStreams {
    async fn account_changes(
        &self,
        address: Pubkey,
        commitment: CommitmentConfig,
    ) -> Result<mpsc::Receiver<AccountSnapshot>, StreamError> {
        let (tx, rx) = mpsc::channel(self.buffer);
        let (ready_tx, ready_rx) = oneshot::channel();
        let client = self.client.clone();

        tokio::spawn(async move {
            let config = RpcAccountInfoConfig {
                encoding: Some(UiAccountEncoding::Base64),
                commitment: Some(commitment),
                ..RpcAccountInfoConfig::default()
            };
            let (stream, _unsubscribe) =
                match client.account_subscribe(&address, Some(config)).await {
                    Ok(subscription) => {
                        let _ = ready_tx.send(Ok(()));
                        subscription
                    }
                    Err(e) => {
                        let _ = ready_tx.send(Err(e.to_string()));
                        return;
                    }
                };
            forward("account", stream, tx, |update| {
                AccountSnapshot::try_from(update.value)
            })
            .await;
        });

        registered("account", ready_rx).await?;
        Ok(rx)
    }

    async fn logs(
        &self,
        address: Pubkey,
        commitment: CommitmentConfig,
    ) -> Result<mpsc::Receiver<LogEvent>, StreamError> {
        let (tx, rx) = mpsc::channel(self.buffer);
        let (ready_tx, ready_rx) = oneshot::channel();
        let client = self.client.clone();

        tokio::spawn(async move {
            let filter = RpcTransactionLogsFilter::Mentions(vec![address.to_string()]);
            let config = RpcTransactionLogsConfig {
                commitment: Some(commitment),
            };
            let (stream, _unsubscribe) = match client.logs_subscribe(filter, config).await {
                Ok(subscription) => {
                    let _ = ready_tx.send(Ok(()));
                    subscription
                }
                Err(e) => {
                    let _ = ready_tx.send(Err(e.to_string()));
                    return;
                }
            };
            forward("logs", stream, tx, |msg| Ok::<_, Infallible>(LogEvent::from(msg))).await;
        });

        registered("logs", ready_rx).await?;
        Ok(rx)
    }

    async fn slot_changes(&self) -> Result<mpsc::Receiver<SlotTransition>, StreamError> {
        let (tx, rx) = mpsc::channel(self.buffer);
        let (ready_tx, ready_rx) = oneshot::channel();
        let client = self.client.clone();

        tokio::spawn(async move {
            let (stream, _unsubscribe) = match client.slot_subscribe().await {
                Ok(subscription) => {
                    let _ = ready_tx.send(Ok(()));
                    subscription
                }
                Err(e) => {
                    let _ = ready_tx.send(Err(e.to_string()));
                    return;
                }
            };
            forward("slot", stream, tx, |info| {
                Ok::<_, Infallible>(SlotTransition::from(info))
            })
            .await;
        });

        registered("slot", ready_rx).await?;
        Ok(rx)
    }
}

/// Waits for a forwarding task to report whether its subscription was accepted.
async fn registered(
    stream: &'static str,
    ready: oneshot::Receiver<Result<(), String>>,
) -> Result<(), StreamError> {
    match ready.await {
        Ok(Ok(())) => {
            tracing::info!("Subscribed to {} notifications", stream);
            Ok(())
        }
        Ok(Err(reason)) => Err(StreamError::Subscribe { stream, reason }),
        Err(_) => Err(StreamError::Aborted { stream }),
    }
}

/// Pumps notifications into `tx` until the stream ends or the receiver goes away.
async fn forward<T, U, E, F>(
    name: &'static str,
    mut stream: BoxStream<'_, T>,
    tx: mpsc::Sender<U>,
    convert: F,
) where
    E: Display,
    F: Fn(T) -> Result<U, E>,
{
    while let Some(notification) = stream.next().await {
        match convert(notification) {
            Ok(event) => {
                if tx.send(event).await.is_err() {
                    tracing::debug!("{} receiver dropped, stopping forwarder", name);
                    return;
                }
            }
            Err(e) => tracing::error!("Skipping undecodable {} notification: {}", name, e),
        }
    }
    tracing::warn!("{} subscription stream closed by the node", name);
}
