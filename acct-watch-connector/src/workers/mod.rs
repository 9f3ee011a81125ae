//! # Subscription Manager & Workers
//!
//! This module defines the [`SubscriptionManager`], which registers the three push
//! subscriptions and starts one worker per subscription.
//!
//! ## Workers
//!
//! - `AccountWorker`: forwards account snapshots to the dispatcher.
//! - `LogsWorker`: spawns one dispatcher task per log event so that enrichment
//!   lookups never hold up the next event.
//! - `SlotWorker`: forwards slot transitions to the dispatcher.
//!
//! Workers run until their subscription stream closes. There is no unsubscribe
//! path; the subscriptions live as long as the process.

mod account;
mod logs;
mod slot;

use crate::{dispatcher::EventDispatcher, listener::LedgerStreams};
use account::AccountWorker;
use anyhow::Result;
use futures::future;
use logs::LogsWorker;
use slot::SlotWorker;
use solana_sdk::{commitment_config::CommitmentConfig, pubkey::Pubkey};
use std::sync::Arc;
use tokio::task::JoinHandle;

/// A shared context containing all dependencies required by the workers.
#[derive(Clone)]
pub(crate) struct WorkerContext {
    pub dispatcher: EventDispatcher,
}

/// Registers the account, logs and slot subscriptions and owns their workers.
pub struct SubscriptionManager {
    streams: Arc<dyn LedgerStreams>,
    ctx: WorkerContext,
    account: Pubkey,
    commitment: CommitmentConfig,
}

impl SubscriptionManager {
    /// Creates a new `SubscriptionManager`.
    ///
    /// # Arguments
    ///
    /// * `streams` - The push channels of the ledger node.
    /// * `dispatcher` - The handlers every received event is routed to.
    /// * `account` - The monitored account, scoping the account and logs subscriptions.
    /// * `commitment` - The commitment requested for the scoped subscriptions.
    pub fn new(
        streams: Arc<dyn LedgerStreams>,
        dispatcher: EventDispatcher,
        account: Pubkey,
        commitment: CommitmentConfig,
    ) -> Self {
        Self {
            streams,
            ctx: WorkerContext { dispatcher },
            account,
            commitment,
        }
    }

    /// Registers all three subscriptions, then spawns their workers.
    ///
    /// Fails if any registration is refused; in that case no worker is started.
    pub async fn start(self) -> Result<Subscriptions> {
        let account_rx = self
            .streams
            .account_changes(self.account, self.commitment)
            .await?;
        let logs_rx = self.streams.logs(self.account, self.commitment).await?;
        let slot_rx = self.streams.slot_changes().await?;

        tracing::info!(account = %self.account, "All subscriptions registered, starting workers");

        let workers = vec![
            tokio::spawn(AccountWorker::new(self.ctx.clone(), account_rx).run()),
            tokio::spawn(LogsWorker::new(self.ctx.clone(), logs_rx).run()),
            tokio::spawn(SlotWorker::new(self.ctx, slot_rx).run()),
        ];

        Ok(Subscriptions { workers })
    }
}

/// The running workers of a started [`SubscriptionManager`].
pub struct Subscriptions {
    workers: Vec<JoinHandle<()>>,
}

impl Subscriptions {
    /// Resolves once every worker has stopped, i.e. every stream has closed.
    pub async fn join(self) {
        for result in future::join_all(self.workers).await {
            if let Err(e) = result {
                tracing::error!("Subscription worker ended abnormally: {}", e);
            }
        }
        tracing::warn!("All subscription streams have closed.");
    }
}
