//! # Event Dispatcher
//!
//! One handler per subscription type. Account and slot events are recorded as
//! they arrive; log events are recorded first and then enriched with the
//! transaction and block they refer to.
//!
//! Handlers never return errors: a failed lookup only costs its own record.
use crate::{
    client::LedgerClient,
    records::{AccountSnapshot, LogEvent, LogRecord, SlotTransition},
    storage::RecordWriter,
};
use solana_sdk::signature::Signature;
use std::sync::Arc;

/// Routes received events to the [`RecordWriter`], enriching log events on the way.
///
/// Cloning is cheap; the log worker hands a clone to every per-event task.
#[derive(Clone)]
pub struct EventDispatcher {
    client: Arc<dyn LedgerClient>,
    writer: RecordWriter,
}

impl EventDispatcher {
    pub fn new(client: Arc<dyn LedgerClient>, writer: RecordWriter) -> Self {
        Self { client, writer }
    }

    pub async fn handle_account_change(&self, snapshot: AccountSnapshot) {
        tracing::debug!(lamports = snapshot.lamports, "Account change received");
        self.writer.append(LogRecord::AccountChange(snapshot)).await;
    }

    /// Records the log event, then looks up its transaction and block concurrently.
    pub async fn handle_logs(&self, event: LogEvent) {
        let signature = event.signature.clone();
        let slot = event.slot;
        tracing::debug!(%signature, slot, "Logs received");

        self.writer.append(LogRecord::Logs(event)).await;

        tokio::join!(
            self.enrich_transaction(&signature),
            self.enrich_block(slot)
        );
    }

    pub async fn handle_slot_change(&self, transition: SlotTransition) {
        tracing::trace!(slot = transition.slot, "Slot change received");
        self.writer.append(LogRecord::SlotChange(transition)).await;
    }

    async fn enrich_transaction(&self, signature: &str) {
        let parsed = match signature.parse::<Signature>() {
            Ok(sig) => sig,
            Err(e) => {
                tracing::error!(%signature, "Invalid transaction signature in logs: {}", e);
                return;
            }
        };
        match self.client.get_parsed_transaction(&parsed).await {
            Ok(Some(tx)) => {
                self.writer
                    .append(LogRecord::Transaction(Box::new(tx)))
                    .await
            }
            Ok(None) => tracing::debug!(%signature, "Transaction not found"),
            Err(e) => tracing::error!(%signature, "Failed to get transaction: {}", e),
        }
    }

    async fn enrich_block(&self, slot: u64) {
        match self.client.get_block(slot).await {
            Ok(Some(block)) => self.writer.append(LogRecord::Block(Box::new(block))).await,
            Ok(None) => tracing::debug!(slot, "Block not found"),
            Err(e) => tracing::error!(slot, "Failed to get block: {}", e),
        }
    }
}
