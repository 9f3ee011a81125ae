//! # Ledger Client
//!
//! Point-in-time lookups against the Solana node.
//!
//! [`LedgerClient`] abstracts over the nonblocking `RpcClient` so that the
//! [`Bootstrapper`](crate::bootstrap::Bootstrapper) and the
//! [`EventDispatcher`](crate::dispatcher::EventDispatcher) can be driven by an
//! in-process mock in tests.

use async_trait::async_trait;
use serde_json::json;
use solana_client::{
    client_error::ClientError,
    nonblocking::rpc_client::RpcClient,
    rpc_config::{RpcBlockConfig, RpcTransactionConfig},
    rpc_request::RpcRequest,
    rpc_response::RpcVersionInfo,
};
use solana_sdk::{account::Account, clock::Slot, pubkey::Pubkey, signature::Signature};
use solana_transaction_status::{
    EncodedConfirmedTransactionWithStatusMeta, TransactionDetails, UiConfirmedBlock,
    UiTransactionEncoding,
};

/// A trait abstracting over the asynchronous RPC lookups the watcher needs.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Asks the node for its software version.
    async fn get_version(&self) -> Result<RpcVersionInfo, ClientError>;
    /// Looks an account up at the client's commitment. `None` if it does not exist.
    async fn get_account(&self, address: &Pubkey) -> Result<Option<Account>, ClientError>;
    /// Fetches a transaction in `jsonParsed` form. `None` if the node does not know it (yet).
    async fn get_parsed_transaction(
        &self,
        signature: &Signature,
    ) -> Result<Option<EncodedConfirmedTransactionWithStatusMeta>, ClientError>;
    /// Fetches the block produced at `slot` with full transaction details.
    async fn get_block(&self, slot: Slot) -> Result<Option<UiConfirmedBlock>, ClientError>;
}

#[async_trait]
impl LedgerClient for RpcClient {
    async fn get_version(&self) -> Result<RpcVersionInfo, ClientError> {
        RpcClient::get_version(self).await
    }

    async fn get_account(&self, address: &Pubkey) -> Result<Option<Account>, ClientError> {
        let response = self
            .get_account_with_commitment(address, self.commitment())
            .await?;
        Ok(response.value)
    }

    async fn get_parsed_transaction(
        &self,
        signature: &Signature,
    ) -> Result<Option<EncodedConfirmedTransactionWithStatusMeta>, ClientError> {
        let config = RpcTransactionConfig {
            encoding: Some(UiTransactionEncoding::JsonParsed),
            commitment: Some(self.commitment()),
            max_supported_transaction_version: Some(0),
        };
        // `get_transaction_with_config` cannot express a `null` result.
        self.send(
            RpcRequest::GetTransaction,
            json!([signature.to_string(), config]),
        )
        .await
    }

    async fn get_block(&self, slot: Slot) -> Result<Option<UiConfirmedBlock>, ClientError> {
        let config = RpcBlockConfig {
            encoding: Some(UiTransactionEncoding::Json),
            transaction_details: Some(TransactionDetails::Full),
            rewards: Some(true),
            commitment: Some(self.commitment()),
            max_supported_transaction_version: Some(0),
        };
        self.send(RpcRequest::GetBlock, json!([slot, config])).await
    }
}
