#![allow(dead_code)]

use acct_watch_connector::{
    client::LedgerClient,
    listener::{LedgerStreams, StreamError},
    records::{AccountSnapshot, LogEvent, SlotTransition},
    storage::RecordStore,
};
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{json, Value};
use solana_client::{
    client_error::{ClientError, ClientErrorKind},
    rpc_response::RpcVersionInfo,
};
use solana_sdk::{
    account::Account, clock::Slot, commitment_config::CommitmentConfig, pubkey::Pubkey,
    signature::Signature,
};
use solana_transaction_status::{EncodedConfirmedTransactionWithStatusMeta, UiConfirmedBlock};
use std::{
    sync::{
        atomic::{AtomicUsize, Ordering},
        Mutex,
    },
    time::Duration,
};
use tokio::sync::mpsc;

/// The scripted outcome of one kind of lookup.
#[derive(Clone)]
pub enum Lookup<T> {
    Found(T),
    Missing,
    Fails,
}

impl<T> Lookup<T> {
    fn resolve_with(&self, what: &str, copy: impl Fn(&T) -> T) -> Result<Option<T>, ClientError> {
        match self {
            Lookup::Found(value) => Ok(Some(copy(value))),
            Lookup::Missing => Ok(None),
            Lookup::Fails => Err(rpc_error(what)),
        }
    }
}

impl<T: Clone> Lookup<T> {
    fn resolve(&self, what: &str) -> Result<Option<T>, ClientError> {
        self.resolve_with(what, T::clone)
    }
}

/// Copies a value that only offers serde, by re-reading its JSON form.
fn reparse<T: Serialize + DeserializeOwned>(value: &T) -> T {
    serde_json::to_value(value)
        .and_then(serde_json::from_value)
        .expect("fixture survives a JSON round trip")
}

pub fn rpc_error(what: &str) -> ClientError {
    ClientError::from(ClientErrorKind::Custom(format!("{} lookup failed", what)))
}

/// A scripted `LedgerClient` that counts the lookups it serves.
pub struct MockLedger {
    pub version: Lookup<String>,
    pub account: Lookup<Account>,
    pub transaction: Lookup<EncodedConfirmedTransactionWithStatusMeta>,
    pub block: Lookup<UiConfirmedBlock>,
    pub transaction_calls: AtomicUsize,
    pub block_calls: AtomicUsize,
    pub requested_slots: Mutex<Vec<Slot>>,
}

impl MockLedger {
    /// A healthy node that knows the monitored account and every transaction and block.
    pub fn healthy() -> Self {
        Self {
            version: Lookup::Found("2.3.12".to_string()),
            account: Lookup::Found(system_account(1_000_000)),
            transaction: Lookup::Found(sample_transaction(42)),
            block: Lookup::Found(sample_block(42)),
            transaction_calls: AtomicUsize::new(0),
            block_calls: AtomicUsize::new(0),
            requested_slots: Mutex::new(Vec::new()),
        }
    }

    pub fn transaction_calls(&self) -> usize {
        self.transaction_calls.load(Ordering::SeqCst)
    }

    pub fn block_calls(&self) -> usize {
        self.block_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LedgerClient for MockLedger {
    async fn get_version(&self) -> Result<RpcVersionInfo, ClientError> {
        let solana_core = self.version.resolve("version")?.unwrap_or_default();
        Ok(RpcVersionInfo {
            solana_core,
            feature_set: Some(1),
        })
    }

    async fn get_account(&self, _address: &Pubkey) -> Result<Option<Account>, ClientError> {
        self.account.resolve("account")
    }

    async fn get_parsed_transaction(
        &self,
        _signature: &Signature,
    ) -> Result<Option<EncodedConfirmedTransactionWithStatusMeta>, ClientError> {
        self.transaction_calls.fetch_add(1, Ordering::SeqCst);
        self.transaction.resolve_with("transaction", reparse)
    }

    async fn get_block(&self, slot: Slot) -> Result<Option<UiConfirmedBlock>, ClientError> {
        self.block_calls.fetch_add(1, Ordering::SeqCst);
        self.requested_slots.lock().unwrap().push(slot);
        self.block.resolve("block")
    }
}

/// Collects appended lines in memory.
#[derive(Default)]
pub struct MemoryStore {
    lines: Mutex<Vec<String>>,
}

impl MemoryStore {
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }

    pub fn lines_with_prefix(&self, prefix: &str) -> Vec<String> {
        self.lines()
            .into_iter()
            .filter(|line| line.starts_with(prefix))
            .collect()
    }

    /// Polls until at least `count` lines were appended.
    pub async fn wait_for(&self, count: usize) -> Vec<String> {
        tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                let lines = self.lines();
                if lines.len() >= count {
                    return lines;
                }
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("timed out waiting for records")
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn append_line(&self, line: &str) -> anyhow::Result<()> {
        self.lines.lock().unwrap().push(line.to_string());
        Ok(())
    }
}

/// A store whose every write fails.
#[derive(Default)]
pub struct FailingStore {
    pub attempts: AtomicUsize,
}

#[async_trait]
impl RecordStore for FailingStore {
    async fn append_line(&self, _line: &str) -> anyhow::Result<()> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(anyhow::anyhow!("disk full"))
    }
}

/// Test-controlled push channels. Each receiver can be taken once.
pub struct MockStreams {
    account_rx: Mutex<Option<mpsc::Receiver<AccountSnapshot>>>,
    logs_rx: Mutex<Option<mpsc::Receiver<LogEvent>>>,
    slot_rx: Mutex<Option<mpsc::Receiver<SlotTransition>>>,
    pub refuse_logs: bool,
    pub subscribed: Mutex<Vec<(&'static str, Option<Pubkey>)>>,
}

pub struct StreamSenders {
    pub account: mpsc::Sender<AccountSnapshot>,
    pub logs: mpsc::Sender<LogEvent>,
    pub slot: mpsc::Sender<SlotTransition>,
}

impl MockStreams {
    pub fn new() -> (Self, StreamSenders) {
        let (account, account_rx) = mpsc::channel(16);
        let (logs, logs_rx) = mpsc::channel(16);
        let (slot, slot_rx) = mpsc::channel(16);
        let streams = Self {
            account_rx: Mutex::new(Some(account_rx)),
            logs_rx: Mutex::new(Some(logs_rx)),
            slot_rx: Mutex::new(Some(slot_rx)),
            refuse_logs: false,
            subscribed: Mutex::new(Vec::new()),
        };
        (streams, StreamSenders { account, logs, slot })
    }

    fn take<T>(
        &self,
        stream: &'static str,
        slot: &Mutex<Option<mpsc::Receiver<T>>>,
        scope: Option<Pubkey>,
    ) -> Result<mpsc::Receiver<T>, StreamError> {
        self.subscribed.lock().unwrap().push((stream, scope));
        slot.lock().unwrap().take().ok_or(StreamError::Subscribe {
            stream,
            reason: "already subscribed".to_string(),
        })
    }
}

#[async_trait]
impl LedgerStreams for MockStreams {
    async fn account_changes(
        &self,
        address: Pubkey,
        _commitment: CommitmentConfig,
    ) -> Result<mpsc::Receiver<AccountSnapshot>, StreamError> {
        self.take("account", &self.account_rx, Some(address))
    }

    async fn logs(
        &self,
        address: Pubkey,
        _commitment: CommitmentConfig,
    ) -> Result<mpsc::Receiver<LogEvent>, StreamError> {
        if self.refuse_logs {
            return Err(StreamError::Subscribe {
                stream: "logs",
                reason: "method not found".to_string(),
            });
        }
        self.take("logs", &self.logs_rx, Some(address))
    }

    async fn slot_changes(&self) -> Result<mpsc::Receiver<SlotTransition>, StreamError> {
        self.take("slot", &self.slot_rx, None)
    }
}

pub fn system_account(lamports: u64) -> Account {
    Account {
        lamports,
        data: Vec::new(),
        owner: solana_sdk::system_program::id(),
        executable: false,
        rent_epoch: 300,
    }
}

/// The wire form of a transaction as returned by `getTransaction`.
pub fn transaction_json(slot: Slot) -> Value {
    json!({
        "slot": slot,
        "transaction": ["AQID", "base64"],
        "meta": null,
        "blockTime": 1_700_000_000
    })
}

pub fn sample_transaction(slot: Slot) -> EncodedConfirmedTransactionWithStatusMeta {
    serde_json::from_value(transaction_json(slot)).expect("valid transaction fixture")
}

/// The wire form of a block as returned by `getBlock`.
pub fn block_json(slot: Slot) -> Value {
    json!({
        "previousBlockhash": "11111111111111111111111111111111",
        "blockhash": "4sGjMW1sUnHzSxGspuhpqLDx6wiyjNtZAMdL4VZHirAn",
        "parentSlot": slot.saturating_sub(1),
        "blockTime": 1_700_000_000,
        "blockHeight": slot
    })
}

pub fn sample_block(slot: Slot) -> UiConfirmedBlock {
    serde_json::from_value(block_json(slot)).expect("valid block fixture")
}

pub fn log_event(signature: &str, slot: Slot) -> LogEvent {
    LogEvent {
        signature: signature.to_string(),
        err: None,
        logs: vec![
            "Program 11111111111111111111111111111111 invoke [1]".to_string(),
            "Program 11111111111111111111111111111111 success".to_string(),
        ],
        slot,
    }
}

/// A syntactically valid transaction signature.
pub fn valid_signature() -> String {
    Signature::from([7u8; 64]).to_string()
}
