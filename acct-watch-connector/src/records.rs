//! # Observation Records
//!
//! The domain types produced by the subscriptions and the tagged [`LogRecord`]
//! that is written to disk, one line per record.
//!
//! A line is `<prefix> <json-body>` where the prefix identifies the record kind
//! (see [`RecordKind`]) and the body carries the record's fields plus a `time`
//! field stamped when the line is rendered.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Serialize, Serializer};
use solana_account_decoder::{UiAccount, UiAccountData, UiAccountEncoding};
use solana_client::rpc_response::{Response, RpcLogsResponse, SlotInfo};
use solana_sdk::{account::Account, clock::Slot, pubkey::Pubkey};
use solana_transaction_status::{EncodedConfirmedTransactionWithStatusMeta, UiConfirmedBlock};
use std::fmt::Display;

/// The state of the monitored account as pushed by an account-change notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountSnapshot {
    pub executable: bool,
    #[serde(serialize_with = "collect_display")]
    pub owner: Pubkey,
    pub lamports: u64,
    #[serde(serialize_with = "encode_base64")]
    pub data: Vec<u8>,
    pub rent_epoch: u64,
}

/// Log lines of one transaction that mentioned the monitored account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogEvent {
    pub signature: String,
    pub err: Option<String>,
    pub logs: Vec<String>,
    /// The context slot the notification was emitted at.
    pub slot: Slot,
}

/// A slot advance observed on the node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SlotTransition {
    pub slot: Slot,
    pub parent: Slot,
    pub root: Slot,
}

/// The reasons an account notification cannot be turned into a snapshot.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("unsupported account data encoding: {0:?}")]
    UnsupportedEncoding(UiAccountEncoding),
    #[error("account data is not binary")]
    NotBinary,
    #[error("invalid base64 account data: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("invalid owner address: {0}")]
    Owner(#[from] solana_sdk::pubkey::ParsePubkeyError),
}

impl From<Account> for AccountSnapshot {
    fn from(account: Account) -> Self {
        Self {
            executable: account.executable,
            owner: account.owner,
            lamports: account.lamports,
            data: account.data,
            rent_epoch: account.rent_epoch,
        }
    }
}

impl TryFrom<UiAccount> for AccountSnapshot {
    type Error = SnapshotError;

    fn try_from(account: UiAccount) -> Result<Self, Self::Error> {
        let data = match account.data {
            UiAccountData::Binary(blob, UiAccountEncoding::Base64) => BASE64.decode(blob)?,
            UiAccountData::Binary(_, encoding) => {
                return Err(SnapshotError::UnsupportedEncoding(encoding))
            }
            _ => return Err(SnapshotError::NotBinary),
        };
        Ok(Self {
            executable: account.executable,
            owner: account.owner.parse()?,
            lamports: account.lamports,
            data,
            rent_epoch: account.rent_epoch,
        })
    }
}

impl From<Response<RpcLogsResponse>> for LogEvent {
    fn from(msg: Response<RpcLogsResponse>) -> Self {
        let Response { context, value } = msg;
        Self {
            signature: value.signature,
            err: value.err.map(|e| e.to_string()),
            logs: value.logs,
            slot: context.slot,
        }
    }
}

impl From<SlotInfo> for SlotTransition {
    fn from(info: SlotInfo) -> Self {
        Self {
            slot: info.slot,
            parent: info.parent,
            root: info.root,
        }
    }
}

/// The kind of a record, recoverable from the line prefix alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    AccountChange,
    Logs,
    Transaction,
    Block,
    SlotChange,
}

impl RecordKind {
    pub const ALL: [RecordKind; 5] = [
        RecordKind::AccountChange,
        RecordKind::Logs,
        RecordKind::Transaction,
        RecordKind::Block,
        RecordKind::SlotChange,
    ];

    pub fn prefix(self) -> &'static str {
        match self {
            RecordKind::AccountChange => "acctChange:",
            RecordKind::Logs => "log:",
            RecordKind::Transaction => "transaction:",
            RecordKind::Block => "block:",
            RecordKind::SlotChange => "slot change:",
        }
    }

    /// Classifies a line written by [`LogRecord::render`] without parsing its body.
    pub fn from_line(line: &str) -> Option<RecordKind> {
        Self::ALL
            .into_iter()
            .find(|kind| line.starts_with(kind.prefix()))
    }

    /// Returns the JSON body of a line of this kind, if the line carries this prefix.
    pub fn body_of(self, line: &str) -> Option<&str> {
        line.strip_prefix(self.prefix()).map(str::trim)
    }
}

/// One unit of the append-only log.
#[derive(Debug)]
pub enum LogRecord {
    AccountChange(AccountSnapshot),
    Logs(LogEvent),
    Transaction(Box<EncodedConfirmedTransactionWithStatusMeta>),
    Block(Box<UiConfirmedBlock>),
    SlotChange(SlotTransition),
}

/// A record body with the observation time appended as a trailing `time` field.
#[derive(Serialize)]
struct Stamped<'a, T: Serialize> {
    #[serde(flatten)]
    body: &'a T,
    time: &'a str,
}

impl LogRecord {
    pub fn kind(&self) -> RecordKind {
        match self {
            LogRecord::AccountChange(_) => RecordKind::AccountChange,
            LogRecord::Logs(_) => RecordKind::Logs,
            LogRecord::Transaction(_) => RecordKind::Transaction,
            LogRecord::Block(_) => RecordKind::Block,
            LogRecord::SlotChange(_) => RecordKind::SlotChange,
        }
    }

    /// Renders the record as a single newline-terminated line stamped with `observed_at`.
    pub fn render(&self, observed_at: DateTime<Utc>) -> serde_json::Result<String> {
        let time = observed_at.to_rfc3339_opts(SecondsFormat::Millis, true);
        let body = match self {
            LogRecord::AccountChange(snapshot) => stamp(snapshot, &time),
            LogRecord::Logs(event) => stamp(event, &time),
            LogRecord::Transaction(tx) => stamp(tx.as_ref(), &time),
            LogRecord::Block(block) => stamp(block.as_ref(), &time),
            LogRecord::SlotChange(transition) => stamp(transition, &time),
        }?;
        Ok(format!("{} {}\n", self.kind().prefix(), body))
    }
}

fn stamp<T: Serialize>(body: &T, time: &str) -> serde_json::Result<String> {
    serde_json::to_string(&Stamped { body, time })
}

fn collect_display<T: Display, S: Serializer>(value: &T, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}

fn encode_base64<S: Serializer>(data: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&BASE64.encode(data))
}
