//! A Rust library that watches a single Solana account and keeps an append-only
//! audit log of everything observed about it.
//!
//! # Key Components
//!
//! *   [`bootstrap::Bootstrapper`]: Validates configuration, connects to the node and
//!     verifies that the monitored account exists.
//! *   [`workers::SubscriptionManager`]: Registers the account, logs and slot
//!     subscriptions and runs one worker per subscription.
//! *   [`dispatcher::EventDispatcher`]: Handles each event, enriching log events with
//!     the transaction and block they belong to.
//! *   [`storage::RecordWriter`]: Appends tagged records to the log file.
/// Startup validation and connection.
pub mod bootstrap;
/// The RPC lookups the watcher performs (`LedgerClient`).
pub mod client;
/// Defines configuration structures for the connector.
pub mod config;
/// The per-event handlers.
pub mod dispatcher;
/// Push subscriptions exposed as channels (`LedgerStreams`).
pub mod listener;
/// Domain events and the on-disk record format.
pub mod records;
/// The append-only record writer.
pub mod storage;
/// The subscription manager and its workers.
pub mod workers;
