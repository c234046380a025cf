//! Relational persistence for parsed trade alerts.
//!
//! This crate handles:
//! - SQLite schema for accounts, instruments, contracts and trades
//! - Asset class inference from symbols
//! - Idempotent trade upserts keyed by broker id or content hash
//! - Batched CSV ingest with per-row error collection

pub mod ingest;
pub mod models;
pub mod schema;
pub mod store;

pub use ingest::{IngestError, IngestReport};
pub use models::{AssetClass, ContractKey, TradeEntry, UpsertResult};
pub use store::Store;
