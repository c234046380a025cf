//! SQLite-backed trade store.
//!
//! Repository functions take a plain [`Connection`] so they run unchanged
//! inside a transaction or savepoint (both deref to `Connection`).

use crate::models::{decimal_text, AssetClass, ContractKey, TradeEntry, UpsertResult};
use crate::schema::SCHEMA;
use alert_core::{Error, Result};
use rusqlite::{params, Connection, OptionalExtension, ToSql};
use std::path::Path;
use tracing::debug;

pub(crate) fn db_error(e: rusqlite::Error) -> Error {
    Error::database(e.to_string())
}

/// Get or create an account by broker code.
pub fn upsert_account(conn: &Connection, broker_code: &str) -> Result<i64> {
    conn.execute(
        "INSERT INTO accounts(broker_code) VALUES (?1) ON CONFLICT(broker_code) DO NOTHING",
        params![broker_code],
    )
    .map_err(db_error)?;
    conn.query_row(
        "SELECT account_id FROM accounts WHERE broker_code = ?1",
        params![broker_code],
        |row| row.get(0),
    )
    .map_err(db_error)
}

/// Get or create an instrument by (symbol, asset class).
pub fn find_or_create_instrument(
    conn: &Connection,
    symbol: &str,
    asset_class: AssetClass,
) -> Result<i64> {
    conn.execute(
        "INSERT INTO instruments(symbol, asset_class) VALUES (?1, ?2)
         ON CONFLICT(symbol, asset_class) DO NOTHING",
        params![symbol, asset_class.as_str()],
    )
    .map_err(db_error)?;
    conn.query_row(
        "SELECT instrument_id FROM instruments WHERE symbol = ?1 AND asset_class = ?2",
        params![symbol, asset_class.as_str()],
        |row| row.get(0),
    )
    .map_err(db_error)
}

/// Get or create a contract by its full identity.
///
/// SQLite treats NULLs as distinct in unique constraints, so lookup uses
/// `IS` comparisons before inserting.
pub fn find_or_create_contract(conn: &Connection, key: &ContractKey) -> Result<i64> {
    let option_type = key.option_type.map(|t| t.as_str());
    let expiry = key.expiry_date.map(|d| d.format("%Y-%m-%d").to_string());
    let strike = key.strike.map(decimal_text);
    let values: [&dyn ToSql; 7] = [
        &key.instrument_id,
        &key.is_option,
        &option_type,
        &expiry,
        &strike,
        &key.root,
        &key.multiplier,
    ];

    let existing: Option<i64> = conn
        .query_row(
            "SELECT contract_id FROM contracts
             WHERE instrument_id = ?1 AND is_option = ?2 AND option_type IS ?3
               AND expiry_date IS ?4 AND strike IS ?5 AND root IS ?6 AND multiplier IS ?7",
            &values[..],
            |row| row.get(0),
        )
        .optional()
        .map_err(db_error)?;
    if let Some(id) = existing {
        return Ok(id);
    }

    conn.execute(
        "INSERT INTO contracts(instrument_id, is_option, option_type, expiry_date, strike, root, multiplier)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        &values[..],
    )
    .map_err(db_error)?;
    Ok(conn.last_insert_rowid())
}

/// Insert or update a trade.
///
/// The key is the broker trade id when present, otherwise the content hash.
pub fn upsert_trade(
    conn: &Connection,
    entry: &TradeEntry,
    account_id: i64,
    contract_id: i64,
) -> Result<UpsertResult> {
    let (trade_hash, lookup_sql, key) = match &entry.broker_trade_id {
        Some(id) => (
            None,
            "SELECT trade_id FROM trades WHERE broker_trade_id = ?1",
            id.clone(),
        ),
        None => {
            let hash = entry.trade_hash(account_id, contract_id);
            (
                Some(hash.clone()),
                "SELECT trade_id FROM trades WHERE trade_hash = ?1",
                hash,
            )
        }
    };

    let existing: Option<i64> = conn
        .query_row(lookup_sql, params![key], |row| row.get(0))
        .optional()
        .map_err(db_error)?;

    let price = decimal_text(entry.price);
    let dt = entry.dt_text();
    let qty = i64::try_from(entry.qty)
        .map_err(|_| Error::data(format!("quantity {} out of range", entry.qty)))?;

    match existing {
        Some(trade_id) => {
            conn.execute(
                "UPDATE trades SET account_id = ?1, contract_id = ?2, side = ?3, qty = ?4,
                     price = ?5, dt = ?6, message_id = ?7, subject = ?8
                 WHERE trade_id = ?9",
                params![
                    account_id,
                    contract_id,
                    entry.side.order_side(),
                    qty,
                    price,
                    dt,
                    entry.message_id,
                    entry.subject,
                    trade_id
                ],
            )
            .map_err(db_error)?;
            Ok(UpsertResult::Updated(trade_id))
        }
        None => {
            conn.execute(
                "INSERT INTO trades(broker_trade_id, trade_hash, account_id, contract_id, side, qty,
                     price, dt, message_id, subject)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                params![
                    entry.broker_trade_id,
                    trade_hash,
                    account_id,
                    contract_id,
                    entry.side.order_side(),
                    qty,
                    price,
                    dt,
                    entry.message_id,
                    entry.subject
                ],
            )
            .map_err(db_error)?;
            Ok(UpsertResult::Created(conn.last_insert_rowid()))
        }
    }
}

/// Resolve account, instrument and contract for `entry`, then upsert it.
pub fn record_trade(conn: &Connection, entry: &TradeEntry) -> Result<UpsertResult> {
    if entry.account.trim().is_empty() {
        return Err(Error::data("missing account"));
    }
    if entry.symbol.trim().is_empty() {
        return Err(Error::data("missing symbol"));
    }

    let account_id = upsert_account(conn, &entry.account)?;
    let instrument_id = find_or_create_instrument(conn, &entry.symbol, entry.asset_class())?;
    let key = ContractKey {
        instrument_id,
        is_option: entry.is_option,
        option_type: entry.option_type.filter(|_| entry.is_option),
        expiry_date: entry.expiry_date.filter(|_| entry.is_option),
        strike: entry.strike.filter(|_| entry.is_option),
        root: entry.root.clone(),
        multiplier: entry.multiplier.clone(),
    };
    let contract_id = find_or_create_contract(conn, &key)?;

    let result = upsert_trade(conn, entry, account_id, contract_id)?;
    debug!(
        trade_id = result.trade_id(),
        created = result.is_created(),
        symbol = %entry.symbol,
        "stored trade"
    );
    Ok(result)
}

/// Owned SQLite connection with the schema applied.
pub struct Store {
    conn: Connection,
}

impl Store {
    /// Open (or create) a database file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path.as_ref()).map_err(db_error)?;
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(db_error)?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA).map_err(db_error)?;
        Ok(Self { conn })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub(crate) fn connection_mut(&mut self) -> &mut Connection {
        &mut self.conn
    }

    /// Store one trade in its own transaction.
    pub fn record_trade(&mut self, entry: &TradeEntry) -> Result<UpsertResult> {
        let tx = self.conn.transaction().map_err(db_error)?;
        let result = record_trade(&tx, entry)?;
        tx.commit().map_err(db_error)?;
        Ok(result)
    }

    /// Row count of one of the store tables.
    pub fn count(&self, table: &str) -> Result<u64> {
        if !["accounts", "instruments", "contracts", "trades"].contains(&table) {
            return Err(Error::data(format!("unknown table {table:?}")));
        }
        let n: i64 = self
            .conn
            .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))
            .map_err(db_error)?;
        Ok(n as u64)
    }
}
