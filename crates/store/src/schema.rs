//! SQLite schema.

/// Tables are created if missing; opening an existing database is a no-op.
pub const SCHEMA: &str = r#"
    PRAGMA foreign_keys = ON;

    CREATE TABLE IF NOT EXISTS accounts(
        account_id INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL,
        broker_code TEXT NOT NULL UNIQUE,
        display_name TEXT,
        created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%SZ', 'now'))
    );

    CREATE TABLE IF NOT EXISTS instruments(
        instrument_id INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL,
        symbol TEXT NOT NULL,
        asset_class TEXT NOT NULL CHECK (asset_class IN ('EQUITY', 'ETF', 'INDEX', 'FUTURE')),
        created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%SZ', 'now')),
        UNIQUE(symbol, asset_class)
    );

    CREATE TABLE IF NOT EXISTS contracts(
        contract_id INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL,
        instrument_id INTEGER NOT NULL REFERENCES instruments(instrument_id) ON DELETE RESTRICT,
        is_option BOOLEAN NOT NULL,
        option_type TEXT CHECK (option_type IN ('CALL', 'PUT')),
        expiry_date TEXT,
        strike TEXT,
        root TEXT,
        multiplier TEXT,
        created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%SZ', 'now')),
        UNIQUE(instrument_id, is_option, option_type, expiry_date, strike, root, multiplier)
    );

    CREATE TABLE IF NOT EXISTS trades(
        trade_id INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL,
        broker_trade_id TEXT UNIQUE,
        trade_hash TEXT UNIQUE,
        account_id INTEGER NOT NULL REFERENCES accounts(account_id) ON DELETE RESTRICT,
        contract_id INTEGER NOT NULL REFERENCES contracts(contract_id) ON DELETE RESTRICT,
        side TEXT NOT NULL CHECK (side IN ('BUY', 'SELL')),
        qty INTEGER NOT NULL CHECK (qty > 0),
        price TEXT NOT NULL,
        dt TEXT NOT NULL,
        message_id TEXT,
        subject TEXT,
        created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%SZ', 'now')),
        CHECK (broker_trade_id IS NOT NULL OR trade_hash IS NOT NULL)
    );
    CREATE INDEX IF NOT EXISTS idx_trades_account_dt ON trades(account_id, dt);
    CREATE INDEX IF NOT EXISTS idx_trades_contract ON trades(contract_id);
"#;
