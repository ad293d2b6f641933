use std::path::Path;

use rusqlite::{Connection, params};
use rust_decimal::Decimal;
use tracing::info;

use crate::core::{ImportError, PriceAction, PriceChange};

use super::{decimal_from_row, decimal_to_sql};

/// One audited retail-price decision, as stored in the local log.
#[derive(Debug, Clone, PartialEq)]
pub struct AuditRecord {
    pub document_id: Option<i64>,
    pub article_code: String,
    /// Price the engine computed for this line.
    pub computed_price: Decimal,
    /// Previous consumer price on record.
    pub old_price: Decimal,
    /// Consumer price actually written.
    pub new_price: Decimal,
    /// Previous purchase price on record.
    pub old_purchase: Option<Decimal>,
    /// Purchase price on the incoming invoice.
    pub new_purchase: Decimal,
    pub quantity: Decimal,
    pub action: PriceAction,
}

/// The price-change audit log.
///
/// Holds its own connection to a fixed local database, independent of the
/// schema the documents target, and commits outside the reconcile
/// transaction — a rolled-back import may still leave audit rows behind,
/// which is preferred over losing the audit trail.
pub struct AuditStore {
    conn: Connection,
}

impl AuditStore {
    /// Open (or create) the audit log at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ImportError> {
        let conn = Connection::open(path.as_ref())?;
        let store = Self { conn };
        store.init()?;
        info!(path = %path.as_ref().display(), "audit store opened");
        Ok(store)
    }

    /// In-memory audit log (tests).
    pub fn open_in_memory() -> Result<Self, ImportError> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.init()?;
        Ok(store)
    }

    fn init(&self) -> Result<(), ImportError> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS price_change_log (
                id             INTEGER PRIMARY KEY AUTOINCREMENT,
                ts             TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
                document_id    INTEGER,
                article_code   TEXT NOT NULL,
                computed_price TEXT NOT NULL,
                old_price      TEXT NOT NULL,
                new_price      TEXT NOT NULL,
                old_purchase   TEXT,
                new_purchase   TEXT NOT NULL,
                quantity       TEXT NOT NULL,
                action_tag     TEXT NOT NULL
            )",
            [],
        )?;
        Ok(())
    }

    /// Append one record.
    pub fn record(&self, record: &AuditRecord) -> Result<(), ImportError> {
        self.conn.execute(
            "INSERT INTO price_change_log
               (document_id, article_code, computed_price, old_price, new_price,
                old_purchase, new_purchase, quantity, action_tag)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                record.document_id,
                record.article_code,
                decimal_to_sql(record.computed_price),
                decimal_to_sql(record.old_price),
                decimal_to_sql(record.new_price),
                record.old_purchase.map(decimal_to_sql),
                decimal_to_sql(record.new_purchase),
                decimal_to_sql(record.quantity),
                record.action.tag(),
            ],
        )?;
        info!(
            article = %record.article_code,
            action = record.action.tag(),
            old = %record.old_price,
            new = %record.new_price,
            "price change audited"
        );
        Ok(())
    }

    /// All audited price changes, oldest first. Mostly for reporting and
    /// tests.
    pub fn changes(&self) -> Result<Vec<PriceChange>, ImportError> {
        let mut stmt = self.conn.prepare(
            "SELECT article_code, old_price, new_price, quantity
             FROM price_change_log ORDER BY id",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(PriceChange {
                article_code: row.get(0)?,
                old_price: decimal_from_row(row, 1)?,
                new_price: decimal_from_row(row, 2)?,
                quantity: decimal_from_row(row, 3)?,
            })
        })?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }
}
