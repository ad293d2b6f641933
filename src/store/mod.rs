//! SQLite-backed relational store.
//!
//! One [`Store`] wraps the connection holding the catalog and the posted
//! documents. Every query is schema-qualified through
//! [`crate::core::SchemaTarget::prefix`], so the same SQL runs against the
//! local schema (`main.`) or an attached production store (`remote.`) —
//! the reconciler's safety gate decides which of those may be written.
//!
//! The price-change audit log lives in a separate [`AuditStore`] with its
//! own connection: audit rows always land locally, outside the document
//! transaction, regardless of where the document itself is written.

pub(crate) mod catalog;
pub(crate) mod documents;

mod audit;
mod schema;

pub use audit::{AuditRecord, AuditStore};
pub use catalog::PriorPurchase;

use std::path::Path;

use chrono::NaiveDate;
use rusqlite::Connection;
use rusqlite::types::Type;
use rust_decimal::Decimal;
use std::str::FromStr;
use tracing::info;

use crate::core::ImportError;

/// The catalog + document store.
pub struct Store {
    conn: Connection,
}

impl Store {
    /// Open (or create) a store at `path` and ensure the local schema.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ImportError> {
        let conn = Connection::open(path.as_ref())?;
        let store = Self { conn };
        store.init_schema("main.")?;
        info!(path = %path.as_ref().display(), "store opened");
        Ok(store)
    }

    /// Open an in-memory store with the local schema (tests, dry runs).
    pub fn open_in_memory() -> Result<Self, ImportError> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.init_schema("main.")?;
        Ok(store)
    }

    /// Attach a production store under the `remote` schema alias.
    /// Pass `None` to attach a fresh in-memory database (tests).
    pub fn attach_remote(&self, path: Option<&Path>) -> Result<(), ImportError> {
        let target = path
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| ":memory:".to_string());
        self.conn
            .execute("ATTACH DATABASE ?1 AS remote", [&target])?;
        self.init_schema("remote.")?;
        info!(target = %target, "remote store attached");
        Ok(())
    }

    /// Create all tables under a schema prefix if they do not exist yet.
    pub fn init_schema(&self, prefix: &str) -> Result<(), ImportError> {
        schema::create_all(&self.conn, prefix)?;
        Ok(())
    }

    /// Borrow the underlying connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Mutable borrow, needed to open a transaction.
    pub fn conn_mut(&mut self) -> &mut Connection {
        &mut self.conn
    }
}

// Monetary columns are stored as TEXT so decimal values survive the round
// trip exactly; comparisons in SQL go through CAST.

pub(crate) fn decimal_to_sql(value: Decimal) -> String {
    value.to_string()
}

pub(crate) fn decimal_from_row(
    row: &rusqlite::Row<'_>,
    idx: usize,
) -> rusqlite::Result<Decimal> {
    let text: String = row.get(idx)?;
    Decimal::from_str(&text)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

pub(crate) fn date_to_sql(value: Option<NaiveDate>) -> Option<String> {
    value.map(|d| d.format("%Y-%m-%d").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn open_in_memory_creates_schema() {
        let store = Store::open_in_memory().unwrap();
        let count: i64 = store
            .conn()
            .query_row("SELECT COUNT(*) FROM main.catalog_article", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn attach_remote_creates_remote_schema() {
        let store = Store::open_in_memory().unwrap();
        store.attach_remote(None).unwrap();
        let count: i64 = store
            .conn()
            .query_row("SELECT COUNT(*) FROM remote.invoice_header", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn decimal_round_trip() {
        let store = Store::open_in_memory().unwrap();
        store
            .conn()
            .execute(
                "INSERT INTO main.catalog_article
                   (code, name, unit, kind, vat_class, pack_size, min_stock, margin_pct)
                 VALUES ('1', 'X', 'KOM', 'LEK', 'OPO', '1', '0', ?1)",
                [decimal_to_sql(dec!(125.04))],
            )
            .unwrap();
        let value = store
            .conn()
            .query_row(
                "SELECT margin_pct FROM main.catalog_article WHERE code='1'",
                [],
                |row| decimal_from_row(row, 0),
            )
            .unwrap();
        assert_eq!(value, dec!(125.04));
    }
}
