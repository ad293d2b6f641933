use chrono::NaiveDate;
use rusqlite::{Connection, OptionalExtension, params};
use rust_decimal::Decimal;

use crate::core::{ImportConfig, InvoiceHeader, numbering};

use super::{date_to_sql, decimal_to_sql};

/// An existing document header, keyed by the invoice natural key.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct HeaderRow {
    pub id: i64,
    pub document_number: String,
}

/// One fully priced line ready to be written.
#[derive(Debug, Clone)]
pub(crate) struct LineRow {
    pub article_code: String,
    pub unit: String,
    pub quantity: Decimal,
    pub purchase_price: Decimal,
    pub discount_pct: Decimal,
    pub overhead: Decimal,
    pub margin_pct: Decimal,
    pub consumer_price_excl_vat: Decimal,
    pub vat_pct: Decimal,
    pub consumer_price_incl_vat: Decimal,
    pub batch: Option<String>,
    pub expiry: Option<NaiveDate>,
}

/// Latest header for this invoice's natural key, if any.
pub(crate) fn find_header(
    conn: &Connection,
    prefix: &str,
    external_invoice_number: &str,
    document_type: &str,
    warehouse: &str,
) -> rusqlite::Result<Option<HeaderRow>> {
    conn.query_row(
        &format!(
            "SELECT id, document_number FROM {prefix}invoice_header
             WHERE external_invoice_number = ?1 AND document_type = ?2 AND warehouse = ?3
             ORDER BY id DESC LIMIT 1"
        ),
        params![external_invoice_number, document_type, warehouse],
        |row| {
            Ok(HeaderRow {
                id: row.get(0)?,
                document_number: row.get(1)?,
            })
        },
    )
    .optional()
}

/// Next free document number for the year of `invoice_date`.
pub(crate) fn next_document_number(
    conn: &Connection,
    prefix: &str,
    invoice_date: NaiveDate,
) -> rusqlite::Result<String> {
    let suffix = numbering::year_suffix(invoice_date);
    let max_in_year: Option<i64> = conn.query_row(
        &format!(
            "SELECT MAX(CAST(SUBSTR(document_number, 1, INSTR(document_number, '/') - 1) AS INTEGER))
             FROM {prefix}invoice_header
             WHERE document_number LIKE '%/' || ?1"
        ),
        [&suffix],
        |row| row.get(0),
    )?;
    Ok(numbering::next_document_number(max_in_year, &suffix))
}

/// Fold the payment terms into the header note:
/// `CASH_DISC=… | PAYABLE=… | PAYABLE_UNTIL=…`. Empty terms yield no note.
pub(crate) fn build_note(header: &InvoiceHeader) -> Option<String> {
    let mut parts = Vec::new();
    if header.cash_discount > Decimal::ZERO {
        parts.push(format!("CASH_DISC={:.2}", header.cash_discount));
    }
    if header.payable_amount > Decimal::ZERO {
        parts.push(format!("PAYABLE={:.2}", header.payable_amount));
    }
    if let Some(due) = header.due_date {
        parts.push(format!("PAYABLE_UNTIL={}", due.format("%Y-%m-%d")));
    }
    if parts.is_empty() { None } else { Some(parts.join(" | ")) }
}

/// Insert a new header and return its id.
pub(crate) fn insert_header(
    conn: &Connection,
    prefix: &str,
    cfg: &ImportConfig,
    header: &InvoiceHeader,
    document_number: &str,
    supplier_code: &str,
) -> rusqlite::Result<i64> {
    conn.execute(
        &format!(
            "INSERT INTO {prefix}invoice_header
               (document_number, external_invoice_number, invoice_date, due_date,
                supplier_code, warehouse, document_type, status, note)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)"
        ),
        params![
            document_number,
            header.invoice_number,
            date_to_sql(Some(header.invoice_date)),
            date_to_sql(header.due_date),
            supplier_code,
            cfg.warehouse,
            cfg.document_type,
            "PROKNJIŽEN",
            build_note(header),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Number of lines already attached to a header.
pub(crate) fn line_count(conn: &Connection, prefix: &str, header_id: i64) -> rusqlite::Result<i64> {
    conn.query_row(
        &format!("SELECT COUNT(*) FROM {prefix}invoice_line WHERE header_id = ?1"),
        [header_id],
        |row| row.get(0),
    )
}

/// Append one line row.
pub(crate) fn insert_line(
    conn: &Connection,
    prefix: &str,
    header_id: i64,
    line: &LineRow,
) -> rusqlite::Result<()> {
    conn.execute(
        &format!(
            "INSERT INTO {prefix}invoice_line
               (header_id, article_code, unit, quantity, purchase_price, discount_pct,
                overhead, margin_pct, consumer_price_excl_vat, vat_pct,
                consumer_price_incl_vat, batch, expiry)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)"
        ),
        params![
            header_id,
            line.article_code,
            line.unit,
            decimal_to_sql(line.quantity),
            decimal_to_sql(line.purchase_price),
            decimal_to_sql(line.discount_pct),
            decimal_to_sql(line.overhead),
            decimal_to_sql(line.margin_pct),
            decimal_to_sql(line.consumer_price_excl_vat),
            decimal_to_sql(line.vat_pct),
            decimal_to_sql(line.consumer_price_incl_vat),
            line.batch,
            date_to_sql(line.expiry),
        ],
    )?;
    Ok(())
}

/// Whether a payment-schedule row exists for this document.
pub(crate) fn payment_exists(
    conn: &Connection,
    prefix: &str,
    document_type: &str,
    document_number: &str,
) -> rusqlite::Result<bool> {
    let hit: Option<i64> = conn
        .query_row(
            &format!(
                "SELECT 1 FROM {prefix}payment_schedule
                 WHERE document_type = ?1 AND document_number = ?2 LIMIT 1"
            ),
            params![document_type, document_number],
            |row| row.get(0),
        )
        .optional()?;
    Ok(hit.is_some())
}

/// Insert the payment-schedule row for a document.
pub(crate) fn insert_payment(
    conn: &Connection,
    prefix: &str,
    cfg: &ImportConfig,
    header: &InvoiceHeader,
    document_number: &str,
    amount: Decimal,
) -> rusqlite::Result<()> {
    conn.execute(
        &format!(
            "INSERT INTO {prefix}payment_schedule
               (cash_register_date, amount, due_date, document_type, document_number,
                warehouse, period_id, document_date)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)"
        ),
        params![
            date_to_sql(Some(header.invoice_date)),
            decimal_to_sql(amount),
            date_to_sql(header.due_date),
            cfg.document_type,
            document_number,
            cfg.warehouse,
            cfg.period_id,
            date_to_sql(Some(header.invoice_date)),
        ],
    )?;
    Ok(())
}

/// Fill in a missing due date or amount on an existing payment row —
/// never overwrites a populated value with a blank one.
pub(crate) fn update_payment_missing(
    conn: &Connection,
    prefix: &str,
    cfg: &ImportConfig,
    document_number: &str,
    due_date: Option<NaiveDate>,
    amount: Decimal,
) -> rusqlite::Result<()> {
    conn.execute(
        &format!(
            "UPDATE {prefix}payment_schedule
             SET due_date = COALESCE(?1, due_date),
                 amount = CASE
                     WHEN CAST(COALESCE(amount, '0') AS REAL) = 0
                          AND CAST(?2 AS REAL) > 0 THEN ?2
                     ELSE amount
                 END
             WHERE document_type = ?3 AND document_number = ?4"
        ),
        params![
            date_to_sql(due_date),
            decimal_to_sql(amount),
            cfg.document_type,
            document_number,
        ],
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Store;
    use rust_decimal_macros::dec;

    fn header() -> InvoiceHeader {
        InvoiceHeader {
            supplier_name: "SOPHARMA TRADING D.O.O.".into(),
            invoice_number: "VP-2026-0117".into(),
            invoice_date: NaiveDate::from_ymd_opt(2026, 2, 10).unwrap(),
            net_total: dec!(1250.40),
            currency: "RSD".into(),
            due_date: NaiveDate::from_ymd_opt(2026, 3, 12),
            cash_discount: dec!(12.50),
            payable_amount: dec!(1237.90),
        }
    }

    #[test]
    fn note_assembly() {
        assert_eq!(
            build_note(&header()).unwrap(),
            "CASH_DISC=12.50 | PAYABLE=1237.90 | PAYABLE_UNTIL=2026-03-12"
        );

        let mut bare = header();
        bare.cash_discount = Decimal::ZERO;
        bare.payable_amount = Decimal::ZERO;
        bare.due_date = None;
        assert_eq!(build_note(&bare), None);
    }

    #[test]
    fn document_numbers_count_per_year() {
        let store = Store::open_in_memory().unwrap();
        let conn = store.conn();
        let cfg = ImportConfig::default();
        let date = NaiveDate::from_ymd_opt(2026, 2, 10).unwrap();

        assert_eq!(next_document_number(conn, "main.", date).unwrap(), "1/26");
        insert_header(conn, "main.", &cfg, &header(), "1/26", "15").unwrap();
        assert_eq!(next_document_number(conn, "main.", date).unwrap(), "2/26");

        // other years do not bleed in
        let next_year = NaiveDate::from_ymd_opt(2027, 1, 5).unwrap();
        assert_eq!(next_document_number(conn, "main.", next_year).unwrap(), "1/27");
    }

    #[test]
    fn header_natural_key_lookup() {
        let store = Store::open_in_memory().unwrap();
        let conn = store.conn();
        let cfg = ImportConfig::default();
        let id = insert_header(conn, "main.", &cfg, &header(), "1/26", "15").unwrap();

        let found = find_header(conn, "main.", "VP-2026-0117", "20", "101").unwrap();
        assert_eq!(found.map(|h| h.id), Some(id));
        assert!(find_header(conn, "main.", "VP-2026-0117", "20", "999").unwrap().is_none());
    }

    #[test]
    fn payment_update_never_blanks_populated_values() {
        let store = Store::open_in_memory().unwrap();
        let conn = store.conn();
        let cfg = ImportConfig::default();
        insert_payment(conn, "main.", &cfg, &header(), "1/26", dec!(1237.90)).unwrap();

        // a retry with no due date and zero amount must not erase anything
        update_payment_missing(conn, "main.", &cfg, "1/26", None, Decimal::ZERO).unwrap();
        let (amount, due): (String, Option<String>) = conn
            .query_row(
                "SELECT amount, due_date FROM main.payment_schedule WHERE document_number='1/26'",
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .unwrap();
        assert_eq!(amount, "1237.90");
        assert_eq!(due.as_deref(), Some("2026-03-12"));
    }
}
