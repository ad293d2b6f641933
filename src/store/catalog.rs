use rusqlite::{Connection, OptionalExtension, params};
use rust_decimal::Decimal;
use tracing::info;

use crate::core::CatalogArticle;

use super::{decimal_from_row, decimal_to_sql};

/// A resolved catalog identity: internal code and display name.
pub(crate) type CodeName = (String, String);

/// The most recent purchase record for an article, as read back from the
/// stored invoice lines. Drives the price preservation policy.
#[derive(Debug, Clone, PartialEq)]
pub struct PriorPurchase {
    pub margin_pct: Decimal,
    pub consumer_price: Decimal,
    pub purchase_price: Decimal,
}

/// Exact primary-barcode match.
pub(crate) fn find_by_barcode(
    conn: &Connection,
    prefix: &str,
    barcode: &str,
) -> rusqlite::Result<Option<CodeName>> {
    conn.query_row(
        &format!("SELECT code, name FROM {prefix}catalog_article WHERE barcode = ?1 LIMIT 1"),
        [barcode],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )
    .optional()
}

/// Primary-barcode match ignoring leading zeros on both sides — EAN-13 vs
/// EAN-8 padding mismatches.
pub(crate) fn find_by_barcode_zeros_stripped(
    conn: &Connection,
    prefix: &str,
    barcode: &str,
) -> rusqlite::Result<Option<CodeName>> {
    conn.query_row(
        &format!(
            "SELECT code, name FROM {prefix}catalog_article
             WHERE LTRIM(barcode, '0') = ?1 LIMIT 1"
        ),
        [barcode],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )
    .optional()
}

/// Alternate-barcode match through the alias table.
pub(crate) fn find_by_alias(
    conn: &Connection,
    prefix: &str,
    barcode: &str,
) -> rusqlite::Result<Option<CodeName>> {
    conn.query_row(
        &format!(
            "SELECT aa.code, ca.name
             FROM {prefix}article_alias aa
             JOIN {prefix}catalog_article ca ON ca.code = aa.code
             WHERE aa.alt_barcode = ?1 LIMIT 1"
        ),
        [barcode],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )
    .optional()
}

/// Direct internal-code match (supplier sifra fallback).
pub(crate) fn find_by_code(
    conn: &Connection,
    prefix: &str,
    code: &str,
) -> rusqlite::Result<Option<CodeName>> {
    conn.query_row(
        &format!("SELECT code, name FROM {prefix}catalog_article WHERE code = ?1 LIMIT 1"),
        [code],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )
    .optional()
}

/// Candidate articles whose name contains `token` (case-insensitive), for
/// the fuzzy scorer to rank. The LIKE prefilter keeps the candidate set
/// small; the actual match decision happens in `matching`.
pub(crate) fn candidates_by_name_token(
    conn: &Connection,
    prefix: &str,
    token: &str,
) -> rusqlite::Result<Vec<CodeName>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT code, name FROM {prefix}catalog_article
         WHERE UPPER(name) LIKE '%' || UPPER(?1) || '%'
         ORDER BY code"
    ))?;
    let rows = stmt.query_map([token], |row| Ok((row.get(0)?, row.get(1)?)))?;
    rows.collect()
}

/// Highest numeric article code, for allocating the next one.
pub(crate) fn max_numeric_code(conn: &Connection, prefix: &str) -> rusqlite::Result<Option<i64>> {
    conn.query_row(
        &format!(
            "SELECT MAX(CAST(code AS INTEGER)) FROM {prefix}catalog_article
             WHERE code GLOB '[0-9]*' AND code NOT GLOB '*[^0-9]*'"
        ),
        [],
        |row| row.get(0),
    )
}

/// Insert a freshly created article.
pub(crate) fn insert_article(
    conn: &Connection,
    prefix: &str,
    article: &CatalogArticle,
) -> rusqlite::Result<()> {
    conn.execute(
        &format!(
            "INSERT INTO {prefix}catalog_article
               (code, name, unit, kind, vat_class, barcode, note, pack_size, min_stock, margin_pct)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)"
        ),
        params![
            article.code,
            article.name,
            article.unit,
            article.kind,
            article.vat_class.code(),
            article.barcode,
            article.note,
            decimal_to_sql(article.pack_size),
            decimal_to_sql(article.min_stock),
            article.margin_pct.map(decimal_to_sql),
        ],
    )?;
    info!(code = %article.code, name = %article.name, "article auto-registered");
    Ok(())
}

/// Record an additional barcode for an existing article. Ignored when the
/// pair already exists.
pub(crate) fn insert_alias(
    conn: &Connection,
    prefix: &str,
    code: &str,
    alt_barcode: &str,
) -> rusqlite::Result<()> {
    conn.execute(
        &format!(
            "INSERT OR IGNORE INTO {prefix}article_alias (code, alt_barcode) VALUES (?1, ?2)"
        ),
        params![code, alt_barcode],
    )?;
    info!(code = %code, barcode = %alt_barcode, "alias barcode recorded");
    Ok(())
}

/// Most recent stored line for an article carrying a positive margin —
/// the prior purchase/consumer price pair the preservation policy keys on.
pub(crate) fn last_purchase(
    conn: &Connection,
    prefix: &str,
    article_code: &str,
) -> rusqlite::Result<Option<PriorPurchase>> {
    conn.query_row(
        &format!(
            "SELECT margin_pct, consumer_price_incl_vat, purchase_price
             FROM {prefix}invoice_line
             WHERE article_code = ?1 AND CAST(margin_pct AS REAL) > 0
             ORDER BY id DESC LIMIT 1"
        ),
        [article_code],
        |row| {
            Ok(PriorPurchase {
                margin_pct: decimal_from_row(row, 0)?,
                consumer_price: decimal_from_row(row, 1)?,
                purchase_price: decimal_from_row(row, 2)?,
            })
        },
    )
    .optional()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::VatClass;
    use crate::store::Store;
    use rust_decimal_macros::dec;

    fn article(code: &str, name: &str, barcode: Option<&str>) -> CatalogArticle {
        CatalogArticle {
            code: code.to_string(),
            name: name.to_string(),
            unit: "KOM".to_string(),
            kind: "LEK".to_string(),
            vat_class: VatClass::Opo,
            barcode: barcode.map(String::from),
            note: None,
            pack_size: dec!(1),
            min_stock: dec!(10),
            margin_pct: Some(dec!(25)),
        }
    }

    #[test]
    fn barcode_lookup_and_zero_stripping() {
        let store = Store::open_in_memory().unwrap();
        let conn = store.conn();
        insert_article(conn, "main.", &article("100", "BRUFEN 400MG", Some("0008600097012345")))
            .unwrap();

        assert!(find_by_barcode(conn, "main.", "0008600097012345").unwrap().is_some());
        assert!(find_by_barcode(conn, "main.", "8600097012345").unwrap().is_none());
        let hit = find_by_barcode_zeros_stripped(conn, "main.", "8600097012345").unwrap();
        assert_eq!(hit.unwrap().0, "100");
    }

    #[test]
    fn alias_lookup() {
        let store = Store::open_in_memory().unwrap();
        let conn = store.conn();
        insert_article(conn, "main.", &article("100", "BRUFEN 400MG", Some("111"))).unwrap();
        insert_alias(conn, "main.", "100", "222").unwrap();
        // duplicate insert is a no-op
        insert_alias(conn, "main.", "100", "222").unwrap();

        let hit = find_by_alias(conn, "main.", "222").unwrap().unwrap();
        assert_eq!(hit, ("100".to_string(), "BRUFEN 400MG".to_string()));
        assert!(find_by_alias(conn, "main.", "333").unwrap().is_none());
    }

    #[test]
    fn max_numeric_code_skips_non_numeric() {
        let store = Store::open_in_memory().unwrap();
        let conn = store.conn();
        assert_eq!(max_numeric_code(conn, "main.").unwrap(), None);

        insert_article(conn, "main.", &article("2300000005", "A", None)).unwrap();
        insert_article(conn, "main.", &article("2300000011", "B", None)).unwrap();
        insert_article(conn, "main.", &article("LEGACY-7", "C", None)).unwrap();
        assert_eq!(max_numeric_code(conn, "main.").unwrap(), Some(2300000011));
    }

    #[test]
    fn name_token_candidates() {
        let store = Store::open_in_memory().unwrap();
        let conn = store.conn();
        insert_article(conn, "main.", &article("1", "BRUFEN 400MG TABLET", None)).unwrap();
        insert_article(conn, "main.", &article("2", "ASPIRIN 500MG", None)).unwrap();

        let hits = candidates_by_name_token(conn, "main.", "brufen").unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].0, "1");
    }
}
