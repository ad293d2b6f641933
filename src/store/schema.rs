use rusqlite::Connection;

/// Create all tables and indexes under `prefix` if missing.
///
/// Monetary columns are TEXT (exact decimal round trip); dates are TEXT in
/// `YYYY-MM-DD`. The header carries a UNIQUE index on its natural key —
/// one supplier invoice maps to at most one header per document type and
/// warehouse.
pub(crate) fn create_all(conn: &Connection, prefix: &str) -> rusqlite::Result<()> {
    conn.execute_batch(&format!(
        "CREATE TABLE IF NOT EXISTS {p}catalog_article (
            code       TEXT PRIMARY KEY,
            name       TEXT NOT NULL,
            unit       TEXT NOT NULL,
            kind       TEXT NOT NULL,
            vat_class  TEXT NOT NULL,
            barcode    TEXT,
            note       TEXT,
            pack_size  TEXT NOT NULL DEFAULT '1',
            min_stock  TEXT NOT NULL DEFAULT '0',
            margin_pct TEXT
        );
        CREATE INDEX IF NOT EXISTS {i}idx_catalog_article_barcode
            ON catalog_article(barcode);

        CREATE TABLE IF NOT EXISTS {p}article_alias (
            code        TEXT NOT NULL,
            alt_barcode TEXT NOT NULL,
            UNIQUE(code, alt_barcode)
        );
        CREATE INDEX IF NOT EXISTS {i}idx_article_alias_barcode
            ON article_alias(alt_barcode);

        CREATE TABLE IF NOT EXISTS {p}supplier (
            code TEXT PRIMARY KEY,
            name TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS {p}invoice_header (
            id                      INTEGER PRIMARY KEY AUTOINCREMENT,
            document_number         TEXT NOT NULL,
            external_invoice_number TEXT NOT NULL,
            invoice_date            TEXT,
            due_date                TEXT,
            supplier_code           TEXT NOT NULL,
            warehouse               TEXT NOT NULL,
            document_type           TEXT NOT NULL,
            status                  TEXT NOT NULL,
            note                    TEXT
        );
        CREATE UNIQUE INDEX IF NOT EXISTS {i}idx_invoice_header_natural_key
            ON invoice_header(external_invoice_number, document_type, warehouse);

        CREATE TABLE IF NOT EXISTS {p}invoice_line (
            id                      INTEGER PRIMARY KEY AUTOINCREMENT,
            header_id               INTEGER NOT NULL,
            article_code            TEXT NOT NULL,
            unit                    TEXT NOT NULL,
            quantity                TEXT NOT NULL,
            purchase_price          TEXT NOT NULL,
            discount_pct            TEXT NOT NULL,
            overhead                TEXT NOT NULL,
            margin_pct              TEXT NOT NULL,
            consumer_price_excl_vat TEXT NOT NULL,
            vat_pct                 TEXT NOT NULL,
            consumer_price_incl_vat TEXT NOT NULL,
            batch                   TEXT,
            expiry                  TEXT
        );
        CREATE INDEX IF NOT EXISTS {i}idx_invoice_line_header
            ON invoice_line(header_id);
        CREATE INDEX IF NOT EXISTS {i}idx_invoice_line_article
            ON invoice_line(article_code);

        CREATE TABLE IF NOT EXISTS {p}payment_schedule (
            id                 INTEGER PRIMARY KEY AUTOINCREMENT,
            cash_register_date TEXT,
            amount             TEXT,
            due_date           TEXT,
            document_type      TEXT NOT NULL,
            document_number    TEXT NOT NULL,
            warehouse          TEXT NOT NULL,
            period_id          INTEGER,
            document_date      TEXT
        );
        CREATE INDEX IF NOT EXISTS {i}idx_payment_schedule_document
            ON payment_schedule(document_type, document_number);",
        p = prefix,
        i = prefix,
    ))
}
