//! Invoice XML parsing.
//!
//! Converts a raw supplier invoice document into the canonical
//! `(InvoiceHeader, Vec<InvoiceLine>)` pair. Two dialects are supported:
//! the legacy flat vendor schema (unprefixed custom tags) and UBL 2.1
//! (`cac:`/`cbc:` elements). Detection is by element presence, legacy
//! first — there is no format declaration and no XSD validation; parsing
//! is tolerant by design and degrades missing optional fields to
//! defaults and `None`s.
//!
//! # Example
//!
//! ```no_run
//! let (header, lines) = apoteka::parse::parse_file("faktura.xml").unwrap();
//! println!("{} lines from {}", lines.len(), header.supplier_name);
//! ```

mod fields;
mod text;
mod tree;

pub use text::{clean_text, parse_date, parse_decimal, parse_decimal_opt};

use std::path::Path;

use rust_decimal::Decimal;
use tracing::debug;

use crate::core::{ImportError, InvoiceHeader, InvoiceLine};
use tree::Element;

/// The invoice dialects the parser recognizes, in detection order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    /// Flat vendor schema: `Dokument`, `Stavke/Stavka`, no namespaces.
    LegacyVendor,
    /// UBL 2.1 `Invoice` with `cac:`/`cbc:` children.
    Ubl,
}

/// Currency assumed when the document does not carry one.
const DEFAULT_CURRENCY: &str = "RSD";

/// Parse an invoice XML file.
pub fn parse_file(path: impl AsRef<Path>) -> Result<(InvoiceHeader, Vec<InvoiceLine>), ImportError> {
    let xml = std::fs::read_to_string(path.as_ref())
        .map_err(|e| ImportError::Parse(format!("cannot read {}: {e}", path.as_ref().display())))?;
    parse_str(&xml)
}

/// Parse an invoice XML string.
pub fn parse_str(xml: &str) -> Result<(InvoiceHeader, Vec<InvoiceLine>), ImportError> {
    let doc = tree::parse_document(xml)?;
    let dialect = detect_dialect(&doc)?;
    debug!(?dialect, "invoice dialect detected");

    let header = parse_header(&doc);
    let lines = match dialect {
        Dialect::LegacyVendor => collect_lines(&doc, fields::LEGACY_LINES),
        Dialect::Ubl => collect_lines(&doc, fields::UBL_LINES),
    };
    debug!(
        invoice_number = %header.invoice_number,
        lines = lines.len(),
        "invoice parsed"
    );
    Ok((header, lines))
}

/// Decide which dialect a document is in, legacy first.
fn detect_dialect(doc: &Element) -> Result<Dialect, ImportError> {
    if doc.find("Dokument").is_some() || doc.find("Stavka").is_some() {
        return Ok(Dialect::LegacyVendor);
    }
    let is_ubl_root = doc
        .children
        .first()
        .is_some_and(|root| root.local_name() == "Invoice");
    if is_ubl_root || doc.find("cac:InvoiceLine").is_some() {
        return Ok(Dialect::Ubl);
    }
    Err(ImportError::Parse(
        "document matches no known invoice dialect".into(),
    ))
}

fn parse_header(doc: &Element) -> InvoiceHeader {
    InvoiceHeader {
        supplier_name: doc
            .first_text(fields::SUPPLIER_NAME)
            .unwrap_or_default()
            .to_string(),
        invoice_number: doc
            .first_text(fields::INVOICE_NUMBER)
            .unwrap_or_default()
            .to_string(),
        invoice_date: text::parse_date(doc.first_text(fields::INVOICE_DATE))
            .unwrap_or_else(|| chrono::Utc::now().date_naive()),
        net_total: text::parse_decimal(doc.first_text(fields::NET_TOTAL), Decimal::ZERO),
        currency: doc
            .first_text(fields::CURRENCY)
            .unwrap_or(DEFAULT_CURRENCY)
            .to_string(),
        due_date: text::parse_date(doc.first_text(fields::DUE_DATE)),
        cash_discount: text::parse_decimal(doc.first_text(fields::CASH_DISCOUNT), Decimal::ZERO),
        payable_amount: text::parse_decimal(doc.first_text(fields::PAYABLE_AMOUNT), Decimal::ZERO),
    }
}

fn collect_lines(doc: &Element, containers: &[&str]) -> Vec<InvoiceLine> {
    for container in containers {
        let elements = doc.find_all(container);
        if !elements.is_empty() {
            return elements.iter().map(|e| parse_line(e)).collect();
        }
    }
    Vec::new()
}

fn parse_line(line: &Element) -> InvoiceLine {
    InvoiceLine {
        supplier_code: line
            .first_text(fields::LINE_SUPPLIER_CODE)
            .unwrap_or_default()
            .to_string(),
        barcode: text::clean_text(line.first_text(fields::LINE_BARCODE)),
        name: line
            .first_text(fields::LINE_NAME)
            .unwrap_or_default()
            .to_string(),
        quantity: text::parse_decimal(line.first_text(fields::LINE_QUANTITY), Decimal::ZERO),
        purchase_price: text::parse_decimal(
            line.first_text(fields::LINE_PURCHASE_PRICE),
            Decimal::ZERO,
        ),
        discount_pct: text::parse_decimal(
            line.first_text(fields::LINE_DISCOUNT_PCT),
            Decimal::ZERO,
        ),
        vat_pct: text::parse_decimal_opt(line.first_text(fields::LINE_VAT_PCT)),
        batch: text::clean_text(line.first_text(fields::LINE_BATCH)),
        expiry: text::parse_date(line.first_text(fields::LINE_EXPIRY)),
    }
}
