use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One supplier invoice document header, as parsed from XML.
///
/// Immutable once parsed; the invoice number is the natural-key component
/// used by the reconciler for idempotent header reuse.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceHeader {
    /// Supplier name, free text as printed on the invoice.
    pub supplier_name: String,
    /// Supplier's invoice number.
    pub invoice_number: String,
    /// Invoice issue date.
    pub invoice_date: NaiveDate,
    /// Invoice net total (excl. VAT).
    pub net_total: Decimal,
    /// Currency code (ISO 4217, e.g. "RSD").
    pub currency: String,
    /// Payment due date (valuta).
    pub due_date: Option<NaiveDate>,
    /// Cash-discount amount offered for early payment.
    pub cash_discount: Decimal,
    /// Amount payable by the due date.
    pub payable_amount: Decimal,
}

/// One invoice line item.
///
/// Line order carries no semantics but is preserved for line numbering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceLine {
    /// Supplier's own item code (sifra).
    pub supplier_code: String,
    /// EAN/GTIN barcode, when the supplier provides one.
    pub barcode: Option<String>,
    /// Item name as printed on the invoice.
    pub name: String,
    /// Invoiced quantity.
    pub quantity: Decimal,
    /// Unit purchase price, pre-discount (nabavna cena).
    pub purchase_price: Decimal,
    /// Supplier discount percentage (rabat).
    pub discount_pct: Decimal,
    /// Per-line VAT percentage; falls back to the configured default.
    pub vat_pct: Option<Decimal>,
    /// Batch/lot number (serija).
    pub batch: Option<String>,
    /// Expiry date (rok upotrebe).
    pub expiry: Option<NaiveDate>,
}

/// VAT classes used by the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VatClass {
    /// OPO — general reduced class, 10%.
    Opo,
    /// PDV10 — explicit 10% class.
    Pdv10,
    /// PDV20 — standard 20% class.
    Pdv20,
}

impl VatClass {
    /// Catalog code string.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Opo => "OPO",
            Self::Pdv10 => "PDV10",
            Self::Pdv20 => "PDV20",
        }
    }

    /// Parse from a catalog code string.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "OPO" => Some(Self::Opo),
            "PDV10" => Some(Self::Pdv10),
            "PDV20" => Some(Self::Pdv20),
            _ => None,
        }
    }

    /// The VAT percentage this class maps to.
    pub fn rate(&self) -> Decimal {
        match self {
            Self::Opo | Self::Pdv10 => Decimal::from(10),
            Self::Pdv20 => Decimal::from(20),
        }
    }

    /// Classify a VAT percentage into the nearest catalog class.
    pub fn from_rate(pct: Decimal) -> Self {
        if pct >= Decimal::from(20) {
            Self::Pdv20
        } else {
            Self::Opo
        }
    }
}

/// One catalog article (artikal).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogArticle {
    /// Internal article code (sifra) — the resolved identity.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Unit of measure (KOM, AMP, BOC, TUB).
    pub unit: String,
    /// Article kind (LEK for medications, AR for general goods).
    pub kind: String,
    /// VAT class.
    pub vat_class: VatClass,
    /// Primary barcode. Not guaranteed unique across the alias table.
    pub barcode: Option<String>,
    /// Free-text note (provenance for auto-created articles).
    pub note: Option<String>,
    /// Trade pack size.
    pub pack_size: Decimal,
    /// Minimum stock level.
    pub min_stock: Decimal,
    /// Default margin percentage, when recorded on the article.
    pub margin_pct: Option<Decimal>,
}

/// How an invoice line was resolved against the catalog, in the exact
/// priority order the resolver tries them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Resolution {
    /// Matched on primary or alias barcode.
    Found,
    /// Matched by fuzzy name; the invoice barcode was recorded as an alias.
    BarcodeAdded,
    /// Matched because the supplier item code equals an internal code.
    SifraFallback,
    /// A new catalog article was created for this line.
    Created,
    /// No match and creation not possible; the line is skipped.
    NotFound,
}

impl Resolution {
    /// Stable tag string, as reported to callers.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Found => "FOUND",
            Self::BarcodeAdded => "BARCODE_ADDED",
            Self::SifraFallback => "SIFRA_FALLBACK",
            Self::Created => "CREATED",
            Self::NotFound => "NOT_FOUND",
        }
    }
}

/// Outcome of the price preservation policy for one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PriceAction {
    /// No prior record (or preservation disabled) — fresh computation used.
    Computed,
    /// Purchase price stable — prior consumer price kept, margin adjusted.
    Preserved,
    /// Purchase price changed beyond tolerance — recomputed, change audited.
    RecalcPurchaseChanged,
}

impl PriceAction {
    /// Stable tag string, as recorded in the audit store.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Computed => "COMPUTED",
            Self::Preserved => "PRESERVED",
            Self::RecalcPurchaseChanged => "RECALC_NABAVNA_CHANGED",
        }
    }
}

/// Per-invoice tally of line resolution outcomes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionStats {
    pub found: usize,
    pub barcode_added: usize,
    pub sifra_fallback: usize,
    pub created: usize,
    pub not_found: usize,
}

impl ResolutionStats {
    /// Record one resolution outcome.
    pub fn record(&mut self, resolution: Resolution) {
        match resolution {
            Resolution::Found => self.found += 1,
            Resolution::BarcodeAdded => self.barcode_added += 1,
            Resolution::SifraFallback => self.sifra_fallback += 1,
            Resolution::Created => self.created += 1,
            Resolution::NotFound => self.not_found += 1,
        }
    }

    /// Lines that resolved to a catalog article.
    pub fn resolved(&self) -> usize {
        self.found + self.barcode_added + self.sifra_fallback + self.created
    }
}

/// One detected retail-price change: the purchase price moved beyond
/// tolerance, so the consumer price was recomputed instead of preserved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceChange {
    /// Catalog article code.
    pub article_code: String,
    /// Previous consumer price (incl. VAT).
    pub old_price: Decimal,
    /// New consumer price (incl. VAT).
    pub new_price: Decimal,
    /// Invoiced quantity at the moment of the change.
    pub quantity: Decimal,
}

/// Whether a reconcile call created a new document header or reused one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentStatus {
    Created,
    Reused,
}

/// Result of one reconcile call, returned to callers (HTTP handlers, CLI).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconcileReport {
    /// Persisted header id. `None` under dry-run.
    pub document_id: Option<i64>,
    /// Internal document number (`{n}/{yy}`).
    pub document_number: String,
    /// Created vs. reused header.
    pub status: DocumentStatus,
    /// Resolved internal supplier code.
    pub supplier_code: String,
    /// Number of line rows inserted by this call.
    pub lines_inserted: usize,
    /// Resolution outcome tally.
    pub stats: ResolutionStats,
    /// Retail-price changes detected by the preservation policy.
    pub price_changes: Vec<PriceChange>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vat_class_codes_round_trip() {
        for class in [VatClass::Opo, VatClass::Pdv10, VatClass::Pdv20] {
            assert_eq!(VatClass::from_code(class.code()), Some(class));
        }
        assert_eq!(VatClass::from_code("E"), None);
    }

    #[test]
    fn vat_class_from_rate() {
        assert_eq!(VatClass::from_rate(Decimal::from(20)), VatClass::Pdv20);
        assert_eq!(VatClass::from_rate(Decimal::from(21)), VatClass::Pdv20);
        assert_eq!(VatClass::from_rate(Decimal::from(10)), VatClass::Opo);
        assert_eq!(VatClass::from_rate(Decimal::ZERO), VatClass::Opo);
    }

    #[test]
    fn stats_tally() {
        let mut stats = ResolutionStats::default();
        stats.record(Resolution::Found);
        stats.record(Resolution::Found);
        stats.record(Resolution::Created);
        stats.record(Resolution::NotFound);
        assert_eq!(stats.found, 2);
        assert_eq!(stats.created, 1);
        assert_eq!(stats.not_found, 1);
        assert_eq!(stats.resolved(), 3);
    }
}
