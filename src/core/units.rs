//! Defaults inferred from product names for auto-created articles.
//!
//! When the resolver registers a new catalog article it only has the
//! invoice line to go on, so unit of measure and VAT class are guessed
//! from keywords in the name. The tables cover the vocabulary seen on
//! pharmacy supplier invoices; anything unrecognized falls back to piece
//! goods at the reduced VAT class.

use rust_decimal::Decimal;

use super::types::VatClass;

/// Keyword → unit-of-measure table, first match wins.
static UNIT_KEYWORDS: &[(&str, &str)] = &[
    ("TABLETE", "KOM"),
    ("TABLET", "KOM"),
    ("TBL", "KOM"),
    ("CAPS", "KOM"),
    ("KAPSULA", "KOM"),
    ("AMPULA", "AMP"),
    ("AMP", "AMP"),
    ("SIRUP", "BOC"),
    ("SIR", "BOC"),
    ("KREMA", "TUB"),
    ("GEL", "TUB"),
    ("PASTA", "TUB"),
];

/// Keywords that mark general (non-medication) goods taxed at 20%.
static STANDARD_RATE_KEYWORDS: &[&str] = &["PAJISJE", "MATERIAL", "OPREMA", "APARAT"];

/// Infer the unit of measure for a new article from its name.
/// Defaults to "KOM" (piece).
pub fn infer_unit(name: &str) -> &'static str {
    let upper = name.to_uppercase();
    for (keyword, unit) in UNIT_KEYWORDS {
        if upper.contains(keyword) {
            return unit;
        }
    }
    "KOM"
}

/// Infer the VAT class for a new article from its name and the VAT
/// percentage carried on the invoice line. The line percentage wins when
/// present; name keywords only decide the 20% class for obvious
/// non-medication goods.
pub fn infer_vat_class(name: &str, line_vat_pct: Option<Decimal>) -> VatClass {
    if let Some(pct) = line_vat_pct {
        return VatClass::from_rate(pct);
    }
    let upper = name.to_uppercase();
    if STANDARD_RATE_KEYWORDS.iter().any(|k| upper.contains(k)) {
        VatClass::Pdv20
    } else {
        VatClass::Opo
    }
}
