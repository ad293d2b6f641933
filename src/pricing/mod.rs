//! MP kalkulacija — the retail price calculator.
//!
//! Maps a purchase price through discount, overhead, margin, and VAT to the
//! regulated consumer price (MP), with a pluggable end-digit rounding
//! strategy applied to the final VAT-inclusive value. Pure arithmetic, no
//! I/O; negative or zero inputs propagate arithmetically — validation is
//! the caller's business.

mod rounding;

pub use rounding::{RoundingMode, apply as apply_rounding};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use rounding::round_half_up;

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Full price breakdown for one invoice line. Transient — recomputed per
/// line, never persisted as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBreakdown {
    /// Purchase price after the supplier discount.
    pub base_after_discount: Decimal,
    /// Overhead amount added on the discounted base.
    pub overhead_amount: Decimal,
    /// Discounted base plus overhead — the margin base.
    pub base_plus_overhead: Decimal,
    /// Nominal margin amount.
    pub margin_amount: Decimal,
    /// Consumer price excluding VAT.
    pub price_excl_vat: Decimal,
    /// VAT amount.
    pub vat_amount: Decimal,
    /// Consumer price including VAT, before end-digit rounding.
    pub price_incl_vat: Decimal,
    /// Consumer price including VAT, after end-digit rounding — the MP.
    pub price_rounded: Decimal,
    /// Discount effectively applied, as a percentage of the purchase price.
    /// Derived, for reporting only.
    pub effective_discount_pct: Decimal,
    /// Margin as a percentage of the final consumer price (RUC).
    /// Derived, for reporting only.
    pub margin_pct_of_final: Decimal,
}

/// Compute the full retail price breakdown.
///
/// The formula chain, all in the invoice currency:
///
/// ```text
/// base       = purchase_price * (1 - discount_pct/100)
/// base+ovh   = base * (1 + overhead_pct/100)
/// margin     = (base+ovh) * margin_pct/100
/// excl_vat   = (base+ovh) + margin
/// vat        = excl_vat * vat_pct/100
/// incl_vat   = excl_vat + vat
/// ```
///
/// `rounding` and `round_threshold` only affect the final `price_rounded`.
pub fn compute(
    purchase_price: Decimal,
    discount_pct: Decimal,
    vat_pct: Decimal,
    margin_pct: Decimal,
    overhead_pct: Decimal,
    rounding: RoundingMode,
    round_threshold: Decimal,
) -> PriceBreakdown {
    let base = purchase_price * (Decimal::ONE - discount_pct / HUNDRED);
    let overhead = base * (overhead_pct / HUNDRED);
    let base_plus_overhead = base + overhead;
    let margin = base_plus_overhead * (margin_pct / HUNDRED);
    let price_excl_vat = base_plus_overhead + margin;
    let vat = price_excl_vat * (vat_pct / HUNDRED);
    let price_incl_vat = price_excl_vat + vat;

    let effective_discount_pct = if purchase_price.is_zero() {
        Decimal::ZERO
    } else {
        HUNDRED * (Decimal::ONE - base / purchase_price)
    };
    let margin_pct_of_final = if price_incl_vat.is_zero() {
        Decimal::ZERO
    } else {
        margin / price_incl_vat * HUNDRED
    };

    PriceBreakdown {
        base_after_discount: round_half_up(base, 4),
        overhead_amount: round_half_up(overhead, 4),
        base_plus_overhead: round_half_up(base_plus_overhead, 4),
        margin_amount: round_half_up(margin, 4),
        price_excl_vat: round_half_up(price_excl_vat, 4),
        vat_amount: round_half_up(vat, 4),
        price_incl_vat: round_half_up(price_incl_vat, 4),
        price_rounded: rounding::apply(price_incl_vat, rounding, round_threshold),
        effective_discount_pct: round_half_up(effective_discount_pct, 4),
        margin_pct_of_final: round_half_up(margin_pct_of_final, 4),
    }
}
