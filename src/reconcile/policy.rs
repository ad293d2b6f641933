//! Price preservation policy.
//!
//! Retail shelf prices must not jitter on every incoming invoice merely
//! because a discount moved slightly; they only move when the purchase
//! price itself changed, and every such move is auditable. The decision
//! is pure — the caller supplies the prior purchase record.

use rust_decimal::Decimal;

use crate::core::{PriceAction, PriceChange, Resolution};
use crate::pricing::PriceBreakdown;
use crate::store::PriorPurchase;

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// The price and margin to write for one line, plus the audit outcome.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceDecision {
    /// Consumer price (incl. VAT) to write.
    pub final_price: Decimal,
    /// Margin percentage to write.
    pub final_margin_pct: Decimal,
    /// What the policy did.
    pub action: PriceAction,
    /// Present exactly when `action` is
    /// [`PriceAction::RecalcPurchaseChanged`].
    pub change: Option<PriceChange>,
}

/// Decide whether to keep the article's last consumer price or use the
/// freshly computed one.
///
/// Preservation only applies to existing articles (`FOUND`,
/// `BARCODE_ADDED`, `SIFRA_FALLBACK`) — a freshly created article always
/// takes the computed price. When the prior consumer price is kept, the
/// margin is back-solved against the new purchase base so downstream
/// margin reporting stays coherent.
#[allow(clippy::too_many_arguments)]
pub fn decide(
    article_code: &str,
    resolution: Resolution,
    breakdown: &PriceBreakdown,
    prior: Option<&PriorPurchase>,
    invoice_purchase_price: Decimal,
    discount_pct: Decimal,
    vat_pct: Decimal,
    quantity: Decimal,
    tolerance: Decimal,
    preserve_enabled: bool,
) -> PriceDecision {
    // carry the article's historical margin when we have one
    let computed = PriceDecision {
        final_price: breakdown.price_rounded,
        final_margin_pct: prior
            .map(|p| p.margin_pct)
            .unwrap_or(breakdown.margin_pct_of_final),
        action: PriceAction::Computed,
        change: None,
    };

    let existing = matches!(
        resolution,
        Resolution::Found | Resolution::BarcodeAdded | Resolution::SifraFallback
    );
    let Some(prior) = prior else { return computed };
    if !preserve_enabled || !existing {
        return computed;
    }

    let purchase_changed =
        (invoice_purchase_price - prior.purchase_price).abs() > tolerance;
    if purchase_changed {
        return PriceDecision {
            final_price: breakdown.price_rounded,
            final_margin_pct: breakdown.margin_pct_of_final,
            action: PriceAction::RecalcPurchaseChanged,
            change: Some(PriceChange {
                article_code: article_code.to_string(),
                old_price: prior.consumer_price,
                new_price: breakdown.price_rounded,
                quantity,
            }),
        };
    }

    // purchase price stable: keep the shelf price, back-solve the margin
    let net_purchase = invoice_purchase_price * (Decimal::ONE - discount_pct / HUNDRED);
    let final_margin_pct = if net_purchase > Decimal::ZERO {
        let price_excl_vat = prior.consumer_price / (Decimal::ONE + vat_pct / HUNDRED);
        ((price_excl_vat - net_purchase) / net_purchase * HUNDRED).round_dp(4)
    } else {
        prior.margin_pct
    };
    PriceDecision {
        final_price: prior.consumer_price,
        final_margin_pct,
        action: PriceAction::Preserved,
        change: None,
    }
}
