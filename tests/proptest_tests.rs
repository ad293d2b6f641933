//! Property-based tests for the pricing engine and its rounding laws.
//!
//! Run with: `cargo test --test proptest_tests`

use apoteka::pricing::{self, RoundingMode, apply_rounding};
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// ── Proptest Strategies ─────────────────────────────────────────────────────

/// Generate a reasonable positive price (0.01 to 99999.99).
fn arb_price() -> impl Strategy<Value = Decimal> {
    (1u64..10_000_000u64).prop_map(|cents| Decimal::new(cents as i64, 2))
}

/// Generate a discount percentage (0 to 99.99).
fn arb_discount() -> impl Strategy<Value = Decimal> {
    (0u64..10_000u64).prop_map(|bp| Decimal::new(bp as i64, 2))
}

/// Generate a VAT percentage from the classes in use.
fn arb_vat() -> impl Strategy<Value = Decimal> {
    prop_oneof![Just(dec!(0)), Just(dec!(10)), Just(dec!(20))]
}

/// Generate a margin percentage (0 to 60).
fn arb_margin() -> impl Strategy<Value = Decimal> {
    (0u64..6_000u64).prop_map(|bp| Decimal::new(bp as i64, 2))
}

// ── END_99 rounding law ─────────────────────────────────────────────────────

proptest! {
    /// For any price p: the END_99 result r satisfies r >= p, r ends in
    /// .99, and no .99-ending value lies strictly between p and r.
    #[test]
    fn end_99_law(p in arb_price()) {
        let r = apply_rounding(p, RoundingMode::End99, Decimal::ZERO);

        prop_assert!(r >= p, "rounded {r} below input {p}");
        prop_assert_eq!(r.fract(), dec!(0.99), "{} does not end in .99", r);
        // minimality: one whole unit lower would undershoot
        prop_assert!(r - Decimal::ONE < p, "{} is not the nearest .99 above {}", r, p);
    }

    /// END_99 is idempotent: a price already ending in .99 is unchanged.
    #[test]
    fn end_99_idempotent(p in arb_price()) {
        let once = apply_rounding(p, RoundingMode::End99, Decimal::ZERO);
        let twice = apply_rounding(once, RoundingMode::End99, Decimal::ZERO);
        prop_assert_eq!(once, twice);
    }

    /// Same law for END_9 at one decimal.
    #[test]
    fn end_9_law(p in arb_price()) {
        let r = apply_rounding(p, RoundingMode::End9, Decimal::ZERO);
        prop_assert!(r >= p);
        prop_assert_eq!(r.fract(), dec!(0.9));
        prop_assert!(r - Decimal::ONE < p);
    }
}

// ── Multiple-of rounding ────────────────────────────────────────────────────

proptest! {
    #[test]
    fn nearest_5_snaps_to_multiples(p in arb_price()) {
        let r = apply_rounding(p, RoundingMode::Nearest5, Decimal::ZERO);
        prop_assert_eq!(r % dec!(5), dec!(0));
        prop_assert!((r - p).abs() <= dec!(2.5));
    }

    #[test]
    fn nearest_10_snaps_to_multiples(p in arb_price()) {
        let r = apply_rounding(p, RoundingMode::Nearest10, Decimal::ZERO);
        prop_assert_eq!(r % dec!(10), dec!(0));
        prop_assert!((r - p).abs() <= dec!(5));
    }

    #[test]
    fn plain_rounding_stays_close(p in arb_price()) {
        let r = apply_rounding(p, RoundingMode::None, Decimal::ZERO);
        prop_assert!((r - p).abs() <= dec!(0.005));
    }

    /// Below the threshold every mode degrades to plain rounding.
    #[test]
    fn threshold_disables_end_digit(p in arb_price()) {
        let threshold = p + dec!(1);
        let r = apply_rounding(p, RoundingMode::End99, threshold);
        prop_assert_eq!(r, apply_rounding(p, RoundingMode::None, Decimal::ZERO));
    }
}

// ── Pricing chain invariants ────────────────────────────────────────────────

proptest! {
    /// The chain stays internally consistent: excl + VAT = incl, and the
    /// effective discount equals the nominal one.
    #[test]
    fn chain_consistency(
        p in arb_price(),
        d in arb_discount(),
        vat in arb_vat(),
        m in arb_margin(),
    ) {
        let b = pricing::compute(p, d, vat, m, Decimal::ZERO, RoundingMode::None, Decimal::ZERO);

        // reported components are rounded to 4dp independently
        let drift = (b.price_excl_vat + b.vat_amount - b.price_incl_vat).abs();
        prop_assert!(drift <= dec!(0.0002), "excl {} + vat {} vs incl {}",
            b.price_excl_vat, b.vat_amount, b.price_incl_vat);

        let discount_drift = (b.effective_discount_pct - d).abs();
        prop_assert!(discount_drift <= dec!(0.0001));

        prop_assert!(b.base_after_discount <= p);
        prop_assert!(b.price_incl_vat >= b.price_excl_vat);
    }

    /// A higher margin never produces a lower consumer price.
    #[test]
    fn margin_is_monotonic(p in arb_price(), vat in arb_vat(), m in arb_margin()) {
        let low = pricing::compute(p, Decimal::ZERO, vat, m, Decimal::ZERO, RoundingMode::None, Decimal::ZERO);
        let high = pricing::compute(p, Decimal::ZERO, vat, m + dec!(1), Decimal::ZERO, RoundingMode::None, Decimal::ZERO);
        prop_assert!(high.price_incl_vat >= low.price_incl_vat);
    }
}
