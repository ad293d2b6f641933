use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// End-digit rounding strategies for the consumer price (MP).
///
/// The end-digit modes never round *down* past the unrounded price: if the
/// naive target digit falls below the input, the rule advances to the next
/// whole-unit boundary first. `NEAREST_5`/`NEAREST_10` snap to the nearest
/// multiple instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundingMode {
    /// Plain round-half-up to two decimals.
    None,
    /// Round up to the nearest price ending in .9.
    End9,
    /// Round up to the nearest price ending in .99.
    End99,
    /// Snap to the nearest multiple of 5.
    Nearest5,
    /// Snap to the nearest multiple of 10.
    Nearest10,
}

impl RoundingMode {
    /// Configuration name, as stored in config files.
    pub fn name(&self) -> &'static str {
        match self {
            Self::None => "NONE",
            Self::End9 => "END_9",
            Self::End99 => "END_99",
            Self::Nearest5 => "NEAREST_5",
            Self::Nearest10 => "NEAREST_10",
        }
    }

    /// Parse a configuration name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "NONE" => Some(Self::None),
            "END_9" => Some(Self::End9),
            "END_99" => Some(Self::End99),
            "NEAREST_5" => Some(Self::Nearest5),
            "NEAREST_10" => Some(Self::Nearest10),
            _ => None,
        }
    }
}

/// Round a consumer price according to `mode`.
///
/// Prices below `threshold` are exempt from the end-digit rule and get a
/// plain half-up rounding to two decimals.
pub fn apply(value: Decimal, mode: RoundingMode, threshold: Decimal) -> Decimal {
    if value < threshold || mode == RoundingMode::None {
        return round_half_up(value, 2);
    }
    match mode {
        RoundingMode::None => round_half_up(value, 2),
        RoundingMode::End9 => {
            let units = value.floor();
            let mut target = units + dec!(0.9);
            if target < value {
                target = units + dec!(1.9);
            }
            round_half_up(target, 1)
        }
        RoundingMode::End99 => {
            let units = value.floor();
            let mut target = units + dec!(0.99);
            if target < value {
                target = units + dec!(1.99);
            }
            round_half_up(target, 2)
        }
        RoundingMode::Nearest5 => ((value + dec!(2.5)) / dec!(5)).floor() * dec!(5),
        RoundingMode::Nearest10 => ((value + dec!(5)) / dec!(10)).floor() * dec!(10),
    }
}

/// Half-up rounding to `dp` decimal places.
pub(crate) fn round_half_up(value: Decimal, dp: u32) -> Decimal {
    value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}
