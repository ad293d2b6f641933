use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::pricing::RoundingMode;

/// Which schema the reconciler writes documents into.
///
/// Mirrors the deployment topology: a local store, a read-capable proxy of
/// the production store, and a direct connection to the production store.
/// The proxy cannot allocate identity values for the header/line/payment
/// tables, so writing through it is rejected unconditionally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SchemaTarget {
    /// The local schema. Always writable.
    Local,
    /// The production store seen through a foreign-data-wrapper proxy.
    /// Read-only for this subsystem.
    RemoteProxy,
    /// A direct connection to the production store. Writable only under
    /// the explicit `allow_remote_write` opt-in.
    RemoteDirect,
}

impl SchemaTarget {
    /// Schema qualifier prepended to every table name in generated SQL.
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::Local => "main.",
            Self::RemoteProxy | Self::RemoteDirect => "remote.",
        }
    }
}

/// Configuration for one import run.
///
/// All feature flags are explicit here rather than read from the process
/// environment at call time, so the safety gate and the preservation
/// policy stay deterministic and testable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportConfig {
    /// Target schema for document writes.
    pub target: SchemaTarget,
    /// Opt-in for direct writes to the production store.
    pub allow_remote_write: bool,
    /// Whether unmatched lines may create new catalog articles.
    pub allow_auto_create: bool,
    /// Whether to keep an article's last consumer price when the purchase
    /// price is stable (within `price_tolerance`).
    pub preserve_existing_price: bool,
    /// Absolute purchase-price difference treated as "unchanged".
    pub price_tolerance: Decimal,
    /// VAT percentage applied when an invoice line carries none.
    pub default_vat_pct: Decimal,
    /// Nominal margin percentage for freshly computed prices.
    pub default_margin_pct: Decimal,
    /// Overhead percentage on the discounted base.
    pub overhead_pct: Decimal,
    /// End-digit rounding strategy for the consumer price.
    pub rounding: RoundingMode,
    /// Minimal price above which the end-digit rule applies.
    pub round_threshold: Decimal,
    /// ERP document type for posted invoices.
    pub document_type: String,
    /// Warehouse code documents are posted to.
    pub warehouse: String,
    /// Accounting period id stamped on headers.
    pub period_id: i64,
    /// User id stamped on headers.
    pub user_id: i64,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            target: SchemaTarget::Local,
            allow_remote_write: false,
            allow_auto_create: true,
            preserve_existing_price: false,
            price_tolerance: dec!(0.01),
            default_vat_pct: dec!(10),
            default_margin_pct: dec!(18),
            overhead_pct: Decimal::ZERO,
            rounding: RoundingMode::End99,
            round_threshold: Decimal::ZERO,
            document_type: "20".to_string(),
            warehouse: "101".to_string(),
            period_id: 4,
            user_id: 14,
        }
    }
}

impl ImportConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_target(mut self, target: SchemaTarget) -> Self {
        self.target = target;
        self
    }

    pub fn with_allow_remote_write(mut self, allow: bool) -> Self {
        self.allow_remote_write = allow;
        self
    }

    pub fn with_allow_auto_create(mut self, allow: bool) -> Self {
        self.allow_auto_create = allow;
        self
    }

    pub fn with_preserve_existing_price(mut self, preserve: bool) -> Self {
        self.preserve_existing_price = preserve;
        self
    }

    pub fn with_price_tolerance(mut self, tolerance: Decimal) -> Self {
        self.price_tolerance = tolerance;
        self
    }

    pub fn with_default_vat_pct(mut self, pct: Decimal) -> Self {
        self.default_vat_pct = pct;
        self
    }

    pub fn with_default_margin_pct(mut self, pct: Decimal) -> Self {
        self.default_margin_pct = pct;
        self
    }

    pub fn with_rounding(mut self, mode: RoundingMode) -> Self {
        self.rounding = mode;
        self
    }

    pub fn with_round_threshold(mut self, threshold: Decimal) -> Self {
        self.round_threshold = threshold;
        self
    }

    pub fn with_warehouse(mut self, warehouse: impl Into<String>) -> Self {
        self.warehouse = warehouse.into();
        self
    }

    pub fn with_document_type(mut self, document_type: impl Into<String>) -> Self {
        self.document_type = document_type.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = ImportConfig::default();
        assert_eq!(cfg.target, SchemaTarget::Local);
        assert!(!cfg.allow_remote_write);
        assert!(cfg.allow_auto_create);
        assert!(!cfg.preserve_existing_price);
        assert_eq!(cfg.price_tolerance, dec!(0.01));
        assert_eq!(cfg.default_vat_pct, dec!(10));
        assert_eq!(cfg.default_margin_pct, dec!(18));
        assert_eq!(cfg.rounding, RoundingMode::End99);
        assert_eq!(cfg.document_type, "20");
        assert_eq!(cfg.warehouse, "101");
    }

    #[test]
    fn schema_prefixes() {
        assert_eq!(SchemaTarget::Local.prefix(), "main.");
        assert_eq!(SchemaTarget::RemoteProxy.prefix(), "remote.");
        assert_eq!(SchemaTarget::RemoteDirect.prefix(), "remote.");
    }

    #[test]
    fn chained_setters() {
        let cfg = ImportConfig::new()
            .with_preserve_existing_price(true)
            .with_rounding(RoundingMode::None)
            .with_warehouse("102");
        assert!(cfg.preserve_existing_price);
        assert_eq!(cfg.rounding, RoundingMode::None);
        assert_eq!(cfg.warehouse, "102");
    }
}
