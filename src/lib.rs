//! # apoteka
//!
//! Pharmacy back-office invoice import library: parses supplier invoice XML
//! (legacy vendor dialect and UBL 2.1), matches line items against a product
//! catalog, computes the regulated retail price (MP kalkulacija), and posts
//! the result as an ERP purchase document with idempotent re-run semantics.
//!
//! All monetary values use [`rust_decimal::Decimal`] — never floating point.
//!
//! ## Quick Start
//!
//! ```rust
//! use apoteka::pricing::{self, RoundingMode};
//! use rust_decimal_macros::dec;
//!
//! // 100.00 purchase, 10% discount, 20% VAT, 18% margin, no end-digit rounding
//! let breakdown = pricing::compute(
//!     dec!(100.00),
//!     dec!(10),
//!     dec!(20),
//!     dec!(18),
//!     dec!(0),
//!     RoundingMode::None,
//!     dec!(0),
//! );
//! assert_eq!(breakdown.price_rounded, dec!(127.44));
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `core` (default) | Data model, pricing engine, name matching, numbering |
//! | `xml` | Invoice XML parsing (legacy vendor + UBL 2.1) |
//! | `store` | SQLite-backed catalog/document/audit store, resolvers |
//! | `import` | The reconciler (implies `xml` + `store`) |
//! | `all` | Everything |

#[cfg(feature = "core")]
pub mod core;

#[cfg(feature = "core")]
pub mod matching;

#[cfg(feature = "core")]
pub mod pricing;

#[cfg(feature = "xml")]
pub mod parse;

#[cfg(feature = "store")]
pub mod resolve;

#[cfg(feature = "store")]
pub mod store;

#[cfg(feature = "import")]
pub mod reconcile;

// Re-export core types at crate root for convenience
#[cfg(feature = "core")]
pub use crate::core::*;
