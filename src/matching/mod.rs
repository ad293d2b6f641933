//! Product-name matching heuristics.
//!
//! Supplier invoices abbreviate and reorder product names freely, so the
//! resolver's fuzzy path works on normalized names scored by token-set
//! similarity. The heuristic tables live behind [`NameNormalizer`] and
//! [`SimilarityScorer`] so they can be swapped and tested in isolation.

mod normalize;
mod similarity;

pub use normalize::NameNormalizer;
pub use similarity::{SimilarityScorer, dose_signature};
