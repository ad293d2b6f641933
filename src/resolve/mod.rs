//! Catalog resolution.
//!
//! [`ArticleResolver`] maps one invoice line to a catalog article through
//! the layered matching strategy (barcode → alias → fuzzy name → supplier
//! code → auto-create); [`SupplierResolver`] maps a free-text supplier
//! name to an internal supplier code and never fails.

mod article;
mod supplier;

pub use article::{ArticleResolver, ResolvedArticle};
pub use supplier::SupplierResolver;
