//! Core data model, configuration, numbering, and article defaults.
//!
//! This module provides the canonical invoice and catalog types shared by
//! the parser, resolvers, pricing engine, and reconciler.

mod config;
mod error;
pub mod numbering;
mod types;
pub mod units;

pub use config::*;
pub use error::*;
pub use types::*;
pub use units::{infer_unit, infer_vat_class};
