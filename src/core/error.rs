use thiserror::Error;

/// Errors that can occur during invoice parsing or document posting.
///
/// Per-line resolution and pricing failures are never surfaced through this
/// type — they are tallied in [`crate::core::ResolutionStats`] so one bad
/// line cannot sink an otherwise-good invoice. Only per-invoice failures
/// (parse, safety gate, transaction) propagate.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ImportError {
    /// Malformed XML or structurally unrecognizable invoice document.
    #[error("parse error: {0}")]
    Parse(String),

    /// Attempt to write through a disallowed schema target. Raised before
    /// any write; never silently downgraded.
    #[error("safety gate: {0}")]
    SafetyGate(String),

    /// Database-level failure during header/line/payment writes. The
    /// surrounding transaction has been rolled back.
    #[error("store error: {0}")]
    Store(String),

    /// Invalid or inconsistent configuration.
    #[error("config error: {0}")]
    Config(String),
}

#[cfg(feature = "store")]
impl From<rusqlite::Error> for ImportError {
    fn from(e: rusqlite::Error) -> Self {
        ImportError::Store(e.to_string())
    }
}
