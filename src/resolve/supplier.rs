use rusqlite::{Connection, OptionalExtension};
use tracing::warn;

/// Legal-entity suffixes stripped during supplier-name normalization.
static LEGAL_SUFFIXES: &[&str] = &["D.O.O.", "D.O.O", "DOO", "D O O"];

/// Maps free-text supplier names from invoices to internal supplier codes.
///
/// Matching strategy, in order: alias table on the first normalized token,
/// exact normalized match against stored names, substring on the first
/// token, substring on any token of three or more characters, alias value
/// where the alias appears anywhere in the normalized name. Falls back to
/// a fixed generic code — a supplier that cannot be resolved never fails
/// the import.
pub struct SupplierResolver {
    aliases: Vec<(String, String)>,
    fallback: String,
}

impl Default for SupplierResolver {
    fn default() -> Self {
        Self {
            aliases: vec![
                ("VEGA".to_string(), "7".to_string()),
                ("SOPHARMA".to_string(), "15".to_string()),
                ("PHOENIX".to_string(), "6".to_string()),
            ],
            fallback: "1".to_string(),
        }
    }
}

impl SupplierResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the alias table.
    pub fn with_aliases(mut self, aliases: Vec<(String, String)>) -> Self {
        self.aliases = aliases;
        self
    }

    /// Replace the fallback supplier code.
    pub fn with_fallback(mut self, code: impl Into<String>) -> Self {
        self.fallback = code.into();
        self
    }

    /// Normalize a raw supplier name: uppercase, legal suffixes removed,
    /// punctuation flattened, whitespace collapsed.
    pub fn normalize(raw: &str) -> String {
        let mut name = raw.trim().to_uppercase();
        for suffix in LEGAL_SUFFIXES {
            name = name.replace(suffix, "");
        }
        let name = name.replace(['.', ','], " ");
        name.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    /// Resolve a supplier name to an internal code.
    pub fn resolve(&self, conn: &Connection, prefix: &str, raw_name: &str) -> rusqlite::Result<String> {
        let clean = Self::normalize(raw_name);
        if clean.is_empty() {
            return Ok(self.fallback.clone());
        }
        let tokens: Vec<&str> = clean.split_whitespace().collect();
        let first = tokens.first().copied().unwrap_or(clean.as_str());

        // (a) alias table on the first token
        for (alias, code) in &self.aliases {
            if first == alias {
                return Ok(code.clone());
            }
        }

        // (b) exact match after stripping legal suffixes on the stored side too
        let exact: Option<String> = conn
            .query_row(
                &format!(
                    "SELECT code FROM {prefix}supplier
                     WHERE TRIM(REPLACE(REPLACE(REPLACE(UPPER(name), 'D.O.O.', ''), 'DOO', ''), '.', ' ')) = ?1
                     LIMIT 1"
                ),
                [&clean],
                |row| row.get(0),
            )
            .optional()?;
        if let Some(code) = exact {
            return Ok(code);
        }

        // (c) substring on the first token
        if let Some(code) = self.find_like(conn, prefix, first)? {
            return Ok(code);
        }

        // (d) substring on any token of length >= 3
        for token in &tokens {
            if token.len() < 3 {
                continue;
            }
            if let Some(code) = self.find_like(conn, prefix, token)? {
                return Ok(code);
            }
        }

        // (e) alias contained anywhere in the normalized name
        for (alias, code) in &self.aliases {
            if clean.contains(alias.as_str()) {
                return Ok(code.clone());
            }
        }

        warn!(supplier = %raw_name, fallback = %self.fallback, "supplier unresolved, using fallback");
        Ok(self.fallback.clone())
    }

    fn find_like(
        &self,
        conn: &Connection,
        prefix: &str,
        token: &str,
    ) -> rusqlite::Result<Option<String>> {
        conn.query_row(
            &format!(
                "SELECT code FROM {prefix}supplier
                 WHERE UPPER(name) LIKE '%' || UPPER(?1) || '%' LIMIT 1"
            ),
            [token],
            |row| row.get(0),
        )
        .optional()
    }
}
