use regex::Regex;
use std::sync::OnceLock;

/// Default abbreviation expansions seen on pharmacy supplier invoices.
/// Keys with a trailing space only expand word prefixes; keys wrapped in
/// spaces only expand whole words.
static DEFAULT_EXPANSIONS: &[(&str, &str)] = &[
    ("UL CLEAN", "ULTRA CLEAN"),
    ("UL ", "ULTRA "),
    (" PAS ", " PASTE "),
    (" TBL ", " TABLET "),
    (" CPS ", " CAPSULES "),
];

fn pack_count_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // trailing packaging counts like "30X" carry no product identity
    RE.get_or_init(|| Regex::new(r"\d+X\s*$").unwrap())
}

/// Normalizes raw invoice product names into a canonical comparable form:
/// uppercase, vendor abbreviations expanded, trailing pack counts removed,
/// whitespace collapsed.
#[derive(Debug, Clone)]
pub struct NameNormalizer {
    expansions: Vec<(String, String)>,
}

impl Default for NameNormalizer {
    fn default() -> Self {
        Self {
            expansions: DEFAULT_EXPANSIONS
                .iter()
                .map(|(from, to)| (from.to_string(), to.to_string()))
                .collect(),
        }
    }
}

impl NameNormalizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the expansion table (for vendor-specific vocabularies).
    pub fn with_expansions(mut self, expansions: Vec<(String, String)>) -> Self {
        self.expansions = expansions;
        self
    }

    /// Normalize a raw product name.
    pub fn normalize(&self, raw: &str) -> String {
        // pad so word-boundary expansions also hit the string edges
        let mut name = format!(" {} ", raw.trim().to_uppercase());
        for (from, to) in &self.expansions {
            name = name.replace(from, to);
        }
        let name = pack_count_re().replace(name.trim(), "");
        name.split_whitespace().collect::<Vec<_>>().join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uppercases_and_collapses_whitespace() {
        let n = NameNormalizer::new();
        assert_eq!(n.normalize("  brufen   400mg "), "BRUFEN 400MG");
    }

    #[test]
    fn expands_abbreviations() {
        let n = NameNormalizer::new();
        assert_eq!(n.normalize("UL CLEAN gel"), "ULTRA CLEAN GEL");
        assert_eq!(n.normalize("BROMAZEPAM TBL 3MG"), "BROMAZEPAM TABLET 3MG");
        assert_eq!(n.normalize("OMEPRAZOL CPS 20MG"), "OMEPRAZOL CAPSULES 20MG");
    }

    #[test]
    fn strips_trailing_pack_count() {
        let n = NameNormalizer::new();
        assert_eq!(n.normalize("BRUFEN 400MG 30x"), "BRUFEN 400MG");
        // an embedded count is not a pack suffix
        assert_eq!(n.normalize("VITAMIN C 500MG 20x kesica"), "VITAMIN C 500MG 20X KESICA");
    }

    #[test]
    fn custom_expansion_table() {
        let n = NameNormalizer::new()
            .with_expansions(vec![(" SUPP ".into(), " SUPPOSITORIES ".into())]);
        assert_eq!(n.normalize("PARACETAMOL SUPP 125MG"), "PARACETAMOL SUPPOSITORIES 125MG");
        // default table no longer applies
        assert_eq!(n.normalize("BROMAZEPAM TBL 3MG"), "BROMAZEPAM TBL 3MG");
    }
}
