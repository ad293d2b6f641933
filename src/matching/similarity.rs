use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

fn dose_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\d+(?:[.,]\d+)?)\s*(MCG|MG|ML|IU|G|L|%)").unwrap())
}

/// Extract the dose/strength signature of a normalized product name:
/// every number-unit pair, e.g. `"BRUFEN 400MG 30X"` → `["400MG"]`.
/// Names without a recognizable dose return an empty signature.
pub fn dose_signature(normalized_name: &str) -> Vec<String> {
    dose_re()
        .captures_iter(normalized_name)
        .map(|cap| format!("{}{}", cap[1].replace(',', "."), &cap[2]))
        .collect()
}

/// Token-set similarity scorer with a dose-signature gate.
///
/// Two names match when their token-set Jaccard similarity reaches the
/// threshold *and* their dose signatures do not contradict each other —
/// "DRUG 250MG" must never be conflated with "DRUG 500MG" no matter how
/// similar the rest of the name is.
#[derive(Debug, Clone)]
pub struct SimilarityScorer {
    threshold: f64,
}

impl Default for SimilarityScorer {
    fn default() -> Self {
        Self { threshold: 0.8 }
    }
}

impl SimilarityScorer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the Jaccard threshold (default 0.8).
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Token-set Jaccard similarity of two normalized names.
    pub fn score(&self, a: &str, b: &str) -> f64 {
        let ta: HashSet<&str> = a.split_whitespace().collect();
        let tb: HashSet<&str> = b.split_whitespace().collect();
        let union = ta.union(&tb).count();
        if union == 0 {
            return 0.0;
        }
        ta.intersection(&tb).count() as f64 / union as f64
    }

    /// Whether two dose signatures are compatible: equal, or at least one
    /// of the names carries no extractable dose.
    pub fn doses_compatible(&self, a: &str, b: &str) -> bool {
        let da = dose_signature(a);
        let db = dose_signature(b);
        da.is_empty() || db.is_empty() || da == db
    }

    /// Decide whether two normalized names refer to the same product.
    pub fn matches(&self, a: &str, b: &str) -> bool {
        if a.is_empty() || b.is_empty() {
            return false;
        }
        if !self.doses_compatible(a, b) {
            return false;
        }
        if a == b {
            return true;
        }
        // one-word names are too ambiguous for fuzzy matching
        if a.split_whitespace().count() < 2 || b.split_whitespace().count() < 2 {
            return false;
        }
        self.score(a, b) >= self.threshold
    }
}
