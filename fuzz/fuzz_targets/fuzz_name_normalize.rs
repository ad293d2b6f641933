#![no_main]

use libfuzzer_sys::fuzz_target;

use apoteka::matching::{NameNormalizer, SimilarityScorer, dose_signature};

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let normalizer = NameNormalizer::new();
        let normalized = normalizer.normalize(s);
        let _ = dose_signature(&normalized);
        let scorer = SimilarityScorer::new();
        let _ = scorer.matches(&normalized, "BRUFEN 400MG TABLET");
    }
});
