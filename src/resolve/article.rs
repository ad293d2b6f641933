use std::collections::HashMap;

use rusqlite::Connection;
use rust_decimal_macros::dec;
use tracing::{info, warn};

use crate::core::{CatalogArticle, InvoiceLine, Resolution, units};
use crate::matching::{NameNormalizer, SimilarityScorer};
use crate::store::catalog;

/// New article codes are allocated above this offset so they can never
/// collide with legacy hand-assigned codes.
const CODE_BASE_OFFSET: i64 = 2_300_000_000;

/// Catalog names are capped at this length.
const NAME_MAX_LEN: usize = 40;

/// A successful resolution: the catalog identity plus how it was reached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedArticle {
    pub code: String,
    pub name: String,
    pub resolution: Resolution,
}

/// Resolves invoice lines to catalog articles.
///
/// One resolver instance spans one reconcile call: articles it creates are
/// remembered in-memory by barcode and normalized name, so several lines
/// of the same invoice referencing the same new product share one freshly
/// created code instead of creating duplicates.
pub struct ArticleResolver {
    normalizer: NameNormalizer,
    scorer: SimilarityScorer,
    allow_create: bool,
    created_by_barcode: HashMap<String, (String, String)>,
    created_by_name: HashMap<String, (String, String)>,
}

impl ArticleResolver {
    pub fn new(allow_create: bool) -> Self {
        Self {
            normalizer: NameNormalizer::new(),
            scorer: SimilarityScorer::new(),
            allow_create,
            created_by_barcode: HashMap::new(),
            created_by_name: HashMap::new(),
        }
    }

    /// Swap the name normalizer (vendor-specific vocabularies).
    pub fn with_normalizer(mut self, normalizer: NameNormalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    /// Swap the similarity scorer.
    pub fn with_scorer(mut self, scorer: SimilarityScorer) -> Self {
        self.scorer = scorer;
        self
    }

    /// Resolve one line. `Ok(None)` means no match and no creation —
    /// the caller counts the line as skipped.
    pub fn resolve(
        &mut self,
        conn: &Connection,
        prefix: &str,
        line: &InvoiceLine,
    ) -> rusqlite::Result<Option<ResolvedArticle>> {
        let barcode = line.barcode.as_deref().unwrap_or("").trim();
        let supplier_code = line.supplier_code.trim();
        let normalized_name = self.normalizer.normalize(&line.name);

        // Articles created earlier in this same invoice win outright.
        if !barcode.is_empty() {
            if let Some((code, name)) = self.created_by_barcode.get(barcode) {
                return Ok(Some(resolved(code, name, Resolution::Found)));
            }
        }
        if !normalized_name.is_empty() {
            if let Some((code, name)) = self.created_by_name.get(&normalized_name) {
                return Ok(Some(resolved(code, name, Resolution::Found)));
            }
        }

        // 1. Primary barcode, then the leading-zero-stripped variant.
        if !barcode.is_empty() {
            if let Some((code, name)) = catalog::find_by_barcode(conn, prefix, barcode)? {
                return Ok(Some(resolved(&code, &name, Resolution::Found)));
            }
            let stripped = barcode.trim_start_matches('0');
            if !stripped.is_empty() && stripped != barcode {
                if let Some((code, name)) =
                    catalog::find_by_barcode_zeros_stripped(conn, prefix, stripped)?
                {
                    return Ok(Some(resolved(&code, &name, Resolution::Found)));
                }
            }

            // 2. Alternate barcode.
            if let Some((code, name)) = catalog::find_by_alias(conn, prefix, barcode)? {
                return Ok(Some(resolved(&code, &name, Resolution::Found)));
            }
        }

        // 3. Fuzzy name match — also taken when the line has no barcode.
        if let Some((code, name)) = self.fuzzy_match(conn, prefix, &normalized_name)? {
            if !barcode.is_empty() {
                catalog::insert_alias(conn, prefix, &code, barcode)?;
            }
            return Ok(Some(resolved(&code, &name, Resolution::BarcodeAdded)));
        }

        // 4. Supplier item code happens to be an internal code.
        if !supplier_code.is_empty() {
            if let Some((code, name)) = catalog::find_by_code(conn, prefix, supplier_code)? {
                return Ok(Some(resolved(&code, &name, Resolution::SifraFallback)));
            }
        }

        // 5. Auto-create.
        if self.allow_create && (!barcode.is_empty() || !line.name.trim().is_empty()) {
            let created = self.create_article(conn, prefix, line, barcode, supplier_code)?;
            if !barcode.is_empty() {
                self.created_by_barcode
                    .insert(barcode.to_string(), (created.code.clone(), created.name.clone()));
            }
            if !normalized_name.is_empty() {
                self.created_by_name
                    .insert(normalized_name, (created.code.clone(), created.name.clone()));
            }
            return Ok(Some(created));
        }

        warn!(
            barcode = %barcode,
            supplier_code = %supplier_code,
            name = %line.name,
            "no catalog match for invoice line"
        );
        Ok(None)
    }

    /// Walk catalog names similar to the invoice name and take the best
    /// scorer-approved candidate.
    fn fuzzy_match(
        &self,
        conn: &Connection,
        prefix: &str,
        normalized_name: &str,
    ) -> rusqlite::Result<Option<(String, String)>> {
        if normalized_name.is_empty() {
            return Ok(None);
        }
        // prefilter on the most distinctive token to keep the walk short
        let Some(needle) = normalized_name
            .split_whitespace()
            .filter(|t| t.len() >= 3)
            .max_by_key(|t| t.len())
        else {
            return Ok(None);
        };

        let mut best: Option<(f64, (String, String))> = None;
        for (code, name) in catalog::candidates_by_name_token(conn, prefix, needle)? {
            let candidate = self.normalizer.normalize(&name);
            if !self.scorer.matches(normalized_name, &candidate) {
                continue;
            }
            let score = self.scorer.score(normalized_name, &candidate);
            if best.as_ref().is_none_or(|(s, _)| score > *s) {
                best = Some((score, (code, name)));
            }
        }
        Ok(best.map(|(_, hit)| hit))
    }

    fn create_article(
        &self,
        conn: &Connection,
        prefix: &str,
        line: &InvoiceLine,
        barcode: &str,
        supplier_code: &str,
    ) -> rusqlite::Result<ResolvedArticle> {
        let max_code = catalog::max_numeric_code(conn, prefix)?;
        let next_code = max_code.unwrap_or(CODE_BASE_OFFSET).max(CODE_BASE_OFFSET) + 1;
        let code = next_code.to_string();

        let name: String = line.name.trim().chars().take(NAME_MAX_LEN).collect();
        let name = if name.is_empty() { "UNKNOWN".to_string() } else { name };
        let note = if supplier_code.is_empty() {
            "AUTO-REG from XML".to_string()
        } else {
            format!("AUTO-REG from supplier sifra={supplier_code}")
        };

        let article = CatalogArticle {
            code: code.clone(),
            name: name.clone(),
            unit: units::infer_unit(&name).to_string(),
            kind: "LEK".to_string(),
            vat_class: units::infer_vat_class(&name, line.vat_pct),
            barcode: (!barcode.is_empty()).then(|| barcode.to_string()),
            note: Some(note),
            pack_size: dec!(1),
            min_stock: dec!(10),
            margin_pct: Some(dec!(25)),
        };
        catalog::insert_article(conn, prefix, &article)?;

        // the supplier's own code is worth remembering as an alias
        if !supplier_code.is_empty() && supplier_code != barcode {
            catalog::insert_alias(conn, prefix, &code, supplier_code)?;
        }

        info!(code = %code, name = %name, "new article created from invoice line");
        Ok(ResolvedArticle {
            code,
            name,
            resolution: Resolution::Created,
        })
    }
}

fn resolved(code: &str, name: &str, resolution: Resolution) -> ResolvedArticle {
    ResolvedArticle {
        code: code.to_string(),
        name: name.to_string(),
        resolution,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::VatClass;
    use crate::store::Store;
    use rust_decimal::Decimal;

    fn line(barcode: Option<&str>, supplier_code: &str, name: &str) -> InvoiceLine {
        InvoiceLine {
            supplier_code: supplier_code.to_string(),
            barcode: barcode.map(String::from),
            name: name.to_string(),
            quantity: Decimal::ONE,
            purchase_price: dec!(100),
            discount_pct: Decimal::ZERO,
            vat_pct: Some(dec!(10)),
            batch: None,
            expiry: None,
        }
    }

    fn seed(conn: &Connection, code: &str, name: &str, barcode: Option<&str>) {
        let article = CatalogArticle {
            code: code.to_string(),
            name: name.to_string(),
            unit: "KOM".to_string(),
            kind: "LEK".to_string(),
            vat_class: VatClass::Opo,
            barcode: barcode.map(String::from),
            note: None,
            pack_size: dec!(1),
            min_stock: dec!(0),
            margin_pct: None,
        };
        catalog::insert_article(conn, "main.", &article).unwrap();
    }

    #[test]
    fn primary_barcode_wins_over_fuzzy_name() {
        let store = Store::open_in_memory().unwrap();
        let conn = store.conn();
        seed(conn, "100", "BRUFEN 400MG TABLET", Some("8600097012345"));
        seed(conn, "200", "BRUFEN 400MG TABLET A10", None);

        let mut resolver = ArticleResolver::new(true);
        let hit = resolver
            .resolve(conn, "main.", &line(Some("8600097012345"), "", "BRUFEN 400MG TABLET A10"))
            .unwrap()
            .unwrap();
        assert_eq!(hit.code, "100");
        assert_eq!(hit.resolution, Resolution::Found);
    }

    #[test]
    fn fuzzy_name_adds_alias_barcode() {
        let store = Store::open_in_memory().unwrap();
        let conn = store.conn();
        seed(conn, "100", "ULTRA CLEAN GEL ZA ZUBE 50ML", Some("111"));

        let mut resolver = ArticleResolver::new(true);
        let hit = resolver
            .resolve(conn, "main.", &line(Some("999"), "S-1", "UL CLEAN GEL ZA ZUBE 50ML"))
            .unwrap()
            .unwrap();
        assert_eq!(hit.code, "100");
        assert_eq!(hit.resolution, Resolution::BarcodeAdded);

        // the new barcode now resolves through the alias table
        let mut second = ArticleResolver::new(true);
        let again = second
            .resolve(conn, "main.", &line(Some("999"), "", "something else entirely"))
            .unwrap()
            .unwrap();
        assert_eq!(again.code, "100");
        assert_eq!(again.resolution, Resolution::Found);
    }

    #[test]
    fn fuzzy_name_runs_without_barcode() {
        let store = Store::open_in_memory().unwrap();
        let conn = store.conn();
        seed(conn, "100", "PARACETAMOL SIRUP 120MG", None);

        let mut resolver = ArticleResolver::new(false);
        let hit = resolver
            .resolve(conn, "main.", &line(None, "", "PARACETAMOL SIRUP 120MG 30x"))
            .unwrap()
            .unwrap();
        assert_eq!(hit.code, "100");
        assert_eq!(hit.resolution, Resolution::BarcodeAdded);
    }

    #[test]
    fn different_dose_does_not_fuzzy_match() {
        let store = Store::open_in_memory().unwrap();
        let conn = store.conn();
        seed(conn, "100", "BRUFEN TABLET 250MG", None);

        let mut resolver = ArticleResolver::new(false);
        let hit = resolver
            .resolve(conn, "main.", &line(None, "", "BRUFEN TABLET 500MG"))
            .unwrap();
        assert!(hit.is_none());
    }

    #[test]
    fn supplier_code_fallback() {
        let store = Store::open_in_memory().unwrap();
        let conn = store.conn();
        seed(conn, "7011", "GAZA STERILNA", None);

        let mut resolver = ArticleResolver::new(false);
        let hit = resolver
            .resolve(conn, "main.", &line(None, "7011", "NEKI SASVIM DRUGI NAZIV"))
            .unwrap()
            .unwrap();
        assert_eq!(hit.code, "7011");
        assert_eq!(hit.resolution, Resolution::SifraFallback);
    }

    #[test]
    fn auto_create_allocates_above_base_offset() {
        let store = Store::open_in_memory().unwrap();
        let conn = store.conn();
        seed(conn, "7011", "GAZA STERILNA", None);

        let mut resolver = ArticleResolver::new(true);
        let hit = resolver
            .resolve(conn, "main.", &line(Some("555"), "S-9", "NOVI LEK AMPULA 5MG"))
            .unwrap()
            .unwrap();
        assert_eq!(hit.code, "2300000001");
        assert_eq!(hit.resolution, Resolution::Created);

        // inferred unit and supplier-code alias
        let unit: String = conn
            .query_row(
                "SELECT unit FROM main.catalog_article WHERE code='2300000001'",
                [],
                |r| r.get(0),
            )
            .unwrap();
        assert_eq!(unit, "AMP");
        let alias_hit = catalog::find_by_alias(conn, "main.", "S-9").unwrap();
        assert_eq!(alias_hit.unwrap().0, "2300000001");
    }

    #[test]
    fn created_articles_deduplicate_within_one_run() {
        let store = Store::open_in_memory().unwrap();
        let conn = store.conn();

        let mut resolver = ArticleResolver::new(true);
        let first = resolver
            .resolve(conn, "main.", &line(Some("555"), "", "NOVI LEK 5MG"))
            .unwrap()
            .unwrap();
        let second = resolver
            .resolve(conn, "main.", &line(Some("555"), "", "NOVI LEK 5MG"))
            .unwrap()
            .unwrap();
        assert_eq!(first.resolution, Resolution::Created);
        assert_eq!(first.code, second.code);

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM main.catalog_article", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn not_found_when_create_disabled() {
        let store = Store::open_in_memory().unwrap();
        let conn = store.conn();

        let mut resolver = ArticleResolver::new(false);
        let hit = resolver
            .resolve(conn, "main.", &line(Some("555"), "S-9", "NOVI LEK 5MG"))
            .unwrap();
        assert!(hit.is_none());
    }
}
