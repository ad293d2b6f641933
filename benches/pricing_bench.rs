use criterion::{Criterion, black_box, criterion_group, criterion_main};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use apoteka::matching::{NameNormalizer, SimilarityScorer};
use apoteka::pricing::{self, RoundingMode};

fn bench_price_compute(c: &mut Criterion) {
    c.bench_function("price_compute", |b| {
        b.iter(|| {
            black_box(pricing::compute(
                black_box(dec!(177.24)),
                black_box(dec!(2.5)),
                black_box(dec!(10)),
                black_box(dec!(18)),
                Decimal::ZERO,
                RoundingMode::End99,
                Decimal::ZERO,
            ))
        });
    });
}

fn bench_price_compute_500_lines(c: &mut Criterion) {
    let prices: Vec<Decimal> = (1..=500).map(|n| Decimal::new(n * 137, 2)).collect();
    c.bench_function("price_compute_500_lines", |b| {
        b.iter(|| {
            for p in &prices {
                black_box(pricing::compute(
                    black_box(*p),
                    dec!(5),
                    dec!(10),
                    dec!(18),
                    Decimal::ZERO,
                    RoundingMode::End99,
                    Decimal::ZERO,
                ));
            }
        });
    });
}

fn bench_name_normalize(c: &mut Criterion) {
    let normalizer = NameNormalizer::new();
    c.bench_function("name_normalize", |b| {
        b.iter(|| black_box(normalizer.normalize(black_box("UL CLEAN pasta za zube 75ml 12x"))));
    });
}

fn bench_similarity_score(c: &mut Criterion) {
    let scorer = SimilarityScorer::new();
    let a = "ULTRA CLEAN PASTE ZA ZUBE 75ML";
    let b_name = "ULTRA CLEAN PASTA ZA ZUBE 75ML 12X";
    c.bench_function("similarity_match", |b| {
        b.iter(|| black_box(scorer.matches(black_box(a), black_box(b_name))));
    });
}

criterion_group!(
    benches,
    bench_price_compute,
    bench_price_compute_500_lines,
    bench_name_normalize,
    bench_similarity_score,
);
criterion_main!(benches);
