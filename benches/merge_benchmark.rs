use cellmerge_rs::distance::fill_distances;
use cellmerge_rs::neighbors::candidate_pairs;
use cellmerge_rs::BarcodeCatalog;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

const BASES: [char; 4] = ['A', 'C', 'G', 'T'];

/// Deterministic catalog of `n` fragments per side
fn catalog(n: usize, len1: usize, len2: usize) -> BarcodeCatalog {
    let fragment = |seed: usize, len: usize| -> String {
        (0..len).map(|i| BASES[(seed * 7 + i * 13 + seed / 4) % 4]).collect()
    };
    BarcodeCatalog::from_fragments(
        (0..n).map(|i| fragment(i, len1)).collect(),
        (0..n).map(|i| fragment(i + n, len2)).collect(),
    )
}

fn bench_fill_distances(c: &mut Criterion) {
    let mut group = c.benchmark_group("fill_distances");

    for n in [96, 384].iter() {
        let cat = catalog(*n, 8, 8);
        group.bench_with_input(BenchmarkId::from_parameter(n), &cat, |b, cat| {
            b.iter(|| black_box(fill_distances("ACGTACGTNACGTACG", 9, cat).unwrap()));
        });
    }

    group.finish();
}

fn bench_candidate_pairs(c: &mut Criterion) {
    let mut group = c.benchmark_group("candidate_pairs");

    for n in [96, 384].iter() {
        let cat = catalog(*n, 8, 8);
        let dists = fill_distances("ACGTACGTNACGTACG", 9, &cat).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(n), &dists, |b, dists| {
            b.iter(|| black_box(candidate_pairs(dists, 2)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_fill_distances, bench_candidate_pairs);
criterion_main!(benches);
