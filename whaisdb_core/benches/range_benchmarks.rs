use criterion::{Criterion, criterion_group, criterion_main};
use rand::{Rng, SeedableRng, rngs::StdRng};
use std::hint::black_box;
use whaisdb_core::core::range::{Interval, Range};

fn random_range(rng: &mut StdRng, intervals: usize) -> Range<u32> {
    Range::from_intervals((0..intervals).map(|_| {
        let from = rng.random_range(0..10_000_000u32);
        Interval::new(from, from + rng.random_range(0..500u32))
    }))
}

fn benchmark_range_algebra(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(1);
    let a = random_range(&mut rng, 10_000);
    let b = random_range(&mut rng, 10_000);

    c.bench_function("range_join_10k", |bencher| {
        bencher.iter(|| {
            let mut out = black_box(&a).clone();
            out.join_range(black_box(&b));
            out
        })
    });

    c.bench_function("range_intersect_10k", |bencher| {
        bencher.iter(|| {
            let mut out = black_box(&a).clone();
            out.intersect(black_box(&b));
            out
        })
    });

    c.bench_function("range_complement_10k", |bencher| {
        bencher.iter(|| {
            let mut out = black_box(&a).clone();
            out.complement();
            out
        })
    });

    let values: Vec<u32> = (0..100_000).map(|_| rng.random_range(0..1_000_000u32)).collect();
    c.bench_function("range_from_values_100k", |bencher| {
        bencher.iter(|| Range::from_values(black_box(&values).iter().copied()))
    });
}

criterion_group!(benches, benchmark_range_algebra);
criterion_main!(benches);
