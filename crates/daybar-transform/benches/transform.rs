//! Normalization throughput.
//!
//! Measures [`Transformer::transform`] over batches the size of a few years
//! of daily bars up to a full provider page.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use daybar_transform::{MS_PER_DAY, Transformer};
use daybar_types::{RawBar, Ticker};

const START_MS: i64 = 1_727_740_800_000;

fn synthetic_bars(count: usize) -> Vec<RawBar> {
    let ticker = Ticker::new("AAPL").expect("valid ticker");
    (0..count)
        .map(|i| {
            let drift = (i % 500) as f64 * 0.013;
            let volume = (i % 7 != 0).then_some(1_000_000.0 + i as f64);
            RawBar::new(
                ticker.clone(),
                226.21 + drift,
                229.65 + drift,
                223.74 + drift,
                227.123_456 + drift,
                volume,
                START_MS + i as i64 * MS_PER_DAY,
            )
        })
        .collect()
}

fn bench_transform(c: &mut Criterion) {
    let transformer = Transformer::new();
    let mut group = c.benchmark_group("transform");

    for count in [250, 1_000, 5_000] {
        let bars = synthetic_bars(count);
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &bars, |b, bars| {
            b.iter(|| transformer.transform(black_box(bars)).expect("valid batch"));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_transform);
criterion_main!(benches);
