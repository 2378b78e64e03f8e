//! Benchmarks for universe-wide screening.
//!
//! Run with: `cargo bench -p almanac-screener`

use almanac_data::{MonthlyPriceObservation, PriceIndex};
use almanac_screener::{Screener, ScreenerConfig};
use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use rand::{Rng, SeedableRng, rngs::StdRng};

const YEARS: std::ops::Range<i32> = 2010..2025;

/// Random-walk monthly prices for `n` tickers plus the two benchmarks.
fn generate_universe(n: usize) -> (Vec<String>, PriceIndex) {
    let mut rng = StdRng::seed_from_u64(42);
    let mut tickers: Vec<String> = (0..n).map(|i| format!("T{i:04}")).collect();
    tickers.extend(["SPY".to_string(), "DIA".to_string()]);

    let mut rows = Vec::with_capacity(tickers.len() * 12 * YEARS.len());
    for ticker in &tickers {
        let mut price: f64 = rng.gen_range(10.0..500.0);
        for year in YEARS {
            for month in 1..=12 {
                let open = price;
                price *= 1.0 + rng.gen_range(-0.08..0.08);
                let close_max = open.max(price) * (1.0 + rng.gen_range(0.0..0.03));
                rows.push(
                    MonthlyPriceObservation::new(ticker.as_str(), year, month)
                        .with_open_first(open)
                        .with_close_last(price)
                        .with_close_max(close_max),
                );
            }
        }
    }

    (tickers, PriceIndex::from_observations(rows))
}

fn bench_screen(c: &mut Criterion) {
    let mut group = c.benchmark_group("screen");
    group.sample_size(20);

    let config = ScreenerConfig {
        current_year: Some(2024),
        ..Default::default()
    };
    let screener = Screener::new(config).expect("valid config");

    for size in [50_usize, 200, 800] {
        let (universe, prices) = generate_universe(size);

        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &prices, |b, prices| {
            b.iter(|| screener.screen(black_box(&universe), black_box(prices)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_screen);
criterion_main!(benches);
