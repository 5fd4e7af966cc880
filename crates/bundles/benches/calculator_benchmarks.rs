use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use bundlestock_bundles::{
    BundleDefinition, StockSnapshot, achievable_stock, ripple_from_individual_sale, sale_deltas,
};
use bundlestock_core::ProductId;

fn pid(raw: u64) -> ProductId {
    ProductId::new(raw).expect("benchmark ids are positive")
}

/// A catalog of `constituents` products and one bundle per constituent window of 5.
fn fixture(constituents: u64) -> (Vec<BundleDefinition>, StockSnapshot) {
    let snapshot: StockSnapshot = (1..=constituents).map(|id| (pid(id), (id as i64) * 7)).collect();

    let bundles = (1..=constituents.saturating_sub(4))
        .map(|start| {
            let linked: Vec<ProductId> = (start..start + 5).map(pid).collect();
            let quantities = linked.iter().map(|&id| (id, (id.get() % 3 + 1) as i64)).collect();
            BundleDefinition::new(pid(100_000 + start), linked, quantities)
        })
        .collect();

    (bundles, snapshot)
}

fn bench_achievable_stock(c: &mut Criterion) {
    let mut group = c.benchmark_group("achievable_stock");

    for size in [5u64, 50, 500] {
        let snapshot: StockSnapshot = (1..=size).map(|id| (pid(id), 1_000)).collect();
        let linked: Vec<ProductId> = (1..=size).map(pid).collect();
        let quantities = linked.iter().map(|&id| (id, 2)).collect();
        let bundle = BundleDefinition::new(pid(1_000_000), linked, quantities);

        group.throughput(Throughput::Elements(size));
        group.bench_with_input(BenchmarkId::new("constituents", size), &size, |b, _| {
            b.iter(|| achievable_stock(black_box(&bundle), black_box(&snapshot)))
        });
    }

    group.finish();
}

fn bench_sale_paths(c: &mut Criterion) {
    let mut group = c.benchmark_group("sale_paths");
    let (bundles, snapshot) = fixture(1_000);

    group.bench_function("bundle_sale_deltas", |b| {
        b.iter(|| sale_deltas(black_box(&bundles[0]), black_box(3), black_box(&snapshot)))
    });

    group.bench_function("individual_sale_ripple", |b| {
        b.iter(|| {
            ripple_from_individual_sale(
                black_box(pid(500)),
                black_box(3),
                black_box(&bundles),
                black_box(&snapshot),
            )
        })
    });

    group.finish();
}

criterion_group!(benches, bench_achievable_stock, bench_sale_paths);
criterion_main!(benches);
