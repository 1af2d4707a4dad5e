use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use chrono::{Duration, Utc};
use vanstock_core::ItemId;
use vanstock_inventory::{
    AssemblyLedger, AssemblyRequest, ConsumptionRequest, InMemoryAssemblyLedger, InMemoryCatalog,
    Item, ItemDraft, Price, ShortfallPolicy, StockLedgerEngine, compute_reorder_quantities,
};

fn catalog_of(size: usize) -> InMemoryCatalog {
    let items = (0..size).map(|i| {
        Item::restore(
            ItemId::new(i.to_string()),
            &ItemDraft {
                name: format!("Artikel {i}"),
                article_number: format!("ART-{i}"),
                list_price: Price::from_cents(1_000),
                target_stock: 100,
                increment_step: 1,
            },
            u32::MAX / 2,
        )
        .expect("valid bench item")
    });
    InMemoryCatalog::from_items(items).expect("unique ids")
}

fn request_for(lines: usize) -> ConsumptionRequest {
    (0..lines).map(|i| (ItemId::new(i.to_string()), 1)).collect()
}

fn bench_apply_assembly(c: &mut Criterion) {
    let mut group = c.benchmark_group("apply_assembly");
    let engine = StockLedgerEngine::new(ShortfallPolicy::ExcludeLine);

    for lines in [1usize, 10, 100].iter() {
        group.throughput(Throughput::Elements(*lines as u64));
        group.bench_with_input(BenchmarkId::from_parameter(lines), lines, |b, &lines| {
            let mut catalog = catalog_of(500);
            let mut ledger = InMemoryAssemblyLedger::new();
            let request = AssemblyRequest::new("AU-BENCH", request_for(lines));

            b.iter(|| {
                let receipt = engine
                    .apply_assembly(black_box(&request), &mut catalog, &mut ledger)
                    .expect("apply");
                black_box(receipt);
            });
        });
    }

    group.finish();
}

fn bench_reorder_with_history(c: &mut Criterion) {
    let mut group = c.benchmark_group("reorder_with_history");

    for assemblies in [10usize, 1_000].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(assemblies), assemblies, |b, &assemblies| {
            let engine = StockLedgerEngine::default();
            let mut catalog = catalog_of(50);
            let mut ledger = InMemoryAssemblyLedger::new();
            let start = Utc::now() - Duration::days(90);
            for n in 0..assemblies {
                let request = AssemblyRequest::new(format!("AU-{n}"), request_for(5))
                    .at(start + Duration::minutes(n as i64));
                engine
                    .apply_assembly(&request, &mut catalog, &mut ledger)
                    .expect("apply");
            }
            let items = catalog_items(&catalog);
            let history = ledger.history();

            b.iter(|| black_box(compute_reorder_quantities(black_box(&items), black_box(&history))));
        });
    }

    group.finish();
}

fn catalog_items(catalog: &InMemoryCatalog) -> Vec<Item> {
    use vanstock_inventory::CatalogStore;
    catalog.list()
}

criterion_group!(benches, bench_apply_assembly, bench_reorder_with_history);
criterion_main!(benches);
