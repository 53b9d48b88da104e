//! Indexed lookup versus table size, and the cost of an indexed update.
//!
//! Lookups should stay flat as the table grows; updates on the persistent
//! driver should grow far slower than on the copy-on-write one.

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use serde_json::json;
use std::hint::black_box;
use treedex_mapper::{
    create_mapper, CowDriver, IndexedTreeMapper, MutableDriver, PersistentDriver, Selector,
    TreeDriver, TreeNode,
};

const SIZES: [usize; 3] = [100, 1_000, 10_000];

fn people(count: usize) -> serde_json::Value {
    let rows: Vec<_> = (0..count)
        .map(|i| json!({"id": i, "name": format!("person_{}", i % 50), "age": i % 90}))
        .collect();
    json!({ "people": rows })
}

fn mapper<D: TreeDriver>(driver: D) -> IndexedTreeMapper<D> {
    create_mapper(driver, vec!["name".to_string()], None, "id").expect("sample tree indexes")
}

fn bench_get(c: &mut Criterion) {
    let mut group = c.benchmark_group("get_by_primary_key");
    for size in SIZES {
        let mutable = mapper(MutableDriver::from_json(people(size)));
        group.bench_with_input(BenchmarkId::new("mutable", size), &size, |b, &size| {
            b.iter(|| black_box(mutable.get("people", size / 2).expect("lookup")))
        });

        let persistent = mapper(PersistentDriver::from_json(people(size)));
        group.bench_with_input(BenchmarkId::new("persistent", size), &size, |b, &size| {
            b.iter(|| black_box(persistent.get("people", size / 2).expect("lookup")))
        });
    }
    group.finish();
}

fn bench_get_by(c: &mut Criterion) {
    let mut group = c.benchmark_group("get_by_secondary_key");
    for size in SIZES {
        let cow = mapper(CowDriver::from_json(people(size)));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| {
                let found = cow.get_by("people", Selector::by("name", "person_7"));
                black_box(found.expect("lookup"))
            })
        });
    }
    group.finish();
}

fn bench_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("update_one");
    for size in SIZES {
        let mut cow = mapper(CowDriver::from_json(people(size)));
        group.bench_with_input(BenchmarkId::new("cow", size), &size, |b, &size| {
            b.iter(|| {
                cow.update_with("people", size / 2, |p| p.with_field("age", 1))
                    .expect("update")
            })
        });

        let mut persistent = mapper(PersistentDriver::from_json(people(size)));
        group.bench_with_input(BenchmarkId::new("persistent", size), &size, |b, &size| {
            b.iter(|| {
                persistent
                    .update_with("people", size / 2, |p| p.with_field("age", 1))
                    .expect("update")
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_get, bench_get_by, bench_update);
criterion_main!(benches);
