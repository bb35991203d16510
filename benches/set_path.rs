use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use irecord::{FreezePolicy, ImmutableRecord, RecordFactory};
use serde_json::json;

fn make_record(factory: &RecordFactory, width: usize) -> ImmutableRecord {
    // `width` top-level siblings plus one nested branch that gets rewritten.
    let mut fields = serde_json::Map::new();
    for i in 0..width {
        fields.insert(format!("k{i}"), json!({"v": i, "inner": {"x": i}}));
    }
    fields.insert("d".to_string(), json!({"a": {"b": {"c": 10}}}));
    factory.create_from_json(serde_json::Value::Object(fields))
}

fn bench_set(c: &mut Criterion) {
    let mut group = c.benchmark_group("set");
    for policy in [FreezePolicy::None, FreezePolicy::Shallow, FreezePolicy::Deep] {
        let factory = RecordFactory::with_policy(policy);
        let record = make_record(&factory, 64);

        group.bench_with_input(BenchmarkId::new("top_level", policy), &record, |b, r| {
            b.iter(|| factory.set(r, black_box("k0"), 1).unwrap());
        });

        group.bench_with_input(BenchmarkId::new("nested", policy), &record, |b, r| {
            b.iter(|| factory.set(r, black_box("d.a.b.c"), 50).unwrap());
        });
    }
    group.finish();
}

fn bench_create(c: &mut Criterion) {
    let source = make_record(&RecordFactory::with_policy(FreezePolicy::None), 64);
    c.bench_function("create/deep_from_record", |b| {
        b.iter_batched(
            || make_record(&RecordFactory::with_policy(FreezePolicy::None), 64),
            |fresh| RecordFactory::with_policy(FreezePolicy::Deep).create(Some(&fresh)),
            criterion::BatchSize::SmallInput,
        );
    });
    c.bench_function("create/shallow_copy", |b| {
        b.iter(|| RecordFactory::with_policy(FreezePolicy::None).create(Some(black_box(&source))));
    });
}

criterion_group!(benches, bench_set, bench_create);
criterion_main!(benches);
