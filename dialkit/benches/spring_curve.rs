use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use dialkit::prelude::*;

fn bench_spring_curve(c: &mut Criterion) {
    let mut group = c.benchmark_group("spring/curve");

    for (label, spring) in [
        ("simple", SpringConfig::simple(0.3, 0.2)),
        ("advanced", SpringConfig::advanced(200.0, 10.0, 1.0)),
    ] {
        group.bench_with_input(
            BenchmarkId::new("preview", label),
            &spring,
            |b, spring| {
                let mode = spring.implied_mode();
                b.iter(|| black_box(preview_curve(spring, mode)))
            },
        );
    }

    group.finish();
}

fn bench_update_value(c: &mut Criterion) {
    let store = DialStore::new();
    let schema = DialConfigBuilder::new()
        .slider("opacity", 0.5, (0.0, 1.0), 0.01)
        .folder("fx", |fx| fx.slider("blur", 24.0, (0.0, 100.0), 1.0))
        .build();
    store.register_panel("bench", "Bench", schema);
    let _sub = store.subscribe("bench", |_| {});

    let mut i = 0u32;
    c.bench_function("store/update_value", |b| {
        b.iter(|| {
            i = i.wrapping_add(1);
            let value = f64::from(i % 100) / 100.0;
            black_box(store.update_value("bench", "opacity", value))
        })
    });
}

criterion_group!(benches, bench_spring_curve, bench_update_value);
criterion_main!(benches);
