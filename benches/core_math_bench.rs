use chart_spline::core::{
    ChartPoint, LineSegment, SegmentCollection, SeriesKind, SplineMode, compute_curve,
};
use chart_spline::{SeriesBindings, SeriesConfig, SeriesEngine, SourceChange};
use criterion::{Criterion, criterion_group, criterion_main};
use serde_json::{Value, json};
use std::hint::black_box;

fn wave(len: usize) -> (Vec<f64>, Vec<f64>) {
    let x: Vec<f64> = (0..len).map(|i| i as f64).collect();
    let y = (0..len)
        .map(|i| {
            if i % 97 == 0 {
                f64::NAN
            } else {
                100.0 + (i as f64 * 0.05).sin() * 25.0
            }
        })
        .collect();
    (x, y)
}

fn bench_natural_curve_10k(c: &mut Criterion) {
    let (x, y) = wave(10_000);
    c.bench_function("natural_curve_10k", |b| {
        b.iter(|| compute_curve(black_box(&x), black_box(&y), SplineMode::Natural))
    });
}

fn bench_monotonic_curve_10k(c: &mut Criterion) {
    let (x, y) = wave(10_000);
    c.bench_function("monotonic_curve_10k", |b| {
        b.iter(|| compute_curve(black_box(&x), black_box(&y), SplineMode::Monotonic))
    });
}

fn bench_segment_resync_10k(c: &mut Criterion) {
    let mut segments = SegmentCollection::new();
    segments.sync(10_000, |i| LineSegment {
        start: ChartPoint::new(i as f64, 0.0),
        end: ChartPoint::new(i as f64 + 1.0, 0.0),
        source_item: i,
    });

    c.bench_function("segment_resync_10k", |b| {
        b.iter(|| {
            segments.sync(black_box(10_000), |i| LineSegment {
                start: ChartPoint::new(i as f64, 1.0),
                end: ChartPoint::new(i as f64 + 1.0, 1.0),
                source_item: i,
            })
        })
    });
}

fn bench_deferred_bulk_load_2k(c: &mut Criterion) {
    let records: Vec<Value> = (0..2_000)
        .map(|i| json!({"x": i, "y": (f64::from(i) * 0.1).cos()}))
        .collect();

    c.bench_function("deferred_bulk_load_2k", |b| {
        b.iter(|| {
            let bindings = SeriesBindings::from_paths("x", &["y"]).expect("bindings");
            let mut engine = SeriesEngine::new(SeriesConfig::new(SeriesKind::Spline), bindings)
                .expect("engine init");
            engine.suspend_notifications();
            for (index, item) in records.iter().cloned().enumerate() {
                engine
                    .apply_change(SourceChange::Add { index, item })
                    .expect("add");
            }
            engine.resume_notifications().expect("resume")
        })
    });
}

criterion_group!(
    benches,
    bench_natural_curve_10k,
    bench_monotonic_curve_10k,
    bench_segment_resync_10k,
    bench_deferred_bulk_load_2k
);
criterion_main!(benches);
