//! Benchmarks for the CPU side of the field.
//!
//! Run with: `cargo bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use glam::Vec3;

use particle_field::{DistanceMetric, GeometryKind, ParticleField, ReferencePoint, Settings};

fn built_field(kind: GeometryKind, settings: Settings) -> ParticleField {
    let mut field = ParticleField::new();
    field
        .build(kind, settings)
        .expect("empty field always builds");
    field.set_cursor(Some(Vec3::new(3.0, 2.0, 0.0)));
    field
}

fn bench_sample(c: &mut Criterion) {
    let mut group = c.benchmark_group("geometry_sample");

    for kind in GeometryKind::ALL {
        group.bench_with_input(BenchmarkId::from_parameter(kind), &kind, |b, &kind| {
            b.iter(|| black_box(kind.sample()))
        });
    }

    group.finish();
}

fn bench_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("field_tick");

    for kind in [GeometryKind::Sphere, GeometryKind::TorusKnot] {
        group.bench_with_input(BenchmarkId::new("default", kind), &kind, |b, &kind| {
            let mut field = built_field(kind, Settings::default());
            b.iter(|| {
                field.tick();
                black_box(field.particles().len())
            })
        });
    }

    // Full 3D distance against the live position: the most expensive mode.
    let settings = Settings::default()
        .with_metric(DistanceMetric::Euclidean)
        .with_reference(ReferencePoint::Live);
    group.bench_function("euclidean_live/sphere", |b| {
        let mut field = built_field(GeometryKind::Sphere, settings);
        b.iter(|| field.tick())
    });

    group.finish();
}

fn bench_instances(c: &mut Criterion) {
    let field = built_field(GeometryKind::Sphere, Settings::default());
    c.bench_function("instances/sphere", |b| {
        b.iter(|| black_box(field.instances().count()))
    });
}

criterion_group!(benches, bench_sample, bench_tick, bench_instances);
criterion_main!(benches);
