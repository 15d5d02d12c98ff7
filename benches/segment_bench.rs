use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

use planar_mesh::prelude::*;

fn arc() -> Segment {
    let anchors: Vec<[f64; 2]> = (0..9)
        .map(|i| {
            let a = i as f64 * std::f64::consts::PI / 16.0;
            [a.cos(), a.sin()]
        })
        .collect();
    Segment::new("arc", &anchors, InterpKind::CubicSpline).expect("segment")
}

fn bench_mesh_segment(c: &mut Criterion) {
    let mut group = c.benchmark_group("mesh_segment");
    let euclidean = Euclidean::new(2);
    let graded = TensorMetric::new(
        |p| {
            let h = 1.0 + 4.0 * p[0] * p[0];
            [[h, 0.0], [0.0, h]]
        },
        3,
    );

    for &np in &[8usize, 32] {
        group.bench_with_input(BenchmarkId::new("euclidean", np), &np, |b, &np| {
            b.iter(|| {
                let mut seg = arc();
                let out = mesh_segment(&mut seg, &euclidean, np, &RemeshOptions::default());
                black_box(out.expect("mesh_segment"));
            });
        });

        group.bench_with_input(BenchmarkId::new("graded", np), &np, |b, &np| {
            b.iter(|| {
                let mut seg = arc();
                let out = mesh_segment(&mut seg, &graded, np, &RemeshOptions::default());
                black_box(out.expect("mesh_segment"));
            });
        });
    }

    group.finish();
}

fn bench_locate(c: &mut Criterion) {
    let opts = MeshBuildOptions {
        build_connectivity: true,
        ..Default::default()
    };
    let mut mesh = structured_triangles(32, 32, [0.0, 0.0], [1.0, 1.0], &opts).expect("grid");
    compute_face_properties(&mut mesh).expect("face properties");

    c.bench_function("locate_corner_to_corner", |b| {
        b.iter(|| {
            let found = locate(&mesh, ElementId::new(0), black_box([0.987, 0.973]));
            black_box(found.expect("locate"));
        });
    });
}

criterion_group!(benches, bench_mesh_segment, bench_locate);
criterion_main!(benches);
