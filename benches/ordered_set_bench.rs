use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

use planar_mesh::prelude::*;

// Multiplicative hash so inserts land all over the set.
fn scrambled(n: usize) -> Vec<u64> {
    (0..n as u64)
        .map(|i| i.wrapping_mul(0x9E37_79B9_7F4A_7C15) >> 40)
        .collect()
}

fn bench_ordered_set(c: &mut Criterion) {
    let mut group = c.benchmark_group("ordered_set");

    for &n in &[1_000usize, 10_000] {
        let keys = scrambled(n);

        group.bench_with_input(BenchmarkId::new("insert", n), &n, |b, _| {
            b.iter(|| {
                let mut set = OrderedSet::new();
                for &k in &keys {
                    set.insert(k, false).expect("insert");
                }
                black_box(set);
            });
        });

        group.bench_with_input(BenchmarkId::new("insert_ranked", n), &n, |b, _| {
            b.iter(|| {
                let mut set = OrderedSet::with_rank_tracking();
                for &k in &keys {
                    set.insert(k, false).expect("insert");
                }
                black_box(set);
            });
        });

        let mut full = OrderedSet::new();
        for &k in &keys {
            full.insert(k, false).expect("insert");
        }
        group.bench_with_input(BenchmarkId::new("contains", n), &n, |b, _| {
            b.iter(|| {
                let hits = keys.iter().filter(|&&k| full.contains(k)).count();
                black_box(hits);
            });
        });
    }

    group.finish();
}

fn bench_connectivity(c: &mut Criterion) {
    let mut group = c.benchmark_group("connectivity");

    for &n in &[16usize, 64] {
        let mesh = structured_triangles(
            n,
            n,
            [0.0, 0.0],
            [1.0, 1.0],
            &MeshBuildOptions::default(),
        )
        .expect("grid");
        group.bench_with_input(BenchmarkId::new("build", n), &n, |b, _| {
            b.iter(|| {
                let mut mesh = mesh.clone();
                build_connectivity(&mut mesh).expect("connectivity");
                black_box(mesh);
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_ordered_set, bench_connectivity);
criterion_main!(benches);
