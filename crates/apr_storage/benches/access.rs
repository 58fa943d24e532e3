use apr_storage::prelude::*;
use utilities::data_sets::sphere_levels;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

fn sphere_tree(edge_len: usize) -> ParticleCellTree {
    let (shapes, levels) = sphere_levels(2, edge_len.trailing_zeros() as u8, edge_len);

    ParticleCellTree::from_levels(shapes, levels).unwrap()
}

fn build_access_sphere(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_access_sphere");
    for power in [5, 6, 7].iter() {
        let edge_len = 1 << *power;
        group.bench_with_input(
            BenchmarkId::from_parameter(edge_len),
            &edge_len,
            |b, &edge_len| {
                b.iter_with_setup(|| sphere_tree(edge_len), |tree| ParticleCellAccess::build(&tree));
            },
        );
    }
    group.finish();
}

fn build_parent_access_sphere(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_parent_access_sphere");
    for power in [5, 6, 7].iter() {
        let edge_len = 1 << *power;
        group.bench_with_input(
            BenchmarkId::from_parameter(edge_len),
            &edge_len,
            |b, &edge_len| {
                b.iter_with_setup(
                    || sphere_tree(edge_len),
                    |tree| tree.parent_tree().map(|parents| ParticleCellAccess::build(&parents)),
                );
            },
        );
    }
    group.finish();
}

fn iterate_particles_sphere(c: &mut Criterion) {
    let mut group = c.benchmark_group("iterate_particles_sphere");
    for power in [5, 6, 7].iter() {
        let edge_len = 1 << *power;
        group.bench_with_input(
            BenchmarkId::from_parameter(edge_len),
            &edge_len,
            |b, &edge_len| {
                b.iter_with_setup(
                    || ParticleCellAccess::build(&sphere_tree(edge_len)),
                    |access| {
                        for p in access.iter() {
                            black_box(p);
                        }
                    },
                );
            },
        );
    }
    group.finish();
}

fn query_neighbours_sphere(c: &mut Criterion) {
    let mut group = c.benchmark_group("query_neighbours_sphere");
    for power in [5, 6, 7].iter() {
        let edge_len = 1 << *power;
        group.bench_with_input(
            BenchmarkId::from_parameter(edge_len),
            &edge_len,
            |b, &edge_len| {
                b.iter_with_setup(
                    || ParticleCellAccess::build(&sphere_tree(edge_len)),
                    |access| {
                        for p in access.iter() {
                            black_box(access.all_face_neighbours(p.key));
                        }
                    },
                );
            },
        );
    }
    group.finish();
}

criterion_group!(
    benches,
    build_access_sphere,
    build_parent_access_sphere,
    iterate_particles_sphere,
    query_neighbours_sphere
);
criterion_main!(benches);
