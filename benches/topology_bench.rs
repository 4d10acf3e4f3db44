use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use zone_mesh::prelude::*;
use zone_mesh::topology::builder::build_face_topology;

fn hex_block(n: usize) -> (StructuredBox, PatchSet) {
    let block = structured_box([n + 1; 3], [[0.0; 3], [1.0; 3]]).unwrap();
    let patches = block.side_patches(BcType::Wall).unwrap();
    (block, patches)
}

fn bench_faces(c: &mut Criterion) {
    let mut group = c.benchmark_group("face-topology");
    for &n in &[8usize, 16, 24] {
        let (block, _) = hex_block(n);
        group.bench_with_input(BenchmarkId::new("build", n * n * n), &block, |b, block| {
            b.iter(|| build_face_topology(black_box(block.geometry())).unwrap())
        });
    }
    group.finish();
}

fn bench_zone(c: &mut Criterion) {
    let mut group = c.benchmark_group("zone");
    for &n in &[8usize, 16] {
        let (block, patches) = hex_block(n);
        let opts = ZoneBuildOptions::default();
        group.bench_with_input(BenchmarkId::new("build+geometry", n * n * n), &n, |b, _| {
            b.iter(|| {
                let mut zone = Zone::build(0, block.geometry(), &patches, &opts).unwrap();
                zone.compute_geometry().unwrap();
                black_box(zone)
            })
        });

        let global = Zone::build(0, block.geometry(), &patches, &opts).unwrap();
        let parts: Vec<ZoneId> = (0..global.cell_count()).map(|c| (c % n) * 4 / n).collect();
        group.bench_with_input(BenchmarkId::new("split+exchange", n * n * n), &parts, |b, parts| {
            b.iter(|| {
                let (mut zones, _) = split_zone(&global, parts).unwrap();
                for z in zones.iter_mut() {
                    z.compute_geometry().unwrap();
                }
                synchronize_interfaces(&mut zones).unwrap();
                black_box(exchange_ghost_geometry(&mut zones).unwrap())
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_faces, bench_zone);
criterion_main!(benches);
