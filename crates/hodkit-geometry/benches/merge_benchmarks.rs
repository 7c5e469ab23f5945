//! Merge Benchmarks
//!
//! Strip joining and buffer flattening over synthetic submeshes

use std::hint::black_box;

use criterion::{BatchSize, BenchmarkId, Criterion, criterion_group, criterion_main};
use hodkit_format::{PrimitiveKind, RawFaceList, RawSubmesh};
use hodkit_geometry::{BufferLayoutBuilder, PrimitiveAssembler, RestartCapability};

fn submesh(fragments: usize) -> RawSubmesh {
    let face_lists = (0..fragments)
        .map(|i| {
            let base = (i * 16) as u16;
            let strip: Vec<u16> = (base..base + 16).collect();
            if i % 4 == 3 {
                RawFaceList::from_indices(PrimitiveKind::TriangleList, &strip[..15])
            } else {
                RawFaceList::from_indices(PrimitiveKind::TriangleStrip, &strip)
            }
        })
        .collect();

    RawSubmesh {
        format_version: 1400,
        lod: 0,
        mesh_count: 1,
        material_id: 0,
        vertex_record_size: 5,
        vertex_count: (fragments * 16) as u32,
        vertex_blob: vec![0; fragments * 16 * 20],
        face_lists,
    }
}

fn bench_merge(c: &mut Criterion) {
    let mut group = c.benchmark_group("merge");

    for fragments in [4, 64, 1024].iter() {
        for capability in [RestartCapability::None, RestartCapability::HardwareRestartIndex] {
            let assembler = PrimitiveAssembler::new(capability);
            group.bench_with_input(
                BenchmarkId::new(format!("{capability:?}"), fragments),
                fragments,
                |b, &fragments| {
                    b.iter_batched(
                        || submesh(fragments),
                        |raw| black_box(assembler.merge(raw)),
                        BatchSize::SmallInput,
                    );
                },
            );
        }
    }

    group.finish();
}

fn bench_flatten(c: &mut Criterion) {
    let mut group = c.benchmark_group("flatten");

    for count in [16, 256].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(count), count, |b, &count| {
            let assembler = PrimitiveAssembler::new(RestartCapability::None);
            b.iter_batched(
                || assembler.merge_all((0..count).map(|_| submesh(8)).collect()),
                |merged| black_box(BufferLayoutBuilder::new().flatten(merged)),
                BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

criterion_group!(benches, bench_merge, bench_flatten);
criterion_main!(benches);
