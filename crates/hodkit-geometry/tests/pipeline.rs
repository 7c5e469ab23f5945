//! End-to-end decoding of small containers into flattened geometry.

use hodkit_format::{
    ChunkReader, ChunkWriter, DecodeConfig, FormatError, GROUP_TAG, MeshBlockWriter, PrimitiveCodes,
    PrimitiveKind, Tag,
};
use hodkit_geometry::{DrawCall, RestartCapability, build};

fn container(block: MeshBlockWriter) -> Vec<u8> {
    ChunkWriter::new()
        .container(
            Tag(*b"FORM"),
            GROUP_TAG,
            ChunkWriter::new().mesh(&block, PrimitiveCodes::default()),
        )
        .finish()
}

fn two_strips() -> Vec<u8> {
    container(
        MeshBlockWriter::new(5, vec![0; 6 * 20])
            .face_list(PrimitiveKind::TriangleStrip, &[0, 1, 2])
            .face_list(PrimitiveKind::TriangleStrip, &[3, 4, 5]),
    )
}

fn indices(blob: &[u8]) -> Vec<u16> {
    blob.chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect()
}

#[test]
fn single_triangle_list() {
    let bytes = container(
        MeshBlockWriter::new(5, vec![0x7F; 4 * 20]).face_list(PrimitiveKind::TriangleList, &[0, 1, 2]),
    );
    let submeshes = ChunkReader::default().parse(&bytes).unwrap();
    let out = build(submeshes, RestartCapability::None).unwrap();

    assert_eq!(out.index_blob, vec![0x00, 0x00, 0x01, 0x00, 0x02, 0x00]);
    assert_eq!(out.vertex_blob, vec![0x7F; 80]);
    assert_eq!(
        out.draw_calls,
        vec![DrawCall {
            kind: PrimitiveKind::TriangleList,
            index_count: 3,
            vertex_blob_offset: 0,
            index_blob_offset: 0,
            vertex_stride: 20,
            submesh: 0,
        }]
    );
}

#[test]
fn strips_joined_with_degenerate_triangles() {
    let submeshes = ChunkReader::default().parse(&two_strips()).unwrap();
    let out = build(submeshes, RestartCapability::None).unwrap();

    assert_eq!(indices(&out.index_blob), vec![0, 1, 2, 2, 3, 3, 4, 5]);
    assert_eq!(out.draw_calls.len(), 1);
    assert_eq!(out.draw_calls[0].kind, PrimitiveKind::TriangleStrip);
    assert_eq!(out.draw_calls[0].index_count, 8);
}

#[test]
fn strips_joined_with_restart_index() {
    let submeshes = ChunkReader::default().parse(&two_strips()).unwrap();
    let out = build(submeshes, RestartCapability::HardwareRestartIndex).unwrap();

    assert_eq!(indices(&out.index_blob), vec![0, 1, 2, 0xFFFF, 3, 4, 5]);
    assert_eq!(out.draw_calls[0].index_count, 7);
}

#[test]
fn oversized_chunk_yields_no_submeshes() {
    let mut bytes = two_strips();
    bytes.truncate(bytes.len() - 1);

    let result = ChunkReader::default().parse(&bytes);
    assert!(matches!(result, Err(FormatError::TruncatedContainer { offset: 0, .. })));
}

#[test]
fn swapped_codes_round_trip() {
    let block = MeshBlockWriter::new(5, vec![0; 60])
        .face_list(PrimitiveKind::TriangleStrip, &[0, 1, 2])
        .face_list(PrimitiveKind::TriangleList, &[2, 1, 0]);
    let bytes = ChunkWriter::new()
        .mesh(&block, PrimitiveCodes::SWAPPED)
        .finish();

    let reader = ChunkReader::new(DecodeConfig {
        primitive_codes: PrimitiveCodes::SWAPPED,
        ..Default::default()
    })
    .unwrap();
    let out = build(reader.parse(&bytes).unwrap(), RestartCapability::None).unwrap();

    let kinds: Vec<_> = out.draw_calls.iter().map(|d| d.kind).collect();
    assert_eq!(kinds, vec![PrimitiveKind::TriangleStrip, PrimitiveKind::TriangleList]);
    assert_eq!(indices(&out.index_blob), vec![0, 1, 2, 2, 1, 0]);
}

#[test]
fn submeshes_keep_declaration_order() {
    let mut group = ChunkWriter::new();
    for material in 0..4u8 {
        let block = MeshBlockWriter::new(5, vec![material; 3 * 20])
            .material(u32::from(material))
            .face_list(PrimitiveKind::TriangleList, &[0, 1, 2]);
        group = group.mesh(&block, PrimitiveCodes::default());
    }
    let bytes = ChunkWriter::new()
        .container(Tag(*b"FORM"), GROUP_TAG, group)
        .finish();

    let reader = ChunkReader::new(DecodeConfig {
        parallel: true,
        ..Default::default()
    })
    .unwrap();
    let out = build(reader.parse(&bytes).unwrap(), RestartCapability::VendorRestartIndex).unwrap();

    let vertex_offsets: Vec<_> = out.draw_calls.iter().map(|d| d.vertex_blob_offset).collect();
    assert_eq!(vertex_offsets, vec![0, 60, 120, 180]);
    for call in &out.draw_calls {
        let first = out.vertex_blob[call.vertex_blob_offset as usize];
        assert_eq!(u32::from(first), call.submesh);
    }
}
