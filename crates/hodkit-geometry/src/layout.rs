//! Buffer Layout
//!
//! Flattens merged submeshes into one vertex blob, one index blob and a
//! draw-call table.
//!
//! Draw calls follow submesh declaration order; within a submesh the strip
//! run comes before the list run.

use hodkit_format::PrimitiveKind;
use serde::{Deserialize, Serialize};

use crate::assembler::MergedSubmesh;
use crate::{GeometryError, GeometryResult};

/// One indexed draw over the flattened blobs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawCall {
    pub kind: PrimitiveKind,
    /// Number of `u16` indices to draw
    pub index_count: u32,
    /// Byte offset of the submesh's first vertex record
    pub vertex_blob_offset: u32,
    /// Byte offset of the first index
    pub index_blob_offset: u32,
    /// Vertex record stride in bytes
    pub vertex_stride: u32,
    /// Declaration index of the owning submesh
    pub submesh: u32,
}

impl DrawCall {
    /// Byte offset one past the last index of this call
    pub fn index_blob_end(&self) -> usize {
        self.index_blob_offset as usize + self.index_count as usize * 2
    }
}

/// Flattened geometry ready for upload
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlattenedGeometry {
    pub vertex_blob: Vec<u8>,
    pub index_blob: Vec<u8>,
    pub draw_calls: Vec<DrawCall>,
}

impl FlattenedGeometry {
    /// Total indices referenced by all draw calls
    pub fn index_count(&self) -> u64 {
        self.draw_calls.iter().map(|d| u64::from(d.index_count)).sum()
    }
}

/// Builds [`FlattenedGeometry`] in a single pass
#[derive(Debug, Clone, Default)]
pub struct BufferLayoutBuilder {
    vertex_blob: Vec<u8>,
    index_blob: Vec<u8>,
    draw_calls: Vec<DrawCall>,
    submeshes: usize,
}

impl BufferLayoutBuilder {
    /// Create an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Flatten `submeshes` in order
    pub fn flatten(mut self, submeshes: Vec<MergedSubmesh>) -> GeometryResult<FlattenedGeometry> {
        for submesh in &submeshes {
            self.push(submesh)?;
        }
        Ok(self.finish())
    }

    /// Append one submesh
    pub fn push(&mut self, submesh: &MergedSubmesh) -> GeometryResult<()> {
        let index = self.submeshes;
        let vertex_blob_offset = blob_offset(&self.vertex_blob, submesh.vertex_blob.len(), "vertex", index)?;
        self.vertex_blob.extend_from_slice(&submesh.vertex_blob);

        for face_list in submesh.face_lists() {
            let index_blob_offset = blob_offset(&self.index_blob, face_list.index_blob.len(), "index", index)?;
            self.index_blob.extend_from_slice(&face_list.index_blob);
            self.draw_calls.push(DrawCall {
                kind: face_list.kind,
                index_count: face_list.index_count,
                vertex_blob_offset,
                index_blob_offset,
                vertex_stride: submesh.vertex_stride(),
                submesh: index as u32,
            });
        }

        self.submeshes += 1;
        Ok(())
    }

    /// Finish and return the blobs and draw calls
    pub fn finish(self) -> FlattenedGeometry {
        FlattenedGeometry {
            vertex_blob: self.vertex_blob,
            index_blob: self.index_blob,
            draw_calls: self.draw_calls,
        }
    }
}

/// Current end of `blob` as a `u32`, checking that `extra` more bytes still fit
fn blob_offset(blob: &[u8], extra: usize, name: &'static str, submesh: usize) -> GeometryResult<u32> {
    let end = blob.len().saturating_add(extra);
    if end > u32::MAX as usize {
        return Err(GeometryError::BufferOverflow {
            blob: name,
            submesh,
            size: end,
        });
    }
    Ok(blob.len() as u32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembler::MergedFaceList;
    use proptest::prelude::*;

    fn face_list(kind: PrimitiveKind, indices: &[u16]) -> MergedFaceList {
        MergedFaceList {
            kind,
            index_count: indices.len() as u32,
            index_blob: indices.iter().flat_map(|i| i.to_le_bytes()).collect(),
            fragments: 1,
        }
    }

    fn submesh(vertices: u32, strip: Option<&[u16]>, list: Option<&[u16]>) -> MergedSubmesh {
        MergedSubmesh {
            format_version: 1400,
            lod: 0,
            mesh_count: 1,
            material_id: 0,
            vertex_record_size: 5,
            vertex_count: vertices,
            vertex_blob: vec![0x11; vertices as usize * 20],
            strip: strip.map(|i| face_list(PrimitiveKind::TriangleStrip, i)),
            list: list.map(|i| face_list(PrimitiveKind::TriangleList, i)),
        }
    }

    #[test]
    fn test_single_list() {
        let out = BufferLayoutBuilder::new()
            .flatten(vec![submesh(4, None, Some(&[0, 1, 2]))])
            .unwrap();
        assert_eq!(out.index_blob, vec![0, 0, 1, 0, 2, 0]);
        assert_eq!(out.vertex_blob.len(), 80);
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
    fn test_strip_precedes_list() {
        let out = BufferLayoutBuilder::new()
            .flatten(vec![
                submesh(3, Some(&[0, 1, 2, 1]), Some(&[0, 1, 2])),
                submesh(2, None, Some(&[1, 0, 1])),
            ])
            .unwrap();

        let summary: Vec<_> = out
            .draw_calls
            .iter()
            .map(|d| (d.submesh, d.kind, d.vertex_blob_offset, d.index_blob_offset))
            .collect();
        assert_eq!(
            summary,
            vec![
                (0, PrimitiveKind::TriangleStrip, 0, 0),
                (0, PrimitiveKind::TriangleList, 0, 8),
                (1, PrimitiveKind::TriangleList, 60, 14),
            ]
        );
        assert_eq!(out.index_blob.len(), 20);
        assert_eq!(out.index_count(), 10);
    }

    #[test]
    fn test_submesh_without_faces_keeps_vertices() {
        let out = BufferLayoutBuilder::new()
            .flatten(vec![submesh(2, None, None), submesh(1, None, Some(&[0, 0, 0]))])
            .unwrap();
        assert_eq!(out.draw_calls.len(), 1);
        assert_eq!(out.draw_calls[0].vertex_blob_offset, 40);
        assert_eq!(out.draw_calls[0].submesh, 1);
    }

    #[test]
    fn test_blob_offset_overflow() {
        let err = blob_offset(&[0; 4], u32::MAX as usize, "index", 3).unwrap_err();
        assert_eq!(
            err,
            GeometryError::BufferOverflow {
                blob: "index",
                submesh: 3,
                size: u32::MAX as usize + 4,
            }
        );
        assert_eq!(blob_offset(&[0; 4], 8, "index", 0), Ok(4));
    }

    proptest! {
        #[test]
        fn offsets_increase_and_stay_in_bounds(
            shapes in prop::collection::vec((1u32..16, 0usize..3, 1usize..6), 1..12),
        ) {
            let strip: Vec<u16> = vec![0, 1, 2, 3];
            let submeshes: Vec<_> = shapes
                .iter()
                .map(|&(vertices, which, triangles)| {
                    let list: Vec<u16> = vec![0; triangles * 3];
                    match which {
                        0 => submesh(vertices, Some(strip.as_slice()), None),
                        1 => submesh(vertices, None, Some(list.as_slice())),
                        _ => submesh(vertices, Some(strip.as_slice()), Some(list.as_slice())),
                    }
                })
                .collect();

            let out = BufferLayoutBuilder::new().flatten(submeshes).unwrap();

            for pair in out.draw_calls.windows(2) {
                prop_assert!(pair[1].index_blob_offset > pair[0].index_blob_offset);
                if pair[1].submesh != pair[0].submesh {
                    prop_assert!(pair[1].vertex_blob_offset > pair[0].vertex_blob_offset);
                }
            }
            for call in &out.draw_calls {
                prop_assert!(call.index_blob_end() <= out.index_blob.len());
            }
            prop_assert_eq!(out.index_count() as usize * 2, out.index_blob.len());
        }
    }
}
