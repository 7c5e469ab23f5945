//! Geometry statistics.

use hodkit_format::{PrimitiveKind, RawSubmesh};
use serde::Serialize;

use crate::layout::FlattenedGeometry;

/// Counts describing a decoded file before and after merging
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GeometryStats {
    pub submeshes: usize,
    pub vertices: u64,
    pub triangles: u64,
    pub strip_fragments: usize,
    pub list_fragments: usize,
    /// Indices before merging
    pub raw_indices: u64,
    /// Indices after merging, separators included
    pub merged_indices: u64,
    pub draw_calls: usize,
    pub vertex_bytes: usize,
    pub index_bytes: usize,
}

impl GeometryStats {
    /// Count the input side of `raw`
    pub fn from_raw(raw: &[RawSubmesh]) -> Self {
        let mut stats = Self {
            submeshes: raw.len(),
            ..Default::default()
        };
        for submesh in raw {
            stats.vertices += u64::from(submesh.vertex_count);
            stats.triangles += submesh.triangle_count();
            stats.strip_fragments += submesh.face_lists_of(PrimitiveKind::TriangleStrip).count();
            stats.list_fragments += submesh.face_lists_of(PrimitiveKind::TriangleList).count();
            stats.raw_indices += submesh
                .face_lists
                .iter()
                .map(|list| u64::from(list.index_count))
                .sum::<u64>();
        }
        stats
    }

    /// Record the sizes of the flattened output
    pub fn record_output(&mut self, flattened: &FlattenedGeometry) {
        self.merged_indices = flattened.index_count();
        self.draw_calls = flattened.draw_calls.len();
        self.vertex_bytes = flattened.vertex_blob.len();
        self.index_bytes = flattened.index_blob.len();
    }

    /// Indices added by strip separators
    pub fn separator_indices(&self) -> u64 {
        self.merged_indices.saturating_sub(self.raw_indices)
    }
}
