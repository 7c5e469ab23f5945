//! # Hodkit Geometry
//!
//! Turns decoded HOD submeshes into GPU-ready buffers.
//!
//! ## Stages
//! - **Assembly**: collapse each submesh's face lists into one strip run and one list run
//! - **Layout**: concatenate vertex and index data into two blobs with a draw-call table
//! - **Vertex layouts**: attribute descriptions for the known record strides
//!
//! The renderer queries its primitive restart support once and passes it in as a
//! [`RestartCapability`]; nothing here holds global state.

pub mod assembler;
pub mod layout;
pub mod stats;
pub mod vertex;

pub use assembler::{MergedFaceList, MergedSubmesh, PrimitiveAssembler, RESTART_INDEX};
pub use layout::{BufferLayoutBuilder, DrawCall, FlattenedGeometry};
pub use stats::GeometryStats;
pub use vertex::{VertexAttribute, VertexFormat, VertexLayout, VertexSemantic};

use hodkit_format::RawSubmesh;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Geometry errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GeometryError {
    #[error("{blob} blob exceeds u32 offsets at submesh {submesh}: {size} bytes")]
    BufferOverflow {
        blob: &'static str,
        submesh: usize,
        size: usize,
    },
}

/// Result type for geometry operations
pub type GeometryResult<T> = Result<T, GeometryError>;

/// Primitive restart support reported by the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RestartCapability {
    /// No restart index; strips are joined with degenerate triangles
    #[default]
    None,
    /// Core primitive restart
    HardwareRestartIndex,
    /// Vendor extension primitive restart
    VendorRestartIndex,
}

impl RestartCapability {
    /// Whether strips can be separated with [`RESTART_INDEX`]
    pub fn supports_restart(&self) -> bool {
        !matches!(self, Self::None)
    }

    /// Indices inserted between two strip fragments
    pub fn separators_per_join(&self) -> u32 {
        if self.supports_restart() { 1 } else { 2 }
    }
}

/// Merge and flatten decoded submeshes in one call
pub fn build(submeshes: Vec<RawSubmesh>, capability: RestartCapability) -> GeometryResult<FlattenedGeometry> {
    let merged = PrimitiveAssembler::new(capability).merge_all(submeshes);
    BufferLayoutBuilder::new().flatten(merged)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_separators_per_join() {
        assert_eq!(RestartCapability::None.separators_per_join(), 2);
        assert_eq!(RestartCapability::HardwareRestartIndex.separators_per_join(), 1);
        assert_eq!(RestartCapability::VendorRestartIndex.separators_per_join(), 1);
    }

    #[test]
    fn test_default_capability() {
        assert_eq!(RestartCapability::default(), RestartCapability::None);
    }
}
