//! Container Encoding
//!
//! Writers producing the chunk layout understood by [`ChunkReader`](crate::ChunkReader).
//! Used to author fixtures for tests and benchmarks.

use crate::mesh::{PrimitiveCodes, PrimitiveKind};
use crate::{EXPECTED_MESH_VERSION, MESH_TAG, Tag};

/// Builder for a sequence of sibling chunks
#[derive(Debug, Clone, Default)]
pub struct ChunkWriter {
    bytes: Vec<u8>,
}

impl ChunkWriter {
    /// Create an empty chunk sequence
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a leaf chunk
    pub fn chunk(mut self, outer: Tag, inner: Tag, payload: &[u8]) -> Self {
        self.bytes.extend_from_slice(&outer.0);
        self.bytes
            .extend_from_slice(&((payload.len() + 4) as u32).to_be_bytes());
        self.bytes.extend_from_slice(&inner.0);
        self.bytes.extend_from_slice(payload);
        self
    }

    /// Append a container chunk holding `children`
    pub fn container(self, outer: Tag, inner: Tag, children: ChunkWriter) -> Self {
        self.chunk(outer, inner, &children.bytes)
    }

    /// Append an encoded mesh block under the `NRML` form tag
    pub fn mesh(self, block: &MeshBlockWriter, codes: PrimitiveCodes) -> Self {
        self.chunk(Tag(*b"NRML"), MESH_TAG, &block.encode(codes))
    }

    /// Finish and return the encoded bytes
    pub fn finish(self) -> Vec<u8> {
        self.bytes
    }
}

/// Builder for a single mesh block payload
#[derive(Debug, Clone)]
pub struct MeshBlockWriter {
    version: u32,
    lod: u32,
    mesh_count: u32,
    material_id: u32,
    record_words: u32,
    vertex_blob: Vec<u8>,
    face_lists: Vec<(PrimitiveKind, Vec<u16>)>,
}

impl MeshBlockWriter {
    /// Create a block with `record_words`-word vertex records.
    ///
    /// The vertex count is derived from the blob length, which should be a
    /// multiple of the record size.
    pub fn new(record_words: u32, vertex_blob: Vec<u8>) -> Self {
        Self {
            version: EXPECTED_MESH_VERSION,
            lod: 0,
            mesh_count: 1,
            material_id: 0,
            record_words,
            vertex_blob,
            face_lists: Vec::new(),
        }
    }

    pub fn version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }

    pub fn lod(mut self, lod: u32) -> Self {
        self.lod = lod;
        self
    }

    pub fn material(mut self, material_id: u32) -> Self {
        self.material_id = material_id;
        self
    }

    /// Append a face list
    pub fn face_list(mut self, kind: PrimitiveKind, indices: &[u16]) -> Self {
        self.face_lists.push((kind, indices.to_vec()));
        self
    }

    /// Encode the block with the given primitive code table
    pub fn encode(&self, codes: PrimitiveCodes) -> Vec<u8> {
        let stride = (self.record_words as usize * 4).max(1);
        let vertex_count = (self.vertex_blob.len() / stride) as u32;

        let mut out = Vec::with_capacity(26 + self.vertex_blob.len());
        out.extend_from_slice(&self.version.to_be_bytes());
        for field in [
            self.lod,
            self.mesh_count,
            self.material_id,
            self.record_words,
            vertex_count,
        ] {
            out.extend_from_slice(&field.to_le_bytes());
        }
        out.extend_from_slice(&self.vertex_blob);
        out.extend_from_slice(&(self.face_lists.len() as u16).to_le_bytes());
        for (kind, indices) in &self.face_lists {
            out.extend_from_slice(&codes.code(*kind).to_le_bytes());
            out.extend_from_slice(&(indices.len() as u32).to_le_bytes());
            for index in indices {
                out.extend_from_slice(&index.to_le_bytes());
            }
        }
        out
    }
}
