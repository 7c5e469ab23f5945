//! Primitive Assembly
//!
//! Collapses a submesh's face lists into at most one run per primitive kind.
//!
//! Triangle lists concatenate as-is. Strip fragments need a separator so the
//! join does not draw a bridging triangle: a single [`RESTART_INDEX`] when the
//! renderer supports primitive restart, otherwise the last index of the
//! previous fragment followed by the first index of the next one, which forms
//! zero-area triangles the rasterizer drops.

use hodkit_format::{PrimitiveKind, RawFaceList, RawSubmesh};

use crate::RestartCapability;

/// Sentinel index that restarts a strip
pub const RESTART_INDEX: u16 = 0xFFFF;

/// A face list produced by merging fragments of one kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedFaceList {
    pub kind: PrimitiveKind,
    pub index_count: u32,
    /// Little-endian `u16` indices
    pub index_blob: Vec<u8>,
    /// Number of fragments joined into this list
    pub fragments: u32,
}

impl MergedFaceList {
    /// Iterate the indices
    pub fn indices(&self) -> impl DoubleEndedIterator<Item = u16> + ExactSizeIterator + '_ {
        self.index_blob
            .chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
    }
}

/// Submesh with its face lists collapsed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedSubmesh {
    pub format_version: u32,
    pub lod: u32,
    pub mesh_count: u32,
    pub material_id: u32,
    /// Vertex record size in 4-byte words
    pub vertex_record_size: u32,
    pub vertex_count: u32,
    pub vertex_blob: Vec<u8>,
    /// Joined strip fragments, absent when the submesh has none
    pub strip: Option<MergedFaceList>,
    /// Joined list fragments, absent when the submesh has none
    pub list: Option<MergedFaceList>,
}

impl MergedSubmesh {
    /// Vertex record stride in bytes
    pub fn vertex_stride(&self) -> u32 {
        self.vertex_record_size * 4
    }

    /// Present face lists, strip first
    pub fn face_lists(&self) -> impl Iterator<Item = &MergedFaceList> {
        self.strip.iter().chain(self.list.iter())
    }
}

/// Merges face lists for a fixed restart capability
#[derive(Debug, Clone, Copy, Default)]
pub struct PrimitiveAssembler {
    capability: RestartCapability,
}

impl PrimitiveAssembler {
    /// Create an assembler for the renderer's restart capability
    pub fn new(capability: RestartCapability) -> Self {
        Self { capability }
    }

    /// Merge every submesh, preserving order
    pub fn merge_all(&self, submeshes: Vec<RawSubmesh>) -> Vec<MergedSubmesh> {
        submeshes.into_iter().map(|raw| self.merge(raw)).collect()
    }

    /// Merge one submesh
    pub fn merge(&self, raw: RawSubmesh) -> MergedSubmesh {
        let mut strips = Vec::new();
        let mut lists = Vec::new();
        for face_list in raw.face_lists {
            match face_list.kind {
                PrimitiveKind::TriangleStrip => strips.push(face_list),
                PrimitiveKind::TriangleList => lists.push(face_list),
            }
        }

        MergedSubmesh {
            format_version: raw.format_version,
            lod: raw.lod,
            mesh_count: raw.mesh_count,
            material_id: raw.material_id,
            vertex_record_size: raw.vertex_record_size,
            vertex_count: raw.vertex_count,
            vertex_blob: raw.vertex_blob,
            strip: self.join_strips(strips),
            list: join_lists(lists),
        }
    }

    fn join_strips(&self, fragments: Vec<RawFaceList>) -> Option<MergedFaceList> {
        if fragments.len() <= 1 {
            return fragments.into_iter().next().map(passthrough);
        }

        let separators = self.capability.separators_per_join() as usize * (fragments.len() - 1);
        let total = fragments.iter().map(|f| f.index_blob.len()).sum::<usize>() + separators * 2;
        let mut blob = Vec::with_capacity(total);

        let mut previous_last: Option<u16> = None;
        for fragment in &fragments {
            let (Some(first), Some(last)) = (fragment.indices().next(), fragment.indices().next_back())
            else {
                continue;
            };
            if let Some(previous) = previous_last {
                if self.capability.supports_restart() {
                    blob.extend_from_slice(&RESTART_INDEX.to_le_bytes());
                } else {
                    blob.extend_from_slice(&previous.to_le_bytes());
                    blob.extend_from_slice(&first.to_le_bytes());
                }
            }
            blob.extend_from_slice(&fragment.index_blob);
            previous_last = Some(last);
        }

        Some(MergedFaceList {
            kind: PrimitiveKind::TriangleStrip,
            index_count: (blob.len() / 2) as u32,
            index_blob: blob,
            fragments: fragments.len() as u32,
        })
    }
}

fn join_lists(fragments: Vec<RawFaceList>) -> Option<MergedFaceList> {
    if fragments.len() <= 1 {
        return fragments.into_iter().next().map(passthrough);
    }

    let index_blob: Vec<u8> = fragments
        .iter()
        .flat_map(|f| f.index_blob.iter().copied())
        .collect();
    Some(MergedFaceList {
        kind: PrimitiveKind::TriangleList,
        index_count: (index_blob.len() / 2) as u32,
        index_blob,
        fragments: fragments.len() as u32,
    })
}

fn passthrough(only: RawFaceList) -> MergedFaceList {
    MergedFaceList {
        kind: only.kind,
        index_count: only.index_count,
        index_blob: only.index_blob,
        fragments: 1,
    }
}
