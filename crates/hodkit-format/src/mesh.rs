//! Mesh Blocks
//!
//! Decoding of `BMSH` payloads into raw submeshes.
//!
//! A mesh block starts with a 24-byte header. The version is stored
//! big-endian; every other field in the block is little-endian.
//!
//! | Field | Size |
//! |---|---|
//! | version (BE) | 4 |
//! | lod, mesh count, material, record words, vertex count | 4 each |
//! | vertex records | `record_words * 4 * vertex_count` |
//! | face list count | 2 |
//! | per list: kind code, index count, indices | 4 + 4 + `2 * count` |

use serde::{Deserialize, Serialize};

use crate::reader::ByteReader;
use crate::{FormatError, FormatResult};

/// Size of the fixed mesh block header in bytes
pub const MESH_HEADER_SIZE: usize = 24;

/// Primitive topology of a face list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrimitiveKind {
    /// Independent triangles, three indices each
    TriangleList,
    /// Triangle strip, one new triangle per index after the second
    TriangleStrip,
}

impl PrimitiveKind {
    /// Check whether `index_count` forms whole primitives of this kind
    pub fn accepts(&self, index_count: u32) -> bool {
        match self {
            Self::TriangleList => index_count % 3 == 0,
            Self::TriangleStrip => index_count >= 3,
        }
    }

    /// Number of triangles described by `index_count` indices
    pub fn triangle_count(&self, index_count: u32) -> u32 {
        match self {
            Self::TriangleList => index_count / 3,
            Self::TriangleStrip => index_count.saturating_sub(2),
        }
    }
}

/// Numeric codes identifying each primitive kind on disk.
///
/// Known assets disagree on the assignment, so the table is configurable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrimitiveCodes {
    pub triangle_list: u32,
    pub triangle_strip: u32,
}

impl PrimitiveCodes {
    /// Assignment used by background assets
    pub const BACKGROUND: Self = Self {
        triangle_list: 514,
        triangle_strip: 518,
    };

    /// Assignment with the two codes exchanged
    pub const SWAPPED: Self = Self {
        triangle_list: 518,
        triangle_strip: 514,
    };

    /// Map an on-disk code to a primitive kind
    pub fn kind(&self, code: u32) -> Option<PrimitiveKind> {
        if code == self.triangle_list {
            Some(PrimitiveKind::TriangleList)
        } else if code == self.triangle_strip {
            Some(PrimitiveKind::TriangleStrip)
        } else {
            None
        }
    }

    /// Map a primitive kind to its on-disk code
    pub fn code(&self, kind: PrimitiveKind) -> u32 {
        match kind {
            PrimitiveKind::TriangleList => self.triangle_list,
            PrimitiveKind::TriangleStrip => self.triangle_strip,
        }
    }
}

impl Default for PrimitiveCodes {
    fn default() -> Self {
        Self::BACKGROUND
    }
}

/// One face list as stored in a mesh block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFaceList {
    /// Primitive topology
    pub kind: PrimitiveKind,
    /// Number of 16-bit indices
    pub index_count: u32,
    /// `index_count` little-endian `u16` indices, zero-based
    pub index_blob: Vec<u8>,
}

impl RawFaceList {
    /// Build a face list from decoded indices
    pub fn from_indices(kind: PrimitiveKind, indices: &[u16]) -> Self {
        Self {
            kind,
            index_count: indices.len() as u32,
            index_blob: indices.iter().flat_map(|i| i.to_le_bytes()).collect(),
        }
    }

    /// Iterate the indices
    pub fn indices(&self) -> impl DoubleEndedIterator<Item = u16> + ExactSizeIterator + '_ {
        self.index_blob
            .chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
    }

    /// Number of triangles this list draws
    pub fn triangle_count(&self) -> u32 {
        self.kind.triangle_count(self.index_count)
    }
}

/// A decoded mesh block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawSubmesh {
    /// Block version, read big-endian
    pub format_version: u32,
    /// Level of detail
    pub lod: u32,
    /// Mesh count declared by the block
    pub mesh_count: u32,
    /// Material index
    pub material_id: u32,
    /// Vertex record size in 4-byte words
    pub vertex_record_size: u32,
    /// Number of vertex records
    pub vertex_count: u32,
    /// Raw vertex records, `vertex_record_size * 4 * vertex_count` bytes
    pub vertex_blob: Vec<u8>,
    /// Face lists in declaration order
    pub face_lists: Vec<RawFaceList>,
}

impl RawSubmesh {
    /// Vertex record stride in bytes
    pub fn vertex_stride(&self) -> u32 {
        self.vertex_record_size * 4
    }

    /// Number of triangles across all face lists
    pub fn triangle_count(&self) -> u64 {
        self.face_lists
            .iter()
            .map(|list| u64::from(list.triangle_count()))
            .sum()
    }

    /// Face lists of one kind, in declaration order
    pub fn face_lists_of(&self, kind: PrimitiveKind) -> impl Iterator<Item = &RawFaceList> {
        self.face_lists.iter().filter(move |list| list.kind == kind)
    }
}

/// Decoder for single mesh block payloads
#[derive(Debug, Clone, Default)]
pub struct MeshBlockDecoder {
    codes: PrimitiveCodes,
    required_version: Option<u32>,
}

impl MeshBlockDecoder {
    /// Create a decoder with the given primitive code table
    pub fn new(codes: PrimitiveCodes) -> Self {
        Self {
            codes,
            required_version: None,
        }
    }

    /// Reject blocks whose version differs from `version`
    pub fn with_required_version(mut self, version: Option<u32>) -> Self {
        self.required_version = version;
        self
    }

    /// Decode a payload that starts at file offset 0
    pub fn decode(&self, payload: &[u8]) -> FormatResult<RawSubmesh> {
        self.decode_at(payload, 0)
    }

    /// Decode a payload located at file offset `base`
    pub fn decode_at(&self, payload: &[u8], base: usize) -> FormatResult<RawSubmesh> {
        let mut reader = ByteReader::new(payload, base);
        if reader.remaining() < MESH_HEADER_SIZE {
            return Err(FormatError::ShortRead {
                offset: base,
                needed: MESH_HEADER_SIZE,
                available: reader.remaining(),
            });
        }

        let format_version = reader.u32_be()?;
        if let Some(expected) = self.required_version {
            if format_version != expected {
                return Err(FormatError::UnsupportedVersion {
                    offset: base,
                    found: format_version,
                    expected,
                });
            }
        }
        let lod = reader.u32_le()?;
        let mesh_count = reader.u32_le()?;
        let material_id = reader.u32_le()?;
        let vertex_record_size = reader.u32_le()?;
        let vertex_count = reader.u32_le()?;

        let vertex_bytes = (vertex_record_size as usize)
            .checked_mul(4)
            .and_then(|stride| stride.checked_mul(vertex_count as usize))
            .ok_or(FormatError::ShortRead {
                offset: reader.offset(),
                needed: usize::MAX,
                available: reader.remaining(),
            })?;
        let vertex_blob = reader.take(vertex_bytes)?.to_vec();

        let list_count = reader.u16_le()?;
        let mut face_lists = Vec::with_capacity(usize::from(list_count));
        for _ in 0..list_count {
            face_lists.push(self.decode_face_list(&mut reader)?);
        }

        Ok(RawSubmesh {
            format_version,
            lod,
            mesh_count,
            material_id,
            vertex_record_size,
            vertex_count,
            vertex_blob,
            face_lists,
        })
    }

    fn decode_face_list(&self, reader: &mut ByteReader<'_>) -> FormatResult<RawFaceList> {
        let offset = reader.offset();
        let code = reader.u32_le()?;
        let index_count = reader.u32_le()?;

        let kind = self
            .codes
            .kind(code)
            .ok_or(FormatError::UnknownPrimitiveKind { offset, code })?;
        if !kind.accepts(index_count) {
            return Err(FormatError::InvalidFaceList {
                offset,
                kind,
                index_count,
            });
        }

        let index_blob = reader.take(index_count as usize * 2)?.to_vec();
        Ok(RawFaceList {
            kind,
            index_count,
            index_blob,
        })
    }
}
