//! # Hodkit Format
//!
//! Decoder for the chunked HOD container used by background and mesh assets.
//!
//! ## Layout
//! - **Chunks**: `outer tag`, big-endian size, `inner tag`, payload
//! - **Containers**: chunks whose inner tag is in the container set nest further chunks
//! - **Mesh blocks**: `BMSH` payloads holding one submesh with its face lists
//!
//! Decoding is a pure function over an in-memory buffer. Nothing here performs
//! I/O or logs; every failure is returned as a [`FormatError`].

pub mod chunk;
pub mod config;
pub mod encode;
pub mod mesh;
mod reader;

pub use chunk::{ChunkInfo, ChunkReader, ChunkRef};
pub use config::DecodeConfig;
pub use encode::{ChunkWriter, MeshBlockWriter};
pub use mesh::{MeshBlockDecoder, PrimitiveCodes, PrimitiveKind, RawFaceList, RawSubmesh};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Inner tag of the background group container.
pub const GROUP_TAG: Tag = Tag(*b"BGMS");

/// Inner tag of a basic mesh block.
pub const MESH_TAG: Tag = Tag(*b"BMSH");

/// Mesh block version written by the known toolchain.
pub const EXPECTED_MESH_VERSION: u32 = 1400;

/// Format errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("Truncated container at offset {offset}: chunk declares {declared} bytes, {available} available")]
    TruncatedContainer {
        offset: usize,
        declared: usize,
        available: usize,
    },

    #[error("Malformed chunk at offset {offset}: {reason}")]
    MalformedChunk { offset: usize, reason: &'static str },

    #[error("Short read at offset {offset}: need {needed} bytes, {available} available")]
    ShortRead {
        offset: usize,
        needed: usize,
        available: usize,
    },

    #[error("Unknown primitive kind {code} at offset {offset}")]
    UnknownPrimitiveKind { offset: usize, code: u32 },

    #[error("Invalid {kind:?} face list at offset {offset}: {index_count} indices")]
    InvalidFaceList {
        offset: usize,
        kind: PrimitiveKind,
        index_count: u32,
    },

    #[error("Unsupported mesh version {found} at offset {offset}, expected {expected}")]
    UnsupportedVersion {
        offset: usize,
        found: u32,
        expected: u32,
    },

    #[error("Chunk nesting deeper than {max_depth} at offset {offset}")]
    NestingTooDeep { offset: usize, max_depth: usize },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for format operations
pub type FormatResult<T> = Result<T, FormatError>;

/// Four-byte chunk tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Tag(pub [u8; 4]);

impl Tag {
    /// Create a tag from raw bytes
    pub const fn new(bytes: [u8; 4]) -> Self {
        Self(bytes)
    }
}

impl std::fmt::Display for Tag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for &b in &self.0 {
            let c = if b.is_ascii_graphic() || b == b' ' { b as char } else { '.' };
            write!(f, "{c}")?;
        }
        Ok(())
    }
}

impl TryFrom<String> for Tag {
    type Error = FormatError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let bytes: [u8; 4] = value
            .as_bytes()
            .try_into()
            .map_err(|_| FormatError::InvalidConfig(format!("tag '{value}' is not 4 bytes")))?;
        Ok(Self(bytes))
    }
}

impl From<Tag> for String {
    fn from(tag: Tag) -> Self {
        tag.to_string()
    }
}

/// Decode every mesh block in `bytes` with the default configuration.
pub fn parse(bytes: &[u8]) -> FormatResult<Vec<RawSubmesh>> {
    ChunkReader::new(DecodeConfig::default())?.parse(bytes)
}
