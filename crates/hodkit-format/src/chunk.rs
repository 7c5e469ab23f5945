//! Chunk Reader
//!
//! Walks the nested, length-prefixed chunk layout of a HOD file.
//!
//! Each chunk is `outer tag (4) | size (u32 BE) | inner tag (4) | payload`,
//! where `size` counts the inner tag plus the payload. Chunks whose inner
//! tag is a container tag hold further chunks; mesh chunks are handed to the
//! [`MeshBlockDecoder`]; everything else is skipped.

use rayon::prelude::*;
use serde::Serialize;

use crate::config::DecodeConfig;
use crate::mesh::{MeshBlockDecoder, RawSubmesh};
use crate::reader::ByteReader;
use crate::{FormatError, FormatResult, MESH_TAG, Tag};

/// Outer tag plus size field
pub const CHUNK_PREFIX_SIZE: usize = 8;

/// A chunk borrowed from the input buffer
#[derive(Debug, Clone, Copy)]
pub struct ChunkRef<'a> {
    /// Nesting depth, 0 for top-level chunks
    pub depth: usize,
    /// File offset of the outer tag
    pub offset: usize,
    pub outer_tag: Tag,
    pub inner_tag: Tag,
    /// Declared size, including the inner tag
    pub size: u32,
    /// File offset of the first payload byte
    pub payload_offset: usize,
    pub payload: &'a [u8],
    /// Whether the payload was walked as nested chunks
    pub container: bool,
}

/// Summary of one chunk for listings
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChunkInfo {
    pub depth: usize,
    pub offset: usize,
    pub outer_tag: Tag,
    pub inner_tag: Tag,
    pub size: u32,
    pub container: bool,
}

impl From<&ChunkRef<'_>> for ChunkInfo {
    fn from(chunk: &ChunkRef<'_>) -> Self {
        Self {
            depth: chunk.depth,
            offset: chunk.offset,
            outer_tag: chunk.outer_tag,
            inner_tag: chunk.inner_tag,
            size: chunk.size,
            container: chunk.container,
        }
    }
}

/// Recursive reader over a chunk container
#[derive(Debug, Clone)]
pub struct ChunkReader {
    config: DecodeConfig,
    decoder: MeshBlockDecoder,
}

impl ChunkReader {
    /// Create a reader, validating the configuration
    pub fn new(config: DecodeConfig) -> FormatResult<Self> {
        config.validate()?;
        let decoder = MeshBlockDecoder::new(config.primitive_codes)
            .with_required_version(config.required_version);
        Ok(Self { config, decoder })
    }

    /// Get the configuration
    pub fn config(&self) -> &DecodeConfig {
        &self.config
    }

    /// Decode every mesh block in declaration order.
    ///
    /// The whole chunk tree is validated before any block is decoded, and no
    /// submeshes are returned if anything fails.
    pub fn parse(&self, bytes: &[u8]) -> FormatResult<Vec<RawSubmesh>> {
        let blocks = self.mesh_blocks(bytes)?;
        let decode = |chunk: &ChunkRef<'_>| self.decoder.decode_at(chunk.payload, chunk.payload_offset);

        if self.config.parallel {
            blocks.par_iter().map(decode).collect()
        } else {
            blocks.iter().map(decode).collect()
        }
    }

    /// Collect the mesh chunks of `bytes` without decoding them
    pub fn mesh_blocks<'a>(&self, bytes: &'a [u8]) -> FormatResult<Vec<ChunkRef<'a>>> {
        let mut blocks = Vec::new();
        self.walk(bytes, |chunk| {
            if chunk.inner_tag == MESH_TAG {
                blocks.push(*chunk);
            }
        })?;
        Ok(blocks)
    }

    /// List every chunk in pre-order
    pub fn outline(&self, bytes: &[u8]) -> FormatResult<Vec<ChunkInfo>> {
        let mut chunks = Vec::new();
        self.walk(bytes, |chunk| chunks.push(ChunkInfo::from(chunk)))?;
        Ok(chunks)
    }

    /// Visit every chunk, containers before their children
    pub fn walk<'a, F>(&self, bytes: &'a [u8], mut visit: F) -> FormatResult<()>
    where
        F: FnMut(&ChunkRef<'a>),
    {
        self.walk_level(bytes, 0, 0, &mut visit)
    }

    fn walk_level<'a, F>(&self, data: &'a [u8], base: usize, depth: usize, visit: &mut F) -> FormatResult<()>
    where
        F: FnMut(&ChunkRef<'a>),
    {
        let mut reader = ByteReader::new(data, base);
        while !reader.is_empty() {
            let offset = reader.offset();
            if reader.remaining() < CHUNK_PREFIX_SIZE {
                return Err(FormatError::MalformedChunk {
                    offset,
                    reason: "fewer than 8 bytes left for a chunk header",
                });
            }
            let outer_tag = reader.tag()?;
            let size = reader.u32_be()?;

            if size as usize > reader.remaining() {
                return Err(FormatError::TruncatedContainer {
                    offset,
                    declared: size as usize,
                    available: reader.remaining(),
                });
            }
            if size < 4 {
                return Err(FormatError::MalformedChunk {
                    offset,
                    reason: "declared size cannot hold the inner tag",
                });
            }

            let inner_tag = reader.tag()?;
            let payload_offset = reader.offset();
            let payload = reader.take(size as usize - 4)?;
            let container = self.config.container_tags.contains(&inner_tag);

            visit(&ChunkRef {
                depth,
                offset,
                outer_tag,
                inner_tag,
                size,
                payload_offset,
                payload,
                container,
            });

            if container {
                if depth + 1 > self.config.max_depth {
                    return Err(FormatError::NestingTooDeep {
                        offset,
                        max_depth: self.config.max_depth,
                    });
                }
                self.walk_level(payload, payload_offset, depth + 1, visit)?;
            }
        }
        Ok(())
    }
}

impl Default for ChunkReader {
    fn default() -> Self {
        Self {
            config: DecodeConfig::default(),
            decoder: MeshBlockDecoder::default(),
        }
    }
}
