//! Decoder configuration.

use serde::{Deserialize, Serialize};

use crate::mesh::PrimitiveCodes;
use crate::{FormatError, FormatResult, GROUP_TAG, Tag};

/// Default ceiling on container nesting
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Settings for [`ChunkReader`](crate::ChunkReader)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecodeConfig {
    /// On-disk codes for each primitive kind
    pub primitive_codes: PrimitiveCodes,
    /// Inner tags whose payload is a nested chunk sequence
    pub container_tags: Vec<Tag>,
    /// Maximum container nesting depth
    pub max_depth: usize,
    /// Reject mesh blocks with any other version
    pub required_version: Option<u32>,
    /// Decode mesh blocks on the rayon pool
    pub parallel: bool,
}

impl Default for DecodeConfig {
    fn default() -> Self {
        Self {
            primitive_codes: PrimitiveCodes::default(),
            container_tags: vec![GROUP_TAG],
            max_depth: DEFAULT_MAX_DEPTH,
            required_version: None,
            parallel: false,
        }
    }
}

impl DecodeConfig {
    /// Check the settings for contradictions
    pub fn validate(&self) -> FormatResult<()> {
        let codes = self.primitive_codes;
        if codes.triangle_list == codes.triangle_strip {
            return Err(FormatError::InvalidConfig(format!(
                "primitive code {} assigned to both kinds",
                codes.triangle_list
            )));
        }
        if self.max_depth == 0 {
            return Err(FormatError::InvalidConfig(
                "max_depth must be at least 1".to_string(),
            ));
        }
        if self.container_tags.contains(&crate::MESH_TAG) {
            return Err(FormatError::InvalidConfig(
                "mesh tag cannot be a container".to_string(),
            ));
        }
        Ok(())
    }
}
