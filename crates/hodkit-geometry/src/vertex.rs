//! Vertex Layouts
//!
//! Attribute descriptions for the vertex record strides found in HOD assets.
//! The decoder never looks inside vertex records; these tell the renderer
//! where to point its attribute bindings.

use serde::{Deserialize, Serialize};

/// What an attribute carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VertexSemantic {
    Position,
    Normal,
    Color,
}

/// Component format of an attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VertexFormat {
    /// Four 32-bit floats
    Float32x4,
    /// Four normalized unsigned bytes
    Unorm8x4,
}

impl VertexFormat {
    /// Size in bytes
    pub fn size(&self) -> u32 {
        match self {
            Self::Float32x4 => 16,
            Self::Unorm8x4 => 4,
        }
    }
}

/// One attribute within a vertex record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VertexAttribute {
    pub semantic: VertexSemantic,
    pub format: VertexFormat,
    /// Byte offset within the record
    pub offset: u32,
}

/// Attribute layout of a vertex record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VertexLayout {
    /// Record stride in bytes
    pub stride: u32,
    pub attributes: Vec<VertexAttribute>,
}

impl VertexLayout {
    /// Layout for a record of `words` 4-byte words, if it is a known one.
    ///
    /// Five-word records are background vertices: position with a unit `w`,
    /// then packed RGBA. Eight-word records carry position and normal, each
    /// followed by a filler that reads as the fourth component.
    pub fn for_record_words(words: u32) -> Option<Self> {
        let attributes = match words {
            5 => vec![
                VertexAttribute {
                    semantic: VertexSemantic::Position,
                    format: VertexFormat::Float32x4,
                    offset: 0,
                },
                VertexAttribute {
                    semantic: VertexSemantic::Color,
                    format: VertexFormat::Unorm8x4,
                    offset: 16,
                },
            ],
            8 => vec![
                VertexAttribute {
                    semantic: VertexSemantic::Position,
                    format: VertexFormat::Float32x4,
                    offset: 0,
                },
                VertexAttribute {
                    semantic: VertexSemantic::Normal,
                    format: VertexFormat::Float32x4,
                    offset: 16,
                },
            ],
            _ => return None,
        };
        Some(Self {
            stride: words * 4,
            attributes,
        })
    }

    /// Find the attribute with `semantic`
    pub fn attribute(&self, semantic: VertexSemantic) -> Option<&VertexAttribute> {
        self.attributes.iter().find(|a| a.semantic == semantic)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_background_layout() {
        let layout = VertexLayout::for_record_words(5).unwrap();
        assert_eq!(layout.stride, 20);
        let color = layout.attribute(VertexSemantic::Color).unwrap();
        assert_eq!(color.offset, 16);
        assert_eq!(color.offset + color.format.size(), layout.stride);
    }

    #[test]
    fn test_attributes_fit_stride() {
        for words in [5, 8] {
            let layout = VertexLayout::for_record_words(words).unwrap();
            for attribute in &layout.attributes {
                assert!(attribute.offset + attribute.format.size() <= layout.stride);
            }
        }
    }

    #[test]
    fn test_unknown_stride() {
        assert!(VertexLayout::for_record_words(11).is_none());
        assert!(VertexLayout::for_record_words(5).unwrap().attribute(VertexSemantic::Normal).is_none());
    }
}
