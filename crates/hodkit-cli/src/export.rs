//! Export of flattened geometry
//!
//! Writes `<stem>.vtx`, `<stem>.idx` and a `<stem>.json` manifest describing
//! how to draw them.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use hodkit_format::RawSubmesh;
use hodkit_geometry::{DrawCall, RESTART_INDEX, RestartCapability, VertexLayout};
use serde::Serialize;

use crate::Decoded;

/// Per-submesh metadata carried into the manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmeshInfo {
    pub lod: u32,
    pub material_id: u32,
    pub format_version: u32,
    pub vertex_count: u32,
    pub vertex_stride: u32,
    /// Attribute layout, when the stride is a known one
    pub layout: Option<VertexLayout>,
}

impl From<&RawSubmesh> for SubmeshInfo {
    fn from(raw: &RawSubmesh) -> Self {
        Self {
            lod: raw.lod,
            material_id: raw.material_id,
            format_version: raw.format_version,
            vertex_count: raw.vertex_count,
            vertex_stride: raw.vertex_stride(),
            layout: VertexLayout::for_record_words(raw.vertex_record_size),
        }
    }
}

/// Manifest written next to the blobs
#[derive(Debug, Serialize)]
pub struct Manifest<'a> {
    pub source: String,
    pub restart: RestartCapability,
    /// Index value the renderer must treat as a strip restart
    pub restart_index: Option<u16>,
    pub vertex_file: String,
    pub index_file: String,
    pub vertex_bytes: usize,
    pub index_bytes: usize,
    pub submeshes: &'a [SubmeshInfo],
    pub draw_calls: &'a [DrawCall],
}

/// Paths written by [`write_export`]
#[derive(Debug, Clone)]
pub struct ExportPaths {
    pub vertices: PathBuf,
    pub indices: PathBuf,
    pub manifest: PathBuf,
}

/// Write blobs and manifest for `decoded` into `dir`
pub fn write_export(dir: &Path, stem: &str, source: &Path, decoded: &Decoded) -> Result<ExportPaths> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory {}", dir.display()))?;

    let paths = ExportPaths {
        vertices: dir.join(format!("{stem}.vtx")),
        indices: dir.join(format!("{stem}.idx")),
        manifest: dir.join(format!("{stem}.json")),
    };

    let geometry = &decoded.geometry;
    let manifest = Manifest {
        source: source.display().to_string(),
        restart: decoded.restart,
        restart_index: decoded.restart.supports_restart().then_some(RESTART_INDEX),
        vertex_file: file_name(&paths.vertices),
        index_file: file_name(&paths.indices),
        vertex_bytes: geometry.vertex_blob.len(),
        index_bytes: geometry.index_blob.len(),
        submeshes: &decoded.submeshes,
        draw_calls: &geometry.draw_calls,
    };

    write(&paths.vertices, &geometry.vertex_blob)?;
    write(&paths.indices, &geometry.index_blob)?;
    let json = serde_json::to_vec_pretty(&manifest).context("Failed to serialize manifest")?;
    write(&paths.manifest, &json)?;

    Ok(paths)
}

fn write(path: &Path, bytes: &[u8]) -> Result<()> {
    std::fs::write(path, bytes).with_context(|| format!("Failed to write {}", path.display()))?;
    log::debug!("Wrote {} ({} bytes)", path.display(), bytes.len());
    Ok(())
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}
