//! # Hodkit CLI
//!
//! Command-line interface for inspecting and exporting HOD assets.
//!
//! ## Commands
//! - `tree` - Print the chunk hierarchy
//! - `info` - Decode, merge and summarise the geometry
//! - `export` - Write vertex/index blobs and a draw-call manifest

pub mod config;
pub mod export;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use hodkit_format::{ChunkReader, EXPECTED_MESH_VERSION, PrimitiveCodes};
use hodkit_geometry::{FlattenedGeometry, GeometryStats, RestartCapability};

pub use config::ToolConfig;
pub use export::{SubmeshInfo, write_export};

/// HOD asset tool
#[derive(Parser)]
#[command(name = "hodkit")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// JSON configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Primitive restart support of the target renderer
    #[arg(long, global = true, value_enum)]
    pub restart: Option<RestartArg>,

    /// Primitive code assignment
    #[arg(long, global = true, value_enum)]
    pub codes: Option<CodesArg>,

    /// Reject mesh blocks whose version is not 1400
    #[arg(long, global = true)]
    pub strict_version: bool,

    /// Decode mesh blocks in parallel
    #[arg(long, global = true)]
    pub parallel: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Print the chunk hierarchy
    Tree {
        /// Input file
        file: PathBuf,
    },

    /// Decode and summarise the geometry
    Info {
        /// Input file
        file: PathBuf,
    },

    /// Write vertex and index blobs with a draw-call manifest
    Export {
        /// Input file
        file: PathBuf,

        /// Output directory
        #[arg(short, long, default_value = ".")]
        output: PathBuf,

        /// Output file stem (defaults to the input stem)
        #[arg(short, long)]
        stem: Option<String>,
    },
}

/// Restart capability as a flag value
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RestartArg {
    None,
    Hardware,
    Vendor,
}

impl From<RestartArg> for RestartCapability {
    fn from(arg: RestartArg) -> Self {
        match arg {
            RestartArg::None => Self::None,
            RestartArg::Hardware => Self::HardwareRestartIndex,
            RestartArg::Vendor => Self::VendorRestartIndex,
        }
    }
}

/// Primitive code table as a flag value
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CodesArg {
    /// 514 lists, 518 strips
    Background,
    /// 518 lists, 514 strips
    Swapped,
}

impl From<CodesArg> for PrimitiveCodes {
    fn from(arg: CodesArg) -> Self {
        match arg {
            CodesArg::Background => Self::BACKGROUND,
            CodesArg::Swapped => Self::SWAPPED,
        }
    }
}

impl Cli {
    /// Resolve the configuration file and apply flag overrides
    pub fn tool_config(&self) -> Result<ToolConfig> {
        let mut config = ToolConfig::load_or_default(self.config.as_deref())?;
        if let Some(restart) = self.restart {
            config.restart = restart.into();
        }
        if let Some(codes) = self.codes {
            config.decode.primitive_codes = codes.into();
        }
        if self.strict_version {
            config.decode.required_version = Some(EXPECTED_MESH_VERSION);
        }
        if self.parallel {
            config.decode.parallel = true;
        }
        Ok(config)
    }
}

/// A decoded file ready for upload or export
#[derive(Debug, Clone)]
pub struct Decoded {
    pub restart: RestartCapability,
    pub submeshes: Vec<SubmeshInfo>,
    pub stats: GeometryStats,
    pub geometry: FlattenedGeometry,
}

/// Decode, merge and flatten a HOD buffer
pub fn decode_bytes(bytes: &[u8], config: &ToolConfig) -> Result<Decoded> {
    let reader = ChunkReader::new(config.decode.clone())?;
    let raw = reader.parse(bytes)?;

    let submeshes: Vec<SubmeshInfo> = raw.iter().map(SubmeshInfo::from).collect();
    let mut stats = GeometryStats::from_raw(&raw);
    let geometry = hodkit_geometry::build(raw, config.restart)?;
    stats.record_output(&geometry);

    Ok(Decoded {
        restart: config.restart,
        submeshes,
        stats,
        geometry,
    })
}

/// Read and decode a HOD file
pub fn decode_file(path: &Path, config: &ToolConfig) -> Result<Decoded> {
    let bytes = read_file(path)?;
    log::info!("Decoding {} ({} bytes)", path.display(), bytes.len());
    let decoded = decode_bytes(&bytes, config).with_context(|| format!("Failed to decode {}", path.display()))?;

    for (index, submesh) in decoded.submeshes.iter().enumerate() {
        if submesh.format_version != EXPECTED_MESH_VERSION {
            log::warn!(
                "Submesh {} has version {}, expected {}",
                index,
                submesh.format_version,
                EXPECTED_MESH_VERSION
            );
        }
        if submesh.layout.is_none() {
            log::warn!(
                "Submesh {} uses an unknown {}-byte vertex record",
                index,
                submesh.vertex_stride
            );
        }
    }
    Ok(decoded)
}

fn read_file(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))
}

/// Execute the CLI command
pub fn execute(cli: Cli) -> Result<()> {
    if cli.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    }

    let config = cli.tool_config()?;
    log::debug!("Configuration: {:?}", config);

    match cli.command {
        Commands::Tree { file } => {
            let bytes = read_file(&file)?;
            let reader = ChunkReader::new(config.decode)?;
            let outline = reader
                .outline(&bytes)
                .with_context(|| format!("Failed to walk {}", file.display()))?;
            for chunk in outline {
                println!(
                    "{}{} ({}) size:{}",
                    "  ".repeat(chunk.depth),
                    chunk.outer_tag,
                    chunk.inner_tag,
                    chunk.size.saturating_sub(4)
                );
            }
        }

        Commands::Info { file } => {
            let decoded = decode_file(&file, &config)?;
            for (index, submesh) in decoded.submeshes.iter().enumerate() {
                log::debug!(
                    "  Submesh {}: lod {}, material {}, {} vertices, stride {}",
                    index,
                    submesh.lod,
                    submesh.material_id,
                    submesh.vertex_count,
                    submesh.vertex_stride
                );
            }
            for call in &decoded.geometry.draw_calls {
                log::debug!(
                    "  Draw {:?}: {} indices at {}, vertices at {}",
                    call.kind,
                    call.index_count,
                    call.index_blob_offset,
                    call.vertex_blob_offset
                );
            }

            let stats = &decoded.stats;
            log::info!("Restart: {:?}", decoded.restart);
            log::info!("  Submeshes: {}", stats.submeshes);
            log::info!("  Vertices: {}", stats.vertices);
            log::info!("  Triangles: {}", stats.triangles);
            log::info!(
                "  Fragments: {} strip, {} list",
                stats.strip_fragments,
                stats.list_fragments
            );
            log::info!(
                "  Indices: {} raw, {} merged ({} separators)",
                stats.raw_indices,
                stats.merged_indices,
                stats.separator_indices()
            );
            log::info!("  Draw calls: {}", stats.draw_calls);
            log::info!(
                "  Buffers: {} vertex bytes, {} index bytes",
                stats.vertex_bytes,
                stats.index_bytes
            );
        }

        Commands::Export { file, output, stem } => {
            let decoded = decode_file(&file, &config)?;
            let stem = stem.unwrap_or_else(|| {
                file.file_stem()
                    .map(|s| s.to_string_lossy().to_string())
                    .unwrap_or_else(|| "geometry".to_string())
            });
            let paths = write_export(&output, &stem, &file, &decoded)?;
            log::info!("Exported {} draw calls", decoded.geometry.draw_calls.len());
            log::info!("  Vertices: {}", paths.vertices.display());
            log::info!("  Indices: {}", paths.indices.display());
            log::info!("  Manifest: {}", paths.manifest.display());
        }
    }

    Ok(())
}
