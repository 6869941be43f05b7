// Media transformation
//
// - Commands: filter chain and ffmpeg argument construction
// - Processor: ffmpeg-backed Transformer implementation

pub mod commands;
pub mod processor;

use async_trait::async_trait;
use std::path::Path;

pub use commands::*;
pub use processor::*;

use crate::config::EditorConfig;
use crate::error::Result;

/// Applies the configured filter chain to one file
#[async_trait]
pub trait Transformer: Send + Sync {
    /// Transform `source` into `destination`
    async fn transform(&self, source: &Path, destination: &Path) -> Result<()>;

    /// Check if the underlying tool is available
    async fn check_availability(&self) -> Result<()>;
}

/// Factory for creating transformer instances
pub struct TransformerFactory;

impl TransformerFactory {
    /// Create the default transformer (FFmpeg-based)
    pub fn create_transformer(config: EditorConfig) -> Box<dyn Transformer> {
        Box::new(processor::FfmpegTransformer::new(config))
    }
}

/// True when `path` has one of `extensions`, compared case-insensitively
pub fn is_recognized_media(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| extensions.iter().any(|allowed| allowed.eq_ignore_ascii_case(ext)))
        .unwrap_or(false)
}
