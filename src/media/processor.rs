use async_trait::async_trait;
use std::path::Path;
use tracing::{debug, info};

use crate::config::EditorConfig;
use crate::error::{Result, ReelbatchError};
use super::{EncodeCommandBuilder, Transformer};

/// FFmpeg-backed transformer
pub struct FfmpegTransformer {
    config: EditorConfig,
    command_builder: EncodeCommandBuilder,
}

impl FfmpegTransformer {
    pub fn new(config: EditorConfig) -> Self {
        let command_builder = EncodeCommandBuilder::new(&config.binary_path);

        Self {
            config,
            command_builder,
        }
    }
}

#[async_trait]
impl Transformer for FfmpegTransformer {
    async fn transform(&self, source: &Path, destination: &Path) -> Result<()> {
        if !source.exists() {
            return Err(ReelbatchError::MissingInput(format!(
                "Input video file does not exist: {}",
                source.display()
            )));
        }

        if let Some(parent) = destination.parent() {
            if !parent.as_os_str().is_empty() && !parent.is_dir() {
                return Err(ReelbatchError::MissingInput(format!(
                    "Output directory does not exist: {}",
                    parent.display()
                )));
            }
        }

        info!("Editing {} -> {} ({:?} profile)", source.display(), destination.display(), self.config.profile);

        let command = self.command_builder.transform(source, destination, &self.config);
        command.execute().await?;

        info!("Edited video saved at: {}", destination.display());
        Ok(())
    }

    async fn check_availability(&self) -> Result<()> {
        let version = self.command_builder.version_check().probe_version().await?;
        debug!("Using {}", version);
        info!("FFmpeg is available");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[tokio::test]
    async fn test_missing_source_is_rejected_before_running_ffmpeg() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default().editor;
        config.binary_path = "reelbatch-no-such-ffmpeg".to_string();
        let transformer = FfmpegTransformer::new(config);

        let result = transformer
            .transform(&dir.path().join("gone.mp4"), &dir.path().join("out.mp4"))
            .await;
        assert!(matches!(result, Err(ReelbatchError::MissingInput(_))));
    }

    #[tokio::test]
    async fn test_missing_output_directory_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("a.mp4");
        std::fs::write(&source, b"").unwrap();

        let mut config = Config::default().editor;
        config.binary_path = "reelbatch-no-such-ffmpeg".to_string();
        let transformer = FfmpegTransformer::new(config);

        let result = transformer
            .transform(&source, &dir.path().join("missing").join("a.mp4"))
            .await;
        assert!(matches!(result, Err(ReelbatchError::MissingInput(_))));
    }

    #[tokio::test]
    async fn test_unavailable_binary_fails_check() {
        let mut config = Config::default().editor;
        config.binary_path = "reelbatch-no-such-ffmpeg".to_string();
        let transformer = FfmpegTransformer::new(config);

        assert!(matches!(
            transformer.check_availability().await,
            Err(ReelbatchError::ExternalTool { .. })
        ));
    }
}
