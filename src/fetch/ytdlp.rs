use async_trait::async_trait;
use std::path::Path;
use tracing::info;

use crate::config::DownloaderConfig;
use crate::error::Result;
use crate::tool::ToolCommand;
use super::Fetcher;

pub struct YtDlpFetcher {
    config: DownloaderConfig,
}

impl YtDlpFetcher {
    pub fn new(config: DownloaderConfig) -> Self {
        Self { config }
    }

    /// Best video at or above the minimum height plus best audio, falling back to best single stream
    pub fn format_selector(&self) -> String {
        format!("bestvideo[height>={}]+bestaudio/best", self.config.min_height)
    }

    /// Build the download command for one URL
    pub fn download_command(&self, url: &str, output_dir: &Path) -> ToolCommand {
        let template = output_dir.join(&self.config.output_template);

        ToolCommand::new(&self.config.binary_path, format!("Download of {}", url))
            .option("-f", self.format_selector())
            .arg("-o")
            .path(template)
            .arg("--no-playlist")
            .arg("--newline")
            .option("--merge-output-format", self.config.merge_output_format.clone())
            .arg("--")
            .arg(url)
            .echo_output(true)
    }
}

#[async_trait]
impl Fetcher for YtDlpFetcher {
    async fn fetch(&self, url: &str, output_dir: &Path) -> Result<()> {
        info!("Downloading video from {}...", url);

        self.download_command(url, output_dir).execute().await?;
        info!("Download complete! Saved to {}", output_dir.display());
        Ok(())
    }

    async fn check_availability(&self) -> Result<()> {
        let version = ToolCommand::new(&self.config.binary_path, "Version check")
            .arg("--version")
            .probe_version()
            .await?;
        info!("yt-dlp is available (version {})", version);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn test_download_command_arguments() {
        let fetcher = YtDlpFetcher::new(Config::default().downloader);
        let cmd = fetcher.download_command("https://x/1", Path::new("downloads"));

        let expected_template = Path::new("downloads").join("%(title)s.%(ext)s");
        assert_eq!(
            cmd.args,
            vec![
                "-f".to_string(),
                "bestvideo[height>=1080]+bestaudio/best".to_string(),
                "-o".to_string(),
                expected_template.to_string_lossy().to_string(),
                "--no-playlist".to_string(),
                "--newline".to_string(),
                "--merge-output-format".to_string(),
                "mp4".to_string(),
                "--".to_string(),
                "https://x/1".to_string(),
            ]
        );
        assert!(cmd.echo_output);
    }

    #[test]
    fn test_min_height_is_configurable() {
        let mut config = Config::default().downloader;
        config.min_height = 720;
        assert_eq!(YtDlpFetcher::new(config).format_selector(), "bestvideo[height>=720]+bestaudio/best");
    }
}
