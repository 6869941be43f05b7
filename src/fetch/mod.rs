// URL-based media fetching
//
// - YtDlp: yt-dlp implementation

pub mod ytdlp;

use async_trait::async_trait;
use std::path::Path;

pub use ytdlp::*;
use crate::config::DownloaderConfig;
use crate::error::Result;

/// Downloads one URL into a directory as a single merged file
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str, output_dir: &Path) -> Result<()>;

    /// Check if the underlying tool is available
    async fn check_availability(&self) -> Result<()>;
}

/// Factory for creating fetcher instances
pub struct FetcherFactory;

impl FetcherFactory {
    /// Create the default fetcher (yt-dlp based)
    pub fn create_fetcher(config: DownloaderConfig) -> Box<dyn Fetcher> {
        Box::new(ytdlp::YtDlpFetcher::new(config))
    }
}
