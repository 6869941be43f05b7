use std::path::Path;
use tokio::fs;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::{Result, ReelbatchError};
use crate::fetch::{Fetcher, FetcherFactory};
use crate::report::{ItemReport, RunReport};

/// Trimmed, non-empty lines in file order; duplicates are kept
pub fn parse_url_list(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

pub struct Downloader {
    fetcher: Box<dyn Fetcher>,
}

impl Downloader {
    pub fn new(config: &Config) -> Self {
        Self::with_fetcher(FetcherFactory::create_fetcher(config.downloader.clone()))
    }

    pub fn with_fetcher(fetcher: Box<dyn Fetcher>) -> Self {
        Self { fetcher }
    }

    pub async fn check_availability(&self) -> Result<()> {
        self.fetcher.check_availability().await
    }

    /// Download a single URL into `dest`; failures are returned in the item report
    pub async fn download_one<P: AsRef<Path>>(&self, url: &str, dest: P) -> ItemReport {
        let url = url.trim();
        match self.try_download(url, dest.as_ref()).await {
            Ok(()) => ItemReport::completed(url),
            Err(e) => {
                warn!("An error occurred while downloading {}: {}", url, e);
                ItemReport::failed(url, &e)
            }
        }
    }

    async fn try_download(&self, url: &str, dest: &Path) -> Result<()> {
        if url.is_empty() {
            return Err(ReelbatchError::InvalidUrl(url.to_string()));
        }
        fs::create_dir_all(dest).await?;
        self.fetcher.fetch(url, dest).await
    }

    /// Download every URL listed in `list_path`, one per line
    pub async fn download_many<P: AsRef<Path>, Q: AsRef<Path>>(&self, list_path: P, dest: Q) -> Result<RunReport> {
        let list_path = list_path.as_ref();
        let dest = dest.as_ref();

        let content = match fs::read_to_string(list_path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ReelbatchError::MissingInput(format!(
                    "File {} not found",
                    list_path.display()
                )));
            }
            Err(e) => return Err(ReelbatchError::Io(e)),
        };

        let urls = parse_url_list(&content);
        let mut report = RunReport::start("download");

        if urls.is_empty() {
            info!("No URLs found in {}", list_path.display());
        } else {
            info!("Found {} URLs in {}", urls.len(), list_path.display());
        }

        for (idx, url) in urls.iter().enumerate() {
            info!("[{}/{}] {}", idx + 1, urls.len(), url);
            report.push(self.download_one(url, dest).await);
        }

        report.finish();
        Ok(report)
    }
}
