use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use tokio::fs;
use tracing::{info, warn};
use walkdir::WalkDir;

use crate::config::Config;
use crate::error::{Result, ReelbatchError};
use crate::media::{is_recognized_media, Transformer, TransformerFactory};
use crate::report::{ItemReport, RunReport};
use crate::state::ProcessedSet;

/// A recognized video file found in the input directory
#[derive(Debug, Clone)]
pub struct MediaFile {
    pub filename: String,
    pub path: PathBuf,
}

pub struct BatchEditor {
    config: Config,
    transformer: Box<dyn Transformer>,
    show_progress: bool,
}

impl BatchEditor {
    pub fn new(config: Config) -> Self {
        let transformer = TransformerFactory::create_transformer(config.editor.clone());
        Self::with_transformer(config, transformer)
    }

    pub fn with_transformer(config: Config, transformer: Box<dyn Transformer>) -> Self {
        Self {
            config,
            transformer,
            show_progress: false,
        }
    }

    /// Draw a progress bar over the candidate files
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Edit every recognized file in the input directory
    pub async fn run(&self) -> Result<RunReport> {
        let paths = &self.config.paths;
        let input_dir = &paths.input_dir;
        let output_dir = &paths.output_dir;
        info!("Processing directory: {}", input_dir.display());

        if !input_dir.is_dir() {
            return Err(ReelbatchError::MissingInput(format!(
                "Input directory does not exist: {}",
                input_dir.display()
            )));
        }

        let tracking = self.config.editor.track_processed;
        let mut processed = if tracking {
            ProcessedSet::load(&paths.processed_state_path)?
        } else {
            ProcessedSet::new()
        };
        if tracking {
            info!(
                "{} videos already recorded in {}",
                processed.len(),
                paths.processed_state_path.display()
            );
        }

        fs::create_dir_all(output_dir).await?;
        self.transformer.check_availability().await?;

        let candidates = self.find_candidates()?;
        info!("Found {} video files", candidates.len());

        let progress = self.progress_bar(candidates.len() as u64)?;
        let mut report = RunReport::start("edit");

        for media in candidates {
            progress.set_message(media.filename.clone());

            if tracking && processed.contains(&media.filename) {
                info!("Skipping already processed video: {}", media.filename);
                report.push(ItemReport::skipped(&media.filename));
                progress.inc(1);
                continue;
            }

            let destination = output_dir.join(&media.filename);
            let outcome = match self.transformer.transform(&media.path, &destination).await {
                Ok(()) if tracking => {
                    processed.add(media.filename.clone());
                    match processed.save(&paths.processed_state_path) {
                        Ok(()) => ItemReport::completed(&media.filename),
                        Err(e) => {
                            warn!("Edited {} but failed to record it: {}", media.filename, e);
                            ItemReport::failed(&media.filename, &e)
                        }
                    }
                }
                Ok(()) => ItemReport::completed(&media.filename),
                Err(e) => {
                    warn!("Failed to edit video {}: {}", media.filename, e);
                    ItemReport::failed(&media.filename, &e)
                }
            };
            report.push(outcome);
            progress.inc(1);
        }

        progress.finish_and_clear();
        report.finish();
        Ok(report)
    }

    /// Regular files directly inside the input directory with a recognized extension, by name
    pub fn find_candidates(&self) -> Result<Vec<MediaFile>> {
        let extensions = &self.config.editor.extensions;
        let mut files = Vec::new();

        let walker = WalkDir::new(&self.config.paths.input_dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .sort_by_file_name();

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping unreadable entry: {}", e);
                    continue;
                }
            };

            if !entry.file_type().is_file() || !is_recognized_media(entry.path(), extensions) {
                continue;
            }

            // Processed-set entries are JSON strings; non-UTF-8 names cannot round-trip.
            let Some(filename) = entry.file_name().to_str() else {
                warn!("Skipping video with a non-UTF-8 filename: {}", entry.path().display());
                continue;
            };

            files.push(MediaFile {
                filename: filename.to_string(),
                path: entry.path().to_path_buf(),
            });
        }

        Ok(files)
    }

    fn progress_bar(&self, len: u64) -> Result<ProgressBar> {
        if !self.show_progress {
            return Ok(ProgressBar::hidden());
        }

        let pb = ProgressBar::new(len);
        pb.set_style(ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .map_err(|e| ReelbatchError::Unexpected(format!("Invalid progress template: {}", e)))?
            .progress_chars("#>-"));
        Ok(pb)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::path::Path;
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    use crate::error::ErrorKind;
    use crate::report::Outcome;

    #[derive(Clone, Default)]
    struct RecordingTransformer {
        calls: Arc<Mutex<Vec<String>>>,
        fail_on: Vec<String>,
    }

    impl RecordingTransformer {
        fn failing_on(names: &[&str]) -> Self {
            Self {
                calls: Arc::default(),
                fail_on: names.iter().map(|s| s.to_string()).collect(),
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Transformer for RecordingTransformer {
        async fn transform(&self, source: &Path, destination: &Path) -> Result<()> {
            let name = source.file_name().unwrap().to_string_lossy().to_string();
            self.calls.lock().unwrap().push(name.clone());
            if self.fail_on.contains(&name) {
                return Err(ReelbatchError::ExternalTool {
                    tool: "ffmpeg".into(),
                    diagnostic: format!("{}: Invalid data found when processing input", name),
                });
            }
            std::fs::write(destination, b"edited")?;
            Ok(())
        }

        async fn check_availability(&self) -> Result<()> {
            Ok(())
        }
    }

    struct Fixture {
        _dir: TempDir,
        config: Config,
    }

    fn fixture(files: &[&str]) -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.paths.input_dir = dir.path().join("video");
        config.paths.output_dir = dir.path().join("edited_video");
        config.paths.processed_state_path = dir.path().join("processed_videos.json");
        std::fs::create_dir_all(&config.paths.input_dir).unwrap();
        for name in files {
            std::fs::write(config.paths.input_dir.join(name), b"video").unwrap();
        }
        Fixture { _dir: dir, config }
    }

    fn editor(config: &Config, transformer: &RecordingTransformer) -> BatchEditor {
        BatchEditor::with_transformer(config.clone(), Box::new(transformer.clone()))
    }

    #[tokio::test]
    async fn test_skips_processed_and_records_new() {
        let fx = fixture(&["a.mp4", "b.mp4"]);
        let mut seeded = ProcessedSet::new();
        seeded.add("b.mp4");
        seeded.save(&fx.config.paths.processed_state_path).unwrap();

        let transformer = RecordingTransformer::default();
        let report = editor(&fx.config, &transformer).run().await.unwrap();

        assert_eq!(transformer.calls(), vec!["a.mp4"]);
        assert_eq!((report.completed(), report.skipped()), (1, 1));
        assert!(fx.config.paths.output_dir.join("a.mp4").exists());

        let state = ProcessedSet::load(&fx.config.paths.processed_state_path).unwrap();
        assert!(state.contains("a.mp4"));
        assert!(state.contains("b.mp4"));
    }

    #[tokio::test]
    async fn test_rerun_invokes_nothing() {
        let fx = fixture(&["a.mp4", "b.mkv", "c.MOV"]);

        let first = RecordingTransformer::default();
        editor(&fx.config, &first).run().await.unwrap();
        assert_eq!(first.calls().len(), 3);

        let second = RecordingTransformer::default();
        let report = editor(&fx.config, &second).run().await.unwrap();
        assert!(second.calls().is_empty());
        assert_eq!(report.skipped(), 3);
    }

    #[tokio::test]
    async fn test_unrecognized_extensions_are_ignored() {
        let fx = fixture(&["notes.txt", "anim.gif", "clip.avi", "README"]);
        std::fs::create_dir_all(fx.config.paths.input_dir.join("folder.mp4")).unwrap();

        let transformer = RecordingTransformer::default();
        let report = editor(&fx.config, &transformer).run().await.unwrap();

        assert_eq!(transformer.calls(), vec!["clip.avi"]);
        assert_eq!(report.items.len(), 1);
    }

    #[tokio::test]
    async fn test_failure_does_not_stop_batch() {
        let fx = fixture(&["1.mp4", "2.mp4", "3.mp4"]);

        let transformer = RecordingTransformer::failing_on(&["2.mp4"]);
        let report = editor(&fx.config, &transformer).run().await.unwrap();

        assert_eq!(transformer.calls(), vec!["1.mp4", "2.mp4", "3.mp4"]);
        assert_eq!(report.failed(), 1);
        match &report.items[1].outcome {
            Outcome::Failed { kind, message } => {
                assert_eq!(*kind, ErrorKind::ExternalToolFailure);
                assert!(message.contains("Invalid data"));
            }
            other => panic!("unexpected outcome: {:?}", other),
        }

        let state = ProcessedSet::load(&fx.config.paths.processed_state_path).unwrap();
        assert!(state.contains("1.mp4"));
        assert!(!state.contains("2.mp4"));
        assert!(state.contains("3.mp4"));
    }

    #[tokio::test]
    async fn test_missing_input_dir_is_fatal() {
        let fx = fixture(&[]);
        let mut config = fx.config.clone();
        config.paths.input_dir = config.paths.input_dir.join("nope");

        let transformer = RecordingTransformer::default();
        let result = editor(&config, &transformer).run().await;

        assert!(matches!(result, Err(ReelbatchError::MissingInput(_))));
        assert!(transformer.calls().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_state_is_fatal() {
        let fx = fixture(&["a.mp4"]);
        std::fs::write(&fx.config.paths.processed_state_path, "not json").unwrap();

        let transformer = RecordingTransformer::default();
        let result = editor(&fx.config, &transformer).run().await;

        assert!(matches!(result, Err(ReelbatchError::MalformedState { .. })));
        assert!(transformer.calls().is_empty());
    }

    #[tokio::test]
    async fn test_untracked_mode_reprocesses_and_writes_no_state() {
        let fx = fixture(&["a.mp4"]);
        let mut config = fx.config.clone();
        config.editor.track_processed = false;

        let transformer = RecordingTransformer::default();
        editor(&config, &transformer).run().await.unwrap();
        editor(&config, &transformer).run().await.unwrap();

        assert_eq!(transformer.calls(), vec!["a.mp4", "a.mp4"]);
        assert!(!config.paths.processed_state_path.exists());
    }

    // Linux only: some Unix filesystems refuse non-UTF-8 names outright.
    #[cfg(target_os = "linux")]
    #[tokio::test]
    async fn test_non_utf8_names_are_skipped_not_merged() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let fx = fixture(&["ok.mp4"]);
        for raw in [&b"\xff.mp4"[..], &b"\xfe.mp4"[..]] {
            std::fs::write(fx.config.paths.input_dir.join(OsStr::from_bytes(raw)), b"video").unwrap();
        }

        let transformer = RecordingTransformer::default();
        let report = editor(&fx.config, &transformer).run().await.unwrap();

        assert_eq!(transformer.calls(), vec!["ok.mp4"]);
        assert_eq!(report.items.len(), 1);
        assert_eq!(report.skipped(), 0);

        let state = ProcessedSet::load(&fx.config.paths.processed_state_path).unwrap();
        assert_eq!(state.iter().collect::<Vec<_>>(), vec!["ok.mp4"]);

        let outputs: Vec<_> = std::fs::read_dir(&fx.config.paths.output_dir)
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(outputs, vec![std::ffi::OsString::from("ok.mp4")]);
    }

    #[test]
    fn test_candidates_are_sorted_by_name() {
        let fx = fixture(&["c.mp4", "a.mov", "b.MKV"]);
        let editor = editor(&fx.config, &RecordingTransformer::default());

        let names: Vec<_> = editor.find_candidates().unwrap().into_iter().map(|m| m.filename).collect();
        assert_eq!(names, vec!["a.mov", "b.MKV", "c.mp4"]);
    }
}
