//! Reelbatch - Batch Video Editing and Downloading
//!
//! Entry point: loads configuration, sets up logging and dispatches to the
//! editor or downloader pipeline.

use anyhow::Result;
use clap::Parser;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn, Level};
use tracing_appender::{non_blocking, non_blocking::WorkerGuard, rolling};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use reelbatch::cli::{prompt_download_request, Args, Commands, DownloadRequest};
use reelbatch::config::{Config, QualityProfile};
use reelbatch::downloader::Downloader;
use reelbatch::editor::BatchEditor;
use reelbatch::error::ReelbatchError;
use reelbatch::report::RunReport;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    if let Commands::InitConfig { output } = &args.command {
        Config::default().save_to_file(output)?;
        println!("Default configuration written to {}", output.display());
        return Ok(());
    }

    let mut config = match &args.config {
        Some(config_path) => Config::from_file(config_path)?,
        None => {
            if Path::new("config.toml").exists() {
                Config::from_file("config.toml")?
            } else {
                Config::default()
            }
        }
    };

    let _guard = setup_logging(args.verbose, &config.logging.directory)?;
    info!("Starting reelbatch");

    match args.command {
        Commands::Edit { input_dir, output_dir, state_file, profile, no_track, report } => {
            if let Some(dir) = input_dir {
                config.paths.input_dir = dir;
            }
            if let Some(dir) = output_dir {
                config.paths.output_dir = dir;
            }
            if let Some(path) = state_file {
                config.paths.processed_state_path = path;
            }
            if let Some(profile) = profile {
                config.editor.profile = profile.parse::<QualityProfile>()?;
            }
            if no_track {
                config.editor.track_processed = false;
            }

            let editor = BatchEditor::new(config).with_progress(std::io::stderr().is_terminal());
            let run = editor.run().await?;
            finish_run(&run, report.as_deref());
        }
        Commands::Download { url, list, dest, report } => {
            let dest = dest.unwrap_or_else(|| config.paths.download_dir.clone());

            let request = match (url, list) {
                (Some(url), _) => DownloadRequest::Single(url),
                (None, Some(list)) => DownloadRequest::List(list),
                (None, None) => {
                    let stdin = std::io::stdin();
                    match prompt_download_request(&mut stdin.lock(), &mut std::io::stdout()) {
                        Ok(request) => request,
                        Err(e @ (ReelbatchError::InvalidUrl(_) | ReelbatchError::Config(_))) => {
                            println!("{}", e);
                            return Ok(());
                        }
                        Err(e) => return Err(e.into()),
                    }
                }
            };

            let downloader = Downloader::new(&config);
            downloader.check_availability().await?;

            let run = match request {
                DownloadRequest::Single(url) => {
                    let mut run = RunReport::start("download");
                    run.push(downloader.download_one(&url, &dest).await);
                    run.finish();
                    run
                }
                DownloadRequest::List(list) => match downloader.download_many(&list, &dest).await {
                    Ok(run) => run,
                    Err(e) => {
                        error!("{}", e);
                        return Ok(());
                    }
                },
            };
            finish_run(&run, report.as_deref());
        }
        Commands::InitConfig { .. } => {}
    }

    info!("reelbatch completed");
    Ok(())
}

fn finish_run(run: &RunReport, report_path: Option<&Path>) {
    run.log_summary();
    if let Some(path) = report_path {
        match run.write_json(path) {
            Ok(()) => info!("Run report written to {}", path.display()),
            Err(e) => warn!("Failed to write run report {}: {}", path.display(), e),
        }
    }
}

/// Setup logging to both console and a daily-rolling file
fn setup_logging(verbose: bool, log_dir: &Path) -> Result<WorkerGuard> {
    let log_dir: PathBuf = if log_dir.is_absolute() {
        log_dir.to_path_buf()
    } else {
        std::env::current_dir()?.join(log_dir)
    };
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = rolling::daily(&log_dir, "reelbatch.log");
    let (non_blocking_file, guard) = non_blocking(file_appender);

    let log_level = if verbose { Level::DEBUG } else { Level::INFO };

    let console_layer = fmt::layer()
        .with_target(false)
        .with_file(verbose)
        .with_line_number(verbose);

    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_target(false)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    info!("Logging initialized - console: {}, file: {}",
          log_level, log_dir.join("reelbatch.log").display());

    Ok(guard)
}
