//! Reelbatch - Batch Video Editing and Downloading
//!
//! Applies a padding + banner + re-encode filter chain to folders of videos
//! with ffmpeg, remembering which files are done, and downloads videos from
//! URLs with yt-dlp.

pub mod cli;
pub mod config;
pub mod downloader;
pub mod editor;
pub mod error;
pub mod fetch;
pub mod media;
pub mod report;
pub mod state;
pub mod tool;
