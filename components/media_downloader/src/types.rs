// components/media_downloader/src/types.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("Required dependency not found: {0}")]
    DependencyNotFound(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Video not found: {0}")]
    VideoNotFound(String),

    #[error("Unreadable video info: {0}")]
    Metadata(#[from] serde_json::Error),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Download cancelled")]
    Cancelled,

    #[error("Installation failed: {0}")]
    InstallFailed(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// The subset of yt-dlp's `--dump-json` output we read.
///
/// Everything is defaulted so extractors that omit fields still decode.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoInfo {
    pub id: String,
    pub title: String,
    /// Duration in seconds
    pub duration: Option<f64>,
    pub webpage_url: Option<String>,
    pub uploader: Option<String>,
    pub formats: Vec<Format>,
}

impl VideoInfo {
    /// Whole seconds, zero when the extractor does not know
    pub fn duration_secs(&self) -> u64 {
        self.duration.map(|d| d.max(0.0) as u64).unwrap_or(0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Format {
    pub format_id: String,
    pub ext: String,
    pub resolution: Option<String>,
    pub filesize: Option<u64>,
    pub filesize_approx: Option<u64>,
    pub format_note: Option<String>,
    /// Audio bitrate in kbit/s
    pub abr: Option<f64>,
    pub vcodec: Option<String>,
    pub acodec: Option<String>,
    pub format: Option<String>,
}

impl Format {
    /// yt-dlp reports audio-only streams with the resolution "audio only"
    pub fn is_audio_only(&self) -> bool {
        self.resolution
            .as_deref()
            .is_some_and(|resolution| resolution.contains("audio"))
    }

    pub fn size(&self) -> Option<u64> {
        self.filesize.or(self.filesize_approx)
    }
}

/// One progress report from the downloader
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Progress {
    pub percent: f64,
    pub total_size: Option<String>,
    pub current_speed: Option<String>,
    pub eta: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadReport {
    /// URL the media was downloaded from
    pub url: String,

    /// Final file, when yt-dlp told us where it put it
    pub file: Option<PathBuf>,

    /// Folder the file was written to
    pub folder: PathBuf,

    /// When the download finished
    pub finished_at: DateTime<Utc>,
}

/// How a download ended. Failures are a value here, not an `Err`.
#[derive(Debug)]
pub enum DownloadOutcome {
    Succeeded(DownloadReport),
    Failed(DownloadError),
    Cancelled,
}

impl DownloadOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, DownloadOutcome::Succeeded(_))
    }
}
