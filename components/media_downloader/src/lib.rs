// components/media_downloader/src/lib.rs
mod format;
mod install;
mod lifecycle;
mod organization;
mod progress;
mod types;
mod utils;
mod validation;
mod ytdlp;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

pub use format::{FormatCatalog, FormatChoice, FormatEntry, FormatSection, VIDEO_CONTAINERS};
pub use install::PackageManager;
pub use lifecycle::{DownloadEvent, DownloadState, InvalidTransition, StateTracker};
pub use organization::OutputTemplate;
pub use progress::ToolMessage;
pub use types::{DownloadError, DownloadOutcome, DownloadReport, Format, Progress, VideoInfo};
pub use utils::{is_valid_url, normalize_extension};
pub use validation::{validate, DownloadForm, DownloadRequest, Field, FieldError, FormRejected};
pub use ytdlp::{build_download_args, Downloader, RunResult, YtDlp};

pub struct MediaDownloader {
    template: OutputTemplate,
    downloader: Arc<dyn Downloader + Send + Sync>,
}

impl MediaDownloader {
    /// Create a MediaDownloader that runs the yt-dlp binary at `binary` and
    /// stores files in `download_path`
    pub async fn new(
        download_path: impl AsRef<Path>,
        binary: impl Into<PathBuf>,
    ) -> Result<Self, DownloadError> {
        Self::new_with_downloader(download_path, Arc::new(YtDlp::new(binary))).await
    }

    /// Create a MediaDownloader with a specific downloader implementation
    pub async fn new_with_downloader(
        download_path: impl AsRef<Path>,
        downloader: Arc<dyn Downloader + Send + Sync>,
    ) -> Result<Self, DownloadError> {
        downloader.check_available().await?;

        let download_path = download_path.as_ref().to_owned();
        tokio::fs::create_dir_all(&download_path).await?;

        Ok(Self {
            template: OutputTemplate::new(download_path),
            downloader,
        })
    }

    /// Use a different yt-dlp file name template, e.g. `"%(title)s"`
    pub fn with_file_name_template(mut self, stem: impl Into<String>) -> Self {
        self.template = OutputTemplate::with_stem(self.template.folder(), stem);
        self
    }

    pub fn template(&self) -> &OutputTemplate {
        &self.template
    }

    /// Look up a video and its formats. Moves `tracker` into `Fetching`; on
    /// failure or cancellation the tracker records that too.
    pub async fn fetch_info(
        &self,
        url: &str,
        tracker: &mut StateTracker,
        cancel: &CancellationToken,
    ) -> Result<VideoInfo, DownloadError> {
        if !is_valid_url(url) {
            return Err(DownloadError::InvalidUrl(url.to_string()));
        }

        tracker.advance(DownloadEvent::FetchStarted);

        let result = tokio::select! {
            result = self.downloader.fetch_info(url) => result,
            _ = cancel.cancelled() => Err(DownloadError::Cancelled),
        };

        match &result {
            Ok(_) => {}
            Err(DownloadError::Cancelled) => {
                tracker.advance(DownloadEvent::Cancelled);
            }
            Err(err) => {
                tracker.advance(DownloadEvent::Failed(err.to_string()));
            }
        }
        result
    }

    /// Download a validated request.
    ///
    /// Never returns an error: failures and cancellation are reported in the
    /// outcome and through `tracker`, which must have fetched the video info.
    pub async fn download(
        &self,
        request: &DownloadRequest,
        tracker: &mut StateTracker,
        cancel: &CancellationToken,
    ) -> DownloadOutcome {
        if !tracker.advance(DownloadEvent::InfoReady) {
            return DownloadOutcome::Failed(DownloadError::DownloadFailed(format!(
                "cannot start a download while {:?}",
                tracker.state()
            )));
        }

        let args = build_download_args(request, &self.template);
        let (messages, mut received) = mpsc::unbounded_channel();
        let run = self.downloader.download(&args, messages, cancel.clone());

        let mut file = None;
        let relay = async {
            while let Some(message) = received.recv().await {
                match message {
                    ToolMessage::Progress(progress) => {
                        tracker.advance(DownloadEvent::Progress(progress));
                    }
                    ToolMessage::Destination(path) => file = Some(path),
                    ToolMessage::Event { .. } | ToolMessage::Other(_) => {}
                }
            }
        };
        let (result, ()) = tokio::join!(run, relay);

        match result {
            Ok(RunResult::Completed) => {
                tracing::info!("Downloaded {} to {:?}", request.url, file);
                tracker.advance(DownloadEvent::Finished { file: file.clone() });
                DownloadOutcome::Succeeded(DownloadReport {
                    url: request.url.clone(),
                    folder: file
                        .as_deref()
                        .and_then(Path::parent)
                        .map(Path::to_path_buf)
                        .unwrap_or_else(|| self.template.folder().to_path_buf()),
                    file,
                    finished_at: chrono::Utc::now(),
                })
            }
            Ok(RunResult::Cancelled) => {
                tracker.advance(DownloadEvent::Cancelled);
                DownloadOutcome::Cancelled
            }
            Err(err) => {
                tracing::warn!("Download of {} failed: {}", request.url, err);
                tracker.advance(DownloadEvent::Failed(err.to_string()));
                DownloadOutcome::Failed(err)
            }
        }
    }
}
