// components/media_downloader/src/ytdlp.rs
use crate::organization::OutputTemplate;
use crate::progress::ToolMessage;
use crate::types::{DownloadError, VideoInfo};
use crate::validation::DownloadRequest;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;

/// How a downloader process ended when it did not fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunResult {
    Completed,
    Cancelled,
}

#[async_trait]
pub trait Downloader {
    /// Check that the external program is installed
    async fn check_available(&self) -> Result<(), DownloadError>;

    /// Fetch metadata, including the available formats, without downloading
    async fn fetch_info(&self, url: &str) -> Result<VideoInfo, DownloadError>;

    /// Run a download with the given arguments, forwarding each output line
    /// until the process exits or `cancel` fires.
    async fn download(
        &self,
        args: &[String],
        messages: UnboundedSender<ToolMessage>,
        cancel: CancellationToken,
    ) -> Result<RunResult, DownloadError>;
}

/// Arguments for downloading `request` into `template`.
///
/// The trim window is handed to the post-processor as a single argument,
/// `-ss <start> [-to <end>]`, with a missing start meaning the beginning.
pub fn build_download_args(request: &DownloadRequest, template: &OutputTemplate) -> Vec<String> {
    let output = template.to_path(request.ext.as_deref());

    let mut args = vec![
        request.url.clone(),
        "-f".to_string(),
        request.format.itag().to_string(),
        "-o".to_string(),
        output.to_string_lossy().into_owned(),
        "--newline".to_string(),
    ];

    if let Some((start, end)) = request.trim_window() {
        let mut window = format!("-ss {}", start.to_hms());
        if let Some(end) = end {
            window.push_str(&format!(" -to {}", end.to_hms()));
        }
        args.push("--postprocessor-args".to_string());
        args.push(window);
    }

    args
}

pub struct YtDlp {
    binary: PathBuf,
}

impl YtDlp {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }
}

#[async_trait]
impl Downloader for YtDlp {
    async fn check_available(&self) -> Result<(), DownloadError> {
        which::which(&self.binary)
            .map(|path| tracing::debug!("Using yt-dlp at {}", path.display()))
            .map_err(|_| DownloadError::DependencyNotFound(self.binary.display().to_string()))
    }

    async fn fetch_info(&self, url: &str) -> Result<VideoInfo, DownloadError> {
        tracing::info!("Fetching video info for {}", url);

        let output = Command::new(&self.binary)
            .arg("--dump-json")
            .arg("--no-playlist")
            .arg("--no-warnings")
            .arg(url)
            .kill_on_drop(true)
            .output()
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let reason = last_line(&stderr).unwrap_or("yt-dlp could not resolve the URL");
            return Err(DownloadError::VideoNotFound(reason.to_string()));
        }

        let info: VideoInfo = serde_json::from_slice(&output.stdout)?;
        tracing::debug!(
            "Found {:?} ({} formats, {:?}s)",
            info.title,
            info.formats.len(),
            info.duration
        );
        Ok(info)
    }

    async fn download(
        &self,
        args: &[String],
        messages: UnboundedSender<ToolMessage>,
        cancel: CancellationToken,
    ) -> Result<RunResult, DownloadError> {
        tracing::info!("Running {} {}", self.binary.display(), args.join(" "));

        let mut child = Command::new(&self.binary)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| DownloadError::DownloadFailed("yt-dlp stdout unavailable".to_string()))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| DownloadError::DownloadFailed("yt-dlp stderr unavailable".to_string()))?;

        let stdout_reader = tokio::spawn(async move {
            let mut reader = BufReader::new(stdout);
            let mut buf = Vec::new();
            while let Some(line) = next_lossy_line(&mut reader, &mut buf).await {
                let message = ToolMessage::parse(&line);
                if let ToolMessage::Event { kind, data } = &message {
                    tracing::debug!("yt-dlp [{}] {}", kind, data);
                }
                if messages.send(message).is_err() {
                    break;
                }
            }
        });
        let stderr_reader = tokio::spawn(collect_lines(stderr));

        let status = tokio::select! {
            status = child.wait() => status?,
            _ = cancel.cancelled() => {
                tracing::info!("Cancelling download");
                let _ = child.kill().await;
                // Helpers spawned by yt-dlp may still hold the pipes open
                stdout_reader.abort();
                stderr_reader.abort();
                return Ok(RunResult::Cancelled);
            }
        };

        let _ = stdout_reader.await;
        let stderr = stderr_reader.await.unwrap_or_default();

        if !status.success() {
            let reason = last_line(&stderr)
                .map(str::to_string)
                .unwrap_or_else(|| format!("yt-dlp exited with status: {}", status));
            return Err(DownloadError::DownloadFailed(reason));
        }

        Ok(RunResult::Completed)
    }
}

async fn collect_lines(pipe: impl AsyncRead + Unpin) -> String {
    let mut collected = String::new();
    let mut reader = BufReader::new(pipe);
    let mut buf = Vec::new();
    while let Some(line) = next_lossy_line(&mut reader, &mut buf).await {
        tracing::debug!("yt-dlp stderr: {}", line);
        collected.push_str(&line);
        collected.push('\n');
    }
    collected
}

/// Next line without its terminator. Bytes that are not UTF-8 are replaced
/// rather than ending the stream.
async fn next_lossy_line<R>(reader: &mut R, buf: &mut Vec<u8>) -> Option<String>
where
    R: AsyncBufRead + Unpin,
{
    buf.clear();
    match reader.read_until(b'\n', buf).await {
        Ok(0) | Err(_) => None,
        Ok(_) => {
            let line = String::from_utf8_lossy(buf);
            Some(line.trim_end_matches(&['\n', '\r'][..]).to_string())
        }
    }
}

fn last_line(text: &str) -> Option<&str> {
    text.lines().map(str::trim).filter(|line| !line.is_empty()).last()
}
