// bases/clipfetch/src/output.rs
use crate::config::Config;
use indicatif::{HumanBytes, ProgressBar, ProgressStyle};
use media_downloader::{
    DownloadReport, DownloadState, FieldError, FormatCatalog, FormatChoice, FormatEntry,
    PackageManager, VideoInfo,
};
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::JoinHandle;

pub struct OutputHandler {
    verbose: bool,
}

impl OutputHandler {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    pub fn print_video(&self, url: &str, info: &VideoInfo) {
        println!("Title: {}", display_title(&info.title));
        println!("Duration: {}", time_primitives::format(info.duration_secs()));
        if self.verbose {
            println!("Source: {}", info.webpage_url.as_deref().unwrap_or(url));
            if let Some(uploader) = &info.uploader {
                println!("Uploader: {}", uploader);
            }
        }
    }

    pub fn print_catalog(&self, catalog: &FormatCatalog) {
        if catalog.is_empty() {
            println!("No downloadable formats found");
            return;
        }
        for section in catalog.sections() {
            if section.entries.is_empty() {
                continue;
            }
            println!("\n{}", section.title);
            for entry in &section.entries {
                println!("  {:>8}  {}", entry.choice.itag(), entry_label(entry));
            }
        }
    }

    pub fn print_field_errors(&self, errors: &[FieldError]) {
        for error in errors {
            eprintln!("{}", error);
        }
    }

    pub fn print_download_start(&self, url: &str, choice: &FormatChoice) {
        let kind = if choice.is_audio() { "audio" } else { "video" };
        println!("Starting {} download from: {}", kind, url);
    }

    pub fn print_download_complete(&self, report: &DownloadReport) {
        println!("Download Complete: {}", report.url);
        match &report.file {
            Some(file) => println!("Saved to {}", file.display()),
            None => println!("Saved in {}", report.folder.display()),
        }
        if self.verbose {
            println!("Finished at: {}", report.finished_at);
        }
    }

    pub fn print_download_failed(&self, error: &media_downloader::DownloadError) {
        eprintln!("Download Failed: Please try again later.");
        if self.verbose {
            eprintln!("  caused by: {}", error);
        }
    }

    pub fn print_cancelled(&self) {
        eprintln!("Download Cancelled");
    }

    pub fn print_copied(&self) {
        println!("Copied to Clipboard");
    }

    pub fn print_missing_executable(&self, executable: &str, manager: Option<PackageManager>) {
        eprintln!();
        eprintln!("🚨 Error: `{}` is not installed", executable);
        eprintln!();
        eprintln!("clipfetch depends on a command-line utility that is not detected on your system.");
        eprintln!("You must install it to continue.");
        match manager {
            Some(manager) => {
                eprintln!();
                eprintln!(
                    "Run `clipfetch install` to install it with {} (`{}`).",
                    manager.name(),
                    manager.install_command()
                );
                eprintln!("Since `{}` is a heavy library, it can take up to 2 minutes.", executable);
            }
            None => {
                eprintln!();
                eprintln!("To install Homebrew, visit https://brew.sh");
            }
        }
        eprintln!();
        eprintln!("If it is installed somewhere else, point to it with --ytdlp-path.");
    }

    pub fn print_config(&self, config: &Config, file: Option<&std::path::Path>) {
        println!("Download path: {}", config.download_path.display());
        println!("yt-dlp binary: {}", config.ytdlp_binary_path.display());
        if let Some(file) = file {
            println!("Preferences file: {}", file.display());
        }
    }

    pub fn spinner(&self, message: &'static str) -> ProgressBar {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        spinner.set_message(message);
        spinner.enable_steady_tick(Duration::from_millis(100));
        spinner
    }

    pub fn print_error(&self, error: &color_eyre::Report) {
        eprintln!("Error: {}", error);

        if self.verbose {
            eprintln!("\nError details:");
            error.chain().skip(1).for_each(|cause| {
                eprintln!("  caused by: {}", cause);
            });
        }
    }
}

/// Live notification for a running download, fed with state changes
pub struct Notification;

impl Notification {
    pub fn spawn(mut states: UnboundedReceiver<DownloadState>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let bar = ProgressBar::new(100);
            bar.set_style(
                ProgressStyle::default_bar()
                    .template("{prefix:.bold} [{bar:30.cyan/blue}] {pos:>3}% {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("=> "),
            );

            while let Some(state) = states.recv().await {
                bar.set_prefix(state.title());
                match &state {
                    DownloadState::Downloading(progress) => {
                        bar.set_position(progress.percent.clamp(0.0, 100.0) as u64);
                        bar.set_message(progress_details(progress));
                    }
                    state if state.is_terminal() => {
                        bar.finish_and_clear();
                        break;
                    }
                    _ => bar.tick(),
                }
            }
            if !bar.is_finished() {
                bar.finish_and_clear();
            }
        })
    }
}

fn progress_details(progress: &media_downloader::Progress) -> String {
    [
        progress.total_size.as_deref().map(|size| format!("of {}", size)),
        progress.current_speed.as_deref().map(|speed| format!("at {}", speed)),
        progress.eta.as_deref().map(|eta| format!("ETA {}", eta)),
    ]
    .into_iter()
    .flatten()
    .collect::<Vec<_>>()
    .join(" ")
}

fn display_title(title: &str) -> &str {
    if title.is_empty() {
        "No video selected"
    } else {
        title
    }
}

/// One line of the format list, e.g. `1280x720 (12.34 MiB) [mp4] [720p]`
pub fn entry_label(entry: &FormatEntry) -> String {
    let format = &entry.format;
    let size = format
        .size()
        .map(|bytes| format!(" ({})", HumanBytes(bytes)))
        .unwrap_or_default();

    match &entry.choice {
        FormatChoice::Video { container, .. } => {
            let note = format
                .format_note
                .as_deref()
                .map(|note| format!(" [{}]", note))
                .unwrap_or_default();
            format!(
                "{}{} [{}]{}",
                format.resolution.as_deref().unwrap_or("unknown"),
                size,
                container,
                note
            )
        }
        FormatChoice::Audio { .. } => {
            let quality = match (format.abr, format.format.as_deref()) {
                (Some(abr), _) => format!("{:.0}kbps", abr),
                (None, Some(description)) => description.to_string(),
                (None, None) => format.format_id.clone(),
            };
            format!("{}{} [{}]", quality, size, format.ext)
        }
    }
}
