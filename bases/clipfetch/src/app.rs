// bases/clipfetch/src/app.rs
use crate::args::{Cli, Command, DownloadArgs};
use crate::clipboard;
use crate::config::{Config, Preferences};
use crate::output::{Notification, OutputHandler};
use color_eyre::eyre::{bail, eyre};
use color_eyre::Result;
use media_downloader::{
    is_valid_url, validate, DownloadError, DownloadForm, DownloadOutcome, Field, FieldError,
    FormatCatalog, MediaDownloader, PackageManager, StateTracker,
};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

pub struct App {
    cli: Cli,
    output: OutputHandler,
}

impl App {
    pub fn new(cli: Cli) -> Self {
        let output = OutputHandler::new(cli.verbose);
        Self { cli, output }
    }

    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Command::Download(args) => self.download(args).await,
            Command::Formats { url } => self.formats(url.as_deref()).await,
            Command::Install => self.install().await,
            Command::Config { save } => self.config(*save),
        }
    }

    pub fn print_error(&self, error: &color_eyre::Report) {
        self.output.print_error(error);
    }

    fn preferences(&self) -> Result<Preferences> {
        match Preferences::default_file() {
            Some(file) => Preferences::load(&file),
            None => Ok(Preferences::default()),
        }
    }

    fn effective_config(&self) -> Result<Config> {
        let preferences = self.preferences()?.merged_with(&self.cli);
        Ok(Config::from_preferences(&preferences))
    }

    /// Fails with the install instructions printed when yt-dlp is missing
    async fn downloader(&self, config: &Config) -> Result<MediaDownloader> {
        match MediaDownloader::new(&config.download_path, &config.ytdlp_binary_path).await {
            Ok(downloader) => Ok(downloader),
            Err(DownloadError::DependencyNotFound(path)) => {
                self.output
                    .print_missing_executable("yt-dlp", PackageManager::detect());
                bail!("yt-dlp not found at {}", path)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// The URL given on the command line, or a URL sitting on the clipboard
    async fn resolve_url(&self, url: Option<&str>) -> Result<String> {
        if let Some(url) = url {
            return Ok(url.to_string());
        }
        match clipboard::read_text().await {
            Some(text) if is_valid_url(&text) => {
                tracing::info!("Using URL from clipboard: {}", text);
                Ok(text)
            }
            _ => bail!("URL is required (none given and none on the clipboard)"),
        }
    }

    async fn formats(&self, url: Option<&str>) -> Result<()> {
        let config = self.effective_config()?;
        let downloader = self.downloader(&config).await?;
        let url = self.resolve_url(url).await?;

        let spinner = self.output.spinner("Fetching video info...");
        let info = downloader
            .fetch_info(&url, &mut StateTracker::new(), &CancellationToken::new())
            .await;
        spinner.finish_and_clear();
        let info = info.map_err(|e| self.lookup_error(e))?;

        self.output.print_video(&url, &info);
        self.output.print_catalog(&FormatCatalog::from_info(&info));
        Ok(())
    }

    async fn download(&self, args: &DownloadArgs) -> Result<()> {
        let config = self.effective_config()?;
        let downloader = self.downloader(&config).await?;
        let url = self.resolve_url(args.url.as_deref()).await?;

        let cancel = CancellationToken::new();
        let ctrl_c = {
            let cancel = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    tracing::debug!("Ctrl-C received");
                    cancel.cancel();
                }
            })
        };

        let (updates, states) = mpsc::unbounded_channel();
        let notification = Notification::spawn(states);
        let mut tracker = StateTracker::with_updates(updates);

        let result = self.fetch_and_download(&url, args, &downloader, &mut tracker, &cancel).await;

        drop(tracker);
        let _ = notification.await;
        ctrl_c.abort();

        let (outcome, copy_to_clipboard) = result?;
        match outcome {
            DownloadOutcome::Succeeded(report) => {
                self.output.print_download_complete(&report);
                if args.open {
                    open::that(&report.folder)?;
                }
                if copy_to_clipboard {
                    let file = report
                        .file
                        .as_deref()
                        .ok_or_else(|| eyre!("yt-dlp did not report the downloaded file"))?;
                    clipboard::copy_file(file).await?;
                    self.output.print_copied();
                }
                Ok(())
            }
            DownloadOutcome::Failed(error) => {
                self.output.print_download_failed(&error);
                Err(eyre!(error).wrap_err("Download failed"))
            }
            DownloadOutcome::Cancelled => {
                self.output.print_cancelled();
                Ok(())
            }
        }
    }

    async fn fetch_and_download(
        &self,
        url: &str,
        args: &DownloadArgs,
        downloader: &MediaDownloader,
        tracker: &mut StateTracker,
        cancel: &CancellationToken,
    ) -> Result<(DownloadOutcome, bool)> {
        let info = match downloader.fetch_info(url, tracker, cancel).await {
            Ok(info) => info,
            Err(DownloadError::Cancelled) => return Ok((DownloadOutcome::Cancelled, false)),
            Err(e) => return Err(self.lookup_error(e)),
        };
        self.output.print_video(url, &info);

        let catalog = FormatCatalog::from_info(&info);
        let format = match args.format.as_deref() {
            None => None,
            Some(itag) => match catalog.find(itag) {
                Some(entry) => Some(entry.choice.clone()),
                None => {
                    self.output.print_catalog(&catalog);
                    bail!("Format {} is not available for this video", itag);
                }
            },
        };
        if format.is_none() {
            self.output.print_catalog(&catalog);
        }

        let form = DownloadForm {
            url: url.to_string(),
            format: format.map(|choice| choice.to_string()).unwrap_or_default(),
            copy_to_clipboard: args.copy,
            start_time: args.start.clone().unwrap_or_default(),
            end_time: args.end.clone().unwrap_or_default(),
            ext: args.ext.clone().unwrap_or_default(),
        };

        let request = match validate(&form, &info) {
            Ok(request) => request,
            Err(rejected) => {
                self.output.print_field_errors(&rejected.0);
                return Err(rejected.into());
            }
        };

        self.output.print_download_start(&request.url, &request.format);
        let outcome = downloader.download(&request, tracker, cancel).await;
        Ok((outcome, request.copy_to_clipboard))
    }

    /// A failed lookup is reported against the URL field
    fn lookup_error(&self, error: DownloadError) -> color_eyre::Report {
        let message = match &error {
            DownloadError::InvalidUrl(_) => "Invalid URL",
            _ => "Video not found",
        };
        self.output.print_field_errors(&[FieldError {
            field: Field::Url,
            message,
        }]);
        eyre!(error)
    }

    async fn install(&self) -> Result<()> {
        let Some(manager) = PackageManager::detect() else {
            bail!("No supported package manager found; install yt-dlp manually or Homebrew from https://brew.sh");
        };

        let spinner = self.output.spinner("Installing yt-dlp...");
        let result = manager.install().await;
        spinner.finish_and_clear();

        match result {
            Ok(()) => {
                println!("yt-dlp installed");
                Ok(())
            }
            Err(e) => Err(eyre!(e).wrap_err("Error installing: an unknown error occurred while trying to install")),
        }
    }

    fn config(&self, save: bool) -> Result<()> {
        let file = Preferences::default_file();

        if save {
            let file = file
                .as_deref()
                .ok_or_else(|| eyre!("No configuration directory on this system"))?;
            let preferences = self.preferences()?.merged_with(&self.cli);
            preferences.save(file)?;
            tracing::info!("Saved preferences to {}", file.display());
        }

        let config = self.effective_config()?;
        self.output.print_config(&config, file.as_deref());
        Ok(())
    }
}
