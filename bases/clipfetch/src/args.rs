// bases/clipfetch/src/args.rs
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Download videos and audio with yt-dlp
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Directory to store downloaded files (overrides the saved preference)
    #[arg(long, global = true)]
    pub download_dir: Option<PathBuf>,

    /// Path to the yt-dlp executable (overrides the saved preference)
    #[arg(long, global = true)]
    pub ytdlp_path: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Download a video or its audio
    Download(DownloadArgs),

    /// List the formats available for a URL
    Formats {
        /// URL to inspect; read from the clipboard when omitted
        url: Option<String>,
    },

    /// Install yt-dlp with a package manager
    Install,

    /// Show preferences, or save the --download-dir/--ytdlp-path given
    Config {
        /// Persist the overrides given on this command line
        #[arg(long)]
        save: bool,
    },
}

#[derive(Args, Debug)]
pub struct DownloadArgs {
    /// URL to download from; read from the clipboard when omitted
    pub url: Option<String>,

    /// Format identifier (itag), as listed by `clipfetch formats`
    #[arg(short, long)]
    pub format: Option<String>,

    /// Save with this extension instead of the stream's own, e.g. ".mp3"
    #[arg(long)]
    pub ext: Option<String>,

    /// Start of the clip, HH:MM:SS or MM:SS
    #[arg(long)]
    pub start: Option<String>,

    /// End of the clip, HH:MM:SS or MM:SS
    #[arg(long)]
    pub end: Option<String>,

    /// Copy the downloaded file to the clipboard
    #[arg(short, long)]
    pub copy: bool,

    /// Open the containing folder when done
    #[arg(long)]
    pub open: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn parses_full_download() {
        let cli = Cli::try_parse_from([
            "clipfetch",
            "download",
            "https://example.com/v",
            "-f",
            "22",
            "--ext",
            ".mp3",
            "--start",
            "00:10",
            "--end",
            "01:00",
            "--copy",
            "--download-dir",
            "/tmp/dl",
        ])
        .unwrap();

        assert_eq!(cli.download_dir, Some(PathBuf::from("/tmp/dl")));
        match cli.command {
            Command::Download(args) => {
                assert_eq!(args.url.as_deref(), Some("https://example.com/v"));
                assert_eq!(args.format.as_deref(), Some("22"));
                assert_eq!(args.ext.as_deref(), Some(".mp3"));
                assert_eq!(args.start.as_deref(), Some("00:10"));
                assert_eq!(args.end.as_deref(), Some("01:00"));
                assert!(args.copy);
                assert!(!args.open);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn url_is_optional() {
        let cli = Cli::try_parse_from(["clipfetch", "formats"]).unwrap();
        assert!(matches!(cli.command, Command::Formats { url: None }));
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["clipfetch", "config", "--save", "--ytdlp-path", "/opt/yt-dlp", "-v"])
            .unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.ytdlp_path, Some(PathBuf::from("/opt/yt-dlp")));
        assert!(matches!(cli.command, Command::Config { save: true }));
    }

    #[rstest]
    #[case::no_subcommand(&["clipfetch"])]
    #[case::unknown_subcommand(&["clipfetch", "play"])]
    #[case::format_without_value(&["clipfetch", "download", "-f"])]
    #[case::extra_positional(&["clipfetch", "formats", "a", "b"])]
    fn rejects_malformed_invocations(#[case] argv: &[&str]) {
        assert!(Cli::try_parse_from(argv).is_err());
    }
}
