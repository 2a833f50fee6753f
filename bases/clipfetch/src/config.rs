// bases/clipfetch/src/config.rs
use crate::args::Cli;
use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Where yt-dlp usually lives when installed with Homebrew on Apple silicon
const HOMEBREW_YTDLP: &str = "/opt/homebrew/bin/yt-dlp";

/// Persisted user preferences
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Preferences {
    pub download_path: Option<PathBuf>,
    pub ytdlp_binary_path: Option<PathBuf>,
}

impl Preferences {
    /// `<config dir>/clipfetch/preferences.toml`
    pub fn default_file() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("clipfetch").join("preferences.toml"))
    }

    /// Load preferences; a missing file means defaults
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("Failed to read preferences from {}", path.display()))?;
        toml::from_str(&content)
            .wrap_err_with(|| format!("Failed to parse preferences in {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .wrap_err_with(|| format!("Failed to create {}", parent.display()))?;
        }
        let content = toml::to_string(self).wrap_err("Failed to serialize preferences")?;
        std::fs::write(path, content)
            .wrap_err_with(|| format!("Failed to write preferences to {}", path.display()))
    }

    /// Command line values win over saved ones
    pub fn merged_with(&self, cli: &Cli) -> Self {
        Self {
            download_path: cli.download_dir.clone().or_else(|| self.download_path.clone()),
            ytdlp_binary_path: cli.ytdlp_path.clone().or_else(|| self.ytdlp_binary_path.clone()),
        }
    }
}

/// Effective configuration with every default filled in
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub download_path: PathBuf,
    pub ytdlp_binary_path: PathBuf,
}

impl Config {
    pub fn from_preferences(preferences: &Preferences) -> Self {
        Self {
            download_path: preferences
                .download_path
                .clone()
                .unwrap_or_else(default_download_path),
            ytdlp_binary_path: preferences
                .ytdlp_binary_path
                .clone()
                .unwrap_or_else(default_ytdlp_path),
        }
    }
}

fn default_download_path() -> PathBuf {
    dirs::download_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join("Downloads")))
        .unwrap_or_else(|| PathBuf::from("."))
}

fn default_ytdlp_path() -> PathBuf {
    which::which("yt-dlp").unwrap_or_else(|_| PathBuf::from(HOMEBREW_YTDLP))
}
