// components/media_downloader/src/install.rs
use crate::types::DownloadError;
use tokio::process::Command;

/// Package managers that can install yt-dlp for the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageManager {
    Homebrew,
    Pipx,
}

impl PackageManager {
    /// Pick the first package manager found on this machine.
    ///
    /// Homebrew is assumed on macOS even when it is missing from PATH, since
    /// the install runs in a login shell that sets it up.
    pub fn detect() -> Option<Self> {
        if which::which("brew").is_ok() || cfg!(target_os = "macos") {
            Some(PackageManager::Homebrew)
        } else if which::which("pipx").is_ok() {
            Some(PackageManager::Pipx)
        } else {
            None
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            PackageManager::Homebrew => "Homebrew",
            PackageManager::Pipx => "pipx",
        }
    }

    pub fn install_command(&self) -> &'static str {
        match self {
            PackageManager::Homebrew => "brew install yt-dlp",
            PackageManager::Pipx => "pipx install yt-dlp",
        }
    }

    fn login_shell() -> &'static str {
        if cfg!(target_os = "macos") {
            "zsh"
        } else {
            "sh"
        }
    }

    /// Install yt-dlp. This can take a couple of minutes.
    pub async fn install(&self) -> Result<(), DownloadError> {
        let command = self.install_command();
        tracing::info!("Installing yt-dlp with {}: {}", self.name(), command);

        let output = Command::new(Self::login_shell())
            .arg("-l")
            .arg("-c")
            .arg(command)
            .output()
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            tracing::warn!("{} failed: {}", command, stderr.trim());
            return Err(DownloadError::InstallFailed(format!(
                "`{}` exited with status: {}",
                command, output.status
            )));
        }

        tracing::info!("yt-dlp installed");
        Ok(())
    }
}
