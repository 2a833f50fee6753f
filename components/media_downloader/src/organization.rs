// components/media_downloader/src/organization.rs
use std::path::{Path, PathBuf};

/// Where yt-dlp writes a download: a folder plus a file name template.
///
/// The stem is a yt-dlp output template (`%(title)s` and friends) and is
/// expanded by yt-dlp, not by us.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputTemplate {
    folder: PathBuf,
    stem: String,
}

impl OutputTemplate {
    pub const DEFAULT_STEM: &'static str = "%(title)s [%(id)s]";
    /// Lets yt-dlp pick the extension of the selected stream
    pub const TOOL_EXTENSION: &'static str = "%(ext)s";

    pub fn new(folder: impl Into<PathBuf>) -> Self {
        Self::with_stem(folder, Self::DEFAULT_STEM)
    }

    pub fn with_stem(folder: impl Into<PathBuf>, stem: impl Into<String>) -> Self {
        Self {
            folder: folder.into(),
            stem: stem.into(),
        }
    }

    pub fn folder(&self) -> &Path {
        &self.folder
    }

    /// Full output path, with `ext` overriding the stream's own extension
    pub fn to_path(&self, ext: Option<&str>) -> PathBuf {
        let ext = ext.unwrap_or(Self::TOOL_EXTENSION);
        self.folder.join(format!("{}.{}", self.stem, ext))
    }
}
