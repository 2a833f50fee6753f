// components/media_downloader/src/utils.rs
use once_cell::sync::Lazy;
use regex::Regex;

static URL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^(ftp|http|https)://[^ "]+$"#).expect("valid URL pattern"));

/// Loose URL check: a known scheme followed by anything without spaces or quotes
pub fn is_valid_url(url: &str) -> bool {
    URL_PATTERN.is_match(url)
}

/// Normalize a user supplied extension (".mp4", "mp3") to its bare form.
///
/// Returns `None` for empty input and for anything that is not purely
/// alphanumeric, since it ends up inside an output path.
pub fn normalize_extension(ext: &str) -> Option<String> {
    let ext = ext.trim();
    let ext = ext.strip_prefix('.').unwrap_or(ext);
    if ext.is_empty() || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(ext.to_string())
}
