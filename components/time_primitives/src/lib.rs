use std::fmt;
use std::str::FromStr;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TimeError {
    #[error("Invalid time format: {0:?} (expected HH:MM:SS or MM:SS)")]
    InvalidFormat(String),
}

/// A position in a media file, in whole seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timecode(u64);

impl Timecode {
    pub const ZERO: Self = Self(0);

    pub fn from_secs(secs: u64) -> Self {
        Self(secs)
    }

    pub fn as_secs(&self) -> u64 {
        self.0
    }

    /// Zero-padded HH:MM:SS, the shape ffmpeg expects for `-ss`/`-to`
    pub fn to_hms(&self) -> String {
        let hours = self.0 / 3600;
        let minutes = (self.0 % 3600) / 60;
        let seconds = self.0 % 60;
        format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
    }
}

impl FromStr for Timecode {
    type Err = TimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse(s).map(Self)
    }
}

/// Renders as MM:SS; minutes are not folded into hours
impl fmt::Display for Timecode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format(self.0))
    }
}

/// Parse `MM:SS` or `HH:MM:SS` into seconds.
///
/// Two parts are read as minutes and seconds, three as hours, minutes and
/// seconds. Parts must be plain digit runs; fields are not range checked, so
/// `"90:00"` is 5400 seconds.
pub fn parse(text: &str) -> Result<u64, TimeError> {
    let invalid = || TimeError::InvalidFormat(text.to_string());

    let parts = text
        .trim()
        .split(':')
        .map(|part| parse_part(part).ok_or_else(invalid))
        .collect::<Result<Vec<u64>, _>>()?;

    let (hours, minutes, seconds) = match parts[..] {
        [minutes, seconds] => (0, minutes, seconds),
        [hours, minutes, seconds] => (hours, minutes, seconds),
        _ => return Err(invalid()),
    };

    hours
        .checked_mul(3600)
        .and_then(|h| minutes.checked_mul(60).and_then(|m| h.checked_add(m)))
        .and_then(|hm| hm.checked_add(seconds))
        .ok_or_else(invalid)
}

fn parse_part(part: &str) -> Option<u64> {
    if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    part.parse().ok()
}

/// Format seconds as zero-padded `MM:SS`
pub fn format(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

/// An empty field is valid; anything else has to parse
pub fn is_valid(text: &str) -> bool {
    text.is_empty() || parse(text).is_ok()
}
