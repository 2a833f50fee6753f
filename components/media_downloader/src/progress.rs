// components/media_downloader/src/progress.rs
use crate::types::Progress;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::PathBuf;

static PROGRESS_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^\[download\]\s+(\d+(?:\.\d+)?)%\s+of\s+~?\s*(\S+)(?:\s+at\s+(\S+))?(?:\s+ETA\s+(\S+))?",
    )
    .expect("valid progress pattern")
});

static EVENT_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\[([\w:]+)\]\s+(.*)$").expect("valid event pattern"));

static DESTINATION_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^\[(?:download|ExtractAudio|VideoConvertor|VideoRemuxer)\] Destination: (.+)$"#)
        .expect("valid destination pattern")
});

static MERGE_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^\[Merger\] Merging formats into "(.+)"$"#).expect("valid merge pattern")
});

static ALREADY_DOWNLOADED_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\[download\] (.+) has already been downloaded").expect("valid pattern")
});

/// A line of yt-dlp output, as far as we care about it
#[derive(Debug, Clone, PartialEq)]
pub enum ToolMessage {
    Progress(Progress),
    /// A file yt-dlp wrote or is about to write; the last one is the result
    Destination(PathBuf),
    /// Any other `[tag] data` line
    Event { kind: String, data: String },
    Other(String),
}

impl ToolMessage {
    pub fn parse(line: &str) -> Self {
        let line = line.trim_end();

        if let Some(caps) = PROGRESS_LINE.captures(line) {
            let percent = caps[1].parse().unwrap_or(0.0);
            let field = |i: usize| caps.get(i).map(|m| m.as_str().to_string());
            return ToolMessage::Progress(Progress {
                percent,
                total_size: field(2),
                current_speed: field(3),
                eta: field(4),
            });
        }

        let destination = DESTINATION_LINE
            .captures(line)
            .or_else(|| MERGE_LINE.captures(line))
            .or_else(|| ALREADY_DOWNLOADED_LINE.captures(line));
        if let Some(caps) = destination {
            return ToolMessage::Destination(PathBuf::from(&caps[1]));
        }

        if let Some(caps) = EVENT_LINE.captures(line) {
            return ToolMessage::Event {
                kind: caps[1].to_string(),
                data: caps[2].to_string(),
            };
        }

        ToolMessage::Other(line.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_progress_line() {
        let msg = ToolMessage::parse("[download]  45.2% of   10.00MiB at    1.00MiB/s ETA 00:05");
        assert_eq!(
            msg,
            ToolMessage::Progress(Progress {
                percent: 45.2,
                total_size: Some("10.00MiB".to_string()),
                current_speed: Some("1.00MiB/s".to_string()),
                eta: Some("00:05".to_string()),
            })
        );
    }

    #[test]
    fn test_estimated_size() {
        let msg = ToolMessage::parse("[download]   3.0% of ~  52.61MiB at  812.31KiB/s ETA 01:04 (frag 2/66)");
        assert_matches!(msg, ToolMessage::Progress(p) if p.percent == 3.0
            && p.total_size.as_deref() == Some("52.61MiB")
            && p.eta.as_deref() == Some("01:04"));
    }

    #[test]
    fn test_final_progress_line() {
        let msg = ToolMessage::parse("[download] 100% of   10.00MiB in 00:00:03 at 3.21MiB/s");
        assert_matches!(msg, ToolMessage::Progress(p) if p.percent == 100.0
            && p.total_size.as_deref() == Some("10.00MiB")
            && p.current_speed.is_none());
    }

    #[test]
    fn test_destinations() {
        assert_eq!(
            ToolMessage::parse("[download] Destination: /dl/Song [abc].webm"),
            ToolMessage::Destination(PathBuf::from("/dl/Song [abc].webm"))
        );
        assert_eq!(
            ToolMessage::parse(r#"[Merger] Merging formats into "/dl/Clip [xyz].mp4""#),
            ToolMessage::Destination(PathBuf::from("/dl/Clip [xyz].mp4"))
        );
        assert_eq!(
            ToolMessage::parse("[ExtractAudio] Destination: /dl/Song.mp3"),
            ToolMessage::Destination(PathBuf::from("/dl/Song.mp3"))
        );
        assert_eq!(
            ToolMessage::parse("[download] /dl/Old.mp4 has already been downloaded"),
            ToolMessage::Destination(PathBuf::from("/dl/Old.mp4"))
        );
    }

    #[test]
    fn test_other_tagged_lines_are_events() {
        assert_eq!(
            ToolMessage::parse("[youtube] 2yJgwwDcgV8: Downloading webpage"),
            ToolMessage::Event {
                kind: "youtube".to_string(),
                data: "2yJgwwDcgV8: Downloading webpage".to_string(),
            }
        );
        assert_matches!(
            ToolMessage::parse("[youtube:tab] Extracting URL"),
            ToolMessage::Event { kind, .. } if kind == "youtube:tab"
        );
    }

    #[test]
    fn test_untagged_lines() {
        assert_eq!(
            ToolMessage::parse("Deleting original file /dl/x.webm\r\n"),
            ToolMessage::Other("Deleting original file /dl/x.webm".to_string())
        );
    }
}
