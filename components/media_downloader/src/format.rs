// components/media_downloader/src/format.rs
use crate::types::{Format, VideoInfo};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Containers offered for video downloads, in display order
pub const VIDEO_CONTAINERS: [&str; 2] = ["mp4", "webm"];

/// The stream a user picked.
///
/// Serialized as a small JSON object so the choice can be stored in a plain
/// text field and read back unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum FormatChoice {
    #[serde(rename = "V")]
    Video { itag: String, container: String },
    #[serde(rename = "S")]
    Audio { itag: String },
}

impl FormatChoice {
    pub fn itag(&self) -> &str {
        match self {
            FormatChoice::Video { itag, .. } | FormatChoice::Audio { itag } => itag,
        }
    }

    pub fn is_audio(&self) -> bool {
        matches!(self, FormatChoice::Audio { .. })
    }
}

impl fmt::Display for FormatChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let encoded = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        f.write_str(&encoded)
    }
}

impl FromStr for FormatChoice {
    type Err = serde_json::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        serde_json::from_str(s)
    }
}

#[derive(Debug, Clone)]
pub struct FormatEntry {
    pub choice: FormatChoice,
    pub format: Format,
}

#[derive(Debug, Clone)]
pub struct FormatSection {
    pub title: String,
    pub entries: Vec<FormatEntry>,
}

/// Selectable formats of one video, grouped the way they are presented
#[derive(Debug, Clone)]
pub struct FormatCatalog {
    pub video: Vec<FormatSection>,
    pub audio: FormatSection,
}

impl FormatCatalog {
    pub fn from_info(info: &VideoInfo) -> Self {
        let video = VIDEO_CONTAINERS
            .iter()
            .map(|container| FormatSection {
                title: format!("Video ({})", container),
                entries: info
                    .formats
                    .iter()
                    .filter(|format| !format.is_audio_only() && format.ext == *container)
                    .map(|format| FormatEntry {
                        choice: FormatChoice::Video {
                            itag: format.format_id.clone(),
                            container: container.to_string(),
                        },
                        format: format.clone(),
                    })
                    .collect(),
            })
            .collect();

        let audio = FormatSection {
            title: "Audio".to_string(),
            entries: info
                .formats
                .iter()
                .filter(|format| format.is_audio_only())
                .map(|format| FormatEntry {
                    choice: FormatChoice::Audio {
                        itag: format.format_id.clone(),
                    },
                    format: format.clone(),
                })
                .collect(),
        };

        Self { video, audio }
    }

    pub fn sections(&self) -> impl Iterator<Item = &FormatSection> {
        self.video.iter().chain(std::iter::once(&self.audio))
    }

    pub fn find(&self, itag: &str) -> Option<&FormatEntry> {
        self.sections()
            .flat_map(|section| section.entries.iter())
            .find(|entry| entry.choice.itag() == itag)
    }

    pub fn is_empty(&self) -> bool {
        self.sections().all(|section| section.entries.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn format(id: &str, ext: &str, resolution: &str) -> Format {
        Format {
            format_id: id.to_string(),
            ext: ext.to_string(),
            resolution: Some(resolution.to_string()),
            ..Default::default()
        }
    }

    fn sample_info() -> VideoInfo {
        VideoInfo {
            title: "Test Video".to_string(),
            duration: Some(600.0),
            formats: vec![
                format("140", "m4a", "audio only"),
                format("251", "webm", "audio only"),
                format("18", "mp4", "640x360"),
                format("22", "mp4", "1280x720"),
                format("243", "webm", "640x360"),
                format("17", "3gp", "176x144"),
            ],
            ..Default::default()
        }
    }

    #[test]
    fn test_choice_wire_format() {
        let video = FormatChoice::Video {
            itag: "22".to_string(),
            container: "mp4".to_string(),
        };
        assert_eq!(
            video.to_string(),
            r#"{"type":"V","itag":"22","container":"mp4"}"#
        );

        let audio: FormatChoice = r#"{"type":"S","itag":"140"}"#.parse().unwrap();
        assert_eq!(audio, FormatChoice::Audio { itag: "140".to_string() });
        assert!(audio.is_audio());
        assert_eq!(audio.itag(), "140");
    }

    #[test]
    fn test_choice_survives_text_field() {
        let choice = FormatChoice::Video {
            itag: "243".to_string(),
            container: "webm".to_string(),
        };
        let decoded: FormatChoice = choice.to_string().parse().unwrap();
        assert_eq!(decoded, choice);
    }

    #[test]
    fn test_garbage_choice_is_rejected() {
        assert!("".parse::<FormatChoice>().is_err());
        assert!(r#"{"type":"X","itag":"1"}"#.parse::<FormatChoice>().is_err());
    }

    #[test]
    fn test_catalog_groups_by_container() {
        let catalog = FormatCatalog::from_info(&sample_info());

        let titles: Vec<_> = catalog.sections().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, ["Video (mp4)", "Video (webm)", "Audio"]);

        let mp4: Vec<_> = catalog.video[0].entries.iter().map(|e| e.choice.itag()).collect();
        assert_eq!(mp4, ["18", "22"]);

        let webm: Vec<_> = catalog.video[1].entries.iter().map(|e| e.choice.itag()).collect();
        assert_eq!(webm, ["243"]);

        let audio: Vec<_> = catalog.audio.entries.iter().map(|e| e.choice.itag()).collect();
        assert_eq!(audio, ["140", "251"]);
    }

    #[test]
    fn test_catalog_skips_unlisted_containers() {
        let catalog = FormatCatalog::from_info(&sample_info());
        assert!(catalog.find("17").is_none());
    }

    #[test]
    fn test_find_returns_tagged_choice() {
        let catalog = FormatCatalog::from_info(&sample_info());

        let entry = catalog.find("22").unwrap();
        assert_eq!(
            entry.choice,
            FormatChoice::Video {
                itag: "22".to_string(),
                container: "mp4".to_string()
            }
        );
        assert_eq!(entry.format.resolution.as_deref(), Some("1280x720"));

        assert!(catalog.find("251").unwrap().choice.is_audio());
    }

    #[test]
    fn test_empty_catalog() {
        let catalog = FormatCatalog::from_info(&VideoInfo::default());
        assert!(catalog.is_empty());
        assert_eq!(catalog.sections().count(), 3);
    }
}
