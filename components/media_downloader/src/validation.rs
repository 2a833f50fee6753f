// components/media_downloader/src/validation.rs
use crate::format::FormatChoice;
use crate::types::VideoInfo;
use crate::utils::{is_valid_url, normalize_extension};
use std::fmt;
use thiserror::Error;
use time_primitives::Timecode;

/// Raw form input, exactly as typed
#[derive(Debug, Clone, Default)]
pub struct DownloadForm {
    pub url: String,
    /// Encoded [`FormatChoice`]
    pub format: String,
    pub copy_to_clipboard: bool,
    pub start_time: String,
    pub end_time: String,
    pub ext: String,
}

/// A form that passed validation
#[derive(Debug, Clone, PartialEq)]
pub struct DownloadRequest {
    pub url: String,
    pub format: FormatChoice,
    pub copy_to_clipboard: bool,
    pub start_time: Option<Timecode>,
    pub end_time: Option<Timecode>,
    /// Extension override without the leading dot
    pub ext: Option<String>,
}

impl DownloadRequest {
    /// The window to cut to, if the user asked for one
    pub fn trim_window(&self) -> Option<(Timecode, Option<Timecode>)> {
        match (self.start_time, self.end_time) {
            (None, None) => None,
            (start, end) => Some((start.unwrap_or(Timecode::ZERO), end)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Url,
    Format,
    StartTime,
    EndTime,
    Ext,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Field::Url => "URL",
            Field::Format => "Format",
            Field::StartTime => "Start Time",
            Field::EndTime => "End Time",
            Field::Ext => "Custom extension",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: Field,
    pub message: &'static str,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

#[derive(Debug, Error)]
#[error("form rejected: {}", .0.iter().map(ToString::to_string).collect::<Vec<_>>().join("; "))]
pub struct FormRejected(pub Vec<FieldError>);

impl FormRejected {
    pub fn error_for(&self, field: Field) -> Option<&FieldError> {
        self.0.iter().find(|error| error.field == field)
    }
}

/// Check a submitted form against the video it refers to.
///
/// Every field is checked; all problems are reported together.
pub fn validate(form: &DownloadForm, info: &VideoInfo) -> Result<DownloadRequest, FormRejected> {
    let mut errors = Vec::new();
    let mut reject = |field, message| errors.push(FieldError { field, message });

    let url = form.url.trim();
    if url.is_empty() {
        reject(Field::Url, "URL is required");
    } else if !is_valid_url(url) {
        reject(Field::Url, "Invalid URL");
    }

    let format = if form.format.is_empty() {
        reject(Field::Format, "Format is required");
        None
    } else {
        let decoded = form.format.parse::<FormatChoice>().ok();
        if decoded.is_none() {
            reject(Field::Format, "Unknown format");
        }
        decoded
    };

    let start_time = parse_optional(&form.start_time);
    if start_time.is_err() {
        reject(Field::StartTime, "Invalid time format");
    }

    let end_time = parse_optional(&form.end_time);
    match end_time {
        Err(()) => reject(Field::EndTime, "Invalid time format"),
        Ok(Some(end)) if end.as_secs() as f64 > info.duration.unwrap_or(0.0) => {
            reject(Field::EndTime, "End time is greater than video duration")
        }
        Ok(Some(end)) if matches!(start_time, Ok(Some(start)) if start >= end) => {
            reject(Field::StartTime, "Start time must be before end time")
        }
        Ok(_) => {}
    }

    let ext = if form.ext.trim().is_empty() {
        None
    } else {
        let normalized = normalize_extension(&form.ext);
        if normalized.is_none() {
            reject(Field::Ext, "Invalid extension");
        }
        normalized
    };

    match (format, start_time, end_time) {
        (Some(format), Ok(start_time), Ok(end_time)) if errors.is_empty() => Ok(DownloadRequest {
            url: url.to_string(),
            format,
            copy_to_clipboard: form.copy_to_clipboard,
            start_time,
            end_time,
            ext,
        }),
        _ => Err(FormRejected(errors)),
    }
}

/// An empty field is absent; anything else must pass `time_primitives::is_valid`
fn parse_optional(text: &str) -> Result<Option<Timecode>, ()> {
    if text.is_empty() {
        return Ok(None);
    }
    text.parse().map(Some).map_err(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn info(duration: f64) -> VideoInfo {
        VideoInfo {
            title: "Test Video".to_string(),
            duration: Some(duration),
            ..Default::default()
        }
    }

    fn form() -> DownloadForm {
        DownloadForm {
            url: "https://www.youtube.com/watch?v=2yJgwwDcgV8".to_string(),
            format: FormatChoice::Video {
                itag: "22".to_string(),
                container: "mp4".to_string(),
            }
            .to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_minimal_form_is_accepted() {
        let request = validate(&form(), &info(600.0)).unwrap();
        assert_eq!(request.format.itag(), "22");
        assert_eq!(request.start_time, None);
        assert_eq!(request.end_time, None);
        assert_eq!(request.trim_window(), None);
        assert_eq!(request.ext, None);
    }

    #[test]
    fn test_end_time_beyond_duration_is_rejected() {
        let form = DownloadForm {
            end_time: "11:00".to_string(),
            ..form()
        };
        let rejected = validate(&form, &info(600.0)).unwrap_err();
        assert_eq!(
            rejected.error_for(Field::EndTime).map(|e| e.message),
            Some("End time is greater than video duration")
        );
    }

    #[test]
    fn test_end_time_within_duration_is_accepted() {
        let form = DownloadForm {
            end_time: "09:59".to_string(),
            ..form()
        };
        let request = validate(&form, &info(600.0)).unwrap();
        assert_eq!(request.end_time, Some(Timecode::from_secs(599)));
        assert_eq!(
            request.trim_window(),
            Some((Timecode::ZERO, Some(Timecode::from_secs(599))))
        );
    }

    #[test]
    fn test_end_time_equal_to_duration_is_accepted() {
        let form = DownloadForm {
            end_time: "10:00".to_string(),
            ..form()
        };
        assert!(validate(&form, &info(600.0)).is_ok());
    }

    #[test]
    fn test_unknown_duration_rejects_any_end_time() {
        let form = DownloadForm {
            end_time: "00:01".to_string(),
            ..form()
        };
        assert!(validate(&form, &VideoInfo::default()).is_err());
    }

    #[test]
    fn test_all_field_errors_are_reported() {
        let form = DownloadForm {
            url: "not a url".to_string(),
            format: String::new(),
            start_time: "abc".to_string(),
            end_time: "1:2:3:4".to_string(),
            ext: "../mp4".to_string(),
            copy_to_clipboard: false,
        };
        let FormRejected(errors) = validate(&form, &info(600.0)).unwrap_err();
        assert_eq!(
            errors,
            vec![
                FieldError { field: Field::Url, message: "Invalid URL" },
                FieldError { field: Field::Format, message: "Format is required" },
                FieldError { field: Field::StartTime, message: "Invalid time format" },
                FieldError { field: Field::EndTime, message: "Invalid time format" },
                FieldError { field: Field::Ext, message: "Invalid extension" },
            ]
        );
    }

    #[test]
    fn test_missing_url() {
        let form = DownloadForm {
            url: "  ".to_string(),
            ..form()
        };
        let rejected = validate(&form, &info(600.0)).unwrap_err();
        assert_eq!(
            rejected.error_for(Field::Url).map(|e| e.message),
            Some("URL is required")
        );
    }

    #[test]
    fn test_undecodable_format() {
        let form = DownloadForm {
            format: "22".to_string(),
            ..form()
        };
        let rejected = validate(&form, &info(600.0)).unwrap_err();
        assert_matches!(
            rejected.error_for(Field::Format),
            Some(FieldError { message: "Unknown format", .. })
        );
    }

    #[test]
    fn test_start_must_precede_end() {
        let form = DownloadForm {
            start_time: "05:00".to_string(),
            end_time: "04:00".to_string(),
            ..form()
        };
        let rejected = validate(&form, &info(600.0)).unwrap_err();
        assert_eq!(
            rejected.error_for(Field::StartTime).map(|e| e.message),
            Some("Start time must be before end time")
        );
    }

    #[test]
    fn test_start_only_trims_to_the_end() {
        let form = DownloadForm {
            start_time: "1:30".to_string(),
            ext: ".mp3".to_string(),
            ..form()
        };
        let request = validate(&form, &info(600.0)).unwrap();
        assert_eq!(request.trim_window(), Some((Timecode::from_secs(90), None)));
        assert_eq!(request.ext.as_deref(), Some("mp3"));
    }

    #[test]
    fn test_rejection_message_lists_fields() {
        let form = DownloadForm {
            url: String::new(),
            ..form()
        };
        let rejected = validate(&form, &info(600.0)).unwrap_err();
        assert_eq!(rejected.to_string(), "form rejected: URL: URL is required");
    }

    #[test]
    fn test_blank_times_are_invalid() {
        let form = DownloadForm {
            start_time: "  ".to_string(),
            end_time: " ".to_string(),
            ..form()
        };
        assert!(!time_primitives::is_valid(&form.start_time));

        let rejected = validate(&form, &info(600.0)).unwrap_err();
        assert_eq!(rejected.0.len(), 2);
        for field in [Field::StartTime, Field::EndTime] {
            assert_eq!(
                rejected.error_for(field).map(|error| error.message),
                Some("Invalid time format")
            );
        }
    }

    #[test]
    fn test_padded_time_is_accepted() {
        let form = DownloadForm {
            start_time: " 00:10 ".to_string(),
            ..form()
        };
        let request = validate(&form, &info(600.0)).unwrap();
        assert_eq!(request.start_time, Some(Timecode::from_secs(10)));
    }
}
