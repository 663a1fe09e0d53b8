//! Input validation: counts and declared types, checked before any byte is
//! downloaded.

use crate::error::{MediaError, Result};

/// One attachment selected for a job, as declared by the chat platform.
#[derive(Debug, Clone)]
pub struct MediaSource {
    pub name: String,
    pub content_type: Option<String>,
    pub url: String,
    pub size: u64,
}

/// What a job accepts as input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Video,
    Pdf,
    Any,
}

const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "mkv", "webm", "avi", "m4v", "mpg", "mpeg"];

impl InputKind {
    fn expected(&self) -> &'static str {
        match self {
            InputKind::Video => "video",
            InputKind::Pdf => "PDF",
            InputKind::Any => "file",
        }
    }

    /// Content type first, extension as the fallback for platforms that
    /// leave the MIME sniffing to the uploader's browser.
    fn accepts(&self, source: &MediaSource) -> bool {
        let ct = source.content_type.as_deref().unwrap_or("");
        match self {
            InputKind::Video => {
                ct.starts_with("video/") || has_extension(&source.name, VIDEO_EXTENSIONS)
            }
            InputKind::Pdf => {
                ct.starts_with("application/pdf") || has_extension(&source.name, &["pdf"])
            }
            InputKind::Any => true,
        }
    }
}

/// Reject bad counts and mistyped attachments. The error names the first
/// offending attachment so the user knows which one to fix.
pub fn validate_inputs(
    kind: InputKind,
    sources: &[MediaSource],
    min: usize,
    max: usize,
) -> Result<()> {
    if sources.len() < min || sources.len() > max {
        return Err(MediaError::BadInputCount {
            got: sources.len(),
            min,
            max,
        });
    }
    for source in sources {
        if !kind.accepts(source) {
            return Err(MediaError::WrongType {
                name: source.name.clone(),
                expected: kind.expected(),
            });
        }
    }
    Ok(())
}

fn has_extension(filename: &str, extensions: &[&str]) -> bool {
    let lower = filename.to_lowercase();
    match lower.rsplit_once('.') {
        Some((_, ext)) => extensions.contains(&ext),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(name: &str, content_type: Option<&str>) -> MediaSource {
        MediaSource {
            name: name.to_string(),
            content_type: content_type.map(str::to_string),
            url: format!("https://cdn.example/{name}"),
            size: 1_024,
        }
    }

    #[test]
    fn too_few_inputs_are_rejected() {
        let sources = vec![source("a.mp4", Some("video/mp4"))];
        let err = validate_inputs(InputKind::Video, &sources, 2, 5).unwrap_err();
        assert!(matches!(
            err,
            MediaError::BadInputCount {
                got: 1,
                min: 2,
                max: 5
            }
        ));
    }

    #[test]
    fn too_many_inputs_are_rejected() {
        let sources: Vec<MediaSource> = (0..6)
            .map(|i| source(&format!("{i}.pdf"), Some("application/pdf")))
            .collect();
        let err = validate_inputs(InputKind::Pdf, &sources, 2, 5).unwrap_err();
        assert!(matches!(err, MediaError::BadInputCount { got: 6, .. }));
    }

    #[test]
    fn bounds_are_inclusive() {
        let two: Vec<MediaSource> = (0..2).map(|i| source(&format!("{i}.mp4"), None)).collect();
        let five: Vec<MediaSource> = (0..5).map(|i| source(&format!("{i}.mp4"), None)).collect();
        assert!(validate_inputs(InputKind::Video, &two, 2, 5).is_ok());
        assert!(validate_inputs(InputKind::Video, &five, 2, 5).is_ok());
    }

    #[test]
    fn content_type_wins_over_missing_extension() {
        let sources = vec![
            source("clip_one", Some("video/webm")),
            source("clip_two", Some("video/mp4")),
        ];
        assert!(validate_inputs(InputKind::Video, &sources, 2, 5).is_ok());
    }

    #[test]
    fn extension_rescues_missing_content_type() {
        let sources = vec![source("a.MOV", None), source("b.mkv", None)];
        assert!(validate_inputs(InputKind::Video, &sources, 2, 5).is_ok());
    }

    #[test]
    fn mistyped_attachment_is_named() {
        let sources = vec![
            source("a.pdf", Some("application/pdf")),
            source("photo.jpg", Some("image/jpeg")),
        ];
        let err = validate_inputs(InputKind::Pdf, &sources, 2, 5).unwrap_err();
        match err {
            MediaError::WrongType { name, expected } => {
                assert_eq!(name, "photo.jpg");
                assert_eq!(expected, "PDF");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn any_kind_accepts_everything() {
        let sources = vec![source("data.bin", None)];
        assert!(validate_inputs(InputKind::Any, &sources, 1, 5).is_ok());
    }
}
