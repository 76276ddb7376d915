//! Multipart upload parsing

use axum::extract::multipart::{Multipart, MultipartError};
use axum::http::StatusCode;
use bytes::Bytes;

use super::model::{MediaKind, MediaMetadata, DEFAULT_ROOM_TYPE, DEFAULT_TITLE};
use crate::error::{Error, Result};

pub const FILES_FIELD: &str = "mediaFiles";
pub const METADATA_FIELD: &str = "mediaData";
pub const PROPERTY_ID_FIELD: &str = "propertyId";

/// One file part of an upload
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: String,
    pub kind: MediaKind,
    pub data: Bytes,
}

/// Parsed upload form
#[derive(Debug, Clone, Default)]
pub struct UploadRequest {
    pub files: Vec<UploadedFile>,
    pub metadata: Vec<MediaMetadata>,
    pub property_id: Option<String>,
}

impl UploadRequest {
    /// Read every part of the form, enforcing the per-file size limit
    pub async fn from_multipart(mut multipart: Multipart, max_file_size: usize) -> Result<Self> {
        let mut request = UploadRequest::default();

        while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
            match field.name() {
                Some(FILES_FIELD) => {
                    let file_name = field.file_name().unwrap_or("upload").to_string();
                    let content_type = field
                        .content_type()
                        .unwrap_or("application/octet-stream")
                        .to_string();
                    let kind = MediaKind::from_content_type(&content_type).ok_or_else(|| {
                        Error::invalid(format!(
                            "{file_name}: only image and video files are allowed"
                        ))
                    })?;

                    let data = field.bytes().await.map_err(multipart_error)?;
                    if data.len() > max_file_size {
                        return Err(Error::PayloadTooLarge {
                            message: format!(
                                "{file_name} is {} bytes, limit is {max_file_size}",
                                data.len()
                            ),
                        });
                    }

                    request.files.push(UploadedFile {
                        file_name,
                        content_type,
                        kind,
                        data,
                    });
                }
                Some(METADATA_FIELD) => {
                    let text = field.text().await.map_err(multipart_error)?;
                    if !text.trim().is_empty() {
                        request.metadata = serde_json::from_str(&text).map_err(|e| {
                            Error::invalid(format!("mediaData must be a JSON array: {e}"))
                        })?;
                    }
                }
                Some(PROPERTY_ID_FIELD) => {
                    let text = field.text().await.map_err(multipart_error)?;
                    let text = text.trim();
                    if !text.is_empty() {
                        request.property_id = Some(text.to_string());
                    }
                }
                _ => {}
            }
        }

        Ok(request)
    }

    /// Metadata for `file`, defaulted when the client sent none
    pub fn metadata_for(&self, file: &UploadedFile) -> MediaMetadata {
        self.metadata
            .iter()
            .find(|entry| entry.id == file.file_name)
            .cloned()
            .unwrap_or_else(|| MediaMetadata {
                id: file.file_name.clone(),
                kind: Some(file.kind),
                title: Some(DEFAULT_TITLE.to_string()),
                tags: Vec::new(),
                room_type: Some(DEFAULT_ROOM_TYPE.to_string()),
            })
    }

    /// Number of metadata entries announced as videos
    pub fn announced_videos(&self) -> usize {
        self.metadata
            .iter()
            .filter(|entry| entry.kind == Some(MediaKind::Video))
            .count()
    }
}

fn multipart_error(e: MultipartError) -> Error {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        Error::PayloadTooLarge {
            message: e.body_text(),
        }
    } else {
        Error::invalid(format!("malformed multipart body: {}", e.body_text()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(name: &str, content_type: &str) -> UploadedFile {
        UploadedFile {
            file_name: name.to_string(),
            content_type: content_type.to_string(),
            kind: MediaKind::from_content_type(content_type).unwrap(),
            data: Bytes::from_static(b"data"),
        }
    }

    #[test]
    fn test_metadata_matched_by_file_name() {
        let request = UploadRequest {
            files: vec![],
            metadata: vec![MediaMetadata {
                id: "hall.jpg".to_string(),
                kind: Some(MediaKind::Photo),
                title: Some("Hall".to_string()),
                tags: vec!["bright".to_string()],
                room_type: Some("halls".to_string()),
            }],
            property_id: None,
        };

        let found = request.metadata_for(&file("hall.jpg", "image/jpeg"));
        assert_eq!(found.title.as_deref(), Some("Hall"));
        assert_eq!(found.room_type.as_deref(), Some("halls"));
    }

    #[test]
    fn test_missing_metadata_defaults() {
        let request = UploadRequest::default();
        let defaulted = request.metadata_for(&file("tour.mp4", "video/mp4"));

        assert_eq!(defaulted.id, "tour.mp4");
        assert_eq!(defaulted.kind, Some(MediaKind::Video));
        assert_eq!(defaulted.title.as_deref(), Some(DEFAULT_TITLE));
        assert_eq!(defaulted.room_type.as_deref(), Some(DEFAULT_ROOM_TYPE));
        assert!(defaulted.tags.is_empty());
    }

    #[test]
    fn test_announced_videos() {
        let request = UploadRequest {
            metadata: vec![
                MediaMetadata {
                    kind: Some(MediaKind::Video),
                    ..Default::default()
                },
                MediaMetadata {
                    kind: Some(MediaKind::Photo),
                    ..Default::default()
                },
            ],
            ..Default::default()
        };
        assert_eq!(request.announced_videos(), 1);
    }
}
