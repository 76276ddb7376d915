//! Object storage for uploaded media
//!
//! Backends come from the `object_store` crate: an in-process store, a local
//! directory or an S3 bucket.

use bytes::Bytes;
use common::error::StorageError;
use object_store::aws::AmazonS3Builder;
use object_store::local::LocalFileSystem;
use object_store::memory::InMemory;
use object_store::path::Path;
use object_store::{Attribute, Attributes, ObjectStore, PutOptions, PutPayload};
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use super::model::MediaKind;
use crate::config::{MediaBackend, MediaConfig};

/// Build the object store selected by `config`
pub fn create_object_store(config: &MediaConfig) -> Result<Arc<dyn ObjectStore>, StorageError> {
    let store: Arc<dyn ObjectStore> = match &config.backend {
        MediaBackend::InMemory => Arc::new(InMemory::new()),
        MediaBackend::Local { path } => {
            std::fs::create_dir_all(path).map_err(|e| StorageError::Configuration {
                details: format!("failed to create media directory '{path}': {e}"),
            })?;
            let store = LocalFileSystem::new_with_prefix(path).map_err(|e| {
                StorageError::Configuration {
                    details: format!("failed to open media directory '{path}': {e}"),
                }
            })?;
            Arc::new(store)
        }
        MediaBackend::Aws { bucket, region } => {
            let store = AmazonS3Builder::from_env()
                .with_region(region)
                .with_bucket_name(bucket)
                .build()
                .map_err(|e| StorageError::Configuration {
                    details: format!("failed to create S3 store: {e}"),
                })?;
            Arc::new(store)
        }
    };

    info!(backend = ?config.backend, "Media object store ready");
    Ok(store)
}

/// Replace each whitespace run in a file name with a single `-`
pub fn sanitize_file_name(name: &str) -> String {
    name.split_whitespace().collect::<Vec<_>>().join("-")
}

/// An object read back from the store
#[derive(Debug, Clone)]
pub struct StoredObject {
    pub data: Bytes,
    pub content_type: Option<String>,
}

#[derive(Clone)]
pub struct MediaStorage {
    store: Arc<dyn ObjectStore>,
    config: MediaConfig,
}

impl MediaStorage {
    pub fn from_config(config: &MediaConfig) -> Result<Self, StorageError> {
        Ok(Self::new(create_object_store(config)?, config.clone()))
    }

    pub fn new(store: Arc<dyn ObjectStore>, config: MediaConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &MediaConfig {
        &self.config
    }

    /// `{key_prefix}/{kind}s/{room}/{uuid}-{file name}`
    pub fn object_key(&self, kind: MediaKind, room_type: &str, file_name: &str) -> String {
        self.object_key_with_id(kind, room_type, file_name, Uuid::new_v4())
    }

    fn object_key_with_id(
        &self,
        kind: MediaKind,
        room_type: &str,
        file_name: &str,
        id: Uuid,
    ) -> String {
        format!(
            "{}/{}/{}/{}-{}",
            self.config.key_prefix.trim_end_matches('/'),
            kind.plural(),
            room_type,
            id,
            sanitize_file_name(file_name)
        )
    }

    /// Public link to a stored object
    pub fn public_url(&self, key: &str) -> String {
        match &self.config.backend {
            MediaBackend::Aws { bucket, region } => {
                format!("https://{bucket}.s3.{region}.amazonaws.com/{key}")
            }
            _ => format!(
                "{}/{}",
                self.config.public_base_url.trim_end_matches('/'),
                key
            ),
        }
    }

    /// Object key behind a URL produced by [`Self::public_url`]
    pub fn key_for_url<'a>(&self, url: &'a str) -> Option<&'a str> {
        let base = match &self.config.backend {
            MediaBackend::Aws { bucket, region } => {
                format!("https://{bucket}.s3.{region}.amazonaws.com")
            }
            _ => self.config.public_base_url.trim_end_matches('/').to_string(),
        };
        url.strip_prefix(base.as_str())?
            .strip_prefix('/')
            .filter(|key| !key.is_empty())
    }

    pub async fn put(&self, key: &str, data: Bytes, content_type: &str) -> Result<(), StorageError> {
        let size = data.len();
        let mut options = PutOptions::default();

        // The local filesystem backend keeps no object attributes
        if !matches!(self.config.backend, MediaBackend::Local { .. }) {
            let mut attributes = Attributes::new();
            attributes.insert(Attribute::ContentType, content_type.to_string().into());
            options.attributes = attributes;
        }

        self.store
            .put_opts(&Path::from(key), PutPayload::from(data), options)
            .await
            .map_err(|e| StorageError::UploadFailed {
                key: key.to_string(),
                details: e.to_string(),
            })?;

        debug!(key = %key, size = size, content_type = %content_type, "Stored media object");
        Ok(())
    }

    /// Read an object; `None` when the key is absent
    pub async fn get(&self, key: &str) -> Result<Option<StoredObject>, StorageError> {
        let read_failed = |e: object_store::Error| StorageError::ReadFailed {
            key: key.to_string(),
            details: e.to_string(),
        };

        let result = match self.store.get(&Path::from(key)).await {
            Ok(result) => result,
            Err(object_store::Error::NotFound { .. }) => return Ok(None),
            Err(e) => return Err(read_failed(e)),
        };

        let content_type = result
            .attributes
            .get(&Attribute::ContentType)
            .map(|value| value.to_string());
        let data = result.bytes().await.map_err(read_failed)?;

        Ok(Some(StoredObject { data, content_type }))
    }

    pub async fn delete(&self, key: &str) -> Result<(), StorageError> {
        match self.store.delete(&Path::from(key)).await {
            Ok(()) | Err(object_store::Error::NotFound { .. }) => Ok(()),
            Err(e) => Err(StorageError::DeleteFailed {
                key: key.to_string(),
                details: e.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn storage(backend: MediaBackend) -> MediaStorage {
        MediaStorage::new(
            Arc::new(InMemory::new()),
            MediaConfig {
                backend,
                ..MediaConfig::default()
            },
        )
    }

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(sanitize_file_name("front door  view.jpg"), "front-door-view.jpg");
        assert_eq!(sanitize_file_name("tab\tand\nnewline.png"), "tab-and-newline.png");
        assert_eq!(sanitize_file_name("plain.mp4"), "plain.mp4");
    }

    #[test]
    fn test_object_key_layout() {
        let storage = storage(MediaBackend::InMemory);
        let key = storage.object_key_with_id(
            MediaKind::Photo,
            "kitchen",
            "my kitchen.jpg",
            Uuid::nil(),
        );
        assert_eq!(
            key,
            "listing-media/photos/kitchen/00000000-0000-0000-0000-000000000000-my-kitchen.jpg"
        );
    }

    #[test]
    fn test_s3_url() {
        let storage = storage(MediaBackend::Aws {
            bucket: "estate-media".to_string(),
            region: "ap-south-1".to_string(),
        });
        let url = storage.public_url("listing-media/videos/general/x.mp4");
        assert_eq!(
            url,
            "https://estate-media.s3.ap-south-1.amazonaws.com/listing-media/videos/general/x.mp4"
        );
        assert_eq!(
            storage.key_for_url(&url),
            Some("listing-media/videos/general/x.mp4")
        );
    }

    #[test]
    fn test_base_url_for_other_backends() {
        let storage = storage(MediaBackend::InMemory);
        let url = storage.public_url("listing-media/photos/general/a.png");
        assert_eq!(
            url,
            "http://localhost:8000/media-files/listing-media/photos/general/a.png"
        );
        assert_eq!(
            storage.key_for_url(&url),
            Some("listing-media/photos/general/a.png")
        );
        assert_eq!(storage.key_for_url("https://elsewhere.example/a.png"), None);
    }

    #[tokio::test]
    async fn test_put_get_delete() {
        let storage = storage(MediaBackend::InMemory);
        let key = "listing-media/photos/general/a.png";

        storage
            .put(key, Bytes::from_static(b"png-bytes"), "image/png")
            .await
            .unwrap();

        let object = storage.get(key).await.unwrap().unwrap();
        assert_eq!(object.data, Bytes::from_static(b"png-bytes"));
        assert_eq!(object.content_type.as_deref(), Some("image/png"));

        storage.delete(key).await.unwrap();
        assert!(storage.get(key).await.unwrap().is_none());
        // Deleting twice is fine
        storage.delete(key).await.unwrap();
    }

    #[tokio::test]
    async fn test_local_backend_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("media");
        let config = MediaConfig {
            backend: MediaBackend::Local {
                path: path.to_string_lossy().into_owned(),
            },
            ..MediaConfig::default()
        };

        let storage = MediaStorage::from_config(&config).unwrap();
        assert!(path.is_dir());

        storage
            .put("k/v.mp4", Bytes::from_static(b"video"), "video/mp4")
            .await
            .unwrap();
        let object = storage.get("k/v.mp4").await.unwrap().unwrap();
        assert_eq!(object.data, Bytes::from_static(b"video"));
        assert!(object.content_type.is_none());
    }
}
