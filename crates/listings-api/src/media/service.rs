//! Media uploads and their links into listing documents

use chrono::Utc;
use common::journal::log_media_upload;
use common::metrics::{labels, MEDIA_FILES_UPLOADED};
use futures::future::try_join_all;
use metrics::counter;
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::warn;
use utoipa::ToSchema;
use uuid::Uuid;

use super::model::{MediaItem, MediaKind, DEFAULT_ROOM_TYPE, DEFAULT_TITLE};
use super::storage::MediaStorage;
use super::upload::{UploadRequest, UploadedFile};
use crate::error::{Error, Result};
use crate::listings::document::{empty_media, ensure_media_skeleton};
use crate::listings::ListingCategory;
use crate::store::ListingRepository;

/// Result of an upload request
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadOutcome {
    pub media_items: Vec<MediaItem>,
    pub media_urls: Vec<String>,
    /// Listing the items were attached to, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub property_id: Option<String>,
}

#[derive(Clone)]
pub struct MediaService {
    storage: MediaStorage,
    listings: Arc<dyn ListingRepository>,
}

impl MediaService {
    pub fn new(storage: MediaStorage, listings: Arc<dyn ListingRepository>) -> Self {
        Self { storage, listings }
    }

    pub fn storage(&self) -> &MediaStorage {
        &self.storage
    }

    /// Store every file and attach the items to the listing when it exists
    ///
    /// An unknown property ID leaves the items unlinked.
    pub async fn upload(
        &self,
        category: ListingCategory,
        request: UploadRequest,
    ) -> Result<UploadOutcome> {
        if request.files.is_empty() {
            return Err(Error::invalid("no media files were provided"));
        }

        let items = try_join_all(
            request
                .files
                .iter()
                .map(|file| self.store_file(category, &request, file)),
        )
        .await?;

        let linked = match &request.property_id {
            Some(property_id) => self.link(category, property_id, &items).await?,
            None => None,
        };

        let videos = items.iter().filter(|i| i.kind == MediaKind::Video).count();
        log_media_upload(category.slug(), linked.as_deref(), items.len(), videos);
        if request.announced_videos() != videos {
            warn!(
                announced = request.announced_videos(),
                uploaded = videos,
                "Video count in mediaData differs from the uploaded videos"
            );
        }

        Ok(UploadOutcome {
            media_urls: items.iter().map(|item| item.url.clone()).collect(),
            media_items: items,
            property_id: linked,
        })
    }

    async fn store_file(
        &self,
        category: ListingCategory,
        request: &UploadRequest,
        file: &UploadedFile,
    ) -> Result<MediaItem> {
        let metadata = request.metadata_for(file);
        let kind = metadata.kind.unwrap_or(file.kind);
        let folder = metadata.room_type.as_deref().unwrap_or(DEFAULT_ROOM_TYPE);

        let key = self.storage.object_key(kind, folder, &file.file_name);
        self.storage
            .put(&key, file.data.clone(), &file.content_type)
            .await?;

        counter!(
            MEDIA_FILES_UPLOADED,
            labels::CATEGORY => category.slug(),
            labels::MEDIA_TYPE => kind.as_str()
        )
        .increment(1);

        Ok(MediaItem {
            id: Uuid::new_v4(),
            kind,
            url: self.storage.public_url(&key),
            title: metadata
                .title
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_TITLE.to_string()),
            tags: metadata.tags,
            room_type: metadata.room_type,
        })
    }

    async fn link(
        &self,
        category: ListingCategory,
        property_id: &str,
        items: &[MediaItem],
    ) -> Result<Option<String>> {
        let Some(mut record) = self.listings.get(category, property_id).await? else {
            warn!(
                category = %category,
                property_id = %property_id,
                "Listing not found, media uploaded without linking"
            );
            return Ok(None);
        };

        attach_items(category, &mut record.document, items)?;
        self.listings
            .replace_document(category, property_id, &record.document, Utc::now())
            .await?;

        Ok(Some(property_id.to_string()))
    }

    /// Media section of a listing
    pub async fn media(&self, category: ListingCategory, property_id: &str) -> Result<Value> {
        let record = self
            .listings
            .get(category, property_id)
            .await?
            .ok_or_else(|| Error::not_found(format!("{} listing {property_id}", category.label())))?;

        Ok(record
            .document
            .get("media")
            .filter(|media| media.is_object())
            .cloned()
            .unwrap_or_else(|| empty_media(category)))
    }

    /// Detach a media item and delete its object
    pub async fn remove(
        &self,
        category: ListingCategory,
        property_id: &str,
        media_id: &str,
    ) -> Result<()> {
        let mut record = self
            .listings
            .get(category, property_id)
            .await?
            .ok_or_else(|| Error::not_found(format!("{} listing {property_id}", category.label())))?;

        let url = detach_item(&mut record.document, media_id)
            .ok_or_else(|| Error::not_found(format!("media item {media_id}")))?;

        self.listings
            .replace_document(category, property_id, &record.document, Utc::now())
            .await?;

        if let Some(key) = url.as_deref().and_then(|url| self.storage.key_for_url(url)) {
            // The listing no longer references the object either way
            if let Err(e) = self.storage.delete(key).await {
                warn!(key = %key, error = %e, "Failed to delete detached media object");
            }
        }

        Ok(())
    }
}

/// Append `items` to `media.mediaItems` and their URLs to the legacy lists
///
/// Flat layouts keep `photos` and `videos` URL arrays. Apartment layouts
/// keep photos in per-room buckets, so a photo URL goes to the bucket named
/// by its room type when that bucket exists.
pub fn attach_items(
    category: ListingCategory,
    document: &mut Value,
    items: &[MediaItem],
) -> Result<()> {
    ensure_media_skeleton(category, document);
    let Some(media) = document.get_mut("media").and_then(Value::as_object_mut) else {
        return Err(Error::invalid("listing document is not a JSON object"));
    };

    for item in items {
        let url = Value::String(item.url.clone());
        if let Some(list) = legacy_list(media, item) {
            list.push(url);
        }
    }

    if let Some(Value::Array(existing)) = media.get_mut("mediaItems") {
        for item in items {
            existing.push(serde_json::to_value(item)?);
        }
    }

    Ok(())
}

fn legacy_list<'a>(media: &'a mut Map<String, Value>, item: &MediaItem) -> Option<&'a mut Vec<Value>> {
    let list = match media.get_mut(item.kind.plural())? {
        Value::Array(list) => list,
        Value::Object(buckets) if item.kind == MediaKind::Photo => {
            match buckets.get_mut(item.room_type.as_deref()?)? {
                Value::Array(list) => list,
                _ => return None,
            }
        }
        _ => return None,
    };
    Some(list)
}

/// Remove the item with `media_id` and drop its URL from the legacy lists
///
/// Returns `None` when no such item exists, otherwise the item's URL.
pub fn detach_item(document: &mut Value, media_id: &str) -> Option<Option<String>> {
    let media = document.get_mut("media")?.as_object_mut()?;
    let items = media.get_mut("mediaItems")?.as_array_mut()?;

    let index = items
        .iter()
        .position(|item| item.get("id").and_then(Value::as_str) == Some(media_id))?;
    let removed = items.remove(index);
    let url = removed.get("url").and_then(Value::as_str).map(str::to_string);

    if let Some(url) = &url {
        for key in ["photos", "videos"] {
            match media.get_mut(key) {
                Some(Value::Array(list)) => list.retain(|v| v.as_str() != Some(url.as_str())),
                Some(Value::Object(buckets)) => {
                    for bucket in buckets.values_mut() {
                        if let Value::Array(list) = bucket {
                            list.retain(|v| v.as_str() != Some(url.as_str()));
                        }
                    }
                }
                _ => {}
            }
        }
    }

    Some(url)
}
