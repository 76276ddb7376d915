//! Listing lifecycle: ID allocation, insert with retry, reads and merges

use chrono::Utc;
use common::journal::log_listing_event;
use common::metrics::{labels, LISTING_EVENTS, LISTING_INSERT_CONFLICTS};
use common::persistence::{Page, PageRequest};
use common::property_id::{IdentifierLookup, PropertyId, SequentialIdAllocator};
use metrics::counter;
use serde_json::Value;
use std::sync::Arc;
use tracing::warn;

use super::category::ListingCategory;
use super::document::{
    deep_merge, ensure_media_skeleton, format_timestamp, prepare_new_document, prepare_update,
    set_property_id,
};
use crate::config::AllocatorConfig;
use crate::error::{Error, Result};
use crate::store::{ListingFilter, ListingRecord, ListingRepository};

#[derive(Clone)]
pub struct ListingService {
    repo: Arc<dyn ListingRepository>,
    allocator: SequentialIdAllocator<dyn IdentifierLookup>,
    insert_attempts: u32,
}

impl ListingService {
    pub fn new(
        repo: Arc<dyn ListingRepository>,
        lookup: Arc<dyn IdentifierLookup>,
        config: &AllocatorConfig,
    ) -> Self {
        let allocator = SequentialIdAllocator::new(lookup).with_max_attempts(config.max_attempts);
        Self::with_allocator(repo, allocator, config.insert_attempts)
    }

    pub fn with_allocator(
        repo: Arc<dyn ListingRepository>,
        allocator: SequentialIdAllocator<dyn IdentifierLookup>,
        insert_attempts: u32,
    ) -> Self {
        Self {
            repo,
            allocator,
            insert_attempts: insert_attempts.max(1),
        }
    }

    /// Create a listing under a freshly allocated property ID
    ///
    /// The unique key on `property_id` settles races between concurrent
    /// creators: a rejected insert allocates again, up to `insert_attempts`.
    pub async fn create(&self, category: ListingCategory, body: Value) -> Result<ListingRecord> {
        let prefix = category.prefix()?;
        let now = Utc::now();
        let document = prepare_new_document(category, body, now)?;

        for attempt in 1..=self.insert_attempts {
            let property_id = self.allocator.allocate(&prefix).await;
            let record = Self::new_record(category, &property_id, document.clone(), now);

            match self.repo.insert(&record).await {
                Ok(()) => {
                    counter!(
                        LISTING_EVENTS,
                        labels::CATEGORY => category.slug(),
                        labels::EVENT => "created"
                    )
                    .increment(1);
                    log_listing_event(category.slug(), &record.property_id, "created");
                    return Ok(record);
                }
                Err(e) if e.is_constraint_violation() => {
                    counter!(LISTING_INSERT_CONFLICTS, labels::CATEGORY => category.slug())
                        .increment(1);
                    warn!(
                        category = %category,
                        property_id = %property_id,
                        attempt = attempt,
                        "Property ID taken at insert, allocating again"
                    );
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(Error::Conflict {
            message: format!(
                "could not store {} listing after {} attempts",
                category, self.insert_attempts
            ),
        })
    }

    pub async fn get(&self, category: ListingCategory, property_id: &str) -> Result<ListingRecord> {
        self.repo
            .get(category, property_id)
            .await?
            .ok_or_else(|| missing(category, property_id))
    }

    pub async fn list(
        &self,
        category: ListingCategory,
        filter: &ListingFilter,
        page: &PageRequest,
    ) -> Result<Page<ListingRecord>> {
        Ok(self.repo.list(category, filter, page).await?)
    }

    /// Deep-merge `data` into the stored document
    pub async fn update(
        &self,
        category: ListingCategory,
        property_id: &str,
        data: Value,
    ) -> Result<ListingRecord> {
        let data = prepare_update(data)?;
        let mut record = self.get(category, property_id).await?;

        deep_merge(&mut record.document, data);
        ensure_media_skeleton(category, &mut record.document);
        record.updated_at = Utc::now();

        let updated = self
            .repo
            .replace_document(category, property_id, &record.document, record.updated_at)
            .await?;
        if !updated {
            return Err(missing(category, property_id));
        }

        counter!(
            LISTING_EVENTS,
            labels::CATEGORY => category.slug(),
            labels::EVENT => "updated"
        )
        .increment(1);
        log_listing_event(category.slug(), property_id, "updated");
        Ok(record)
    }

    /// Delete a listing; its property ID is never handed out again
    pub async fn delete(&self, category: ListingCategory, property_id: &str) -> Result<()> {
        if !self.repo.delete(category, property_id).await? {
            return Err(missing(category, property_id));
        }

        counter!(
            LISTING_EVENTS,
            labels::CATEGORY => category.slug(),
            labels::EVENT => "deleted"
        )
        .increment(1);
        log_listing_event(category.slug(), property_id, "deleted");
        Ok(())
    }

    fn new_record(
        category: ListingCategory,
        property_id: &PropertyId,
        mut document: Value,
        now: chrono::DateTime<Utc>,
    ) -> ListingRecord {
        set_property_id(&mut document, property_id.as_str());
        ListingRecord {
            property_id: property_id.to_string(),
            id_scheme: property_id.scheme(),
            category,
            document,
            created_at: now,
            updated_at: now,
        }
    }
}

fn missing(category: ListingCategory, property_id: &str) -> Error {
    Error::not_found(format!("{} listing {property_id}", category.label()))
}

/// Client-facing form of a stored listing
///
/// The document with `createdAt` and `updatedAt` added at the top level.
pub fn listing_view(record: &ListingRecord) -> Value {
    let mut view = record.document.clone();
    if let Some(map) = view.as_object_mut() {
        map.insert(
            "createdAt".to_string(),
            Value::String(format_timestamp(record.created_at)),
        );
        map.insert(
            "updatedAt".to_string(),
            Value::String(format_timestamp(record.updated_at)),
        );
    }
    view
}
