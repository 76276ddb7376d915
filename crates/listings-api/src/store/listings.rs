//! SQLite document store for listings
//!
//! Each listing is one row holding its JSON document. The property ID column
//! is the primary key, and deleted IDs move to `retired_property_ids` so the
//! sequence never hands them out again. Every row records the scheme that
//! produced its ID; only sequential IDs feed the counter.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::error::PersistenceError;
use common::persistence::{HealthCheck, Migrate, Page, PageRequest, SqlitePool};
use common::property_id::{IdScheme, IdentifierLookup, PropertyPrefix};
use serde_json::Value;
use sqlx::{QueryBuilder, Row, Sqlite};
use tracing::{debug, info};

use crate::listings::category::ListingCategory;
use crate::listings::document::format_timestamp;

/// A stored listing
#[derive(Debug, Clone, PartialEq)]
pub struct ListingRecord {
    pub property_id: String,
    pub id_scheme: IdScheme,
    pub category: ListingCategory,
    pub document: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Optional filters for listing queries
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListingFilter {
    pub city: Option<String>,
    pub state: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub bedrooms: Option<i64>,
    pub property_type: Option<String>,
    pub created_by: Option<String>,
}

/// Listing persistence operations used by the services
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ListingRepository: Send + Sync {
    /// Insert a new listing; a taken property ID is a `ConstraintViolation`
    async fn insert(&self, record: &ListingRecord) -> Result<(), PersistenceError>;

    async fn get(
        &self,
        category: ListingCategory,
        property_id: &str,
    ) -> Result<Option<ListingRecord>, PersistenceError>;

    /// Newest first
    async fn list(
        &self,
        category: ListingCategory,
        filter: &ListingFilter,
        page: &PageRequest,
    ) -> Result<Page<ListingRecord>, PersistenceError>;

    /// Replace the document; returns false when the listing does not exist
    async fn replace_document(
        &self,
        category: ListingCategory,
        property_id: &str,
        document: &Value,
        updated_at: DateTime<Utc>,
    ) -> Result<bool, PersistenceError>;

    /// Delete and retire the property ID; returns false when missing
    async fn delete(
        &self,
        category: ListingCategory,
        property_id: &str,
    ) -> Result<bool, PersistenceError>;
}

/// SQLite-backed listing store
#[derive(Clone)]
pub struct SqliteListingStore {
    pool: SqlitePool,
}

impl SqliteListingStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn record_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<ListingRecord, PersistenceError> {
        let category: String = row.get("category");
        let id_scheme: String = row.get("id_scheme");
        let document: String = row.get("document");
        let created_at: String = row.get("created_at");
        let updated_at: String = row.get("updated_at");

        Ok(ListingRecord {
            property_id: row.get("property_id"),
            id_scheme: id_scheme
                .parse()
                .map_err(|details| PersistenceError::DeserializationFailed { details })?,
            category: category
                .parse()
                .map_err(|_| PersistenceError::DeserializationFailed {
                    details: format!("unknown listing category {category}"),
                })?,
            document: serde_json::from_str(&document).map_err(|e| {
                PersistenceError::DeserializationFailed {
                    details: format!("listing document: {e}"),
                }
            })?,
            created_at: parse_timestamp(&created_at)?,
            updated_at: parse_timestamp(&updated_at)?,
        })
    }

    fn push_filters(
        builder: &mut QueryBuilder<'_, Sqlite>,
        category: ListingCategory,
        filter: &ListingFilter,
    ) {
        builder
            .push(" WHERE category = ")
            .push_bind(category.slug().to_string());

        if let Some(city) = &filter.city {
            builder
                .push(" AND json_extract(document, '$.basicInformation.address.city') = ")
                .push_bind(city.clone());
        }
        if let Some(state) = &filter.state {
            builder
                .push(" AND json_extract(document, '$.basicInformation.address.state') = ")
                .push_bind(state.clone());
        }
        if let Some(min_price) = filter.min_price {
            builder
                .push(" AND json_extract(document, '$.price') >= ")
                .push_bind(min_price);
        }
        if let Some(max_price) = filter.max_price {
            builder
                .push(" AND json_extract(document, '$.price') <= ")
                .push_bind(max_price);
        }
        if let Some(bedrooms) = filter.bedrooms {
            builder
                .push(" AND json_extract(document, '$.propertyDetails.bedrooms') = ")
                .push_bind(bedrooms);
        }
        if let Some(property_type) = &filter.property_type {
            builder
                .push(" AND json_extract(document, '$.propertyType') = ")
                .push_bind(property_type.clone());
        }
        if let Some(created_by) = &filter.created_by {
            builder
                .push(" AND json_extract(document, '$.metadata.createdBy') = ")
                .push_bind(created_by.clone());
        }
    }
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, PersistenceError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| PersistenceError::DeserializationFailed {
            details: format!("timestamp {value:?}: {e}"),
        })
}

/// SQL suffix matching `<prefix><digits>` on `property_id`
///
/// The prefix is restricted to `[A-Za-z0-9-]`, so it carries no GLOB
/// metacharacters.
const PREFIX_DIGITS_CLAUSE: &str = "property_id GLOB ?1 || '[0-9]*' \
     AND substr(property_id, length(?1) + 1) NOT GLOB '*[^0-9]*'";

#[async_trait]
impl Migrate for SqliteListingStore {
    async fn run_migrations(&self) -> Result<(), PersistenceError> {
        info!("Running listing store migrations");

        let statements = [
            r#"
            CREATE TABLE IF NOT EXISTS listings (
                property_id TEXT PRIMARY KEY NOT NULL,
                id_scheme TEXT NOT NULL DEFAULT 'sequential',
                category TEXT NOT NULL,
                document TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            "#,
            "CREATE INDEX IF NOT EXISTS idx_listings_category_created ON listings(category, created_at DESC)",
            r#"
            CREATE TABLE IF NOT EXISTS retired_property_ids (
                property_id TEXT PRIMARY KEY NOT NULL,
                id_scheme TEXT NOT NULL DEFAULT 'sequential',
                category TEXT NOT NULL,
                retired_at TEXT NOT NULL
            )
            "#,
        ];

        for statement in statements {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| PersistenceError::MigrationFailed {
                    details: format!("listing schema: {e}"),
                })?;
        }

        info!("Listing store migrations completed");
        Ok(())
    }
}

#[async_trait]
impl HealthCheck for SqliteListingStore {
    async fn health_check(&self) -> Result<(), PersistenceError> {
        common::persistence::test_sqlite_connection_health(&self.pool).await
    }
}

#[async_trait]
impl IdentifierLookup for SqliteListingStore {
    async fn highest_with_prefix(
        &self,
        prefix: &PropertyPrefix,
    ) -> Result<Option<String>, PersistenceError> {
        let query = format!(
            "SELECT property_id FROM ( \
                 SELECT property_id FROM listings \
                 WHERE id_scheme = 'sequential' AND {PREFIX_DIGITS_CLAUSE} \
                 UNION ALL \
                 SELECT property_id FROM retired_property_ids \
                 WHERE id_scheme = 'sequential' AND {PREFIX_DIGITS_CLAUSE} \
             ) ORDER BY length(property_id) DESC, property_id DESC LIMIT 1"
        );

        let highest: Option<String> = sqlx::query_scalar(&query)
            .bind(prefix.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| PersistenceError::from_sqlx("highest property id", e))?;

        debug!(prefix = %prefix, highest = ?highest, "Read highest property ID");
        Ok(highest)
    }

    async fn exists(&self, property_id: &str) -> Result<bool, PersistenceError> {
        let found: i64 = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM listings WHERE property_id = ?1) \
                 OR EXISTS(SELECT 1 FROM retired_property_ids WHERE property_id = ?1)",
        )
        .bind(property_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| PersistenceError::from_sqlx("property id exists", e))?;

        Ok(found != 0)
    }
}

#[async_trait]
impl ListingRepository for SqliteListingStore {
    async fn insert(&self, record: &ListingRecord) -> Result<(), PersistenceError> {
        let document = serde_json::to_string(&record.document).map_err(|e| {
            PersistenceError::SerializationFailed {
                details: format!("listing document: {e}"),
            }
        })?;

        // Retired IDs are rejected like live duplicates
        let result = sqlx::query(
            "INSERT INTO listings \
                 (property_id, id_scheme, category, document, created_at, updated_at) \
             SELECT ?1, ?6, ?2, ?3, ?4, ?5 \
             WHERE NOT EXISTS (SELECT 1 FROM retired_property_ids WHERE property_id = ?1)",
        )
        .bind(record.property_id.as_str())
        .bind(record.category.slug())
        .bind(document)
        .bind(format_timestamp(record.created_at))
        .bind(format_timestamp(record.updated_at))
        .bind(record.id_scheme.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| PersistenceError::from_sqlx("insert listing", e))?;

        if result.rows_affected() == 0 {
            return Err(PersistenceError::ConstraintViolation {
                constraint: format!("property id {} was retired", record.property_id),
            });
        }

        Ok(())
    }

    async fn get(
        &self,
        category: ListingCategory,
        property_id: &str,
    ) -> Result<Option<ListingRecord>, PersistenceError> {
        let row = sqlx::query(
            "SELECT property_id, id_scheme, category, document, created_at, updated_at \
             FROM listings WHERE category = ? AND property_id = ?",
        )
        .bind(category.slug())
        .bind(property_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| PersistenceError::from_sqlx("get listing", e))?;

        row.as_ref().map(Self::record_from_row).transpose()
    }

    async fn list(
        &self,
        category: ListingCategory,
        filter: &ListingFilter,
        page: &PageRequest,
    ) -> Result<Page<ListingRecord>, PersistenceError> {
        let mut count_query = QueryBuilder::new("SELECT COUNT(*) FROM listings");
        Self::push_filters(&mut count_query, category, filter);

        let total: i64 = count_query
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| PersistenceError::from_sqlx("count listings", e))?;

        let pagination = page.to_pagination();
        let mut select = QueryBuilder::new(
            "SELECT property_id, id_scheme, category, document, created_at, updated_at FROM listings",
        );
        Self::push_filters(&mut select, category, filter);
        select
            .push(" ORDER BY created_at DESC, rowid DESC LIMIT ")
            .push_bind(i64::from(pagination.limit))
            .push(" OFFSET ")
            .push_bind(i64::from(pagination.offset));

        let rows = select
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| PersistenceError::from_sqlx("list listings", e))?;

        let items = rows
            .iter()
            .map(Self::record_from_row)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Page::new(items, page, u64::try_from(total).unwrap_or(0)))
    }

    async fn replace_document(
        &self,
        category: ListingCategory,
        property_id: &str,
        document: &Value,
        updated_at: DateTime<Utc>,
    ) -> Result<bool, PersistenceError> {
        let document = serde_json::to_string(document).map_err(|e| {
            PersistenceError::SerializationFailed {
                details: format!("listing document: {e}"),
            }
        })?;

        let result = sqlx::query(
            "UPDATE listings SET document = ?, updated_at = ? WHERE category = ? AND property_id = ?",
        )
        .bind(document)
        .bind(format_timestamp(updated_at))
        .bind(category.slug())
        .bind(property_id)
        .execute(&self.pool)
        .await
        .map_err(|e| PersistenceError::from_sqlx("update listing", e))?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(
        &self,
        category: ListingCategory,
        property_id: &str,
    ) -> Result<bool, PersistenceError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| PersistenceError::from_sqlx("begin delete", e))?;

        // Retire first so the tombstone keeps the row's ID scheme
        sqlx::query(
            "INSERT OR IGNORE INTO retired_property_ids \
                 (property_id, id_scheme, category, retired_at) \
             SELECT property_id, id_scheme, category, ? FROM listings \
             WHERE category = ? AND property_id = ?",
        )
        .bind(format_timestamp(Utc::now()))
        .bind(category.slug())
        .bind(property_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| PersistenceError::from_sqlx("retire property id", e))?;

        let result = sqlx::query("DELETE FROM listings WHERE category = ? AND property_id = ?")
            .bind(category.slug())
            .bind(property_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| PersistenceError::from_sqlx("delete listing", e))?;

        if result.rows_affected() == 0 {
            return Ok(false);
        }

        tx.commit()
            .await
            .map_err(|e| PersistenceError::from_sqlx("commit delete", e))?;

        Ok(true)
    }
}
