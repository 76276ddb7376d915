//! # Metric Names
//!
//! Names and label keys shared by every component that records metrics, so
//! the Prometheus exposition stays consistent.

/// Property IDs handed out by the sequential allocator
pub const PROPERTY_IDS_ALLOCATED: &str = "listings_property_ids_allocated_total";

/// Candidates found already taken during allocation
pub const PROPERTY_ID_COLLISIONS: &str = "listings_property_id_collisions_total";

/// Time-derived IDs issued because sequential allocation failed
pub const PROPERTY_ID_FALLBACKS: &str = "listings_property_id_fallbacks_total";

/// Listing inserts rejected by the unique constraint and retried
pub const LISTING_INSERT_CONFLICTS: &str = "listings_insert_conflicts_total";

/// Listing lifecycle events
pub const LISTING_EVENTS: &str = "listings_events_total";

/// Media files stored
pub const MEDIA_FILES_UPLOADED: &str = "listings_media_files_uploaded_total";

/// HTTP requests served
pub const HTTP_REQUESTS: &str = "listings_http_requests_total";

/// HTTP request latency in seconds
pub const HTTP_REQUEST_DURATION: &str = "listings_http_request_duration_seconds";

pub mod labels {
    pub const PREFIX: &str = "prefix";
    pub const CATEGORY: &str = "category";
    pub const EVENT: &str = "event";
    pub const MEDIA_TYPE: &str = "media_type";
    pub const METHOD: &str = "method";
    pub const STATUS: &str = "status";
}
