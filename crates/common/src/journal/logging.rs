//! Structured logging functions

use tracing::{error, info, warn};

/// Log a sequential property ID handed out by the allocator
pub fn log_property_id_allocated(prefix: &str, property_id: &str, attempts: u32) {
    info!(
        prefix = %prefix,
        property_id = %property_id,
        attempts = attempts,
        "Property ID allocated"
    );
}

/// Log a candidate that turned out to be taken already
pub fn log_property_id_collision(prefix: &str, candidate: &str, attempt: u32) {
    warn!(
        prefix = %prefix,
        candidate = %candidate,
        attempt = attempt,
        "Property ID already exists, re-reading highest ID"
    );
}

/// Log the switch to a time-derived fallback ID
pub fn log_property_id_fallback(prefix: &str, fallback_id: &str, reason: &str) {
    error!(
        prefix = %prefix,
        fallback_id = %fallback_id,
        reason = %reason,
        "Sequential property ID allocation failed, using fallback ID"
    );
}

/// Log listing lifecycle events (created, updated, deleted)
pub fn log_listing_event(category: &str, property_id: &str, event: &str) {
    info!(
        category = %category,
        property_id = %property_id,
        event = %event,
        "Listing {}",
        event
    );
}

/// Log media uploads, linked to a listing or not
pub fn log_media_upload(category: &str, property_id: Option<&str>, items: usize, videos: usize) {
    match property_id {
        Some(property_id) => info!(
            category = %category,
            property_id = %property_id,
            items = items,
            videos = videos,
            "Media uploaded for listing"
        ),
        None => info!(
            category = %category,
            items = items,
            videos = videos,
            "Media uploaded without linking to a listing"
        ),
    }
}
