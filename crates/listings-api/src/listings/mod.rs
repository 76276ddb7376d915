//! Property listings: categories, documents and the listing service

pub mod category;
pub mod document;
pub mod service;

pub use category::{ListingCategory, MediaLayout};
pub use service::{listing_view, ListingService};
