//! SQLite-backed stores

pub mod blogs;
pub mod listings;

pub use blogs::{BlogRepository, SqliteBlogStore};
pub use listings::{ListingFilter, ListingRecord, ListingRepository, SqliteListingStore};
