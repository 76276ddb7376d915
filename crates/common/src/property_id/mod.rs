//! # Property IDs
//!
//! Human-readable, per-category sequential identifiers for listings
//! (`RA-COMREPL0001`, `RA-COMREPL0002`, ...), with a time-derived fallback
//! when the sequence cannot be read.

pub mod allocator;
pub mod types;

pub use allocator::{AllocationError, IdentifierLookup, SequentialIdAllocator, DEFAULT_MAX_ATTEMPTS};
pub use types::{trailing_counter, IdScheme, PropertyId, PropertyPrefix, COUNTER_WIDTH, FALLBACK_DIGITS};
