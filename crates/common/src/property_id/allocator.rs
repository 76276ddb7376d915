//! Sequential property ID allocation
//!
//! The allocator derives the next ID from the highest existing ID in a
//! prefix namespace and confirms the candidate is free before handing it
//! out. Confirmation is a read, not a reservation: two concurrent callers
//! can receive the same candidate, and the store's uniqueness constraint
//! decides which insert wins.

use async_trait::async_trait;
use chrono::Utc;
use metrics::counter;
use std::sync::Arc;
use thiserror::Error;

use super::types::{trailing_counter, PropertyId, PropertyPrefix};
use crate::error::PersistenceError;
use crate::journal::{
    log_property_id_allocated, log_property_id_collision, log_property_id_fallback,
};
use crate::metrics::{
    labels, PROPERTY_IDS_ALLOCATED, PROPERTY_ID_COLLISIONS, PROPERTY_ID_FALLBACKS,
};

/// Default number of candidates tried before falling back
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Read access to the identifiers already in use
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentifierLookup: Send + Sync {
    /// Highest sequential ID of the form `<prefix><digits>`, ordered numerically
    ///
    /// IDs issued under `IdScheme::Fallback` must be left out.
    async fn highest_with_prefix(
        &self,
        prefix: &PropertyPrefix,
    ) -> Result<Option<String>, PersistenceError>;

    /// Whether any record (live or retired) already carries `property_id`
    async fn exists(&self, property_id: &str) -> Result<bool, PersistenceError>;
}

#[derive(Debug, Error)]
pub enum AllocationError {
    #[error("Identifier store unavailable: {0}")]
    Store(#[from] PersistenceError),

    #[error("No free property ID for prefix {prefix} after {attempts} attempts")]
    Exhausted { prefix: String, attempts: u32 },
}

/// Hands out `<prefix><counter>` identifiers in increasing order
pub struct SequentialIdAllocator<L: ?Sized> {
    lookup: Arc<L>,
    max_attempts: u32,
    clock: fn() -> i64,
}

impl<L: ?Sized> Clone for SequentialIdAllocator<L> {
    fn clone(&self) -> Self {
        Self {
            lookup: Arc::clone(&self.lookup),
            max_attempts: self.max_attempts,
            clock: self.clock,
        }
    }
}

fn epoch_millis() -> i64 {
    Utc::now().timestamp_millis()
}

impl<L: IdentifierLookup + ?Sized> SequentialIdAllocator<L> {
    pub fn new(lookup: Arc<L>) -> Self {
        Self {
            lookup,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            clock: epoch_millis,
        }
    }

    /// Bound the retry loop; at least one attempt is always made
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Replace the millisecond clock used for fallback IDs
    pub fn with_clock(mut self, clock: fn() -> i64) -> Self {
        self.clock = clock;
        self
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Allocate the next sequential ID or report why none could be produced
    ///
    /// Each attempt re-reads the current maximum. The candidate never moves
    /// backwards between attempts, so a stale maximum cannot make the loop
    /// revisit an ID that was already found taken.
    pub async fn try_allocate(
        &self,
        prefix: &PropertyPrefix,
    ) -> Result<PropertyId, AllocationError> {
        let mut floor = 0_u64;

        for attempt in 1..=self.max_attempts {
            let highest = self.lookup.highest_with_prefix(prefix).await?;
            let next = highest
                .as_deref()
                .and_then(trailing_counter)
                .map_or(1, |n| n.saturating_add(1));

            let counter = next.max(floor);
            let candidate = PropertyId::sequential(prefix, counter);

            if !self.lookup.exists(candidate.as_str()).await? {
                counter!(PROPERTY_IDS_ALLOCATED, labels::PREFIX => prefix.to_string())
                    .increment(1);
                log_property_id_allocated(prefix.as_str(), candidate.as_str(), attempt);
                return Ok(candidate);
            }

            counter!(PROPERTY_ID_COLLISIONS, labels::PREFIX => prefix.to_string())
                .increment(1);
            log_property_id_collision(prefix.as_str(), candidate.as_str(), attempt);
            floor = counter.saturating_add(1);
        }

        Err(AllocationError::Exhausted {
            prefix: prefix.to_string(),
            attempts: self.max_attempts,
        })
    }

    /// Allocate an ID, degrading to a time-derived one instead of failing
    pub async fn allocate(&self, prefix: &PropertyPrefix) -> PropertyId {
        match self.try_allocate(prefix).await {
            Ok(id) => id,
            Err(e) => {
                let fallback = self.fallback(prefix);
                counter!(PROPERTY_ID_FALLBACKS, labels::PREFIX => prefix.to_string())
                    .increment(1);
                log_property_id_fallback(prefix.as_str(), fallback.as_str(), &e.to_string());
                fallback
            }
        }
    }

    /// Time-derived ID for `prefix` at the current clock reading
    pub fn fallback(&self, prefix: &PropertyPrefix) -> PropertyId {
        PropertyId::fallback(prefix, (self.clock)())
    }
}
