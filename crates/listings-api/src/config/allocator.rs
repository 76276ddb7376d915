//! Property ID allocation settings

use common::property_id::DEFAULT_MAX_ATTEMPTS;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllocatorConfig {
    /// Candidates tried per allocation before the time-derived fallback
    pub max_attempts: u32,

    /// Inserts attempted when the unique constraint rejects an allocated ID
    pub insert_attempts: u32,
}

impl Default for AllocatorConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            insert_attempts: 5,
        }
    }
}
