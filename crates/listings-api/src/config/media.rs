//! Media storage configuration

use serde::{Deserialize, Serialize};

/// Default per-file upload limit (150 MiB)
pub const DEFAULT_MAX_FILE_SIZE: usize = 150 * 1024 * 1024;

/// Object store backend for uploaded media
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum MediaBackend {
    /// Process-local store, lost on restart
    #[default]
    InMemory,

    /// Directory on the local filesystem
    Local { path: String },

    /// AWS S3 bucket; credentials come from the standard AWS environment
    Aws { bucket: String, region: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaConfig {
    /// Storage backend
    pub backend: MediaBackend,

    /// Leading path segment of every object key
    pub key_prefix: String,

    /// Base URL for public links on non-S3 backends
    pub public_base_url: String,

    /// Largest accepted file in bytes
    pub max_file_size: usize,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            backend: MediaBackend::default(),
            key_prefix: "listing-media".to_string(),
            public_base_url: "http://localhost:8000/media-files".to_string(),
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }
}

impl MediaConfig {
    /// Request body limit for multipart uploads
    ///
    /// A request may carry several files, so the limit is a multiple of the
    /// per-file cap.
    pub fn request_body_limit(&self) -> usize {
        self.max_file_size.saturating_mul(4)
    }
}
