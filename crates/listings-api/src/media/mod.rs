//! Photo and video uploads for listings

pub mod model;
pub mod service;
pub mod storage;
pub mod upload;

pub use model::{MediaItem, MediaKind, MediaMetadata};
pub use service::{MediaService, UploadOutcome};
pub use storage::{create_object_store, MediaStorage};
pub use upload::UploadRequest;
