//! Blog posts, counters and per-author statistics

pub mod model;
pub mod service;
pub mod statistics;

pub use model::{Blog, BlogComment, BlogStatistics, BlogStatus, NewBlog, NewComment};
pub use service::BlogService;
