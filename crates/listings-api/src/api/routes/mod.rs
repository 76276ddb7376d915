//! API route handlers

pub mod blogs;
pub mod health;
pub mod listings;
pub mod media;
pub mod metrics;
