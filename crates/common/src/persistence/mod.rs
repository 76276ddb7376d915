//! # Persistence Abstractions
//!
//! SQLite pool setup, store lifecycle traits and pagination types shared by
//! the listing and blog stores.

pub mod connection;
pub mod pagination;
pub mod traits;

pub use connection::*;
pub use pagination::*;
pub use traits::*;
