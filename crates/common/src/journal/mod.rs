//! Structured logging built on tracing
//!
//! `init` installs the global subscriber; `logging` holds the structured
//! event helpers used for audit-relevant operations.

pub mod init;
pub mod logging;

pub use init::{build_filter, init_logging};
pub use logging::*;
