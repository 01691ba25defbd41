//! Query parsing and the exact/prefix record filter.

/// Record filtering and ordering over a parsed query.
pub mod filter;
/// Query tokenization and per-record matching.
pub mod query;

pub use filter::{filter, sort_recent_first};
pub use query::{Query, append_tag, drop_last_tag, highlight};
