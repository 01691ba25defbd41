//! In-memory authoritative store, its indices, and the persisted book.

/// Persisted record book: store + blob store + clock.
pub mod book;
/// Helper index aliases.
pub mod indices;
/// Authoritative record store.
pub mod store;
