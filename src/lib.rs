//! Tag-based record keeping: an in-memory record store with exact/prefix tag
//! search, tag frequency views, and whole-snapshot persistence.
//!
//! # Examples
//!
//! Direct use of [`core::book::RecordBook`]:
//! ```
//! use misctags::{core::book::RecordBook, persist::MemoryBlobStore};
//!
//! let mut book = RecordBook::open_default(MemoryBlobStore::new());
//! book.create(["alpha", "beta"]).expect("create");
//! book.create(["alpha", "gamma"]).expect("create");
//!
//! assert_eq!(book.search("alpha be").len(), 1);
//! assert_eq!(book.search("alpha").len(), 2);
//! assert_eq!(book.frequencies("")[0].tag, "alpha");
//! ```
//!
//! Runtime usage with a SQLite blob store:
//! ```no_run
//! use misctags::{
//!     core::book::RecordBook,
//!     persist::sqlite::SqliteBlobStore,
//!     runtime::handle::{spawn_records, RuntimeConfig},
//! };
//!
//! # #[tokio::main]
//! # async fn main() {
//! let blobs = SqliteBlobStore::open("records.db").expect("open sqlite");
//! let handle = spawn_records(RecordBook::open_default(blobs), RuntimeConfig::default());
//! let rec = handle
//!     .create(vec!["coffee".to_string(), "beans".to_string()])
//!     .await
//!     .expect("create");
//! assert_eq!(handle.search("coff").await.expect("search")[0].id, rec.id);
//! handle.shutdown().await.expect("shutdown");
//! # }
//! ```
#![deny(missing_docs)]

/// Record store, its indices, and the persisted book.
pub mod core;
/// Tag frequency and universe views.
pub mod index;
/// File logging bootstrap.
pub mod logging;
/// Applied mutation model.
pub mod op;
/// Blob store abstraction and its backings.
pub mod persist;
/// Record domain type and tag parsing.
pub mod record;
/// Single-writer runtime handle and events.
pub mod runtime;
/// Query parsing and filtering.
pub mod search;
/// Portable JSON codec for snapshots and export files.
pub mod transfer;
/// Shared primitive types and the clock capability.
pub mod types;
