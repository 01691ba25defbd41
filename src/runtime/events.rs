//! Runtime event stream payloads.

use crate::types::RecordId;

/// Events emitted from the single-writer runtime loop once a mutation is
/// persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordEvent {
    /// A new record was created.
    Created {
        /// Created record id.
        id: RecordId,
    },
    /// A record's tags were replaced.
    Updated {
        /// Updated record id.
        id: RecordId,
    },
    /// A record was deleted.
    Deleted {
        /// Deleted record id.
        id: RecordId,
    },
    /// The collection was replaced by an import.
    Imported {
        /// Records held after the import.
        count: usize,
    },
}
