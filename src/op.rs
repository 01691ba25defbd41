//! Applied mutation model.
//!
//! Every store mutation returns the [`Op`] it applied. Handing the op back to
//! [`crate::core::store::RecordStore::revert`] restores the prior state, which
//! is how the book keeps memory and the persisted snapshot in step when a
//! write fails.

use crate::{
    record::Record,
    types::{RecordId, Timestamp},
};

/// Mutation applied to a [`crate::core::store::RecordStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Op {
    /// A record was inserted at the front.
    Create {
        /// Inserted record.
        record: Record,
    },
    /// A record's tags were replaced.
    Update {
        /// Updated record id.
        id: RecordId,
        /// Tags before the update.
        prev_tags: Vec<String>,
        /// `updated_at` before the update.
        prev_updated_at: Timestamp,
    },
    /// A record was removed.
    Delete {
        /// Removed record.
        record: Record,
        /// Position the record held in store order.
        index: usize,
    },
    /// The whole collection was swapped out.
    Replace {
        /// Collection before the swap, in store order.
        prev: Vec<Record>,
        /// Number of records after the swap.
        count: usize,
    },
}

impl Op {
    /// Short label used in log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Create { .. } => "create",
            Self::Update { .. } => "update",
            Self::Delete { .. } => "delete",
            Self::Replace { .. } => "replace",
        }
    }

    /// Record touched by this op, if it targets exactly one.
    pub fn record_id(&self) -> Option<RecordId> {
        match self {
            Self::Create { record } | Self::Delete { record, .. } => Some(record.id),
            Self::Update { id, .. } => Some(*id),
            Self::Replace { .. } => None,
        }
    }
}
