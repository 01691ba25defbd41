//! Record domain type, tag input parsing, and the dedup key.

use serde::{Deserialize, Serialize};

use crate::types::{RecordId, Timestamp};

/// One saved tag-set with creation/update timestamps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    /// Stable record identifier.
    pub id: RecordId,
    /// Tags in display order. Never empty.
    pub tags: Vec<String>,
    /// Set once at creation.
    #[serde(with = "crate::types::iso8601")]
    pub created_at: Timestamp,
    /// Refreshed on every tag mutation. Never earlier than `created_at`.
    #[serde(with = "crate::types::iso8601")]
    pub updated_at: Timestamp,
}

impl Record {
    /// Lower-cased, space-joined tags used to detect duplicates at creation.
    pub fn dedup_key(&self) -> String {
        dedup_key(&self.tags)
    }
}

/// Computes the dedup key for a tag sequence.
pub fn dedup_key<S: AsRef<str>>(tags: &[S]) -> String {
    let mut key = String::new();
    for (i, tag) in tags.iter().enumerate() {
        if i > 0 {
            key.push(' ');
        }
        key.push_str(&tag.as_ref().to_lowercase());
    }
    key
}

/// Splits user input into tags on runs of whitespace. Case is preserved.
pub fn parse_tags(input: &str) -> Vec<String> {
    input.split_whitespace().map(str::to_string).collect()
}

/// Drops blank entries, keeping the rest verbatim and in order.
pub fn clean_tags<I, S>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    tags.into_iter()
        .map(Into::into)
        .filter(|tag| !tag.trim().is_empty())
        .collect()
}
