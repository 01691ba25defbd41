//! Derived tag views: frequency counts and the tag universe.
//!
//! Both are pure functions over a record sequence and are recomputed on
//! demand. Tags are compared verbatim, so `Rust` and `rust` count separately.

use std::collections::BTreeSet;

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::record::Record;

/// Number of records carrying one tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagFrequency {
    /// Tag text, original casing.
    pub tag: String,
    /// Records in scope containing the tag.
    pub count: usize,
}

/// Counts, for each distinct tag, the records in `records` carrying it.
///
/// Sorted by count descending. Ties keep first-seen order: records are walked
/// in the order given and tags in display order.
pub fn frequencies<'a, I>(records: I) -> Vec<TagFrequency>
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut slots: HashMap<&'a str, usize> = HashMap::new();
    let mut out: Vec<TagFrequency> = Vec::new();

    for rec in records {
        for (i, tag) in rec.tags.iter().enumerate() {
            if rec.tags[..i].contains(tag) {
                continue;
            }
            match slots.get(tag.as_str()) {
                Some(&slot) => out[slot].count += 1,
                None => {
                    slots.insert(tag.as_str(), out.len());
                    out.push(TagFrequency {
                        tag: tag.clone(),
                        count: 1,
                    });
                }
            }
        }
    }

    out.sort_by(|a, b| b.count.cmp(&a.count));
    out
}

/// Default number of entries shown in a tag cloud.
pub const TAG_CLOUD_LIMIT: usize = 50;

/// Keeps the `limit` most frequent entries of an already sorted list.
pub fn top(mut freqs: Vec<TagFrequency>, limit: usize) -> Vec<TagFrequency> {
    freqs.truncate(limit);
    freqs
}

/// All distinct tags across `records`, ascending.
pub fn universe<'a, I>(records: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = &'a Record>,
{
    records
        .into_iter()
        .flat_map(|rec| rec.tags.iter().cloned())
        .collect()
}

/// Completion candidates for a partially typed tag.
///
/// Returns universe tags starting with `partial` (case-insensitive), skipping
/// a tag equal to `partial` itself, in universe order, at most `limit`.
pub fn suggest(universe: &BTreeSet<String>, partial: &str, limit: usize) -> Vec<String> {
    let partial = partial.trim().to_lowercase();
    if partial.is_empty() {
        return Vec::new();
    }

    universe
        .iter()
        .filter(|tag| {
            let lowered = tag.to_lowercase();
            lowered.starts_with(&partial) && lowered != partial
        })
        .take(limit)
        .cloned()
        .collect()
}
