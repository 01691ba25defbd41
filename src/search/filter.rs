use crate::record::Record;

use super::query::Query;

/// Returns the records matching `query`, preserving input order.
///
/// An empty query returns every record.
pub fn filter<'a, I>(records: I, query: &str) -> Vec<Record>
where
    I: IntoIterator<Item = &'a Record>,
{
    let query = Query::parse(query);
    records
        .into_iter()
        .filter(|rec| query.matches(rec))
        .cloned()
        .collect()
}

/// Stable sort by `updated_at`, most recent first.
pub fn sort_recent_first(records: &mut [Record]) {
    records.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
}
