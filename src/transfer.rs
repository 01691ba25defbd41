//! Portable JSON form shared by the persisted snapshot and export files.
//!
//! The form is a JSON array of `{id, tags, createdAt, updatedAt}` objects with
//! timestamps as RFC 3339 text. Decoding is strict about the top-level shape
//! and lenient about ids: a missing, malformed, or repeated id is replaced by
//! a fresh one.

use std::{
    error::Error,
    fmt::{Display, Formatter},
};

use chrono::NaiveDate;
use hashbrown::HashSet;
use log::warn;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::{
    record::{Record, clean_tags},
    types::{DEFAULT_STORAGE_KEY, RecordId, Timestamp, format_timestamp, parse_timestamp, to_millis},
};

/// Payload that cannot be turned into a record collection.
#[derive(Debug)]
pub enum ImportError {
    /// Not valid JSON.
    Json(serde_json::Error),
    /// Valid JSON with the wrong structure.
    Shape(String),
    /// A timestamp field is present but unreadable.
    Timestamp {
        /// Entry position in the array.
        index: usize,
        /// Offending field name.
        field: &'static str,
        /// Parser message.
        message: String,
    },
}

impl Display for ImportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json(err) => write!(f, "invalid JSON: {err}"),
            Self::Shape(message) => write!(f, "unexpected record data: {message}"),
            Self::Timestamp {
                index,
                field,
                message,
            } => write!(f, "entry {index}: invalid `{field}`: {message}"),
        }
    }
}

impl Error for ImportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Json(err) => Some(err),
            Self::Shape(_) | Self::Timestamp { .. } => None,
        }
    }
}

impl From<serde_json::Error> for ImportError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

/// Structural copy of a [`Record`] with textual fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortableRecord {
    /// Record id, verbatim.
    pub id: String,
    /// Tags in display order.
    pub tags: Vec<String>,
    /// Creation time as RFC 3339 text.
    pub created_at: String,
    /// Last update time as RFC 3339 text.
    pub updated_at: String,
}

impl From<&Record> for PortableRecord {
    fn from(rec: &Record) -> Self {
        Self {
            id: rec.id.to_string(),
            tags: rec.tags.clone(),
            created_at: format_timestamp(&rec.created_at),
            updated_at: format_timestamp(&rec.updated_at),
        }
    }
}

/// Copies `records` into their portable form.
pub fn export<'a>(records: impl IntoIterator<Item = &'a Record>) -> Vec<PortableRecord> {
    records.into_iter().map(PortableRecord::from).collect()
}

/// Compact encoding used for the persisted snapshot.
pub fn encode(records: &[Record]) -> Result<String, serde_json::Error> {
    serde_json::to_string(records)
}

/// Two-space indented encoding used for export files.
pub fn encode_pretty(records: &[Record]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(records)
}

/// Suggested export file name for `date`.
pub fn export_file_name(date: NaiveDate) -> String {
    format!("{DEFAULT_STORAGE_KEY}-{}.json", date.format("%Y-%m-%d"))
}

/// Parses `text` into records, in the order given.
///
/// `now` fills in missing timestamps.
pub fn decode(text: &str, now: Timestamp) -> Result<Vec<Record>, ImportError> {
    let value: Value = serde_json::from_str(text)?;
    decode_value(value, now)
}

fn decode_value(value: Value, now: Timestamp) -> Result<Vec<Record>, ImportError> {
    let Value::Array(items) = value else {
        return Err(ImportError::Shape("expected an array of records".to_string()));
    };

    let now = to_millis(now);
    let mut seen: HashSet<RecordId> = HashSet::with_capacity(items.len());
    let mut out = Vec::with_capacity(items.len());

    for (index, item) in items.into_iter().enumerate() {
        let Value::Object(map) = item else {
            return Err(ImportError::Shape(format!("entry {index} is not an object")));
        };

        let tags = decode_tags(&map, index)?;
        let created_at = decode_timestamp(&map, "createdAt", index)?.unwrap_or(now);
        let updated_at = decode_timestamp(&map, "updatedAt", index)?
            .unwrap_or(created_at)
            .max(created_at);

        if tags.is_empty() {
            warn!("event=import_skip module=transfer reason=no_tags index={index}");
            continue;
        }

        let id = map
            .get("id")
            .and_then(Value::as_str)
            .and_then(|text| Uuid::parse_str(text).ok())
            .filter(|id| !seen.contains(id))
            .unwrap_or_else(|| fresh_id(&seen));
        seen.insert(id);

        out.push(Record {
            id,
            tags,
            created_at,
            updated_at,
        });
    }

    Ok(out)
}

fn decode_tags(map: &Map<String, Value>, index: usize) -> Result<Vec<String>, ImportError> {
    let Some(Value::Array(raw)) = map.get("tags") else {
        return Err(ImportError::Shape(format!(
            "entry {index}: `tags` must be an array of strings"
        )));
    };

    let mut tags = Vec::with_capacity(raw.len());
    for tag in raw {
        let Value::String(tag) = tag else {
            return Err(ImportError::Shape(format!(
                "entry {index}: `tags` must be an array of strings"
            )));
        };
        tags.push(tag.clone());
    }
    Ok(clean_tags(tags))
}

fn decode_timestamp(
    map: &Map<String, Value>,
    field: &'static str,
    index: usize,
) -> Result<Option<Timestamp>, ImportError> {
    match map.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(text)) => {
            parse_timestamp(text)
                .map(Some)
                .map_err(|err| ImportError::Timestamp {
                    index,
                    field,
                    message: err.to_string(),
                })
        }
        Some(_) => Err(ImportError::Timestamp {
            index,
            field,
            message: "expected a string".to_string(),
        }),
    }
}

fn fresh_id(taken: &HashSet<RecordId>) -> RecordId {
    loop {
        let id = Uuid::new_v4();
        if !taken.contains(&id) {
            return id;
        }
    }
}
