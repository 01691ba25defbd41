use std::{
    error::Error,
    fmt::{Display, Formatter},
};

use hashbrown::HashMap;
use uuid::Uuid;

use crate::{
    op::Op,
    record::{Record, clean_tags, dedup_key},
    types::{RecordId, Timestamp, to_millis},
};

use super::indices::VecIndex;

/// Declined store operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A record with the same dedup key already exists.
    AlreadyExists {
        /// Colliding dedup key.
        key: String,
    },
    /// The tag sequence was empty after dropping blank tags.
    EmptyTags,
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AlreadyExists { key } => write!(f, "record already exists: `{key}`"),
            Self::EmptyTags => write!(f, "record needs at least one tag"),
        }
    }
}

impl Error for StoreError {}

/// Authoritative in-memory record collection.
///
/// Store order is newest-created first. The dedup index maps each dedup key
/// to every record currently carrying it; after an update several records may
/// share one key.
#[derive(Debug, Default)]
pub struct RecordStore {
    records: HashMap<RecordId, Record>,
    order: Vec<RecordId>,
    by_key: VecIndex<String>,
}

impl RecordStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store from records already in store order.
    ///
    /// Records whose id repeats an earlier one are dropped.
    pub fn from_records(records: Vec<Record>) -> Self {
        let mut store = Self::new();
        store.load(records);
        store
    }

    /// Inserts a new record at the front of store order.
    ///
    /// Blank tags are dropped. Declined when nothing remains or when another
    /// record already has the same dedup key.
    pub fn create<I, S>(&mut self, tags: I, now: Timestamp) -> Result<(Record, Op), StoreError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tags = clean_tags(tags);
        if tags.is_empty() {
            return Err(StoreError::EmptyTags);
        }

        let key = dedup_key(&tags);
        if self.by_key.get(&key).is_some_and(|ids| !ids.is_empty()) {
            return Err(StoreError::AlreadyExists { key });
        }

        let now = to_millis(now);
        let record = Record {
            id: self.fresh_id(),
            tags,
            created_at: now,
            updated_at: now,
        };
        self.insert_at(0, record.clone());
        Ok((record.clone(), Op::Create { record }))
    }

    /// Replaces the tags of `id`. Returns `Ok(None)` when `id` is absent.
    ///
    /// Dedup is not re-checked here.
    pub fn update<I, S>(&mut self, id: RecordId, tags: I, now: Timestamp) -> Result<Option<Op>, StoreError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tags = clean_tags(tags);
        if tags.is_empty() {
            return Err(StoreError::EmptyTags);
        }

        let Some(rec) = self.records.get_mut(&id) else {
            return Ok(None);
        };

        let old_key = rec.dedup_key();
        let prev_tags = std::mem::replace(&mut rec.tags, tags);
        let prev_updated_at = rec.updated_at;
        rec.updated_at = to_millis(now).max(rec.created_at);
        let new_key = rec.dedup_key();

        if new_key != old_key {
            Self::remove_from_vec_index(&mut self.by_key, &old_key, id);
            self.by_key.entry(new_key).or_default().push(id);
        }

        Ok(Some(Op::Update {
            id,
            prev_tags,
            prev_updated_at,
        }))
    }

    /// Removes `id`. Returns `None` when it is absent.
    pub fn delete(&mut self, id: RecordId) -> Option<Op> {
        let index = self.order.iter().position(|x| *x == id)?;
        let record = self.remove_at(index)?;
        Some(Op::Delete { record, index })
    }

    /// Swaps the whole collection for `records`, given in store order.
    pub fn replace_all(&mut self, records: Vec<Record>) -> Op {
        let prev = self.list();
        self.clear();
        self.load(records);
        Op::Replace {
            prev,
            count: self.order.len(),
        }
    }

    /// Undoes an op previously returned by this store.
    pub fn revert(&mut self, op: Op) {
        match op {
            Op::Create { record } => {
                if let Some(index) = self.order.iter().position(|x| *x == record.id) {
                    let _ = self.remove_at(index);
                }
            }
            Op::Update {
                id,
                prev_tags,
                prev_updated_at,
            } => {
                let Some(rec) = self.records.get_mut(&id) else {
                    return;
                };
                let old_key = rec.dedup_key();
                rec.tags = prev_tags;
                rec.updated_at = prev_updated_at;
                let new_key = rec.dedup_key();
                if new_key != old_key {
                    Self::remove_from_vec_index(&mut self.by_key, &old_key, id);
                    self.by_key.entry(new_key).or_default().push(id);
                }
            }
            Op::Delete { record, index } => {
                let index = index.min(self.order.len());
                self.insert_at(index, record);
            }
            Op::Replace { prev, .. } => {
                self.clear();
                self.load(prev);
            }
        }
    }

    /// Record with `id`, if present.
    pub fn get(&self, id: RecordId) -> Option<&Record> {
        self.records.get(&id)
    }

    /// Number of records held.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// True when no records are held.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Records in store order.
    pub fn iter(&self) -> impl Iterator<Item = &Record> {
        self.order.iter().filter_map(|id| self.records.get(id))
    }

    /// Clones every record in store order.
    pub fn list(&self) -> Vec<Record> {
        self.iter().cloned().collect()
    }

    /// Ids in store order.
    pub fn ordered_ids(&self) -> &[RecordId] {
        &self.order
    }

    /// Records whose dedup key equals `key`, in index insertion order.
    pub fn by_dedup_key(&self, key: &str) -> Vec<&Record> {
        self.by_key
            .get(key)
            .into_iter()
            .flat_map(|ids| ids.iter())
            .filter_map(|id| self.records.get(id))
            .collect()
    }

    fn load(&mut self, records: Vec<Record>) {
        for rec in records {
            if self.records.contains_key(&rec.id) {
                continue;
            }
            let at = self.order.len();
            self.insert_at(at, rec);
        }
    }

    fn clear(&mut self) {
        self.records.clear();
        self.order.clear();
        self.by_key.clear();
    }

    fn insert_at(&mut self, index: usize, rec: Record) {
        self.by_key.entry(rec.dedup_key()).or_default().push(rec.id);
        self.order.insert(index, rec.id);
        self.records.insert(rec.id, rec);
    }

    fn remove_at(&mut self, index: usize) -> Option<Record> {
        let id = self.order.remove(index);
        let rec = self.records.remove(&id)?;
        Self::remove_from_vec_index(&mut self.by_key, &rec.dedup_key(), id);
        Some(rec)
    }

    fn fresh_id(&self) -> RecordId {
        loop {
            let id = Uuid::new_v4();
            if !self.records.contains_key(&id) {
                return id;
            }
        }
    }

    fn remove_from_vec_index(index: &mut VecIndex<String>, key: &str, id: RecordId) {
        let Some(ids) = index.get_mut(key) else {
            return;
        };
        if let Some(pos) = ids.iter().position(|x| *x == id) {
            ids.remove(pos);
        }
        if ids.is_empty() {
            index.remove(key);
        }
    }
}
