//! Persisted record book.
//!
//! Wraps a [`RecordStore`] with a [`BlobStore`] and a [`Clock`]. The snapshot
//! is read once when the book opens and rewritten in full after every
//! mutation. A failed write reverts the in-memory mutation before the error
//! is returned, so memory never runs ahead of the snapshot.

use std::{
    collections::BTreeSet,
    error::Error,
    fmt::{Display, Formatter},
};

use log::{debug, error, info, warn};

use crate::{
    core::store::{RecordStore, StoreError},
    index::{self, TagFrequency},
    op::Op,
    persist::{BlobStore, PersistError, PersistResult},
    record::Record,
    search,
    transfer::{self, ImportError, PortableRecord},
    types::{Clock, DEFAULT_STORAGE_KEY, RecordId, SystemClock},
};

/// Which records feed [`RecordBook::frequencies`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FrequencyScope {
    /// Only records matching the current query.
    #[default]
    Filtered,
    /// Every record, regardless of query.
    All,
}

/// Book settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookConfig {
    /// Blob key holding the snapshot.
    pub storage_key: String,
    /// Scope for tag frequency counts.
    pub frequency_scope: FrequencyScope,
}

impl Default for BookConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            frequency_scope: FrequencyScope::default(),
        }
    }
}

/// Failure returned by a book operation.
#[derive(Debug)]
pub enum BookError {
    /// The store declined the mutation.
    Store(StoreError),
    /// The import payload was rejected; the store is untouched.
    Import(ImportError),
    /// The snapshot write failed; the mutation was reverted.
    Persist(PersistError),
}

impl Display for BookError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Store(err) => write!(f, "{err}"),
            Self::Import(err) => write!(f, "import failed: {err}"),
            Self::Persist(err) => write!(f, "persist failed: {err}"),
        }
    }
}

impl Error for BookError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            Self::Import(err) => Some(err),
            Self::Persist(err) => Some(err),
        }
    }
}

impl From<StoreError> for BookError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl From<ImportError> for BookError {
    fn from(value: ImportError) -> Self {
        Self::Import(value)
    }
}

impl From<PersistError> for BookError {
    fn from(value: PersistError) -> Self {
        Self::Persist(value)
    }
}

/// Record store bound to its persisted snapshot.
pub struct RecordBook<B: BlobStore, C: Clock = SystemClock> {
    store: RecordStore,
    blob: B,
    clock: C,
    config: BookConfig,
}

impl<B: BlobStore> RecordBook<B, SystemClock> {
    /// Opens with the wall clock and default settings.
    pub fn open_default(blob: B) -> Self {
        Self::open(blob, SystemClock, BookConfig::default())
    }
}

impl<B: BlobStore, C: Clock> RecordBook<B, C> {
    /// Hydrates the book from `blob`.
    ///
    /// A missing snapshot starts empty. An unreadable or malformed snapshot
    /// is logged and also starts empty; opening never fails.
    pub fn open(blob: B, clock: C, config: BookConfig) -> Self {
        let key = config.storage_key.as_str();
        let store = match blob.get(key) {
            Ok(None) => {
                info!("event=hydrate module=book status=empty key={key}");
                RecordStore::new()
            }
            Ok(Some(text)) => match transfer::decode(&text, clock.now()) {
                Ok(records) => {
                    info!(
                        "event=hydrate module=book status=ok key={key} records={}",
                        records.len()
                    );
                    RecordStore::from_records(records)
                }
                Err(err) => {
                    warn!("event=hydrate module=book status=malformed key={key} error={err}");
                    RecordStore::new()
                }
            },
            Err(err) => {
                warn!("event=hydrate module=book status=read_failed key={key} error={err}");
                RecordStore::new()
            }
        };

        Self {
            store,
            blob,
            clock,
            config,
        }
    }

    /// Creates a record from `tags` and persists it.
    pub fn create<I, S>(&mut self, tags: I) -> Result<Record, BookError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let (record, op) = self.store.create(tags, self.clock.now())?;
        self.commit(op)?;
        Ok(record)
    }

    /// Replaces the tags of `id`. Returns `false` when `id` is absent.
    pub fn update<I, S>(&mut self, id: RecordId, tags: I) -> Result<bool, BookError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let Some(op) = self.store.update(id, tags, self.clock.now())? else {
            return Ok(false);
        };
        self.commit(op)?;
        Ok(true)
    }

    /// Deletes `id`. Returns `false` when `id` is absent.
    pub fn delete(&mut self, id: RecordId) -> Result<bool, BookError> {
        let Some(op) = self.store.delete(id) else {
            return Ok(false);
        };
        self.commit(op)?;
        Ok(true)
    }

    /// Replaces the whole collection with the records in `text`.
    ///
    /// Returns the number of records now held. On any error the collection
    /// is left as it was.
    pub fn import_json(&mut self, text: &str) -> Result<usize, BookError> {
        let records = transfer::decode(text, self.clock.now())?;
        let op = self.store.replace_all(records);
        self.commit(op)?;
        Ok(self.store.len())
    }

    /// Portable copy of every record, in store order.
    pub fn export(&self) -> Vec<PortableRecord> {
        transfer::export(self.store.iter())
    }

    /// Export file contents: the snapshot form, two-space indented.
    pub fn export_json(&self) -> Result<String, BookError> {
        transfer::encode_pretty(&self.store.list())
            .map_err(|err| BookError::Persist(PersistError::Serde(err)))
    }

    /// Suggested export file name for today.
    pub fn export_file_name(&self) -> String {
        transfer::export_file_name(self.clock.now().date_naive())
    }

    /// Rewrites the snapshot from the current collection.
    pub fn flush(&mut self) -> PersistResult<()> {
        let text = transfer::encode(&self.store.list())?;
        self.blob.set(&self.config.storage_key, &text)
    }

    /// Record with `id`, if present.
    pub fn get(&self, id: RecordId) -> Option<&Record> {
        self.store.get(id)
    }

    /// Clones every record in store order.
    pub fn list(&self) -> Vec<Record> {
        self.store.list()
    }

    /// Number of records held.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// True when no records are held.
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Records matching `query`, newest created first.
    pub fn search(&self, query: &str) -> Vec<Record> {
        search::filter(self.store.iter(), query)
    }

    /// Tag counts for `query`, scoped per [`BookConfig::frequency_scope`].
    pub fn frequencies(&self, query: &str) -> Vec<TagFrequency> {
        match self.config.frequency_scope {
            FrequencyScope::Filtered => index::frequencies(&self.search(query)),
            FrequencyScope::All => index::frequencies(self.store.iter()),
        }
    }

    /// [`Self::frequencies`] capped at [`index::TAG_CLOUD_LIMIT`] entries.
    pub fn tag_cloud(&self, query: &str) -> Vec<TagFrequency> {
        index::top(self.frequencies(query), index::TAG_CLOUD_LIMIT)
    }

    /// Every distinct tag across the whole collection.
    pub fn universe(&self) -> BTreeSet<String> {
        index::universe(self.store.iter())
    }

    /// Completions for a partially typed tag.
    pub fn suggest(&self, partial: &str, limit: usize) -> Vec<String> {
        index::suggest(&self.universe(), partial, limit)
    }

    /// Underlying store.
    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    /// Backing blob store.
    pub fn blob(&self) -> &B {
        &self.blob
    }

    /// Active settings.
    pub fn config(&self) -> &BookConfig {
        &self.config
    }

    fn commit(&mut self, op: Op) -> Result<(), BookError> {
        match self.flush() {
            Ok(()) => {
                debug!(
                    "event=commit module=book op={} id={:?} records={}",
                    op.kind(),
                    op.record_id(),
                    self.store.len()
                );
                Ok(())
            }
            Err(err) => {
                error!(
                    "event=commit module=book status=reverted op={} error={err}",
                    op.kind()
                );
                self.store.revert(op);
                Err(err.into())
            }
        }
    }
}
