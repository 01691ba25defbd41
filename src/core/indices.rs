use hashbrown::HashMap;

use crate::types::RecordId;

/// Secondary index from a derived key to the records carrying it.
pub type VecIndex<K> = HashMap<K, Vec<RecordId>>;
