//! Content-addressed store of genome records.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::GenomeRecord;

/// Generator of genome IDs that stay unique across cooperating processes.
///
/// Process `rank` of `num_tasks` hands out `rank + 1`, `rank + 1 + num_tasks`,
/// and so on. IDs are never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenomeIdGenerator {
    next_id: u32,
    stride: u32,
}

impl GenomeIdGenerator {
    pub fn new(rank: u32, num_tasks: u32) -> Self {
        Self {
            next_id: rank + 1,
            stride: num_tasks.max(1),
        }
    }

    /// Take the next ID.
    ///
    /// # Panics
    /// Panics when the ID space is exhausted. IDs are never reused.
    #[inline]
    pub fn next_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id = id
            .checked_add(self.stride)
            .unwrap_or_else(|| panic!("genome ID space exhausted after ID {id}"));
        id
    }

    /// The ID the next call to [`next_id`](Self::next_id) will return.
    #[inline]
    pub fn peek(&self) -> u32 {
        self.next_id
    }
}

impl Default for GenomeIdGenerator {
    fn default() -> Self {
        Self::new(0, 1)
    }
}

/// Map from content hash to genome record.
///
/// The store holds one reference to every record it owns. A record with no
/// other holder survives until [`compact`](Self::compact) is called.
#[derive(Debug, Default)]
pub struct GenomeStore {
    records: HashMap<i64, Arc<GenomeRecord>>,
    ids: GenomeIdGenerator,
}

impl GenomeStore {
    pub fn new(ids: GenomeIdGenerator) -> Self {
        Self {
            records: HashMap::new(),
            ids,
        }
    }

    /// Take the next genome ID.
    #[inline]
    pub fn next_id(&mut self) -> u32 {
        self.ids.next_id()
    }

    #[inline]
    pub fn id_generator(&self) -> GenomeIdGenerator {
        self.ids
    }

    pub fn set_id_generator(&mut self, ids: GenomeIdGenerator) {
        self.ids = ids;
    }

    /// Insert a candidate record, or return the stored record with the same
    /// hash and drop the candidate.
    ///
    /// # Panics
    /// Panics if a stored record has the candidate's hash but different
    /// content.
    pub fn insert(&mut self, candidate: GenomeRecord) -> Arc<GenomeRecord> {
        if let Some(existing) = self.records.get(&candidate.hash_code()) {
            assert!(
                existing.same_content(&candidate),
                "hash collision: genomes {} and {} share hash {} but differ in content",
                existing.id(),
                candidate.id(),
                candidate.hash_code()
            );
            return Arc::clone(existing);
        }
        let record = Arc::new(candidate);
        self.records.insert(record.hash_code(), Arc::clone(&record));
        record
    }

    /// Look up a record by content hash.
    #[inline]
    pub fn get(&self, hash: i64) -> Option<&Arc<GenomeRecord>> {
        self.records.get(&hash)
    }

    #[inline]
    pub fn contains(&self, hash: i64) -> bool {
        self.records.contains_key(&hash)
    }

    /// True when no stored record shares the candidate's hash with different
    /// content.
    pub fn check_hashcodes(&self, candidate: &GenomeRecord) -> bool {
        self.records
            .get(&candidate.hash_code())
            .map_or(true, |existing| existing.same_content(candidate))
    }

    /// Remove every record held only by the store. Returns how many were
    /// removed.
    pub fn compact(&mut self) -> usize {
        let before = self.records.len();
        self.records.retain(|_, record| Arc::strong_count(record) > 1);
        let removed = before - self.records.len();
        debug!(removed, remaining = self.records.len(), "compacted genome store");
        removed
    }

    /// Drop every record. Outstanding handles stay valid.
    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// Number of live records.
    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<GenomeRecord>> {
        self.records.values()
    }
}
