//! Arena of per-table cache entries.

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::trace;

use super::entry::{CacheEntry, CachedRow, CachedValue};
use super::model::CacheModel;
use crate::catalog::TableId;
use crate::value::Value;

/// The engine-wide last-value cache.
///
/// One slot per table, indexed directly by [`TableId`] (ids are allocated
/// monotonically, so the arena stays dense). Each slot has its own lock:
/// writes to different tables never contend, and a reader sees each field
/// atomically. Write serialization per table is the caller's job (the
/// table write path holds a per-table mutex).
#[derive(Default)]
pub struct LastCache {
    slots: RwLock<Vec<Option<Arc<RwLock<CacheEntry>>>>>,
}

impl LastCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a slot for a newly created table.
    pub fn register(&self, table_id: TableId, column_count: usize) {
        let mut slots = self.slots.write();
        let index = table_id as usize;
        if index >= slots.len() {
            slots.resize_with(index + 1, || None);
        }
        slots[index] = Some(Arc::new(RwLock::new(CacheEntry::new(column_count))));
    }

    /// Release a dropped table's slot.
    pub fn evict(&self, table_id: TableId) {
        let mut slots = self.slots.write();
        if let Some(slot) = slots.get_mut(table_id as usize) {
            *slot = None;
        }
    }

    /// Apply an inserted row under the database's cache model.
    ///
    /// With model `none` this is a no-op; otherwise only the sides the model
    /// maintains are touched.
    pub fn apply(&self, table_id: TableId, ts: i64, values: &[Value], model: CacheModel) {
        if !model.allows_row_cache() && !model.allows_value_cache() {
            return;
        }

        let entry = self.slot(table_id);
        // The write path registers a slot before the first insert for any
        // model that maintains a cache.
        debug_assert!(entry.is_some(), "cache slot missing for table {}", table_id);
        let Some(entry) = entry else { return };

        let mut entry = entry.write();
        if model.allows_row_cache() {
            entry.record_row(ts, values);
        }
        if model.allows_value_cache() {
            entry.record_values(ts, values);
        }
        trace!(table_id, ts, model = model.as_str(), "cache updated");
    }

    /// Snapshot the last received row for a table.
    pub fn last_row(&self, table_id: TableId) -> Option<CachedRow> {
        self.slot(table_id)
            .and_then(|entry| entry.read().last_row().cloned())
    }

    /// Snapshot the last non-null value of one column.
    pub fn last_value(&self, table_id: TableId, column: usize) -> Option<CachedValue> {
        self.slot(table_id)
            .and_then(|entry| entry.read().last_value(column).cloned())
    }

    fn slot(&self, table_id: TableId) -> Option<Arc<RwLock<CacheEntry>>> {
        self.slots
            .read()
            .get(table_id as usize)
            .and_then(|slot| slot.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(ts: i64, id: Option<i32>) -> Vec<Value> {
        vec![
            Value::Timestamp(ts),
            id.map(Value::Int32).unwrap_or(Value::Null),
        ]
    }

    #[test]
    fn test_none_model_leaves_cache_empty() {
        let cache = LastCache::new();
        cache.register(0, 2);
        cache.apply(0, 1, &row(1, Some(1)), CacheModel::None);

        assert!(cache.last_row(0).is_none());
        assert!(cache.last_value(0, 1).is_none());
    }

    #[test]
    fn test_last_row_model_only_row_side() {
        let cache = LastCache::new();
        cache.register(0, 2);
        cache.apply(0, 1, &row(1, Some(1)), CacheModel::LastRow);

        assert!(cache.last_row(0).is_some());
        assert!(cache.last_value(0, 1).is_none());
    }

    #[test]
    fn test_last_value_model_only_value_side() {
        let cache = LastCache::new();
        cache.register(0, 2);
        cache.apply(0, 1, &row(1, Some(1)), CacheModel::LastValue);

        assert!(cache.last_row(0).is_none());
        assert_eq!(cache.last_value(0, 1).unwrap().value, Value::Int32(1));
    }

    #[test]
    fn test_both_model_updates_both_sides() {
        let cache = LastCache::new();
        cache.register(0, 2);
        cache.apply(0, 1, &row(1, Some(1)), CacheModel::Both);
        cache.apply(0, 2, &row(2, None), CacheModel::Both);

        let last_row = cache.last_row(0).unwrap();
        assert_eq!(last_row.ts, 2);
        assert_eq!(last_row.values[1], Value::Null);
        assert_eq!(cache.last_value(0, 1).unwrap().value, Value::Int32(1));
    }

    #[test]
    fn test_evict_clears_slot() {
        let cache = LastCache::new();
        cache.register(0, 2);
        cache.apply(0, 1, &row(1, Some(1)), CacheModel::Both);
        cache.evict(0);

        assert!(cache.last_row(0).is_none());
    }

    #[test]
    fn test_slots_are_independent() {
        let cache = LastCache::new();
        cache.register(0, 2);
        cache.register(5, 2);
        cache.apply(5, 9, &row(9, Some(9)), CacheModel::Both);

        assert!(cache.last_row(0).is_none());
        assert_eq!(cache.last_row(5).unwrap().ts, 9);
    }
}
