//! Per-table cache entry: last received row and last non-null value per
//! column.

use crate::value::Value;

/// The last non-null value observed for one column, with its source row's
/// timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedValue {
    /// The value (never null).
    pub value: Value,
    /// Timestamp of the row the value came from.
    pub ts: i64,
}

/// A full snapshot of the most recently received row.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedRow {
    /// Row timestamp.
    pub ts: i64,
    /// One value per schema column, nulls included.
    pub values: Vec<Value>,
}

/// In-memory cache state for one table.
///
/// The two sides update independently: the row side is overwritten
/// unconditionally on every insert (arrival order defines "last"), the value
/// side only where the new row is non-null. The row timestamp is therefore
/// always >= every cached value timestamp.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    last_row: Option<CachedRow>,
    last_values: Vec<Option<CachedValue>>,
}

impl CacheEntry {
    /// Create an empty entry for a table with the given column count.
    pub fn new(column_count: usize) -> Self {
        Self {
            last_row: None,
            last_values: vec![None; column_count],
        }
    }

    /// Record a newly inserted row in the row-cache side.
    pub fn record_row(&mut self, ts: i64, values: &[Value]) {
        self.last_row = Some(CachedRow {
            ts,
            values: values.to_vec(),
        });
    }

    /// Record a newly inserted row in the value-cache side.
    ///
    /// Null columns leave the previous cached value untouched.
    pub fn record_values(&mut self, ts: i64, values: &[Value]) {
        debug_assert_eq!(values.len(), self.last_values.len());
        for (slot, value) in self.last_values.iter_mut().zip(values) {
            if !value.is_null() {
                *slot = Some(CachedValue {
                    value: value.clone(),
                    ts,
                });
            }
        }
    }

    /// The last received row, if any.
    pub fn last_row(&self) -> Option<&CachedRow> {
        self.last_row.as_ref()
    }

    /// The last non-null value of a column, if one was ever inserted.
    pub fn last_value(&self, column: usize) -> Option<&CachedValue> {
        self.last_values.get(column).and_then(|slot| slot.as_ref())
    }

    /// Number of columns this entry tracks.
    pub fn column_count(&self) -> usize {
        self.last_values.len()
    }
}
