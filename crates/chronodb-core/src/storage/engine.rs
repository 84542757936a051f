//! Row store implementation.
//!
//! Rows live in a single sled tree keyed by [`RowKey`]; a table's rows form
//! one contiguous key range in timestamp order. This is the scan path the
//! planner calls "Table Scan".

use sled::{Db, Tree};
use tracing::debug;

use super::codec::{decode_row, encode_row};
use super::{RowKey, StoreConfig};
use crate::catalog::TableId;
use crate::error::Error;
use crate::value::Value;

/// Tree name for row data.
const ROWS_TREE: &str = "rows";

/// The sled-backed row store.
pub struct RowStore {
    /// The underlying sled database.
    db: Db,
    /// Tree holding all rows for all tables.
    rows: Tree,
}

impl RowStore {
    /// Open or create a row store with the given configuration.
    pub fn open(config: StoreConfig) -> Result<Self, Error> {
        let db = config.to_sled_config().open()?;
        let rows = db.open_tree(ROWS_TREE)?;
        Ok(Self { db, rows })
    }

    /// Check if the store was recovered from a previous run.
    pub fn was_recovered(&self) -> bool {
        self.db.was_recovered()
    }

    /// Insert a row, replacing in place when the timestamp already exists.
    ///
    /// Returns `true` if an existing row at the same timestamp was replaced.
    pub fn upsert(&self, table_id: TableId, ts: i64, values: &[Value]) -> Result<bool, Error> {
        let key = RowKey::new(table_id, ts).encode();
        let bytes = encode_row(values)?;
        let previous = self.rows.insert(key, bytes)?;
        Ok(previous.is_some())
    }

    /// Number of rows stored for a table.
    pub fn row_count(&self, table_id: TableId) -> Result<u64, Error> {
        let mut count = 0u64;
        for result in self.rows.range(Self::table_range(table_id)) {
            result?;
            count += 1;
        }
        Ok(count)
    }

    /// The row with the maximum timestamp, if the table is non-empty.
    pub fn last_row(&self, table_id: TableId) -> Result<Option<(i64, Vec<Value>)>, Error> {
        match self.rows.range(Self::table_range(table_id)).next_back() {
            Some(result) => {
                let (key_bytes, value_bytes) = result?;
                let key = RowKey::decode(&key_bytes).ok_or_else(|| {
                    Error::Codec("stored row key has an invalid length".into())
                })?;
                Ok(Some((key.ts, decode_row(&value_bytes)?)))
            }
            None => Ok(None),
        }
    }

    /// The most recent non-null value of a column, scanning backwards from
    /// the newest row.
    pub fn last_non_null(
        &self,
        table_id: TableId,
        column: usize,
    ) -> Result<Option<(Value, i64)>, Error> {
        for result in self.rows.range(Self::table_range(table_id)).rev() {
            let (key_bytes, value_bytes) = result?;
            let key = RowKey::decode(&key_bytes)
                .ok_or_else(|| Error::Codec("stored row key has an invalid length".into()))?;
            let row = decode_row(&value_bytes)?;
            match row.get(column) {
                Some(value) if !value.is_null() => return Ok(Some((value.clone(), key.ts))),
                _ => {}
            }
        }
        Ok(None)
    }

    /// Number of rows with a non-null value in the given column.
    pub fn non_null_count(&self, table_id: TableId, column: usize) -> Result<u64, Error> {
        let mut count = 0u64;
        for result in self.rows.range(Self::table_range(table_id)) {
            let (_, value_bytes) = result?;
            let row = decode_row(&value_bytes)?;
            if matches!(row.get(column), Some(value) if !value.is_null()) {
                count += 1;
            }
        }
        Ok(count)
    }

    /// All rows of a table in timestamp order.
    pub fn scan_rows(&self, table_id: TableId) -> Result<Vec<(i64, Vec<Value>)>, Error> {
        let mut rows = Vec::new();
        for result in self.rows.range(Self::table_range(table_id)) {
            let (key_bytes, value_bytes) = result?;
            let key = RowKey::decode(&key_bytes)
                .ok_or_else(|| Error::Codec("stored row key has an invalid length".into()))?;
            rows.push((key.ts, decode_row(&value_bytes)?));
        }
        Ok(rows)
    }

    /// Remove all rows belonging to a table.
    pub fn drop_table(&self, table_id: TableId) -> Result<u64, Error> {
        let keys: Vec<_> = self
            .rows
            .range(Self::table_range(table_id))
            .map(|result| result.map(|(key, _)| key))
            .collect::<Result<_, sled::Error>>()?;
        let removed = keys.len() as u64;
        for key in keys {
            self.rows.remove(key)?;
        }
        debug!(table_id, removed, "dropped table rows");
        Ok(removed)
    }

    /// Flush pending writes to disk.
    pub fn flush(&self) -> Result<(), Error> {
        self.rows.flush()?;
        Ok(())
    }

    fn table_range(table_id: TableId) -> std::ops::RangeInclusive<[u8; super::key::KEY_SIZE]> {
        RowKey::min_for_table(table_id).encode()..=RowKey::max_for_table(table_id).encode()
    }
}
